//! Level 3: Pixel Boss
//!
//! Shoot rays to raise the render resolution while the boss fires walls of
//! pixel blocks at the player. Past 35% the boss shifts phase: tighter
//! spreads plus vertical rakes along the top and bottom lanes.

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_RADIUS};
use crate::level::{LevelContext, LevelId, LevelRules};

const TARGET_RESOLUTION: f32 = 70.0;
const RESOLUTION_PER_HIT: f32 = 5.0;
const PHASE_TWO_AT: f32 = 35.0;
const WAVE_MS: u64 = 520;
const REFIRE_MS: u64 = 190;
const HIT_BAND: f32 = 120.0;
const CONTACT_GATE_MS: u64 = 220;

const TAG_WAVE: u32 = 1;

#[derive(Debug)]
struct PixelBlock {
    pos: Vec2,
    vel: Vec2,
    size: f32,
}

pub struct PixelBoss {
    resolution: f32,
    phase_two: bool,
    next_shot_ms: u64,
    last_contact_ms: Option<u64>,
    boss_pos: Vec2,
    blocks: Vec<PixelBlock>,
}

impl PixelBoss {
    pub fn new() -> Self {
        Self {
            resolution: 0.0,
            phase_two: false,
            next_shot_ms: 0,
            last_contact_ms: None,
            boss_pos: Vec2::new(ARENA_WIDTH - 180.0, ARENA_HEIGHT / 2.0),
            blocks: Vec::new(),
        }
    }

    fn spawn_block(&mut self, pos: Vec2, size: f32, vel: Vec2) {
        self.blocks.push(PixelBlock { pos, vel, size });
    }

    fn spawn_block_wave(&mut self, ctx: &mut LevelContext) {
        let count = if self.phase_two { 5 } else { 3 };
        let spread = if self.phase_two { 60.0 } else { 84.0 };
        let size = if self.phase_two { 30.0 } else { 26.0 };
        let player_y = ctx.player_pos().y;
        let boss_x = self.boss_pos.x;

        for i in 0..count {
            let offset = (i as f32 - (count - 1) as f32 / 2.0) * spread;
            let jitter = ctx.rng().random_range(-16.0..=16.0);
            let y = (player_y + offset + jitter).clamp(90.0, ARENA_HEIGHT - 90.0);
            let speed = if self.phase_two {
                ctx.rng().random_range(360.0..=500.0)
            } else {
                ctx.rng().random_range(320.0..=430.0)
            };
            self.spawn_block(Vec2::new(boss_x - 70.0, y), size, Vec2::new(-speed, 0.0));
        }

        if self.phase_two {
            let rake_down = ctx.rng().random_range(140.0..=240.0);
            self.spawn_block(
                Vec2::new(boss_x - 82.0, 96.0),
                24.0,
                Vec2::new(-400.0, rake_down),
            );
            let rake_up = ctx.rng().random_range(140.0..=240.0);
            self.spawn_block(
                Vec2::new(boss_x - 82.0, ARENA_HEIGHT - 96.0),
                24.0,
                Vec2::new(-400.0, -rake_up),
            );
        }
    }
}

impl Default for PixelBoss {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRules for PixelBoss {
    fn level_id(&self) -> LevelId {
        LevelId::PixelBoss
    }

    fn objective_label(&self) -> &'static str {
        "Fire SPACE 4K Rays. Dodge pixel blocks to reach 70% resolution."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        let _ = ctx.schedule_repeating(TAG_WAVE, WAVE_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64) {
        let dt = delta_ms as f32 / 1_000.0;

        for tag in ctx.take_fired() {
            if tag == TAG_WAVE {
                self.spawn_block_wave(ctx);
            }
        }

        if ctx.input().primary && elapsed_ms >= self.next_shot_ms {
            self.next_shot_ms = elapsed_ms + REFIRE_MS;
            // Rays travel flat, so the boss is only hittable from its band.
            if (ctx.player_pos().y - self.boss_pos.y).abs() <= HIT_BAND {
                self.resolution = (self.resolution + RESOLUTION_PER_HIT).min(TARGET_RESOLUTION);
                ctx.award(20.0);
            }
        }

        if !self.phase_two && self.resolution >= PHASE_TWO_AT {
            self.phase_two = true;
            log::info!("pixel boss phase shift at {:.0}%", self.resolution);
        }

        for block in &mut self.blocks {
            block.pos += block.vel * dt;
        }
        self.blocks.retain(|block| {
            block.pos.x > -80.0
                && block.pos.x < ARENA_WIDTH + 80.0
                && block.pos.y > -80.0
                && block.pos.y < ARENA_HEIGHT + 80.0
        });

        let player = ctx.player_pos();
        let mut contact = false;
        self.blocks.retain(|block| {
            if block.pos.distance(player) <= PLAYER_RADIUS + block.size / 2.0 {
                contact = true;
                false
            } else {
                true
            }
        });
        if contact {
            let gate_open = self
                .last_contact_ms
                .is_none_or(|last| elapsed_ms.saturating_sub(last) > CONTACT_GATE_MS);
            if gate_open {
                self.last_contact_ms = Some(elapsed_ms);
                ctx.damage(14.0);
            }
        }

        if self.resolution >= TARGET_RESOLUTION {
            ctx.complete_level(0);
            return;
        }

        ctx.update_hud(format!(
            "Resolution {:.0}% / {:.0}% | SPACE = 4K Ray | Obstacles {}",
            self.resolution,
            TARGET_RESOLUTION,
            self.blocks.len(),
        ));
    }
}
