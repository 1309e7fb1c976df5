//! Level 5: The 45 Ronin
//!
//! Chargers pour in from all four edges while the auto-gun thins the swarm.
//! The real opponent is the RAM meter: every live charger feeds it, and at
//! 100% the process dies.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_RADIUS};
use crate::level::mechanics::compute_ram_load;
use crate::level::{LevelContext, LevelId, LevelRules};

const TOTAL_ENEMIES: u32 = 25;
const WAVE_SIZE: u32 = 8;
const WAVE_INTERVAL_MS: u64 = 1_400;
const WAVE_SPAWN_DELAY_MS: u64 = 350;
const CHARGE_SPEED_MIN: f32 = 340.0;
const CHARGE_SPEED_MAX: f32 = 560.0;
const GUN_FIRE_MS: u64 = 100;
const CHARGER_HP: i32 = 6;
const CHARGER_RADIUS: f32 = 13.0;
const CULL_MARGIN: f32 = 100.0;

const TAG_WAVE: u32 = 1;
const TAG_WAVE_SPAWN: u32 = 2;
const TAG_GUN: u32 = 3;

#[derive(Debug)]
struct Charger {
    pos: Vec2,
    vel: Vec2,
    hp: i32,
}

pub struct Ronin45 {
    chargers: Vec<Charger>,
    ram_load: f32,
    spawned: u32,
    killed: u32,
    /// Wave sizes announced but not yet spawned (edge warning lead time)
    pending_waves: VecDeque<u32>,
}

impl Ronin45 {
    pub fn new() -> Self {
        Self {
            chargers: Vec::new(),
            ram_load: 0.0,
            spawned: 0,
            killed: 0,
            pending_waves: VecDeque::new(),
        }
    }

    /// Announce a wave. The chargers themselves arrive after the edge
    /// warning has had time to register.
    fn queue_wave(&mut self, ctx: &mut LevelContext) {
        if self.spawned >= TOTAL_ENEMIES {
            return;
        }

        let count = WAVE_SIZE.min(TOTAL_ENEMIES - self.spawned);
        self.pending_waves.push_back(count);
        let _ = ctx.schedule(TAG_WAVE_SPAWN, WAVE_SPAWN_DELAY_MS);
    }

    fn spawn_wave(&mut self, ctx: &mut LevelContext, count: u32) {
        let per_edge = count.div_ceil(4);
        for i in 0..count {
            if self.spawned >= TOTAL_ENEMIES {
                break;
            }
            self.spawn_charger(ctx, i % 4, i / 4, per_edge);
        }
    }

    fn spawn_charger(&mut self, ctx: &mut LevelContext, edge: u32, slot: u32, per_edge: u32) {
        let spread = slot as f32 / per_edge.saturating_sub(1).max(1) as f32;
        let across_x = 80.0 + (ARENA_WIDTH - 160.0) * spread;
        let across_y = 120.0 + (ARENA_HEIGHT - 200.0) * spread;

        let pos = match edge {
            0 => Vec2::new(across_x, -20.0),
            1 => Vec2::new(ARENA_WIDTH + 20.0, across_y),
            2 => Vec2::new(across_x, ARENA_HEIGHT + 20.0),
            _ => Vec2::new(-20.0, across_y),
        };

        let player = ctx.player_pos();
        let rng = ctx.rng();
        let target = player
            + Vec2::new(
                rng.random_range(-30.0..=30.0),
                rng.random_range(-30.0..=30.0),
            );
        let speed = rng.random_range(CHARGE_SPEED_MIN..=CHARGE_SPEED_MAX);
        let vel = (target - pos).normalize_or_zero() * speed;

        self.chargers.push(Charger {
            pos,
            vel,
            hp: CHARGER_HP,
        });
        self.spawned += 1;
    }

    /// One auto-gun shot at the nearest on-screen charger.
    fn fire_auto_gun(&mut self, ctx: &mut LevelContext) {
        let player = ctx.player_pos();

        let mut nearest: Option<usize> = None;
        let mut best = f32::MAX;
        for (index, charger) in self.chargers.iter().enumerate() {
            // Off-screen chargers are ignored so the gun focuses on
            // visible threats.
            if charger.pos.x < 0.0
                || charger.pos.x > ARENA_WIDTH
                || charger.pos.y < 0.0
                || charger.pos.y > ARENA_HEIGHT
            {
                continue;
            }
            let distance = charger.pos.distance(player);
            if distance < best {
                best = distance;
                nearest = Some(index);
            }
        }

        let Some(index) = nearest else {
            return;
        };

        self.chargers[index].hp -= 1;
        if self.chargers[index].hp <= 0 {
            let _ = self.chargers.swap_remove(index);
            self.killed += 1;
            ctx.award(25.0);
            self.ram_load = (self.ram_load - 0.8).max(0.0);
        }
    }
}

impl Default for Ronin45 {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRules for Ronin45 {
    fn level_id(&self) -> LevelId {
        LevelId::Ronin45
    }

    fn objective_label(&self) -> &'static str {
        "Dodge ronin charges from all edges. Auto-gun active. Clear 25 ronin."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        ctx.set_player_pos(Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0));

        self.queue_wave(ctx);
        let _ = ctx.schedule_repeating(TAG_WAVE, WAVE_INTERVAL_MS);
        let _ = ctx.schedule_repeating(TAG_GUN, GUN_FIRE_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, _elapsed_ms: u64, delta_ms: u64) {
        let dt = delta_ms as f32 / 1_000.0;

        for tag in ctx.take_fired() {
            match tag {
                TAG_WAVE => self.queue_wave(ctx),
                TAG_WAVE_SPAWN => {
                    if let Some(count) = self.pending_waves.pop_front() {
                        self.spawn_wave(ctx, count);
                    }
                }
                TAG_GUN => self.fire_auto_gun(ctx),
                _ => {}
            }
        }

        let alive = self.chargers.len() as u32;

        for charger in &mut self.chargers {
            charger.pos += charger.vel * dt;
        }

        // Strays past the cull margin free their slot for a later wave.
        let mut culled = 0u32;
        self.chargers.retain(|charger| {
            let out = charger.pos.x < -CULL_MARGIN
                || charger.pos.x > ARENA_WIDTH + CULL_MARGIN
                || charger.pos.y < -CULL_MARGIN
                || charger.pos.y > ARENA_HEIGHT + CULL_MARGIN;
            if out {
                culled += 1;
            }
            !out
        });
        self.spawned = self.spawned.saturating_sub(culled);

        let player = ctx.player_pos();
        let mut contacts = 0u32;
        self.chargers.retain(|charger| {
            if charger.pos.distance(player) <= PLAYER_RADIUS + CHARGER_RADIUS {
                contacts += 1;
                false
            } else {
                true
            }
        });
        // A ram-through consumes the charger but costs dearly.
        for _ in 0..contacts {
            self.killed += 1;
            ctx.damage(18.0);
        }

        self.ram_load = (self.ram_load + (alive as f32 * 0.2 + 0.1) * dt * 0.7).max(0.0);

        if self.ram_load >= 100.0 {
            ctx.restart_current_level();
            return;
        }

        let remaining = TOTAL_ENEMIES.saturating_sub(self.killed);
        if remaining == 0 {
            ctx.complete_level(0);
            return;
        }

        let occupancy = compute_ram_load(self.chargers.len() as u32, TOTAL_ENEMIES);
        ctx.update_hud(format!(
            "Remaining {}/{} | RAM {:.1}% | Occupancy {}%",
            remaining, TOTAL_ENEMIES, self.ram_load, occupancy,
        ));
    }
}
