//! Level 2: The Snap
//!
//! Blur enemies drift fast and erratic. The snap pulse captures up to four
//! of them inside its radius, on a cooldown; snapping empty air stings.

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_RADIUS};
use crate::level::{LevelContext, LevelId, LevelRules};

const REQUIRED_CAPTURES: u32 = 24;
const SNAP_RADIUS: f32 = 150.0;
const SNAP_COOLDOWN_MS: u64 = 600;
const MAX_ENEMIES: usize = 24;
const INITIAL_ENEMIES: usize = 16;
const REFILL_MS: u64 = 900;
const RESPAWN_DELAY_MS: u64 = 420;
const CAPTURES_PER_SNAP: usize = 4;
const ENEMY_RADIUS: f32 = 15.0;

const TAG_REFILL: u32 = 1;
const TAG_RESPAWN: u32 = 2;

#[derive(Debug)]
struct BlurEnemy {
    pos: Vec2,
    vel: Vec2,
}

pub struct Snap {
    captured: u32,
    next_snap_ms: u64,
    enemies: Vec<BlurEnemy>,
}

impl Snap {
    pub fn new() -> Self {
        Self {
            captured: 0,
            next_snap_ms: 0,
            enemies: Vec::new(),
        }
    }

    fn spawn_enemy(&mut self, ctx: &mut LevelContext) {
        let rng = ctx.rng();
        let pos = Vec2::new(
            rng.random_range(80.0..=ARENA_WIDTH - 80.0),
            rng.random_range(110.0..=ARENA_HEIGHT - 90.0),
        );
        let vel = Vec2::new(
            rng.random_range(-560.0..=560.0),
            rng.random_range(-560.0..=560.0),
        );
        self.enemies.push(BlurEnemy { pos, vel });
    }

    fn perform_snap(&mut self, ctx: &mut LevelContext) {
        let player = ctx.player_pos();

        let mut hits: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.pos.distance(player) <= SNAP_RADIUS)
            .map(|(index, _)| index)
            .collect();

        if hits.is_empty() {
            ctx.damage(3.0);
            return;
        }

        hits.truncate(CAPTURES_PER_SNAP);
        for index in hits.into_iter().rev() {
            let _ = self.enemies.remove(index);
            self.captured += 1;
            ctx.award(18.0);
            let _ = ctx.schedule(TAG_RESPAWN, RESPAWN_DELAY_MS);
        }
    }
}

impl Default for Snap {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRules for Snap {
    fn level_id(&self) -> LevelId {
        LevelId::Snap
    }

    fn objective_label(&self) -> &'static str {
        "Use SPACE to snap nearby blur enemies. Capture 24 frames."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        for _ in 0..INITIAL_ENEMIES {
            self.spawn_enemy(ctx);
        }
        let _ = ctx.schedule_repeating(TAG_REFILL, REFILL_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64) {
        let dt = delta_ms as f32 / 1_000.0;

        for tag in ctx.take_fired() {
            match tag {
                TAG_REFILL | TAG_RESPAWN => {
                    if self.enemies.len() < MAX_ENEMIES {
                        self.spawn_enemy(ctx);
                    }
                }
                _ => {}
            }
        }

        if ctx.input().primary && elapsed_ms >= self.next_snap_ms {
            self.next_snap_ms = elapsed_ms + SNAP_COOLDOWN_MS;
            self.perform_snap(ctx);
        }

        for enemy in &mut self.enemies {
            enemy.pos += enemy.vel * dt;
        }

        // Escapees get teleported back in with a fresh heading.
        let mut relocate: Vec<usize> = Vec::new();
        for (index, enemy) in self.enemies.iter().enumerate() {
            if enemy.pos.x < -40.0
                || enemy.pos.x > ARENA_WIDTH + 40.0
                || enemy.pos.y < -40.0
                || enemy.pos.y > ARENA_HEIGHT + 40.0
            {
                relocate.push(index);
            }
        }
        for index in relocate {
            let rng = ctx.rng();
            let pos = Vec2::new(
                rng.random_range(80.0..=ARENA_WIDTH - 80.0),
                rng.random_range(90.0..=ARENA_HEIGHT - 80.0),
            );
            let vel = Vec2::new(
                rng.random_range(-520.0..=520.0),
                rng.random_range(-520.0..=520.0),
            );
            self.enemies[index] = BlurEnemy { pos, vel };
        }

        let player = ctx.player_pos();
        let mut contacts = 0u32;
        for enemy in &mut self.enemies {
            if enemy.pos.distance(player) <= PLAYER_RADIUS + ENEMY_RADIUS {
                contacts += 1;
                enemy.vel *= -0.8;
            }
        }
        for _ in 0..contacts {
            ctx.damage(4.0);
        }

        if self.captured >= REQUIRED_CAPTURES {
            ctx.complete_level(0);
            return;
        }

        let remaining = REQUIRED_CAPTURES - self.captured;
        let cooldown_left = self.next_snap_ms.saturating_sub(elapsed_ms);
        ctx.update_hud(format!(
            "Captured {}/{} | SPACE Snap Radius {}px | Cooldown {:.1}s | Remaining {}",
            self.captured,
            REQUIRED_CAPTURES,
            SNAP_RADIUS as u32,
            cooldown_left as f32 / 1_000.0,
            remaining,
        ));
    }
}
