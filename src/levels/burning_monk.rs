//! Level 1: The Burning Monk
//!
//! Survive 20 seconds while the overheat meter climbs. Fire bugs rain down
//! aimed near the player, coolant drops push the meter back down, and the
//! floor is lava in all but name.

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_RADIUS};
use crate::level::mechanics::update_temperature;
use crate::level::{LevelContext, LevelId, LevelRules};

const GOAL_MS: u64 = 20_000;
const FIRE_SPAWN_MS: u64 = 300;
const COOLANT_SPAWN_MS: u64 = 6_000;
const HEAT_SURGE_MS: u64 = 4_000;

const START_TEMPERATURE: f32 = 25.0;
const FLOOR_ZONE_Y: f32 = ARENA_HEIGHT - 58.0;
const BUG_RADIUS: f32 = 14.0;
const CUP_RADIUS: f32 = 12.0;

const TAG_FIRE: u32 = 1;
const TAG_COOLANT: u32 = 2;
const TAG_SURGE: u32 = 3;

#[derive(Debug)]
struct FireBug {
    pos: Vec2,
    vel: Vec2,
}

#[derive(Debug)]
struct CoolantCup {
    pos: Vec2,
    vel: Vec2,
}

pub struct BurningMonk {
    temperature: f32,
    fire_bugs: Vec<FireBug>,
    coolant_cups: Vec<CoolantCup>,
}

impl BurningMonk {
    pub fn new() -> Self {
        Self {
            temperature: START_TEMPERATURE,
            fire_bugs: Vec::new(),
            coolant_cups: Vec::new(),
        }
    }

    fn spawn_fire_bug(&mut self, ctx: &mut LevelContext) {
        let player_x = ctx.player_pos().x;
        let rng = ctx.rng();

        // Bugs aim near the player so camping one spot never works.
        let target_x = (player_x + rng.random_range(-140.0..=140.0))
            .clamp(30.0, ARENA_WIDTH - 30.0);
        let spawn_x = (target_x + rng.random_range(-120.0..=120.0))
            .clamp(24.0, ARENA_WIDTH - 24.0);
        let vel_x = ((target_x - spawn_x) * 1.6).clamp(-220.0, 220.0);
        let vel_y = rng.random_range(280.0..=430.0);

        self.fire_bugs.push(FireBug {
            pos: Vec2::new(spawn_x, -24.0),
            vel: Vec2::new(vel_x, vel_y),
        });
    }

    fn spawn_coolant(&mut self, ctx: &mut LevelContext) {
        let rng = ctx.rng();
        let pos = Vec2::new(rng.random_range(40.0..=ARENA_WIDTH - 40.0), -16.0);
        let vel = Vec2::new(
            rng.random_range(-35.0..=35.0),
            rng.random_range(140.0..=210.0),
        );
        self.coolant_cups.push(CoolantCup { pos, vel });
    }
}

impl Default for BurningMonk {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRules for BurningMonk {
    fn level_id(&self) -> LevelId {
        LevelId::BurningMonk
    }

    fn objective_label(&self) -> &'static str {
        "Survive 20s. Keep temp under 100%. Collect coffee coolant."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        for _ in 0..7 {
            self.spawn_fire_bug(ctx);
        }

        let _ = ctx.schedule_repeating(TAG_FIRE, FIRE_SPAWN_MS);
        let _ = ctx.schedule_repeating(TAG_COOLANT, COOLANT_SPAWN_MS);
        let _ = ctx.schedule_repeating(TAG_SURGE, HEAT_SURGE_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64) {
        let dt = delta_ms as f32 / 1_000.0;

        for tag in ctx.take_fired() {
            match tag {
                TAG_FIRE => self.spawn_fire_bug(ctx),
                TAG_COOLANT => self.spawn_coolant(ctx),
                TAG_SURGE => self.temperature += 10.0,
                _ => {}
            }
        }

        self.temperature = update_temperature(self.temperature, dt, 0, 0).clamp(0.0, 120.0);

        for bug in &mut self.fire_bugs {
            bug.pos += bug.vel * dt;
        }
        for cup in &mut self.coolant_cups {
            cup.pos += cup.vel * dt;
        }
        self.fire_bugs.retain(|bug| {
            bug.pos.y < ARENA_HEIGHT + 80.0 && bug.pos.x > -80.0 && bug.pos.x < ARENA_WIDTH + 80.0
        });
        self.coolant_cups.retain(|cup| {
            cup.pos.y < ARENA_HEIGHT + 80.0 && cup.pos.x > -80.0 && cup.pos.x < ARENA_WIDTH + 80.0
        });

        let player = ctx.player_pos();

        let mut bug_hits = 0u32;
        self.fire_bugs.retain(|bug| {
            if bug.pos.distance(player) <= PLAYER_RADIUS + BUG_RADIUS {
                bug_hits += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..bug_hits {
            ctx.damage(8.0);
        }
        self.temperature = update_temperature(self.temperature, 0.0, bug_hits, 0);

        let mut collected = 0u32;
        self.coolant_cups.retain(|cup| {
            if cup.pos.distance(player) <= PLAYER_RADIUS + CUP_RADIUS {
                collected += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..collected {
            ctx.heal(5.0);
        }
        self.temperature = update_temperature(self.temperature, 0.0, 0, collected);

        // Standing in the floor zone burns and feeds the meter.
        if player.y >= FLOOR_ZONE_Y {
            ctx.damage(14.0 * dt);
            self.temperature += 6.0 * dt;
        }

        if self.temperature >= 100.0 {
            ctx.restart_current_level();
            return;
        }

        if elapsed_ms >= GOAL_MS {
            ctx.complete_level(0);
            return;
        }

        let remaining_ms = GOAL_MS - elapsed_ms;
        ctx.update_hud(format!(
            "Temp {:.0}% | Survive {:.1}s | Bugs {} | Coffee {}",
            self.temperature,
            remaining_ms as f32 / 1_000.0,
            self.fire_bugs.len(),
            self.coolant_cups.len(),
        ));
    }
}
