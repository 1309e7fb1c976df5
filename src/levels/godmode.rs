//! Level 6: GODMODE
//!
//! Pure survival. Fire rains from above, glitch darts sweep in from the
//! sides, a sword strike lands every 2.2 seconds, and every ten seconds the
//! rules themselves mutate. Survive three minutes and the survival time
//! feeds straight into the score.

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_RADIUS};
use crate::level::mechanics::{PARRY_WINDOW_MS, is_parry_success, parry_delta_ms};
use crate::level::{
    LevelContext, LevelId, LevelRules, MUTATION_INTERVAL_MS, MUTATION_WINDOW_MS,
    MutationScheduler, RuleMutation,
};

const SURVIVE_MS: u64 = 180_000;
const FIRE_SPAWN_MS: u64 = 700;
const GLITCH_SPAWN_MS: u64 = 540;
const SWORD_ARM_MS: u64 = 2_200;
const SWORD_LAND_MS: u64 = 450;

const FIRE_RADIUS: f32 = 10.0;
const GLITCH_RADIUS: f32 = 12.0;
const CULL_MARGIN: f32 = 40.0;

const TAG_FIRE: u32 = 1;
const TAG_GLITCH: u32 = 2;
const TAG_SWORD: u32 = 3;

/// The four godmode rule overrides, rotated round-robin by the scheduler.
/// Enter and exit actions write absolute values, so repeating either is
/// harmless.
pub fn mutation_catalog() -> Vec<RuleMutation> {
    vec![
        RuleMutation {
            id: "gravity_flip",
            label: "Gravity Flip",
            duration_ms: MUTATION_WINDOW_MS,
            apply: |effects| {
                effects.gravity_multiplier = -1.0;
                effects.active_label = "Gravity Flip";
            },
            clear: |effects| {
                effects.gravity_multiplier = 1.0;
                effects.active_label = "None";
            },
        },
        RuleMutation {
            id: "reverse_controls",
            label: "Reverse Controls",
            duration_ms: MUTATION_WINDOW_MS,
            apply: |effects| {
                effects.reverse_controls = true;
                effects.active_label = "Reverse Controls";
            },
            clear: |effects| {
                effects.reverse_controls = false;
                effects.active_label = "None";
            },
        },
        RuleMutation {
            id: "darkness_mask",
            label: "Darkness Mask",
            duration_ms: MUTATION_WINDOW_MS,
            apply: |effects| {
                effects.darkness_mask = true;
                effects.active_label = "Darkness Mask";
            },
            clear: |effects| {
                effects.darkness_mask = false;
                effects.active_label = "None";
            },
        },
        RuleMutation {
            id: "speed_shift",
            label: "Speed Shift",
            duration_ms: MUTATION_WINDOW_MS,
            apply: |effects| {
                effects.speed_multiplier = 1.8;
                effects.active_label = "Speed Shift";
            },
            clear: |effects| {
                effects.speed_multiplier = 1.0;
                effects.active_label = "None";
            },
        },
    ]
}

#[derive(Debug)]
struct Hazard {
    pos: Vec2,
    vel: Vec2,
}

pub struct Godmode {
    fire_hazards: Vec<Hazard>,
    glitch_hazards: Vec<Hazard>,
    strike_at_ms: Option<u64>,
    scheduler: MutationScheduler,
}

impl Godmode {
    pub fn new() -> Self {
        Self {
            fire_hazards: Vec::new(),
            glitch_hazards: Vec::new(),
            strike_at_ms: None,
            scheduler: MutationScheduler::new(
                mutation_catalog(),
                MUTATION_INTERVAL_MS,
                MUTATION_WINDOW_MS,
            ),
        }
    }

    fn spawn_fire(&mut self, ctx: &mut LevelContext) {
        let rng = ctx.rng();
        let pos = Vec2::new(rng.random_range(24.0..=ARENA_WIDTH - 24.0), -16.0);
        let vel = Vec2::new(
            rng.random_range(-120.0..=120.0),
            rng.random_range(210.0..=320.0),
        );
        self.fire_hazards.push(Hazard { pos, vel });
    }

    fn spawn_glitch(&mut self, ctx: &mut LevelContext) {
        let rng = ctx.rng();
        let from_left = rng.random_bool(0.5);
        let pos = Vec2::new(
            if from_left { -30.0 } else { ARENA_WIDTH + 30.0 },
            rng.random_range(100.0..=ARENA_HEIGHT - 90.0),
        );
        let speed = rng.random_range(260.0..=360.0);
        let vel = Vec2::new(
            if from_left { speed } else { -speed },
            rng.random_range(-80.0..=80.0),
        );
        self.glitch_hazards.push(Hazard { pos, vel });
    }
}

impl Default for Godmode {
    fn default() -> Self {
        Self::new()
    }
}

fn step_hazards(hazards: &mut Vec<Hazard>, dt: f32) {
    for hazard in hazards.iter_mut() {
        hazard.pos += hazard.vel * dt;
    }
    hazards.retain(|hazard| {
        hazard.pos.x > -CULL_MARGIN
            && hazard.pos.x < ARENA_WIDTH + CULL_MARGIN
            && hazard.pos.y > -CULL_MARGIN
            && hazard.pos.y < ARENA_HEIGHT + CULL_MARGIN
    });
}

fn drain_contacts(hazards: &mut Vec<Hazard>, player: Vec2, radius: f32) -> u32 {
    let mut contacts = 0u32;
    hazards.retain(|hazard| {
        if hazard.pos.distance(player) <= PLAYER_RADIUS + radius {
            contacts += 1;
            false
        } else {
            true
        }
    });
    contacts
}

impl LevelRules for Godmode {
    fn level_id(&self) -> LevelId {
        LevelId::Godmode
    }

    fn objective_label(&self) -> &'static str {
        "Final protocol: survive 180s. Rules mutate every 10 seconds."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        let _ = ctx.schedule_repeating(TAG_FIRE, FIRE_SPAWN_MS);
        let _ = ctx.schedule_repeating(TAG_GLITCH, GLITCH_SPAWN_MS);
        let _ = ctx.schedule_repeating(TAG_SWORD, SWORD_ARM_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64) {
        let dt = delta_ms as f32 / 1_000.0;

        for tag in ctx.take_fired() {
            match tag {
                TAG_FIRE => self.spawn_fire(ctx),
                TAG_GLITCH => self.spawn_glitch(ctx),
                TAG_SWORD => self.strike_at_ms = Some(elapsed_ms + SWORD_LAND_MS),
                _ => {}
            }
        }

        step_hazards(&mut self.fire_hazards, dt);
        step_hazards(&mut self.glitch_hazards, dt);

        let player = ctx.player_pos();
        let fire_hits = drain_contacts(&mut self.fire_hazards, player, FIRE_RADIUS);
        for _ in 0..fire_hits {
            ctx.damage(9.0);
        }
        let glitch_hits = drain_contacts(&mut self.glitch_hazards, player, GLITCH_RADIUS);
        for _ in 0..glitch_hits {
            ctx.damage(7.0);
        }

        let _ = self.scheduler.update(elapsed_ms, ctx.effects_mut());

        if ctx.input().primary
            && let Some(strike_at) = self.strike_at_ms.take()
        {
            let delta = parry_delta_ms(strike_at, elapsed_ms);
            if is_parry_success(delta, PARRY_WINDOW_MS) {
                ctx.award(18.0);
            } else {
                ctx.damage(18.0);
            }
        }

        // An ignored strike lands on its own a window after the instant.
        if let Some(strike_at) = self.strike_at_ms
            && elapsed_ms > strike_at + PARRY_WINDOW_MS
        {
            ctx.damage(16.0);
            self.strike_at_ms = None;
        }

        if elapsed_ms >= SURVIVE_MS {
            self.scheduler.clear_all(ctx.effects_mut());
            ctx.complete_level(SURVIVE_MS);
            return;
        }

        let remaining_secs = (SURVIVE_MS - elapsed_ms).div_ceil(1_000);
        ctx.update_hud(format!(
            "Survive {}s | SPACE to parry sword strikes | Mutation: {}",
            remaining_secs,
            ctx.effects().active_label,
        ));
    }
}
