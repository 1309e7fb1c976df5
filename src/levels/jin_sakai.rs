//! Level 4: Jin Sakai
//!
//! A pure timing duel. One ninja at a time telegraphs for 420ms and then
//! strikes; the parry must land within 110ms of the strike instant.
//! Shooting is forbidden here, and parrying empty air stings.

use glam::Vec2;
use rand::Rng;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::level::mechanics::{is_parry_success, parry_delta_ms};
use crate::level::{LevelContext, LevelId, LevelRules};

const TARGET_PARRIES: u32 = 14;
const TELEGRAPH_MS: u64 = 420;
const PARRY_WINDOW_MS: u64 = 110;
const NINJA_POLL_MS: u64 = 740;

const TAG_NINJA: u32 = 1;

#[derive(Debug)]
struct Ninja {
    pos: Vec2,
    strike_at_ms: u64,
}

pub struct JinSakai {
    parries: u32,
    ninja: Option<Ninja>,
}

impl JinSakai {
    pub fn new() -> Self {
        Self {
            parries: 0,
            ninja: None,
        }
    }

    fn spawn_ninja(&mut self, ctx: &mut LevelContext, now_ms: u64) {
        let rng = ctx.rng();
        let from_left = rng.random_bool(0.5);
        let x = if from_left { -40.0 } else { ARENA_WIDTH + 40.0 };
        let y = rng.random_range(130.0..=ARENA_HEIGHT - 100.0);

        self.ninja = Some(Ninja {
            pos: Vec2::new(x, y),
            strike_at_ms: now_ms + TELEGRAPH_MS,
        });
    }
}

impl Default for JinSakai {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRules for JinSakai {
    fn level_id(&self) -> LevelId {
        LevelId::JinSakai
    }

    fn objective_label(&self) -> &'static str {
        "No shooting. SPACE parry 14 strikes within 110ms."
    }

    fn on_level_start(&mut self, ctx: &mut LevelContext) {
        let _ = ctx.schedule_repeating(TAG_NINJA, NINJA_POLL_MS);
    }

    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64) {
        for tag in ctx.take_fired() {
            if tag == TAG_NINJA && self.ninja.is_none() {
                self.spawn_ninja(ctx, elapsed_ms);
            }
        }

        // The ninja closes on the player for the length of the telegraph,
        // arriving exactly at the strike instant.
        if let Some(ninja) = &mut self.ninja {
            let remaining = ninja.strike_at_ms.saturating_sub(elapsed_ms);
            if remaining > 0 {
                let fraction = (delta_ms as f32 / remaining as f32).min(1.0);
                ninja.pos += (ctx.player_pos() - ninja.pos) * fraction;
            }
        }

        // Drawing the gun costs honor and health.
        if ctx.input().secondary {
            ctx.damage(4.0);
        }

        if ctx.input().primary {
            match self.ninja.take() {
                None => ctx.damage(10.0),
                Some(ninja) => {
                    let delta = parry_delta_ms(ninja.strike_at_ms, elapsed_ms);
                    if is_parry_success(delta, PARRY_WINDOW_MS) {
                        self.parries += 1;
                        ctx.award(35.0);
                    } else {
                        ctx.damage(20.0);
                    }
                }
            }
        }

        if let Some(ninja) = &self.ninja
            && elapsed_ms > ninja.strike_at_ms + PARRY_WINDOW_MS
        {
            ctx.damage(20.0);
            self.ninja = None;
        }

        if self.parries >= TARGET_PARRIES {
            ctx.complete_level(0);
            return;
        }

        let status = match &self.ninja {
            Some(ninja) => format!("Strike at {:.2}s", ninja.strike_at_ms as f32 / 1_000.0),
            None => "Waiting for ninja".to_owned(),
        };
        ctx.update_hud(format!(
            "Parries {}/{} | {}",
            self.parries, TARGET_PARRIES, status,
        ));
    }
}
