//! Level lifecycle state machine
//!
//! Runs one level attempt: countdown, active play, and the terminal
//! complete/restart flows. Level-specific rules plug in through
//! [`LevelRules`] and call back through [`LevelContext`]; the lifecycle owns
//! health, timing, scoring and persistence so every level behaves the same
//! at the seams.
//!
//! Tick order inside Active is fixed: pause check, health check, movement,
//! rules update, HUD refresh. Rules may request completion or a restart
//! from inside their update hook; requests are latched and resolved once
//! the hook returns.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{
    ARENA_HEIGHT, COUNTDOWN_STEP_MS, COUNTDOWN_STEPS, MAX_HEALTH, PLAYER_START_X,
};
use crate::persistence::{clear_active_run, save_active_run};
use crate::score::{ScoreInput, apply_score, calculate_level_score};
use crate::storage::KeyValueStore;

use super::movement;
use super::state::{LevelId, LevelPhase, LevelResult, LevelSnapshot, MutationEffects, RunState};
use super::timer::{TimerHandle, TimerQueue};

/// Queue tag reserved for the countdown stepper. The countdown queue is
/// cleared before any level timer is scheduled, so levels may use any tag.
const COUNTDOWN_TAG: u32 = u32::MAX;

/// Logical action signals for one tick. Direction flags are level-held;
/// the rest are edge-triggered by the driver.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Primary action: snap, ray, parry
    pub primary: bool,
    /// Secondary action: attack
    pub secondary: bool,
    /// Pause toggle
    pub pause: bool,
    /// Accept the restart prompt (retry the level)
    pub confirm: bool,
    /// Decline the restart prompt (abandon to results)
    pub cancel: bool,
}

/// Presentation side effects for the front end to drain each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxEvent {
    CountdownStep(u8),
    LevelStarted,
    PlayerHit,
    PlayerHealed,
    Paused,
    Resumed,
    RestartPrompt,
    LevelCleared,
}

/// HUD read model, refreshed at the end of every active tick.
#[derive(Debug, Clone)]
pub struct HudModel {
    pub level_label: String,
    pub objective: &'static str,
    /// Level-controlled status line
    pub status: String,
    pub health: f32,
    pub score: f64,
    pub elapsed_secs: u64,
    pub mutation_label: &'static str,
}

/// Per-level rule set consumed by the lifecycle.
pub trait LevelRules {
    fn level_id(&self) -> LevelId;
    fn objective_label(&self) -> &'static str;
    /// Invoked exactly once, at the countdown-to-active transition
    fn on_level_start(&mut self, ctx: &mut LevelContext);
    /// Invoked every active tick, after movement has been applied
    fn on_level_update(&mut self, ctx: &mut LevelContext, elapsed_ms: u64, delta_ms: u64);
}

/// Terminal outcome of a level attempt.
#[derive(Debug, Clone)]
pub enum LevelOutcome {
    /// Player chose to retry after health hit zero
    Retry(LevelSnapshot),
    /// Objective met
    Completed {
        run_state: RunState,
        level_index: usize,
        result: LevelResult,
        results: Vec<LevelResult>,
    },
    /// Player abandoned the run at the failure prompt
    Abandoned {
        run_state: RunState,
        level_index: usize,
        deaths_in_level: u32,
        results: Vec<LevelResult>,
    },
}

/// The lifecycle-owned state a level's rules read and mutate through
/// callbacks.
pub struct LevelContext {
    run_state: RunState,
    level_index: usize,
    deaths_in_level: u32,
    prior_results: Vec<LevelResult>,
    damage_taken: f32,
    effects: MutationEffects,
    level_elapsed_ms: u64,
    level_active: bool,
    player_pos: Vec2,
    velocity: Vec2,
    input: TickInput,
    timers: TimerQueue,
    fired: Vec<u32>,
    rng: Pcg32,
    hud: HudModel,
    fx: Vec<FxEvent>,
    pending_complete: Option<u64>,
    pending_restart: bool,
}

impl LevelContext {
    /// Apply damage. Negative amounts are treated as zero. Health can hit
    /// zero here without ending the attempt: the tick loop performs the
    /// single per-tick health check, so simultaneous hits coalesce into
    /// one restart.
    pub fn damage(&mut self, amount: f32) {
        let applied = amount.max(0.0);
        self.damage_taken += applied;
        self.run_state.health = (self.run_state.health - applied).max(0.0);
        if applied > 0.0 {
            self.fx.push(FxEvent::PlayerHit);
        }
    }

    /// Restore health, clamped to the maximum.
    pub fn heal(&mut self, amount: f32) {
        let applied = amount.max(0.0);
        self.run_state.health = (self.run_state.health + applied).min(MAX_HEALTH);
        if applied > 0.0 {
            self.fx.push(FxEvent::PlayerHealed);
        }
    }

    /// Declare the objective met. Resolved after the update hook returns;
    /// the first call in a tick wins.
    pub fn complete_level(&mut self, bonus_survival_ms: u64) {
        let _ = self.pending_complete.get_or_insert(bonus_survival_ms);
    }

    /// Request the failure flow, as if health had reached zero.
    pub fn restart_current_level(&mut self) {
        self.pending_restart = true;
    }

    /// Add points immediately (pickup rewards). The run total stays
    /// floored at zero.
    pub fn award(&mut self, points: f64) {
        self.run_state.score = apply_score(self.run_state.score, points);
    }

    pub fn effects(&self) -> &MutationEffects {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut MutationEffects {
        &mut self.effects
    }

    /// Attempt-relative active time. Zero while gameplay is not live.
    pub fn level_elapsed_ms(&self) -> u64 {
        if self.level_active { self.level_elapsed_ms } else { 0 }
    }

    /// Replace the HUD status line.
    pub fn update_hud(&mut self, status: impl Into<String>) {
        self.hud.status = status.into();
    }

    pub fn player_pos(&self) -> Vec2 {
        self.player_pos
    }

    pub fn set_player_pos(&mut self, pos: Vec2) {
        self.player_pos = pos;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn input(&self) -> &TickInput {
        &self.input
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Timer tags that fired this tick, in firing order. Draining resets
    /// the list.
    pub fn take_fired(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.fired)
    }

    pub fn schedule(&mut self, tag: u32, delay_ms: u64) -> TimerHandle {
        self.timers.schedule(tag, delay_ms)
    }

    pub fn schedule_repeating(&mut self, tag: u32, interval_ms: u64) -> TimerHandle {
        self.timers.schedule_repeating(tag, interval_ms)
    }

    pub fn cancel_timer(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn deaths_in_level(&self) -> u32 {
        self.deaths_in_level
    }
}

/// One level attempt from scene entry to terminal outcome.
pub struct LevelLifecycle {
    rules: Box<dyn LevelRules>,
    ctx: LevelContext,
    phase: LevelPhase,
    countdown_remaining: u8,
    restart_handled: bool,
    restart_snapshot: Option<LevelSnapshot>,
}

impl LevelLifecycle {
    /// Enter a level from a snapshot. Health refills, per-attempt counters
    /// reset, mutation effects return to neutral and the countdown starts.
    pub fn new(rules: Box<dyn LevelRules>, snapshot: LevelSnapshot, seed: u64) -> Self {
        let mut run_state = snapshot.run_state;
        run_state.health = MAX_HEALTH;
        run_state.current_level = rules.level_id();

        let hud = HudModel {
            level_label: format!("LEVEL {}", snapshot.level_index + 1),
            objective: rules.objective_label(),
            status: format!("Starting in {COUNTDOWN_STEPS}..."),
            health: run_state.health,
            score: run_state.score,
            elapsed_secs: 0,
            mutation_label: "None",
        };

        let mut ctx = LevelContext {
            run_state,
            level_index: snapshot.level_index,
            deaths_in_level: snapshot.deaths_in_level,
            prior_results: snapshot.results,
            damage_taken: 0.0,
            effects: MutationEffects::default(),
            level_elapsed_ms: 0,
            level_active: false,
            player_pos: Vec2::new(PLAYER_START_X, ARENA_HEIGHT / 2.0),
            velocity: Vec2::ZERO,
            input: TickInput::default(),
            timers: TimerQueue::new(),
            fired: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            hud,
            fx: vec![FxEvent::CountdownStep(COUNTDOWN_STEPS)],
            pending_complete: None,
            pending_restart: false,
        };
        let _ = ctx.timers.schedule_repeating(COUNTDOWN_TAG, COUNTDOWN_STEP_MS);

        log::info!("entering {}", rules.level_id().label());

        Self {
            rules,
            ctx,
            phase: LevelPhase::Countdown,
            countdown_remaining: COUNTDOWN_STEPS,
            restart_handled: false,
            restart_snapshot: None,
        }
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn level_id(&self) -> LevelId {
        self.rules.level_id()
    }

    pub fn hud(&self) -> &HudModel {
        &self.ctx.hud
    }

    pub fn run_state(&self) -> &RunState {
        &self.ctx.run_state
    }

    pub fn player_pos(&self) -> Vec2 {
        self.ctx.player_pos
    }

    /// Timers still registered, countdown included. Zero after teardown.
    pub fn pending_timers(&self) -> usize {
        self.ctx.timers.len()
    }

    /// Drain queued presentation events.
    pub fn take_fx(&mut self) -> Vec<FxEvent> {
        std::mem::take(&mut self.ctx.fx)
    }

    /// Advance the attempt by one tick.
    pub fn tick(
        &mut self,
        input: &TickInput,
        delta_ms: u64,
        store: &mut dyn KeyValueStore,
    ) -> Option<LevelOutcome> {
        self.ctx.input = input.clone();

        match self.phase {
            LevelPhase::Countdown => {
                self.tick_countdown(delta_ms, store);
                None
            }
            LevelPhase::Paused => {
                if input.pause {
                    self.phase = LevelPhase::Active;
                    self.ctx.fx.push(FxEvent::Resumed);
                }
                None
            }
            LevelPhase::Active => self.tick_active(input, delta_ms, store),
            LevelPhase::Restarting => self.tick_restart_prompt(input, store),
            LevelPhase::Complete => None,
        }
    }

    /// Force the failure flow, equivalent to health reaching zero. A no-op
    /// while the prompt is already showing or resolved.
    pub fn restart_current_level(&mut self, store: &mut dyn KeyValueStore) {
        self.enter_restarting(store);
    }

    fn tick_countdown(&mut self, delta_ms: u64, store: &mut dyn KeyValueStore) {
        self.ctx.fired.clear();
        self.ctx.timers.advance(delta_ms, &mut self.ctx.fired);

        let steps = self
            .ctx
            .fired
            .iter()
            .filter(|&&tag| tag == COUNTDOWN_TAG)
            .count();
        self.ctx.fired.clear();

        for _ in 0..steps {
            self.countdown_remaining -= 1;
            if self.countdown_remaining > 0 {
                self.ctx.fx.push(FxEvent::CountdownStep(self.countdown_remaining));
                self.ctx.hud.status = format!("Starting in {}...", self.countdown_remaining);
            } else {
                self.begin_active(store);
                break;
            }
        }
    }

    fn begin_active(&mut self, store: &mut dyn KeyValueStore) {
        if self.ctx.level_active {
            return;
        }

        self.ctx.timers.clear();
        save_active_run(store, &self.resume_snapshot());

        self.ctx.level_active = true;
        self.phase = LevelPhase::Active;
        self.ctx.hud.status = "Fight!".to_owned();
        self.ctx.fx.push(FxEvent::LevelStarted);

        log::info!("{} active", self.rules.level_id().label());
        self.rules.on_level_start(&mut self.ctx);
    }

    fn tick_active(
        &mut self,
        input: &TickInput,
        delta_ms: u64,
        store: &mut dyn KeyValueStore,
    ) -> Option<LevelOutcome> {
        if input.pause {
            self.phase = LevelPhase::Paused;
            self.ctx.fx.push(FxEvent::Paused);
            return None;
        }

        if self.ctx.run_state.health <= 0.0 {
            self.enter_restarting(store);
            return None;
        }

        self.ctx.level_elapsed_ms += delta_ms;
        self.ctx.fired.clear();
        self.ctx.timers.advance(delta_ms, &mut self.ctx.fired);

        self.ctx.velocity = movement::resolve_velocity(input, &self.ctx.effects);
        self.ctx.player_pos = movement::step_player(self.ctx.player_pos, self.ctx.velocity, delta_ms);

        let elapsed_ms = self.ctx.level_elapsed_ms;
        self.rules.on_level_update(&mut self.ctx, elapsed_ms, delta_ms);

        if let Some(bonus) = self.ctx.pending_complete.take() {
            return Some(self.complete(store, bonus));
        }
        if std::mem::take(&mut self.ctx.pending_restart) {
            self.enter_restarting(store);
            return None;
        }

        self.refresh_hud();
        None
    }

    fn enter_restarting(&mut self, store: &mut dyn KeyValueStore) {
        if self.restart_handled || self.phase == LevelPhase::Restarting {
            return;
        }

        self.phase = LevelPhase::Restarting;
        self.ctx.level_active = false;
        self.ctx.velocity = Vec2::ZERO;
        self.ctx.effects = MutationEffects::default();
        self.ctx.timers.clear();
        self.ctx.pending_complete = None;
        self.ctx.pending_restart = false;

        let duration_ms = self.ctx.level_elapsed_ms;
        self.ctx.run_state.elapsed_ms += duration_ms;
        self.ctx.run_state.deaths += 1;

        let mut run_state = self.ctx.run_state.clone();
        run_state.health = MAX_HEALTH;
        let snapshot = LevelSnapshot {
            run_state,
            level_index: self.ctx.level_index,
            deaths_in_level: self.ctx.deaths_in_level + 1,
            results: self.ctx.prior_results.clone(),
        };
        save_active_run(store, &snapshot);
        self.restart_snapshot = Some(snapshot);

        self.ctx.hud.status = "SYSTEM FAILURE".to_owned();
        self.ctx.fx.push(FxEvent::RestartPrompt);
        log::info!(
            "{} failed after {duration_ms}ms",
            self.rules.level_id().label()
        );
    }

    fn tick_restart_prompt(
        &mut self,
        input: &TickInput,
        store: &mut dyn KeyValueStore,
    ) -> Option<LevelOutcome> {
        if self.restart_handled {
            return None;
        }

        let Some(snapshot) = self.restart_snapshot.as_ref() else {
            log::warn!("restart prompt without a snapshot");
            return None;
        };

        if input.confirm {
            self.restart_handled = true;
            return Some(LevelOutcome::Retry(snapshot.clone()));
        }

        if input.cancel {
            self.restart_handled = true;
            clear_active_run(store);
            let snapshot = snapshot.clone();
            return Some(LevelOutcome::Abandoned {
                run_state: snapshot.run_state,
                level_index: snapshot.level_index,
                deaths_in_level: snapshot.deaths_in_level,
                results: snapshot.results,
            });
        }

        None
    }

    fn complete(&mut self, store: &mut dyn KeyValueStore, bonus_survival_ms: u64) -> LevelOutcome {
        self.phase = LevelPhase::Complete;
        self.ctx.level_active = false;
        self.ctx.velocity = Vec2::ZERO;
        self.ctx.effects = MutationEffects::default();
        self.ctx.timers.clear();
        clear_active_run(store);

        let duration_ms = self.ctx.level_elapsed_ms;
        self.ctx.run_state.elapsed_ms += duration_ms;

        let breakdown = calculate_level_score(&ScoreInput {
            level: self.rules.level_id(),
            level_number: self.ctx.level_index as u32 + 1,
            duration_ms,
            damage_taken: self.ctx.damage_taken,
            deaths_in_level: self.ctx.deaths_in_level,
            godmode_survival_ms: bonus_survival_ms,
            success: true,
        });
        self.ctx.run_state.score = apply_score(self.ctx.run_state.score, breakdown.total);

        let result = LevelResult {
            level: self.rules.level_id(),
            success: true,
            duration_ms,
            damage_taken: self.ctx.damage_taken,
            deaths_in_level: self.ctx.deaths_in_level,
            score_delta: breakdown.total,
        };

        self.ctx.fx.push(FxEvent::LevelCleared);
        log::info!(
            "{} cleared in {duration_ms}ms for {:+}",
            self.rules.level_id().label(),
            breakdown.total
        );

        LevelOutcome::Completed {
            run_state: self.ctx.run_state.clone(),
            level_index: self.ctx.level_index,
            result,
            results: self.ctx.prior_results.clone(),
        }
    }

    fn resume_snapshot(&self) -> LevelSnapshot {
        let mut run_state = self.ctx.run_state.clone();
        run_state.health = MAX_HEALTH;
        LevelSnapshot {
            run_state,
            level_index: self.ctx.level_index,
            deaths_in_level: self.ctx.deaths_in_level,
            results: self.ctx.prior_results.clone(),
        }
    }

    fn refresh_hud(&mut self) {
        self.ctx.hud.health = self.ctx.run_state.health.max(0.0).floor();
        self.ctx.hud.score = self.ctx.run_state.score.floor();
        self.ctx.hud.elapsed_secs = self.ctx.level_elapsed_ms / 1_000;
        self.ctx.hud.mutation_label = self.ctx.effects.active_label;
    }
}
