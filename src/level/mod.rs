//! Level core
//!
//! The shared machinery every level runs on. This module must stay pure
//! and deterministic:
//! - Time arrives as tick deltas from the driver, never from a wall clock
//! - Seeded RNG only
//! - Rendering, audio playback and input devices stay behind interfaces

pub mod lifecycle;
pub mod mechanics;
pub mod movement;
pub mod mutation;
pub mod state;
pub mod timer;

pub use lifecycle::{
    FxEvent, HudModel, LevelContext, LevelLifecycle, LevelOutcome, LevelRules, TickInput,
};
pub use mutation::{
    MUTATION_INTERVAL_MS, MUTATION_WINDOW_MS, MutationScheduler, MutationWindow, RuleMutation,
    build_mutation_timeline,
};
pub use state::{
    LEVEL_ORDER, LevelId, LevelPhase, LevelResult, LevelSnapshot, MutationEffects, RunState,
};
pub use timer::{TimerHandle, TimerQueue};
