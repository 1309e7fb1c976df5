//! Scoring engine
//!
//! Pure breakdown of a level attempt into bonuses and penalties. Only the
//! running total applied to the run is floored; individual level totals may
//! go negative.

use crate::level::LevelId;

/// Inputs to one level's score calculation.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput {
    pub level: LevelId,
    /// 1-based position in the gauntlet
    pub level_number: u32,
    pub duration_ms: u64,
    pub damage_taken: f32,
    pub deaths_in_level: u32,
    /// Nonzero only for the final survival level
    pub godmode_survival_ms: u64,
    pub success: bool,
}

/// Per-component score breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub clear_bonus: f64,
    pub time_bonus: f64,
    pub damage_penalty: f64,
    pub death_penalty: f64,
    pub godmode_bonus: f64,
    pub total: f64,
}

/// Score one level attempt.
pub fn calculate_level_score(input: &ScoreInput) -> ScoreBreakdown {
    let target_ms = input.level.target_ms();

    let clear_bonus = if input.success {
        1_000.0 * f64::from(input.level_number)
    } else {
        0.0
    };
    // Integer division floors the under-par reward.
    let time_bonus = (target_ms.saturating_sub(input.duration_ms) / 10) as f64;
    let damage_penalty = -5.0 * f64::from(input.damage_taken);
    let death_penalty = -300.0 * f64::from(input.deaths_in_level);
    let godmode_bonus = (input.godmode_survival_ms / 1_000) as f64 * 10.0;

    ScoreBreakdown {
        clear_bonus,
        time_bonus,
        damage_penalty,
        death_penalty,
        godmode_bonus,
        total: clear_bonus + time_bonus + damage_penalty + death_penalty + godmode_bonus,
    }
}

/// Fold a level delta into the run score. The run total never goes
/// negative, no matter how costly the level was.
pub fn apply_score(current: f64, delta: f64) -> f64 {
    (current + delta).max(0.0)
}
