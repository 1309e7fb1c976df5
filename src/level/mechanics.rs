//! Pure per-level mechanics helpers

/// Advance the overheat meter: +1 per second, +8 per bug hit, -25 per
/// coolant pickup.
pub fn update_temperature(
    current: f32,
    delta_seconds: f32,
    bug_hits: u32,
    coolant_collections: u32,
) -> f32 {
    current + delta_seconds + bug_hits as f32 * 8.0 - coolant_collections as f32 * 25.0
}

/// Occupancy percentage of the charger swarm, clamped to [0, 100].
pub fn compute_ram_load(alive_enemies: u32, total_enemies: u32) -> u32 {
    if total_enemies == 0 {
        return 100;
    }

    let ratio = alive_enemies as f64 / total_enemies as f64;
    ((ratio * 100.0).round() as u32).min(100)
}

/// Absolute distance between a strike instant and the parry input.
pub fn parry_delta_ms(strike_at_ms: u64, input_at_ms: u64) -> u64 {
    strike_at_ms.abs_diff(input_at_ms)
}

/// Default parry timing window
pub const PARRY_WINDOW_MS: u64 = 120;

pub fn is_parry_success(delta_ms: u64, window_ms: u64) -> bool {
    delta_ms <= window_ms
}
