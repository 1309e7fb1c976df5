//! Movement composition
//!
//! Digital 4-way input becomes a velocity with the active mutation effects
//! applied in a fixed order: reverse controls, then gravity scaling on the
//! vertical axis, then the speed multiplier. The order is part of the
//! mutation contract and must not be rearranged.

use glam::Vec2;

use super::lifecycle::TickInput;
use super::state::MutationEffects;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, MOVE_SPEED, PLAYER_RADIUS};

/// Resolve this tick's velocity from held directions and active effects.
/// Screen coordinates: +y is down.
pub fn resolve_velocity(input: &TickInput, effects: &MutationEffects) -> Vec2 {
    let mut direction = Vec2::ZERO;

    if input.left {
        direction.x -= 1.0;
    }
    if input.right {
        direction.x += 1.0;
    }
    if input.up {
        direction.y -= 1.0;
    }
    if input.down {
        direction.y += 1.0;
    }

    if effects.reverse_controls {
        direction = -direction;
    }

    direction.y *= effects.gravity_multiplier;

    direction * (MOVE_SPEED * effects.speed_multiplier)
}

/// Integrate one tick of movement, clamped to the arena walls.
pub fn step_player(pos: Vec2, velocity: Vec2, delta_ms: u64) -> Vec2 {
    let next = pos + velocity * (delta_ms as f32 / 1_000.0);
    next.clamp(
        Vec2::splat(PLAYER_RADIUS),
        Vec2::new(ARENA_WIDTH - PLAYER_RADIUS, ARENA_HEIGHT - PLAYER_RADIUS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(up: bool, down: bool, left: bool, right: bool) -> TickInput {
        TickInput {
            up,
            down,
            left,
            right,
            ..TickInput::default()
        }
    }

    #[test]
    fn neutral_effects_move_at_base_speed() {
        let v = resolve_velocity(&input(false, true, false, true), &MutationEffects::default());
        assert_eq!(v, Vec2::new(MOVE_SPEED, MOVE_SPEED));
    }

    #[test]
    fn opposing_directions_cancel() {
        let v = resolve_velocity(&input(true, true, true, true), &MutationEffects::default());
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn composition_order_is_reverse_then_gravity_then_speed() {
        let effects = MutationEffects {
            reverse_controls: true,
            gravity_multiplier: -1.0,
            speed_multiplier: 2.0,
            ..MutationEffects::default()
        };

        // right+down: (1, 1) -> reversed (-1, -1) -> gravity flips y back
        // to (-1, 1) -> scaled by 280 * 2.
        let v = resolve_velocity(&input(false, true, false, true), &effects);
        assert_eq!(v, Vec2::new(-MOVE_SPEED * 2.0, MOVE_SPEED * 2.0));
    }

    #[test]
    fn gravity_flip_alone_inverts_vertical_only() {
        let effects = MutationEffects {
            gravity_multiplier: -1.0,
            ..MutationEffects::default()
        };

        let v = resolve_velocity(&input(true, false, false, true), &effects);
        assert_eq!(v, Vec2::new(MOVE_SPEED, MOVE_SPEED));
    }

    #[test]
    fn player_stays_inside_the_arena() {
        let pos = step_player(Vec2::new(20.0, 20.0), Vec2::new(-1_000.0, -1_000.0), 1_000);
        assert_eq!(pos, Vec2::splat(PLAYER_RADIUS));

        let pos = step_player(
            Vec2::new(ARENA_WIDTH - 20.0, ARENA_HEIGHT - 20.0),
            Vec2::new(5_000.0, 5_000.0),
            1_000,
        );
        assert_eq!(
            pos,
            Vec2::new(ARENA_WIDTH - PLAYER_RADIUS, ARENA_HEIGHT - PLAYER_RADIUS)
        );
    }
}
