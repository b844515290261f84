use glam::Vec2;

use crate::action::{Action, ActionFlags};
use crate::config::{ArenaConfig, PhysicsRules};
use crate::state::PuckState;

/// Resolve an action into `(new_heading, acceleration)` for one tick.
///
/// The returned acceleration never exceeds `config.max_puck_accel`.
pub fn applied_acceleration(
    puck: &PuckState,
    action: Action,
    config: &ArenaConfig,
    rules: &PhysicsRules,
) -> (f32, Vec2) {
    match action {
        Action::Idle => (puck.heading, Vec2::ZERO),
        Action::Accel(requested) => (puck.heading, clamp_magnitude(requested, config.max_puck_accel)),
        Action::Flags(flags) => {
            let heading = puck.heading + flags.turn_direction() * rules.turn_rate;
            let accel = if flags.contains(ActionFlags::THRUST) {
                Vec2::from_angle(heading) * config.max_puck_accel
            } else {
                Vec2::ZERO
            };
            (heading, accel)
        }
    }
}

/// Limit `v` to length `max`, keeping its direction.
///
/// Pre-scales by the largest component so finite but huge requests do not
/// overflow `length_squared` into infinity.
pub fn clamp_magnitude(v: Vec2, max: f32) -> Vec2 {
    let scale = v.abs().max_element();
    if scale == 0.0 {
        return Vec2::ZERO;
    }
    let scaled = v / scale;
    if scaled.length() * scale <= max {
        v
    } else {
        scaled.normalize() * max
    }
}

/// Advance one puck by one tick. Boundary and puck-puck interaction are
/// resolved separately so that every puck integrates from the same snapshot.
pub fn integrate(
    puck: &PuckState,
    action: Action,
    config: &ArenaConfig,
    rules: &PhysicsRules,
) -> PuckState {
    let (heading, accel) = applied_acceleration(puck, action, config, rules);

    let mut velocity = puck.velocity + accel * rules.dt;
    velocity *= 1.0 - config.damping;
    let position = puck.position + velocity * rules.dt;

    PuckState {
        id: puck.id,
        position,
        velocity,
        heading,
    }
}
