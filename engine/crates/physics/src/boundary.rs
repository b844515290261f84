//! Puck vs. arena wall.
//!
//! The arena is a circle of `boundary_radius` centred at the origin. A puck
//! has left it once the magnitude of its centre position exceeds that radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ArenaConfig, BoundaryPolicy};
use crate::state::PuckState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryOutcome {
    Inside,
    Reflected,
    Clamped,
    /// Puck left the arena under `BoundaryPolicy::Eliminate`. State untouched.
    Exited,
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

pub fn is_outside(puck: &PuckState, config: &ArenaConfig) -> bool {
    puck.position.length() > config.boundary_radius
}

/// Fraction of a straight move from `from` to `to` spent inside the arena
/// before first crossing the wall. `1.0` if the move ends inside.
pub fn exit_fraction(from: Vec2, to: Vec2, config: &ArenaConfig) -> f32 {
    let radius = config.boundary_radius;
    if to.length() <= radius {
        return 1.0;
    }
    if from.length() > radius {
        return 0.0;
    }
    let motion = to - from;
    let a = motion.length_squared();
    let b = from.dot(motion);
    let c = from.length_squared() - radius * radius;
    // c <= 0 keeps the discriminant non-negative
    ((-b + (b * b - a * c).sqrt()) / a).clamp(0.0, 1.0)
}

/// Apply the boundary policy to a freshly integrated puck.
pub fn resolve_boundary(
    puck: &mut PuckState,
    config: &ArenaConfig,
    policy: BoundaryPolicy,
) -> BoundaryOutcome {
    let distance = puck.position.length();
    if distance <= config.boundary_radius {
        return BoundaryOutcome::Inside;
    }

    // distance > boundary_radius > 0, so the normal is well defined.
    let outward = puck.position / distance;
    let radius = config.boundary_radius;

    match policy {
        BoundaryPolicy::Reflect => {
            let overshoot = distance - radius;
            puck.position = outward * (radius - overshoot).max(0.0);
            if puck.velocity.dot(outward) > 0.0 {
                puck.velocity = reflect_velocity(puck.velocity, outward);
            }
            BoundaryOutcome::Reflected
        }
        BoundaryPolicy::Clamp => {
            puck.position = outward * radius;
            let outward_speed = puck.velocity.dot(outward);
            if outward_speed > 0.0 {
                puck.velocity -= outward * outward_speed;
            }
            BoundaryOutcome::Clamped
        }
        BoundaryPolicy::Eliminate => BoundaryOutcome::Exited,
    }
}
