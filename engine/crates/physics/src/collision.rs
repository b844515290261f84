use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::state::PuckState;

const EPS: f32 = 1e-5;

/// Approach speeds closer than this count as a mutual ram.
pub const RAM_TOLERANCE: f32 = 1e-3;

pub fn pucks_touch(a: &PuckState, b: &PuckState, config: &ArenaConfig) -> bool {
    a.distance_to(b) <= config.contact_distance()
}

/// Fraction of the tick, in `[0, 1]`, at which two pucks moving linearly
/// from `*_prev` to `*_next` first come within `reach` of each other.
///
/// Returns `Some(0.0)` for pucks that start the tick in contact and `None`
/// when the paths never get that close, even if end-of-tick samples would
/// have tunnelled past each other.
pub fn time_of_impact(
    a_prev: &PuckState,
    a_next: &PuckState,
    b_prev: &PuckState,
    b_next: &PuckState,
    reach: f32,
) -> Option<f32> {
    let start = b_prev.position - a_prev.position;
    let motion = (b_next.position - a_next.position) - start;

    // |start + motion * t|^2 = reach^2, solved as a t^2 + 2 b t + c = 0
    let c = start.length_squared() - reach * reach;
    if c <= 0.0 {
        return Some(0.0);
    }
    let a = motion.length_squared();
    let b = start.dot(motion);
    if a <= f32::EPSILON || b >= 0.0 {
        return None;
    }
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    (t <= 1.0).then_some(t.max(0.0))
}

/// Whether the pucks touched at any point during the tick.
pub fn swept_contact(
    a_prev: &PuckState,
    a_next: &PuckState,
    b_prev: &PuckState,
    b_next: &PuckState,
    config: &ArenaConfig,
) -> bool {
    time_of_impact(a_prev, a_next, b_prev, b_next, config.contact_distance()).is_some()
}

/// Speed at which `puck` is moving toward `target` along the line of centres.
pub fn approach_speed(puck: &PuckState, target: &PuckState) -> f32 {
    let towards = target.position - puck.position;
    let distance = towards.length();
    if distance < EPS {
        return 0.0;
    }
    puck.velocity.dot(towards / distance)
}

/// Who rammed whom in a terminal contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RamVerdict {
    /// The first puck hit harder; the second loses.
    FirstRams,
    /// The second puck hit harder; the first loses.
    SecondRams,
    /// Approach speeds matched; both lose.
    Mutual,
}

pub fn ram_verdict(a: &PuckState, b: &PuckState) -> RamVerdict {
    let a_speed = approach_speed(a, b);
    let b_speed = approach_speed(b, a);
    if (a_speed - b_speed).abs() <= RAM_TOLERANCE {
        RamVerdict::Mutual
    } else if a_speed > b_speed {
        RamVerdict::FirstRams
    } else {
        RamVerdict::SecondRams
    }
}

/// Equal-mass elastic bounce. Returns the new velocities for `(a, b)`.
///
/// Pucks already separating keep their velocities.
pub fn bounce(a: &PuckState, b: &PuckState) -> (Vec2, Vec2) {
    let normal = a.position - b.position;
    let distance = normal.length();
    if distance < EPS {
        return (a.velocity, b.velocity);
    }
    let normal = normal / distance;

    let closing = (a.velocity - b.velocity).dot(normal);
    if closing >= 0.0 {
        return (a.velocity, b.velocity);
    }

    (a.velocity - closing * normal, b.velocity + closing * normal)
}
