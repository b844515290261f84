use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifies one bot (and the puck it controls) within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(pub u32);

impl std::fmt::Display for BotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bot#{}", self.0)
    }
}

/// Authoritative puck state. Owned by the match engine; guests only see copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuckState {
    pub id: BotId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing angle in radians, steered by the flag-based action variant.
    pub heading: f32,
}

impl PuckState {
    pub fn new(id: BotId, position: Vec2) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    pub fn distance_to(&self, other: &PuckState) -> f32 {
        self.position.distance(other.position)
    }

    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// One bot's per-tick view of the arena: itself and its opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotView {
    pub own: Kinematics,
    pub enemy: Kinematics,
}

impl BotView {
    pub fn observe(own: &PuckState, enemy: &PuckState) -> Self {
        Self {
            own: own.kinematics(),
            enemy: enemy.kinematics(),
        }
    }

    pub fn to_wire(&self) -> bot_abi::StateWire {
        bot_abi::StateWire {
            x_pos: self.own.position.x,
            y_pos: self.own.position.y,
            x_vel: self.own.velocity.x,
            y_vel: self.own.velocity.y,
            enemy_x_pos: self.enemy.position.x,
            enemy_y_pos: self.enemy.position.y,
            enemy_x_vel: self.enemy.velocity.x,
            enemy_y_vel: self.enemy.velocity.y,
        }
    }
}
