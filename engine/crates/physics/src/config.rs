use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Arena parameters broadcast to every bot at `init`.
///
/// Immutable for the lifetime of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub boundary_radius: f32,
    pub puck_radius: f32,
    pub max_puck_accel: f32,
    /// Fraction of velocity lost per tick.
    pub damping: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            boundary_radius: 100.0,
            puck_radius: 2.0,
            max_puck_accel: 5.0,
            damping: 0.1,
        }
    }
}

impl ArenaConfig {
    /// Build a config, rejecting anything that violates the arena invariants.
    pub fn new(
        boundary_radius: f32,
        puck_radius: f32,
        max_puck_accel: f32,
        damping: f32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            boundary_radius,
            puck_radius,
            max_puck_accel,
            damping,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("boundary_radius", self.boundary_radius)?;
        finite("puck_radius", self.puck_radius)?;
        finite("max_puck_accel", self.max_puck_accel)?;
        finite("damping", self.damping)?;

        positive("puck_radius", self.puck_radius)?;
        positive("max_puck_accel", self.max_puck_accel)?;
        if self.boundary_radius <= self.puck_radius {
            return Err(ConfigError::PuckTooLarge {
                boundary_radius: self.boundary_radius,
                puck_radius: self.puck_radius,
            });
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(ConfigError::DampingOutOfRange(self.damping));
        }
        Ok(())
    }

    /// Distance between centres at which two pucks touch.
    pub fn contact_distance(&self) -> f32 {
        self.puck_radius * 2.0
    }

    pub fn to_wire(&self) -> bot_abi::ConfigWire {
        bot_abi::ConfigWire {
            boundary_radius: self.boundary_radius,
            puck_radius: self.puck_radius,
            max_puck_accel: self.max_puck_accel,
            damping: self.damping,
        }
    }
}

/// What happens when a puck's centre leaves the arena circle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Mirror the overshoot back inside and reflect the velocity.
    #[default]
    Reflect,
    /// Pin the puck to the wall and drop its outward velocity.
    Clamp,
    /// Leaving the arena eliminates the puck.
    Eliminate,
}

/// What happens when two pucks touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Contact ends the match for the rammed puck.
    #[default]
    Terminal,
    /// Equal-mass elastic bounce, play continues.
    Bounce,
}

/// Host-side stepping rules. Never sent to guests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsRules {
    /// Tick duration in seconds.
    pub dt: f32,
    /// Heading change in radians applied by LEFT or RIGHT per tick.
    pub turn_rate: f32,
    pub boundary: BoundaryPolicy,
    pub collision: CollisionPolicy,
}

impl Default for PhysicsRules {
    fn default() -> Self {
        Self {
            dt: 1.0 / 30.0,
            turn_rate: std::f32::consts::PI / 30.0,
            boundary: BoundaryPolicy::default(),
            collision: CollisionPolicy::default(),
        }
    }
}

impl PhysicsRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("dt", self.dt)?;
        positive("dt", self.dt)?;
        finite("turn_rate", self.turn_rate)?;
        if self.turn_rate < 0.0 {
            return Err(ConfigError::NegativeTurnRate(self.turn_rate));
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
