use physics::{ArenaConfig, BotId, PhysicsRules, PuckState, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Host-only match rules. Never sent to guests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    #[serde(flatten)]
    pub physics: PhysicsRules,
    /// Tick ceiling; reaching it ends the match in a draw.
    pub max_ticks: u64,
    /// Distance from the centre at which pucks spawn.
    pub spawn_radius: f32,
    /// Initial speed towards the centre.
    pub spawn_speed: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            physics: PhysicsRules::default(),
            max_ticks: 3_600,
            spawn_radius: 50.0,
            spawn_speed: 0.0,
        }
    }
}

impl MatchRules {
    pub fn validate(&self, config: &ArenaConfig) -> Result<(), MatchError> {
        self.physics.validate()?;
        if self.max_ticks == 0 {
            return Err(MatchError::Rules("max_ticks must be > 0".into()));
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return Err(MatchError::Rules(format!(
                "spawn_radius must be finite and >= 0, got {}",
                self.spawn_radius
            )));
        }
        if self.spawn_radius + config.puck_radius > config.boundary_radius {
            return Err(MatchError::Rules(format!(
                "spawn_radius {} puts pucks outside boundary {}",
                self.spawn_radius, config.boundary_radius
            )));
        }
        if !self.spawn_speed.is_finite() {
            return Err(MatchError::Rules("spawn_speed must be finite".into()));
        }
        Ok(())
    }

    /// Evenly spaced starting pucks on the spawn circle, facing the centre.
    ///
    /// Bot 0 starts on the negative x axis; the rest follow counter-clockwise.
    pub fn spawn(&self, ids: &[BotId]) -> Vec<PuckState> {
        let n = ids.len().max(1) as f32;
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let angle = std::f32::consts::PI + i as f32 * std::f32::consts::TAU / n;
                let outward = Vec2::from_angle(angle);
                PuckState::new(*id, outward * self.spawn_radius)
                    .with_velocity(-outward * self.spawn_speed)
                    .with_heading(angle + std::f32::consts::PI)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_bots_spawn_opposite_each_other() {
        let rules = MatchRules {
            spawn_speed: 10.0,
            ..Default::default()
        };
        let pucks = rules.spawn(&[BotId(0), BotId(1)]);
        assert!((pucks[0].position - Vec2::new(-50.0, 0.0)).length() < 1e-4);
        assert!((pucks[1].position - Vec2::new(50.0, 0.0)).length() < 1e-4);
        assert!(pucks[0].velocity.x > 9.99);
        assert!(pucks[1].velocity.x < -9.99);
        assert!((pucks[0].distance_to(&pucks[1]) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn spawn_outside_arena_rejected() {
        let rules = MatchRules {
            spawn_radius: 99.0,
            ..Default::default()
        };
        assert!(rules.validate(&ArenaConfig::default()).is_err());
        assert!(MatchRules::default().validate(&ArenaConfig::default()).is_ok());
    }

    #[test]
    fn toml_style_flattened_fields() {
        let rules: MatchRules =
            serde_json::from_str(r#"{"dt":0.05,"collision":"bounce","max_ticks":10}"#).unwrap();
        assert_eq!(rules.physics.dt, 0.05);
        assert_eq!(rules.physics.collision, physics::CollisionPolicy::Bounce);
        assert_eq!(rules.max_ticks, 10);
        assert_eq!(rules.spawn_radius, 50.0);
    }
}
