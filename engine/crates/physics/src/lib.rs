pub mod action;
pub mod boundary;
pub mod collision;
pub mod config;
pub mod error;
pub mod integrate;
pub mod state;
pub mod world;

pub use action::{Action, ActionFlags};
pub use boundary::BoundaryOutcome;
pub use collision::RamVerdict;
pub use config::{ArenaConfig, BoundaryPolicy, CollisionPolicy, PhysicsRules};
pub use error::ConfigError;
pub use glam::Vec2;
pub use integrate::integrate;
pub use state::{BotId, BotView, Kinematics, PuckState};
pub use world::{step, Contact, StepReport};
