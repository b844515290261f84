pub mod config;
pub mod controller;
pub mod error;

pub use config::MatchFile;
pub use controller::{check_bot, run_match, MatchOutcome};
pub use error::ArenaError;
