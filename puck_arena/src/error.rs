use std::path::PathBuf;

use engine_core::{MatchError, ReplayError};
use sandbox::{GuestFault, LoadError, SandboxError};

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid arena config: {0}")]
    Arena(#[from] physics::ConfigError),

    #[error("a match needs at least 2 bots, config lists {0}")]
    NotEnoughBots(usize),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("bot failed its init check: {0}")]
    Guest(#[from] GuestFault),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}
