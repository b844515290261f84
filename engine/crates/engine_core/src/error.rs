use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("match already finished")]
    AlreadyTerminal,

    #[error("match not started; call start() first")]
    NotStarted,

    #[error("match already started")]
    AlreadyStarted,

    #[error("a match needs at least 2 bots, got {0}")]
    TooFewBots(usize),

    #[error("{bots} bots but {pucks} pucks")]
    MismatchedPucks { bots: usize, pucks: usize },

    #[error("invalid arena config: {0}")]
    Config(#[from] physics::ConfigError),

    #[error("invalid match rules: {0}")]
    Rules(String),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] sandbox::SandboxError),
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to write replay {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay json error: {0}")]
    Json(#[from] serde_json::Error),
}
