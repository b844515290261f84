use std::path::Path;

use physics::{ArenaConfig, BotId, PuckState};
use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::events::MatchEvent;
use crate::result::MatchResult;
use crate::rules::MatchRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotMeta {
    pub id: BotId,
    pub name: String,
    pub color: Option<[f32; 3]>,
}

/// Authoritative state after one tick. Tick 0 is the spawn state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub pucks: Vec<PuckState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<MatchEvent>,
}

/// Full record of a match, enough to redraw it tick by tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub config: ArenaConfig,
    pub rules: MatchRules,
    pub bots: Vec<BotMeta>,
    pub frames: Vec<Frame>,
    pub result: Option<MatchResult>,
}

impl Replay {
    pub fn new(config: ArenaConfig, rules: MatchRules) -> Self {
        Self {
            config,
            rules,
            bots: Vec::new(),
            frames: Vec::new(),
            result: None,
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ReplayError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), frames = self.frames.len(), "replay written");
        Ok(())
    }
}
