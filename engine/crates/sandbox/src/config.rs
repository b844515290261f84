use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::action_buffer::ActionPersistence;
use crate::error::SandboxError;

/// Resource ceilings applied to every guest call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Fuel (instruction budget) granted to each `init` / `update` call.
    pub fuel_per_call: u64,
    /// Optional wall-clock ceiling per call, enforced with epoch interruption.
    /// Off by default: fuel alone keeps matches reproducible.
    pub deadline_ms: Option<u64>,
    /// Upper bound on a guest's linear memory.
    pub max_memory_bytes: usize,
    pub max_wasm_stack: usize,
    pub action_persistence: ActionPersistence,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            fuel_per_call: 1_000_000,
            deadline_ms: None,
            max_memory_bytes: 16 * 1024 * 1024,
            max_wasm_stack: 512 * 1024,
            action_persistence: ActionPersistence::default(),
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<(), SandboxError> {
        if self.fuel_per_call == 0 {
            return Err(SandboxError::Config("fuel_per_call must be > 0".into()));
        }
        if self.deadline_ms == Some(0) {
            return Err(SandboxError::Config("deadline_ms must be > 0 when set".into()));
        }
        if self.max_wasm_stack == 0 {
            return Err(SandboxError::Config("max_wasm_stack must be > 0".into()));
        }
        Ok(())
    }
}

/// One bot seat in a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotEntry {
    /// Display name used in logs and results.
    pub name: String,
    /// Path to the compiled guest module (.wasm or .wat).
    pub wasm_path: PathBuf,
    /// Fuel override for this bot (None = SandboxConfig default).
    #[serde(default)]
    pub fuel_limit: Option<u64>,
}
