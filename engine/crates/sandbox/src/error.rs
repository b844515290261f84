use std::path::PathBuf;

use physics::BotId;
use serde::{Deserialize, Serialize};

/// A guest module could not be admitted to a match.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile module: {0}")]
    Compile(String),

    #[error("import {module}::{name} is not provided by the host")]
    UnknownImport { module: String, name: String },

    #[error("failed to instantiate: {0}")]
    Instantiate(String),

    #[error("missing wasm export: {0}")]
    MissingExport(&'static str),

    #[error("export {name} has the wrong signature: {reason}")]
    BadExportSignature { name: &'static str, reason: String },

    #[error("sandbox setup failed: {0}")]
    Setup(String),
}

/// A guest call misbehaved. Always attributed to the bot, never fatal to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestFault {
    #[error("wasm trap: {0}")]
    Trap(String),

    #[error("fuel exhausted after {limit} units")]
    FuelExhausted { limit: u64 },

    #[error("wall-clock deadline of {deadline_ms}ms exceeded")]
    DeadlineExceeded { deadline_ms: u64 },

    #[error("invalid host call: {0}")]
    InvalidHostCall(String),

    #[error("linear memory ceiling of {limit_bytes} bytes exceeded")]
    MemoryLimit { limit_bytes: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("invalid sandbox config: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fault(#[from] GuestFault),

    #[error("{0}: init already called")]
    AlreadyInitialized(BotId),

    #[error("{0}: update called before init")]
    NotInitialized(BotId),

    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] wasmtime::Error),
}

/// Guest linear memory access failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("guest does not export linear memory")]
    NoMemory,

    #[error("memory out of bounds: offset={offset}, len={len}, memory_size={memory_size}")]
    OutOfBounds {
        offset: u32,
        len: u32,
        memory_size: usize,
    },
}
