use std::path::Path;

use engine_core::{FaultPhase, FaultRecord, MatchEngine, MatchResult, Replay};
use physics::{ArenaConfig, BotId};
use sandbox::{SandboxConfig, SandboxError, SandboxHost};

use crate::config::MatchFile;
use crate::error::ArenaError;

pub struct MatchOutcome {
    pub result: MatchResult,
    /// Present when recording was requested and the match actually ran.
    pub replay: Option<Replay>,
}

/// Load every bot, run the match to completion and report the outcome.
///
/// A bot whose module fails to load forfeits; the match still runs if at
/// least two bots are left.
pub fn run_match(file: &MatchFile, record_replay: bool) -> Result<MatchOutcome, ArenaError> {
    file.validate()?;
    let host = SandboxHost::new(file.sandbox.clone())?;

    let mut bots = Vec::with_capacity(file.bots.len());
    let mut load_faults = Vec::new();
    for (index, entry) in file.bots.iter().enumerate() {
        let id = BotId(index as u32);
        match host.load_entry(id, entry) {
            Ok(bot) => bots.push(bot),
            Err(e) => {
                tracing::warn!(
                    bot = %id,
                    name = %entry.name,
                    path = %entry.wasm_path.display(),
                    error = %e,
                    "bot failed to load, forfeiting"
                );
                load_faults.push(FaultRecord {
                    bot: id,
                    phase: FaultPhase::Load,
                    tick: 0,
                    message: e.to_string(),
                });
            }
        }
    }

    if bots.len() < 2 {
        let survivors: Vec<BotId> = bots.iter().map(|bot| bot.id).collect();
        let result = MatchResult::forfeit(&survivors, load_faults);
        tracing::info!(result = %result, "match decided before start");
        return Ok(MatchOutcome { result, replay: None });
    }

    let mut engine = MatchEngine::new(file.arena, file.rules, bots)?;
    if record_replay {
        engine = engine.with_replay();
    }
    let mut result = engine.run()?;

    if !load_faults.is_empty() {
        load_faults.append(&mut result.faults);
        result.faults = load_faults;
    }
    let mut replay = engine.take_replay();
    if let Some(replay) = &mut replay {
        replay.result = Some(result.clone());
    }

    Ok(MatchOutcome { result, replay })
}

/// Load a bot module and run its `init` hook against a default arena.
pub fn check_bot(path: &Path, sandbox: SandboxConfig) -> Result<(), ArenaError> {
    let host = SandboxHost::new(sandbox)?;
    let mut bot = host.load_file(BotId(0), "check", path, None)?;
    match bot.call_init(&ArenaConfig::default()) {
        Ok(()) => {}
        Err(SandboxError::Fault(fault)) => return Err(fault.into()),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(
        path = %path.display(),
        fuel_used = bot.last_fuel_used(),
        color = ?bot.color(),
        "bot module ok"
    );
    Ok(())
}
