use std::path::Path;

use serde::Deserialize;

use engine_core::MatchRules;
use physics::ArenaConfig;
use sandbox::{BotEntry, SandboxConfig};

use crate::error::ArenaError;

/// Top-level match file.
///
/// ```toml
/// [arena]
/// boundary_radius = 100.0
///
/// [rules]
/// max_ticks = 3600
/// boundary = "eliminate"
///
/// [sandbox]
/// fuel_per_call = 500000
///
/// [[bots]]
/// name = "rammer"
/// wasm_path = "bots/rammer.wasm"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchFile {
    pub arena: ArenaConfig,
    pub rules: MatchRules,
    pub sandbox: SandboxConfig,
    pub bots: Vec<BotEntry>,
}

impl MatchFile {
    /// Load a match file from an optional TOML path. A missing file yields
    /// the defaults. Relative bot paths are resolved against the file's
    /// directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ArenaError> {
        let file = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path).map_err(|source| ArenaError::ReadConfig {
                    path: path.to_path_buf(),
                    source,
                })?;
                let mut file: MatchFile = toml::from_str(&content)?;
                if let Some(dir) = path.parent() {
                    file.resolve_bot_paths(dir);
                }
                file
            }
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        Ok(file)
    }

    fn resolve_bot_paths(&mut self, base: &Path) {
        for bot in &mut self.bots {
            if bot.wasm_path.is_relative() {
                bot.wasm_path = base.join(&bot.wasm_path);
            }
        }
    }

    /// Check every section before any bot module is touched.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.arena.validate()?;
        self.rules.validate(&self.arena)?;
        self.sandbox.validate()?;
        if self.bots.len() < 2 {
            return Err(ArenaError::NotEnoughBots(self.bots.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{BoundaryPolicy, CollisionPolicy};
    use sandbox::ActionPersistence;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_none_returns_defaults() {
        let file = MatchFile::load(None).unwrap();
        assert_eq!(file.arena, ArenaConfig::default());
        assert_eq!(file.rules.max_ticks, 3_600);
        assert_eq!(file.sandbox.fuel_per_call, 1_000_000);
        assert!(file.bots.is_empty());
    }

    #[test]
    fn load_nonexistent_file_returns_defaults() {
        let file = MatchFile::load(Some(Path::new("/tmp/nonexistent_match_12345.toml"))).unwrap();
        assert_eq!(file.arena.boundary_radius, 100.0);
    }

    #[test]
    fn load_full_toml() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"
[arena]
boundary_radius = 80.0
damping = 0.05

[rules]
max_ticks = 900
dt = 0.02
boundary = "eliminate"
collision = "bounce"

[sandbox]
fuel_per_call = 250000
deadline_ms = 50
action_persistence = "reset_to_neutral"

[[bots]]
name = "left"
wasm_path = "bots/left.wasm"

[[bots]]
name = "right"
wasm_path = "/abs/right.wasm"
fuel_limit = 1000
"#
        )
        .unwrap();

        let file = MatchFile::load(Some(f.path())).unwrap();
        assert_eq!(file.arena.boundary_radius, 80.0);
        assert_eq!(file.arena.puck_radius, 2.0);
        assert_eq!(file.arena.damping, 0.05);
        assert_eq!(file.rules.max_ticks, 900);
        assert_eq!(file.rules.physics.dt, 0.02);
        assert_eq!(file.rules.physics.boundary, BoundaryPolicy::Eliminate);
        assert_eq!(file.rules.physics.collision, CollisionPolicy::Bounce);
        assert_eq!(file.sandbox.fuel_per_call, 250_000);
        assert_eq!(file.sandbox.deadline_ms, Some(50));
        assert_eq!(file.sandbox.action_persistence, ActionPersistence::ResetToNeutral);

        assert_eq!(file.bots.len(), 2);
        let base = f.path().parent().unwrap();
        assert_eq!(file.bots[0].wasm_path, base.join("bots/left.wasm"));
        assert_eq!(file.bots[1].wasm_path, Path::new("/abs/right.wasm"));
        assert_eq!(file.bots[1].fuel_limit, Some(1000));
        assert!(file.validate().is_ok());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "[arena\nboundary_radius = ").unwrap();
        assert!(matches!(MatchFile::load(Some(f.path())), Err(ArenaError::Toml(_))));
    }

    #[test]
    fn validate_rejects_bad_arena_and_bot_count() {
        let mut file = MatchFile::default();
        assert!(matches!(file.validate(), Err(ArenaError::NotEnoughBots(0))));

        file.arena.puck_radius = 200.0;
        assert!(matches!(file.validate(), Err(ArenaError::Arena(_))));
    }
}
