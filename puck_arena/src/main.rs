use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use puck_arena::{check_bot, run_match, ArenaError, MatchFile};
use sandbox::BotEntry;

#[derive(Parser)]
#[command(name = "puck_arena", about = "Run WASM puck bots against each other")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a match described by a TOML match file
    Run {
        /// Path to the match file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bot modules to use instead of the file's [[bots]] list
        #[arg(long = "bot")]
        bots: Vec<PathBuf>,

        /// Override the tick ceiling
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Output path for replay JSON
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Check that a bot module loads and initializes
    Check {
        /// Path to the .wasm or .wat module
        wasm: PathBuf,

        /// Fuel budget for the init call
        #[arg(long)]
        fuel: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init_logging(&cli.log);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "puck_arena failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<(), ArenaError> {
    match command {
        Commands::Run {
            config,
            bots,
            max_ticks,
            replay,
        } => {
            let mut file = MatchFile::load(config.as_deref())?;
            if !bots.is_empty() {
                file.bots = bots.into_iter().map(entry_for_path).collect();
            }
            if let Some(max_ticks) = max_ticks {
                file.rules.max_ticks = max_ticks;
            }

            let outcome = run_match(&file, replay.is_some())?;
            println!("{}", outcome.result);
            for fault in &outcome.result.faults {
                println!("  {} {:?} fault at tick {}: {}", fault.bot, fault.phase, fault.tick, fault.message);
            }

            if let (Some(path), Some(recorded)) = (replay, &outcome.replay) {
                recorded.write_to(&path)?;
            }
            Ok(())
        }
        Commands::Check { wasm, fuel } => {
            let mut sandbox = sandbox::SandboxConfig::default();
            if let Some(fuel) = fuel {
                sandbox.fuel_per_call = fuel;
            }
            check_bot(&wasm, sandbox)?;
            println!("{}: ok", wasm.display());
            Ok(())
        }
    }
}

fn entry_for_path(path: PathBuf) -> BotEntry {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    BotEntry {
        name,
        wasm_path: path,
        fuel_limit: None,
    }
}
