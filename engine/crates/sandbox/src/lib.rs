pub mod action_buffer;
pub mod bot;
pub mod config;
pub mod epoch;
pub mod error;
pub mod host_api;
pub mod limits;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use physics::BotId;
use wasmtime::{Engine, Linker};

use crate::bot::CallBudget;
use crate::epoch::EpochTicker;
use crate::host_api::HostState;

pub use crate::action_buffer::{ActionBuffer, ActionPersistence};
pub use crate::bot::LoadedBot;
pub use crate::config::{BotEntry, SandboxConfig};
pub use crate::error::{GuestFault, LoadError, MemoryError, SandboxError};

/// Loads untrusted bot modules and runs them under fuel, time and memory budgets.
///
/// Every bot gets its own `Store`, so guests share nothing but the compiled
/// engine and the host import set.
pub struct SandboxHost {
    engine: Engine,
    linker: Linker<HostState>,
    config: SandboxConfig,
    ticker: Option<Arc<EpochTicker>>,
}

impl SandboxHost {
    pub fn new(config: SandboxConfig) -> Result<Self, SandboxError> {
        config.validate()?;

        let mut wasm_config = wasmtime::Config::new();
        wasm_config.consume_fuel(true);
        wasm_config.max_wasm_stack(config.max_wasm_stack);
        if config.deadline_ms.is_some() {
            wasm_config.epoch_interruption(true);
        }

        let engine = Engine::new(&wasm_config)?;
        let mut linker = Linker::new(&engine);
        host_api::register_host_functions(&mut linker)?;

        let ticker = match config.deadline_ms {
            Some(_) => {
                let ticker = EpochTicker::spawn(engine.clone())
                    .map_err(|e| SandboxError::Config(format!("failed to start epoch ticker: {}", e)))?;
                Some(Arc::new(ticker))
            }
            None => None,
        };

        tracing::info!(
            abi_major = bot_abi::ABI_VERSION_MAJOR,
            abi_minor = bot_abi::ABI_VERSION_MINOR,
            fuel_per_call = config.fuel_per_call,
            deadline_ms = ?config.deadline_ms,
            max_memory_bytes = config.max_memory_bytes,
            persistence = ?config.action_persistence,
            "sandbox host ready"
        );

        Ok(Self {
            engine,
            linker,
            config,
            ticker,
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Load a bot from raw module bytes (binary wasm or WAT text).
    pub fn load(
        &self,
        id: BotId,
        name: impl Into<String>,
        wasm_bytes: &[u8],
        fuel_override: Option<u64>,
    ) -> Result<LoadedBot, LoadError> {
        let budget = CallBudget {
            fuel: fuel_override.unwrap_or(self.config.fuel_per_call),
            deadline_ms: self.config.deadline_ms,
            max_memory_bytes: self.config.max_memory_bytes,
            persistence: self.config.action_persistence,
        };
        LoadedBot::from_bytes(
            &self.engine,
            &self.linker,
            id,
            name.into(),
            wasm_bytes,
            budget,
            self.ticker.clone(),
        )
    }

    /// Load a bot from a .wasm or .wat file.
    pub fn load_file(
        &self,
        id: BotId,
        name: impl Into<String>,
        path: &Path,
        fuel_override: Option<u64>,
    ) -> Result<LoadedBot, LoadError> {
        let wasm_bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(id, name, &wasm_bytes, fuel_override)
    }

    pub fn load_entry(&self, id: BotId, entry: &BotEntry) -> Result<LoadedBot, LoadError> {
        self.load_file(id, entry.name.clone(), &entry.wasm_path, entry.fuel_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{Action, ActionFlags, ArenaConfig, BotView, PuckState, Vec2};

    const RAMMER: &str = r#"
        (module
          (import "env" "send_action" (func $send_action (param f32 f32)))
          (import "env" "set_color" (func $set_color (param f32 f32 f32)))
          (global $max (mut f32) (f32.const 0))
          (func (export "init") (param f32 f32 f32 f32)
            (global.set $max (local.get 2))
            (call $set_color (f32.const 1) (f32.const 0) (f32.const 0)))
          (func (export "update")
            (param $x f32) (param $y f32) (param f32 f32)
            (param $ex f32) (param $ey f32) (param f32 f32)
            (local $dx f32) (local $dy f32) (local $mag f32)
            (local.set $dx (f32.sub (local.get $ex) (local.get $x)))
            (local.set $dy (f32.sub (local.get $ey) (local.get $y)))
            (local.set $mag (f32.sqrt (f32.add
              (f32.mul (local.get $dx) (local.get $dx))
              (f32.mul (local.get $dy) (local.get $dy)))))
            (if (f32.eq (local.get $mag) (f32.const 0)) (then (return)))
            (call $send_action
              (f32.mul (f32.div (local.get $dx) (local.get $mag)) (global.get $max))
              (f32.mul (f32.div (local.get $dy) (local.get $mag)) (global.get $max)))))
    "#;

    fn guest(update_body: &str) -> String {
        format!(
            r#"(module
                 (import "env" "send_action" (func $send_action (param f32 f32)))
                 (import "env" "send_actions" (func $send_actions (param i32)))
                 (import "env" "host_log" (func $host_log (param i32 i32 i32)))
                 (memory (export "memory") 1)
                 (data (i32.const 0) "hello from guest")
                 (global $calls (mut i32) (i32.const 0))
                 (func (export "init") (param f32 f32 f32 f32))
                 (func (export "update") (param f32 f32 f32 f32 f32 f32 f32 f32)
                   {update_body}))"#
        )
    }

    fn host() -> SandboxHost {
        SandboxHost::new(SandboxConfig::default()).unwrap()
    }

    fn view() -> BotView {
        let own = PuckState::new(BotId(0), Vec2::new(-10.0, 0.0));
        let enemy = PuckState::new(BotId(1), Vec2::new(10.0, 0.0));
        BotView::observe(&own, &enemy)
    }

    fn ready(host: &SandboxHost, wat: &str) -> LoadedBot {
        let mut bot = host.load(BotId(0), "test", wat.as_bytes(), None).unwrap();
        bot.call_init(&ArenaConfig::default()).unwrap();
        bot
    }

    fn fault_of(result: Result<(), SandboxError>) -> GuestFault {
        match result {
            Err(SandboxError::Fault(fault)) => fault,
            other => panic!("expected guest fault, got {:?}", other),
        }
    }

    #[test]
    fn rammer_steers_toward_enemy_at_full_accel() {
        let host = host();
        let mut bot = ready(&host, RAMMER);
        assert_eq!(bot.color(), Some([1.0, 0.0, 0.0]));

        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::accel(5.0, 0.0));
        assert!(bot.last_fuel_used() > 0);
    }

    #[test]
    fn faulted_update_keeps_previous_color() {
        let wat = r#"(module
            (import "env" "set_color" (func $set_color (param f32 f32 f32)))
            (func (export "init") (param f32 f32 f32 f32)
              (call $set_color (f32.const 0) (f32.const 1) (f32.const 0)))
            (func (export "update") (param f32 f32 f32 f32 f32 f32 f32 f32)
              (call $set_color (f32.const 1) (f32.const 1) (f32.const 1))
              unreachable))"#;
        let host = host();
        let mut bot = ready(&host, wat);
        assert!(matches!(fault_of(bot.call_update(&view())), GuestFault::Trap(_)));
        assert_eq!(bot.color(), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn missing_update_export_fails_load() {
        let wat = r#"(module (func (export "init") (param f32 f32 f32 f32)))"#;
        let err = host().load(BotId(0), "bad", wat.as_bytes(), None).unwrap_err();
        assert!(matches!(err, LoadError::MissingExport("update")));
    }

    #[test]
    fn wrong_update_signature_fails_load() {
        let wat = r#"(module
            (func (export "init") (param f32 f32 f32 f32))
            (func (export "update") (param i32)))"#;
        let err = host().load(BotId(0), "bad", wat.as_bytes(), None).unwrap_err();
        assert!(matches!(err, LoadError::BadExportSignature { name: "update", .. }));
    }

    #[test]
    fn unknown_import_fails_load() {
        let wat = r#"(module
            (import "wasi_snapshot_preview1" "fd_write" (func (param i32 i32 i32 i32) (result i32)))
            (func (export "init") (param f32 f32 f32 f32))
            (func (export "update") (param f32 f32 f32 f32 f32 f32 f32 f32)))"#;
        let err = host().load(BotId(0), "bad", wat.as_bytes(), None).unwrap_err();
        match err {
            LoadError::UnknownImport { module, name } => {
                assert_eq!(module, "wasi_snapshot_preview1");
                assert_eq!(name, "fd_write");
            }
            other => panic!("expected UnknownImport, got {:?}", other),
        }
    }

    #[test]
    fn garbage_bytes_fail_compile() {
        let err = host().load(BotId(0), "bad", &[0xde, 0xad, 0xbe, 0xef], None).unwrap_err();
        assert!(matches!(err, LoadError::Compile(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.wasm");
        let err = host().load_file(BotId(0), "ghost", &path, None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn load_file_accepts_wat_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rammer.wat");
        std::fs::write(&path, RAMMER).unwrap();
        let entry = BotEntry {
            name: "rammer".into(),
            wasm_path: path,
            fuel_limit: Some(50_000),
        };
        let bot = host().load_entry(BotId(3), &entry).unwrap();
        assert_eq!(bot.id, BotId(3));
        assert_eq!(bot.fuel_limit(), 50_000);
    }

    #[test]
    fn last_submission_in_a_call_wins() {
        let host = host();
        let mut bot = ready(
            &host,
            &guest(
                "(call $send_action (f32.const 1) (f32.const 0))
                 (call $send_action (f32.const 0) (f32.const 1))
                 (call $send_actions (i32.const 1))",
            ),
        );
        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::Flags(ActionFlags::THRUST));
    }

    #[test]
    fn oversized_accel_is_clamped_not_rejected() {
        let host = host();
        let mut bot = ready(&host, &guest("(call $send_action (f32.const 300) (f32.const 400))"));
        bot.call_update(&view()).unwrap();
        match bot.consume_action() {
            Action::Accel(a) => {
                assert!((a.length() - 5.0).abs() < 1e-5);
                assert!((a.x - 3.0).abs() < 1e-5 && (a.y - 4.0).abs() < 1e-5);
            }
            other => panic!("expected accel, got {:?}", other),
        }
    }

    #[test]
    fn infinite_loop_exhausts_fuel_and_discards_submission() {
        let host = host();
        let mut bot = ready(
            &host,
            &guest(
                "(if (i32.eqz (global.get $calls))
                   (then
                     (global.set $calls (i32.const 1))
                     (call $send_action (f32.const 1) (f32.const 0))
                     (return)))
                 (call $send_action (f32.const -1) (f32.const 0))
                 (loop $spin (br $spin))",
            ),
        );
        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::accel(1.0, 0.0));

        let fault = fault_of(bot.call_update(&view()));
        assert_eq!(fault, GuestFault::FuelExhausted { limit: 1_000_000 });
        assert_eq!(bot.consume_action(), Action::accel(1.0, 0.0));
    }

    #[test]
    fn unreachable_is_a_trap() {
        let host = host();
        let mut bot = ready(&host, &guest("unreachable"));
        assert!(matches!(fault_of(bot.call_update(&view())), GuestFault::Trap(_)));
    }

    #[test]
    fn nan_accel_is_invalid_host_call() {
        let host = host();
        let mut bot = ready(&host, &guest("(call $send_action (f32.const nan) (f32.const 0))"));
        assert!(matches!(
            fault_of(bot.call_update(&view())),
            GuestFault::InvalidHostCall(_)
        ));
        assert_eq!(bot.consume_action(), Action::Idle);
    }

    #[test]
    fn unknown_flag_bits_are_invalid_host_call() {
        let host = host();
        let mut bot = ready(&host, &guest("(call $send_actions (i32.const 8))"));
        assert!(matches!(
            fault_of(bot.call_update(&view())),
            GuestFault::InvalidHostCall(_)
        ));
    }

    #[test]
    fn submitting_during_init_faults_init() {
        let wat = r#"(module
            (import "env" "send_action" (func $send_action (param f32 f32)))
            (func (export "init") (param f32 f32 f32 f32)
              (call $send_action (f32.const 1) (f32.const 1)))
            (func (export "update") (param f32 f32 f32 f32 f32 f32 f32 f32)))"#;
        let mut bot = host().load(BotId(0), "eager", wat.as_bytes(), None).unwrap();
        let fault = fault_of(bot.call_init(&ArenaConfig::default()));
        assert!(matches!(fault, GuestFault::InvalidHostCall(_)));
    }

    #[test]
    fn init_twice_is_rejected() {
        let host = host();
        let mut bot = ready(&host, RAMMER);
        let err = bot.call_init(&ArenaConfig::default()).unwrap_err();
        assert!(matches!(err, SandboxError::AlreadyInitialized(BotId(0))));
    }

    #[test]
    fn update_before_init_is_rejected() {
        let mut bot = host().load(BotId(1), "early", RAMMER.as_bytes(), None).unwrap();
        let err = bot.call_update(&view()).unwrap_err();
        assert!(matches!(err, SandboxError::NotInitialized(BotId(1))));
    }

    #[test]
    fn reset_to_neutral_clears_silent_ticks() {
        let host = SandboxHost::new(SandboxConfig {
            action_persistence: ActionPersistence::ResetToNeutral,
            ..Default::default()
        })
        .unwrap();
        let body = "(if (i32.eqz (global.get $calls))
                      (then (call $send_action (f32.const 2) (f32.const 0))))
                    (global.set $calls (i32.add (global.get $calls) (i32.const 1)))";

        let mut bot = ready(&host, &guest(body));
        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::accel(2.0, 0.0));
        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::Idle);

        let repeat_host = SandboxHost::new(SandboxConfig::default()).unwrap();
        let mut bot = ready(&repeat_host, &guest(body));
        bot.call_update(&view()).unwrap();
        bot.call_update(&view()).unwrap();
        assert_eq!(bot.consume_action(), Action::accel(2.0, 0.0));
    }

    #[test]
    fn memory_growth_past_ceiling_faults() {
        let host = SandboxHost::new(SandboxConfig {
            max_memory_bytes: 2 * 65536,
            ..Default::default()
        })
        .unwrap();
        let mut bot = ready(&host, &guest("(drop (memory.grow (i32.const 1000)))"));
        assert_eq!(
            fault_of(bot.call_update(&view())),
            GuestFault::MemoryLimit { limit_bytes: 2 * 65536 }
        );
    }

    #[test]
    fn host_log_reads_guest_memory() {
        let host = host();
        let mut bot = ready(
            &host,
            &guest("(call $host_log (i32.const 2) (i32.const 0) (i32.const 16))"),
        );
        bot.call_update(&view()).unwrap();
    }

    #[test]
    fn host_log_out_of_bounds_faults() {
        let host = host();
        let mut bot = ready(
            &host,
            &guest("(call $host_log (i32.const 2) (i32.const 65530) (i32.const 100))"),
        );
        assert!(matches!(
            fault_of(bot.call_update(&view())),
            GuestFault::InvalidHostCall(_)
        ));
    }

    #[test]
    fn wall_clock_deadline_interrupts_guest() {
        let host = SandboxHost::new(SandboxConfig {
            fuel_per_call: u64::MAX / 2,
            deadline_ms: Some(20),
            ..Default::default()
        })
        .unwrap();
        let mut bot = ready(&host, &guest("(loop $spin (br $spin))"));
        assert_eq!(
            fault_of(bot.call_update(&view())),
            GuestFault::DeadlineExceeded { deadline_ms: 20 }
        );
    }

    #[test]
    fn bots_do_not_share_state() {
        let host = host();
        let body = "(global.set $calls (i32.add (global.get $calls) (i32.const 1)))
                    (if (i32.eq (global.get $calls) (i32.const 1))
                      (then (call $send_action (f32.const 1) (f32.const 0))))";
        let mut a = ready(&host, &guest(body));
        let mut b = ready(&host, &guest(body));
        a.call_update(&view()).unwrap();
        a.call_update(&view()).unwrap();
        b.call_update(&view()).unwrap();
        assert_eq!(b.consume_action(), Action::accel(1.0, 0.0));
    }
}
