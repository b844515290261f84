use std::sync::Arc;

use physics::{Action, ArenaConfig, BotId, BotView};
use wasmtime::{Engine, Linker, Module, Store, Trap, TypedFunc};

use crate::action_buffer::ActionPersistence;
use crate::epoch::EpochTicker;
use crate::error::{GuestFault, LoadError, SandboxError};
use crate::host_api::{is_host_import, CallPhase, HostState};
use crate::limits::MemoryCeiling;

type InitFn = TypedFunc<(f32, f32, f32, f32), ()>;
type UpdateFn = TypedFunc<(f32, f32, f32, f32, f32, f32, f32, f32), ()>;

/// Per-bot resource budget resolved from `SandboxConfig` and the bot entry.
#[derive(Debug, Clone, Copy)]
pub struct CallBudget {
    pub fuel: u64,
    pub deadline_ms: Option<u64>,
    pub max_memory_bytes: usize,
    pub persistence: ActionPersistence,
}

/// A compiled, instantiated and export-checked bot module.
pub struct LoadedBot {
    pub id: BotId,
    pub name: String,
    budget: CallBudget,
    initialized: bool,
    last_fuel_used: u64,
    store: Store<HostState>,
    fn_init: InitFn,
    fn_update: UpdateFn,
    // Keeps the epoch thread running for as long as a bot can be called.
    _ticker: Option<Arc<EpochTicker>>,
}

impl LoadedBot {
    pub(crate) fn from_bytes(
        engine: &Engine,
        linker: &Linker<HostState>,
        id: BotId,
        name: String,
        wasm_bytes: &[u8],
        budget: CallBudget,
        ticker: Option<Arc<EpochTicker>>,
    ) -> Result<Self, LoadError> {
        let module = Module::new(engine, wasm_bytes).map_err(|e| LoadError::Compile(e.to_string()))?;

        if let Some(import) = module
            .imports()
            .find(|import| !is_host_import(import.module(), import.name()))
        {
            return Err(LoadError::UnknownImport {
                module: import.module().to_string(),
                name: import.name().to_string(),
            });
        }

        let state = HostState::new(
            id,
            budget.persistence,
            MemoryCeiling::new(budget.max_memory_bytes),
        );
        let mut store = Store::new(engine, state);
        store.limiter(|state| &mut state.limits);

        // A start function runs during instantiation and must be metered too.
        store
            .set_fuel(budget.fuel)
            .map_err(|e| LoadError::Setup(format!("failed to set initial fuel: {}", e)))?;
        if let Some(ms) = budget.deadline_ms {
            store.set_epoch_deadline(ms);
        }

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| LoadError::Instantiate(e.to_string()))?;

        let init = instance
            .get_func(&mut store, bot_abi::EXPORT_INIT)
            .ok_or(LoadError::MissingExport(bot_abi::EXPORT_INIT))?;
        let fn_init = init
            .typed::<(f32, f32, f32, f32), ()>(&store)
            .map_err(|e| LoadError::BadExportSignature {
                name: bot_abi::EXPORT_INIT,
                reason: e.to_string(),
            })?;

        let update = instance
            .get_func(&mut store, bot_abi::EXPORT_UPDATE)
            .ok_or(LoadError::MissingExport(bot_abi::EXPORT_UPDATE))?;
        let fn_update = update
            .typed::<(f32, f32, f32, f32, f32, f32, f32, f32), ()>(&store)
            .map_err(|e| LoadError::BadExportSignature {
                name: bot_abi::EXPORT_UPDATE,
                reason: e.to_string(),
            })?;

        tracing::info!(bot = %id, name = %name, fuel = budget.fuel, "bot loaded");

        Ok(Self {
            id,
            name,
            budget,
            initialized: false,
            last_fuel_used: 0,
            store,
            fn_init,
            fn_update,
            _ticker: ticker,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn fuel_limit(&self) -> u64 {
        self.budget.fuel
    }

    /// Fuel burned by the most recent guest call.
    pub fn last_fuel_used(&self) -> u64 {
        self.last_fuel_used
    }

    /// Colour chosen by the guest, if it called `set_color`.
    pub fn color(&self) -> Option<[f32; 3]> {
        self.store.data().color
    }

    /// The action to apply this tick.
    pub fn consume_action(&self) -> Action {
        self.store.data().actions.consume()
    }

    /// Run the guest's `init` hook. Must be called exactly once.
    pub fn call_init(&mut self, config: &ArenaConfig) -> Result<(), SandboxError> {
        if self.initialized {
            tracing::warn!(bot = %self.id, "init called twice");
            return Err(SandboxError::AlreadyInitialized(self.id));
        }
        self.initialized = true;
        self.store.data_mut().max_accel = config.max_puck_accel;

        self.prepare_call(CallPhase::Init)?;
        let result = self.fn_init.call(&mut self.store, config.to_wire().to_args());
        self.finish_call(result, CallPhase::Init)
    }

    /// Run the guest's `update` hook for one tick.
    ///
    /// On a fault, anything the guest submitted during this call is discarded,
    /// including a colour change.
    pub fn call_update(&mut self, view: &BotView) -> Result<(), SandboxError> {
        if !self.initialized {
            return Err(SandboxError::NotInitialized(self.id));
        }
        let color = self.store.data().color;
        self.store.data_mut().actions.begin_call();

        self.prepare_call(CallPhase::Update)?;
        let result = self.fn_update.call(&mut self.store, view.to_wire().to_args());
        let outcome = self.finish_call(result, CallPhase::Update);
        if outcome.is_err() {
            let state = self.store.data_mut();
            state.actions.rollback();
            state.color = color;
        }
        outcome
    }

    fn prepare_call(&mut self, phase: CallPhase) -> Result<(), SandboxError> {
        self.store.set_fuel(self.budget.fuel)?;
        if let Some(ms) = self.budget.deadline_ms {
            self.store.set_epoch_deadline(ms);
        }
        let state = self.store.data_mut();
        state.phase = phase;
        state.rejected_call = None;
        state.limits.take_exceeded();
        Ok(())
    }

    fn finish_call(
        &mut self,
        result: wasmtime::Result<()>,
        phase: CallPhase,
    ) -> Result<(), SandboxError> {
        let remaining = self.store.get_fuel().unwrap_or(0);
        self.last_fuel_used = self.budget.fuel.saturating_sub(remaining);
        self.store.data_mut().phase = CallPhase::Idle;

        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                let fault = self.classify_fault(&err);
                tracing::warn!(
                    bot = %self.id,
                    phase = ?phase,
                    fuel_used = self.last_fuel_used,
                    fault = %fault,
                    "guest call faulted"
                );
                Err(SandboxError::Fault(fault))
            }
        }
    }

    fn classify_fault(&mut self, err: &wasmtime::Error) -> GuestFault {
        let state = self.store.data_mut();
        if let Some(reason) = state.rejected_call.take() {
            return GuestFault::InvalidHostCall(reason);
        }
        if state.limits.take_exceeded() {
            return GuestFault::MemoryLimit {
                limit_bytes: state.limits.max_bytes(),
            };
        }
        match err.downcast_ref::<Trap>() {
            Some(Trap::OutOfFuel) => GuestFault::FuelExhausted {
                limit: self.budget.fuel,
            },
            Some(Trap::Interrupt) => GuestFault::DeadlineExceeded {
                deadline_ms: self.budget.deadline_ms.unwrap_or(0),
            },
            _ => GuestFault::Trap(err.to_string()),
        }
    }
}

impl std::fmt::Debug for LoadedBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedBot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fuel_limit", &self.budget.fuel)
            .field("initialized", &self.initialized)
            .finish()
    }
}
