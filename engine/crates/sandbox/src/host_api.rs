use physics::{Action, ActionFlags, BotId, Vec2};
use wasmtime::{Caller, Linker};

use crate::action_buffer::{ActionBuffer, ActionPersistence};
use crate::limits::MemoryCeiling;
use crate::memory::GuestMemory;

/// Which guest hook, if any, is currently on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Init,
    Update,
}

/// Host-side state stored in each bot's wasmtime::Store.
/// Accessible from host functions via Caller<'_, HostState>.
pub struct HostState {
    pub bot_id: BotId,
    pub phase: CallPhase,
    pub actions: ActionBuffer,
    /// Acceleration ceiling from the arena config, set at init.
    pub max_accel: f32,
    /// Colour requested by the guest via set_color.
    pub color: Option<[f32; 3]>,
    /// Reason the guest's last host call was rejected. Set right before the
    /// host function traps so the fault can be attributed precisely.
    pub rejected_call: Option<String>,
    pub limits: MemoryCeiling,
}

impl HostState {
    pub fn new(bot_id: BotId, persistence: ActionPersistence, limits: MemoryCeiling) -> Self {
        Self {
            bot_id,
            phase: CallPhase::Idle,
            actions: ActionBuffer::new(persistence),
            max_accel: 0.0,
            color: None,
            rejected_call: None,
            limits,
        }
    }
}

/// Every import a guest may link against. Anything else fails to load.
pub const HOST_IMPORTS: [&str; 4] = [
    bot_abi::IMPORT_SEND_ACTIONS,
    bot_abi::IMPORT_SEND_ACTION,
    bot_abi::IMPORT_SET_COLOR,
    bot_abi::IMPORT_HOST_LOG,
];

pub fn is_host_import(module: &str, name: &str) -> bool {
    module == bot_abi::IMPORT_MODULE && HOST_IMPORTS.contains(&name)
}

fn reject(caller: &mut Caller<'_, HostState>, reason: String) -> wasmtime::Result<()> {
    tracing::debug!(bot = %caller.data().bot_id, reason = %reason, "host call rejected");
    caller.data_mut().rejected_call = Some(reason.clone());
    Err(wasmtime::Error::msg(reason))
}

fn require_update(caller: &mut Caller<'_, HostState>, import: &str) -> wasmtime::Result<()> {
    let phase = caller.data().phase;
    if phase == CallPhase::Update {
        return Ok(());
    }
    reject(caller, format!("{import} called during {phase:?}"))
}

/// Register all host API functions on the wasmtime Linker.
pub fn register_host_functions(linker: &mut Linker<HostState>) -> Result<(), wasmtime::Error> {
    // send_actions(flags: i32)
    linker.func_wrap(
        bot_abi::IMPORT_MODULE,
        bot_abi::IMPORT_SEND_ACTIONS,
        |mut caller: Caller<'_, HostState>, flags: i32| -> wasmtime::Result<()> {
            require_update(&mut caller, bot_abi::IMPORT_SEND_ACTIONS)?;
            match ActionFlags::from_bits(flags) {
                Some(flags) => {
                    caller.data_mut().actions.submit(Action::Flags(flags));
                    Ok(())
                }
                None => reject(&mut caller, format!("unknown action flag bits {flags:#b}")),
            }
        },
    )?;

    // send_action(x_accel: f32, y_accel: f32)
    linker.func_wrap(
        bot_abi::IMPORT_MODULE,
        bot_abi::IMPORT_SEND_ACTION,
        |mut caller: Caller<'_, HostState>, x: f32, y: f32| -> wasmtime::Result<()> {
            require_update(&mut caller, bot_abi::IMPORT_SEND_ACTION)?;
            if !x.is_finite() || !y.is_finite() {
                return reject(&mut caller, format!("non-finite acceleration ({x}, {y})"));
            }
            let max_accel = caller.data().max_accel;
            let accel = physics::integrate::clamp_magnitude(Vec2::new(x, y), max_accel);
            caller.data_mut().actions.submit(Action::Accel(accel));
            Ok(())
        },
    )?;

    // set_color(r: f32, g: f32, b: f32)
    linker.func_wrap(
        bot_abi::IMPORT_MODULE,
        bot_abi::IMPORT_SET_COLOR,
        |mut caller: Caller<'_, HostState>, r: f32, g: f32, b: f32| -> wasmtime::Result<()> {
            if ![r, g, b].iter().all(|c| c.is_finite()) {
                return reject(&mut caller, format!("non-finite colour ({r}, {g}, {b})"));
            }
            caller.data_mut().color = Some([r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)]);
            Ok(())
        },
    )?;

    // host_log(level: u32, msg_ptr: u32, msg_len: u32)
    linker.func_wrap(
        bot_abi::IMPORT_MODULE,
        bot_abi::IMPORT_HOST_LOG,
        |mut caller: Caller<'_, HostState>, level: u32, msg_ptr: u32, msg_len: u32| -> wasmtime::Result<()> {
            let len = msg_len.min(bot_abi::MAX_LOG_BYTES);
            let read = GuestMemory::from_caller(&mut caller).and_then(|mem| mem.read_bytes(msg_ptr, len));
            let bytes = match read {
                Ok(bytes) => bytes,
                Err(e) => return reject(&mut caller, format!("host_log: {e}")),
            };

            let bot = caller.data().bot_id;
            let msg = String::from_utf8_lossy(&bytes);
            match level {
                bot_abi::LOG_TRACE => tracing::trace!(target: "bot_guest", bot = %bot, "{}", msg),
                bot_abi::LOG_DEBUG => tracing::debug!(target: "bot_guest", bot = %bot, "{}", msg),
                bot_abi::LOG_INFO => tracing::info!(target: "bot_guest", bot = %bot, "{}", msg),
                bot_abi::LOG_WARN => tracing::warn!(target: "bot_guest", bot = %bot, "{}", msg),
                bot_abi::LOG_ERROR => tracing::error!(target: "bot_guest", bot = %bot, "{}", msg),
                _ => tracing::info!(target: "bot_guest", bot = %bot, "[level={}] {}", level, msg),
            }
            Ok(())
        },
    )?;

    Ok(())
}
