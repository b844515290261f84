use wasmtime::{AsContext, Caller, Extern, Memory, StoreContext};

use crate::error::MemoryError;
use crate::host_api::HostState;

/// Read-only view of a guest's linear memory, taken from inside a host call.
///
/// Borrows the caller for its whole lifetime, so the guest cannot run (and
/// grow its memory) while the view exists.
pub struct GuestMemory<'a> {
    memory: Memory,
    store: StoreContext<'a, HostState>,
}

impl<'a> GuestMemory<'a> {
    pub fn from_caller(caller: &'a mut Caller<'_, HostState>) -> Result<Self, MemoryError> {
        let memory = match caller.get_export(bot_abi::EXPORT_MEMORY) {
            Some(Extern::Memory(mem)) => mem,
            _ => return Err(MemoryError::NoMemory),
        };
        Ok(Self {
            memory,
            store: AsContext::as_context(&*caller),
        })
    }

    /// Copy `len` bytes starting at `offset` out of guest memory.
    pub fn read_bytes(&self, offset: u32, len: u32) -> Result<Vec<u8>, MemoryError> {
        let data = self.memory.data(&self.store);
        let start = offset as usize;
        let end = start.checked_add(len as usize);
        match end {
            Some(end) if end <= data.len() => Ok(data[start..end].to_vec()),
            _ => Err(MemoryError::OutOfBounds {
                offset,
                len,
                memory_size: data.len(),
            }),
        }
    }
}
