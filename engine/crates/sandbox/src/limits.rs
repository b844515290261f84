use wasmtime::ResourceLimiter;

/// Tables are tiny in bot modules; this only stops runaway `table.grow`.
const MAX_TABLE_ELEMENTS: usize = 10_000;

/// Per-store ceiling on guest linear memory.
///
/// Growing past the ceiling traps the guest instead of returning -1 from
/// `memory.grow`, and the breach is remembered so the fault can be reported
/// as a memory-limit violation rather than a generic trap.
#[derive(Debug, Clone)]
pub struct MemoryCeiling {
    max_bytes: usize,
    exceeded: bool,
}

impl MemoryCeiling {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            exceeded: false,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns whether the ceiling was hit since the last call, and resets it.
    pub fn take_exceeded(&mut self) -> bool {
        std::mem::take(&mut self.exceeded)
    }
}

impl ResourceLimiter for MemoryCeiling {
    fn memory_growing(
        &mut self,
        current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        if desired > self.max_bytes {
            self.exceeded = true;
            return Err(wasmtime::Error::msg(format!(
                "memory grow from {current} to {desired} bytes exceeds ceiling of {} bytes",
                self.max_bytes
            )));
        }
        Ok(true)
    }

    fn table_growing(
        &mut self,
        _current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        Ok(desired <= MAX_TABLE_ELEMENTS)
    }
}
