use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Wall-clock budget for one match tick at 30 ticks per second.
pub const TICK_BUDGET_US: u128 = 33_000;

#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub tick_number: u64,
    pub duration_us: u128,
    /// Time spent inside guest `update` calls.
    pub guest_duration_us: u128,
    /// Fuel burned by all guests this tick.
    pub fuel_used: u64,
    pub active_pucks: usize,
    pub event_count: usize,
}

impl TickMetrics {
    pub fn over_budget(&self) -> bool {
        self.duration_us > TICK_BUDGET_US
    }

    pub fn log(&self) {
        if self.over_budget() {
            tracing::warn!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                guest_us = self.guest_duration_us,
                fuel = self.fuel_used,
                pucks = self.active_pucks,
                events = self.event_count,
                "tick exceeded budget ({}us > {}us)",
                self.duration_us,
                TICK_BUDGET_US
            );
        } else {
            tracing::trace!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                guest_us = self.guest_duration_us,
                fuel = self.fuel_used,
                pucks = self.active_pucks,
                events = self.event_count,
                "tick completed"
            );
        }
    }
}
