use physics::{BotId, RamVerdict};
use sandbox::GuestFault;
use serde::{Deserialize, Serialize};

use crate::result::FaultPhase;

/// Something notable that happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    Fault {
        bot: BotId,
        phase: FaultPhase,
        fault: GuestFault,
    },
    Collision {
        first: BotId,
        second: BotId,
        verdict: RamVerdict,
    },
    Bounce {
        first: BotId,
        second: BotId,
    },
    BoundaryExit {
        bot: BotId,
    },
}

impl MatchEvent {
    /// Lower sorts first when a tick's events are drained.
    fn order_key(&self) -> (u8, BotId) {
        match self {
            MatchEvent::Fault { bot, .. } => (0, *bot),
            MatchEvent::Collision { first, .. } => (1, *first),
            MatchEvent::Bounce { first, .. } => (2, *first),
            MatchEvent::BoundaryExit { bot } => (3, *bot),
        }
    }
}

/// Per-tick event queue.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<MatchEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    pub fn emit(&mut self, event: MatchEvent) {
        self.queue.push(event);
    }

    /// Drain everything emitted this tick, faults first, then contacts, then
    /// boundary exits, each group in bot order.
    pub fn drain_all(&mut self) -> Vec<MatchEvent> {
        let mut events = std::mem::take(&mut self.queue);
        events.sort_by_key(MatchEvent::order_key);
        events
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
