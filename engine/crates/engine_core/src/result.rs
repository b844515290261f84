use physics::BotId;
use serde::{Deserialize, Serialize};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Collision,
    BoundaryExit,
    Timeout,
    Fault,
}

/// Where in a bot's lifecycle a fault happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPhase {
    Load,
    Init,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub bot: BotId,
    pub phase: FaultPhase,
    pub tick: u64,
    pub message: String,
}

/// Final outcome of a match. `winner == None` is a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Option<BotId>,
    pub reason: EndReason,
    pub final_tick: u64,
    pub faults: Vec<FaultRecord>,
}

impl MatchResult {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Result for a match decided before it could start because too few
    /// bots loaded. `survivors` are the bots that did load.
    pub fn forfeit(survivors: &[BotId], faults: Vec<FaultRecord>) -> Self {
        let winner = match survivors {
            [only] => Some(*only),
            _ => None,
        };
        Self {
            winner,
            reason: EndReason::Fault,
            final_tick: 0,
            faults,
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.winner {
            Some(bot) => write!(f, "{} wins by {:?} at tick {}", bot, self.reason, self.final_tick),
            None => write!(f, "draw by {:?} at tick {}", self.reason, self.final_tick),
        }
    }
}
