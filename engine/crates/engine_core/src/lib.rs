pub mod bot;
pub mod error;
pub mod events;
pub mod match_engine;
pub mod replay;
pub mod result;
pub mod rules;

pub use bot::Bot;
pub use error::{MatchError, ReplayError};
pub use events::{EventBus, MatchEvent};
pub use match_engine::{MatchEngine, MatchPhase};
pub use replay::{BotMeta, Frame, Replay};
pub use result::{EndReason, FaultPhase, FaultRecord, MatchResult};
pub use rules::MatchRules;
