use physics::Action;
use serde::{Deserialize, Serialize};

/// What a bot's action becomes on a tick where it submits nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPersistence {
    /// The last submitted action keeps applying until replaced.
    #[default]
    RepeatLast,
    /// Every `update` call starts from `Action::Idle`.
    ResetToNeutral,
}

/// Per-bot latch for the action submitted during `update`.
///
/// Overwrite-wins: only the last submission of a call counts.
#[derive(Debug, Clone, Default)]
pub struct ActionBuffer {
    current: Action,
    checkpoint: Action,
    submissions: u32,
    persistence: ActionPersistence,
}

impl ActionBuffer {
    pub fn new(persistence: ActionPersistence) -> Self {
        Self {
            persistence,
            ..Default::default()
        }
    }

    pub fn submit(&mut self, action: Action) {
        self.current = action;
        self.submissions += 1;
    }

    /// The action to apply this tick. Does not clear the latch.
    pub fn consume(&self) -> Action {
        self.current
    }

    /// Number of submissions since the last `begin_call`.
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Called before each guest `update`.
    pub fn begin_call(&mut self) {
        self.checkpoint = self.current;
        self.submissions = 0;
        if self.persistence == ActionPersistence::ResetToNeutral {
            self.current = Action::Idle;
        }
    }

    /// Discard everything submitted since `begin_call`.
    pub fn rollback(&mut self) {
        self.current = self.checkpoint;
        self.submissions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::ActionFlags;

    #[test]
    fn default_is_idle_before_any_submission() {
        let buffer = ActionBuffer::new(ActionPersistence::RepeatLast);
        assert_eq!(buffer.consume(), Action::Idle);
    }

    #[test]
    fn last_submission_wins() {
        let mut buffer = ActionBuffer::new(ActionPersistence::RepeatLast);
        buffer.begin_call();
        buffer.submit(Action::accel(1.0, 0.0));
        buffer.submit(Action::accel(0.0, 2.0));
        buffer.submit(Action::Flags(ActionFlags::THRUST));
        assert_eq!(buffer.submissions(), 3);
        assert_eq!(buffer.consume(), Action::Flags(ActionFlags::THRUST));
    }

    #[test]
    fn consume_does_not_clear() {
        let mut buffer = ActionBuffer::new(ActionPersistence::RepeatLast);
        buffer.submit(Action::accel(1.0, 1.0));
        assert_eq!(buffer.consume(), buffer.consume());
    }

    #[test]
    fn repeat_last_carries_into_silent_tick() {
        let mut buffer = ActionBuffer::new(ActionPersistence::RepeatLast);
        buffer.begin_call();
        buffer.submit(Action::accel(3.0, 0.0));
        buffer.begin_call();
        assert_eq!(buffer.submissions(), 0);
        assert_eq!(buffer.consume(), Action::accel(3.0, 0.0));
    }

    #[test]
    fn reset_to_neutral_clears_on_silent_tick() {
        let mut buffer = ActionBuffer::new(ActionPersistence::ResetToNeutral);
        buffer.begin_call();
        buffer.submit(Action::accel(3.0, 0.0));
        assert_eq!(buffer.consume(), Action::accel(3.0, 0.0));
        buffer.begin_call();
        assert_eq!(buffer.consume(), Action::Idle);
    }

    #[test]
    fn rollback_restores_pre_call_action() {
        let mut buffer = ActionBuffer::new(ActionPersistence::ResetToNeutral);
        buffer.begin_call();
        buffer.submit(Action::accel(1.0, 0.0));
        buffer.begin_call();
        buffer.submit(Action::accel(-9.0, 0.0));
        buffer.rollback();
        assert_eq!(buffer.consume(), Action::accel(1.0, 0.0));
        assert_eq!(buffer.submissions(), 0);
    }
}
