use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Discrete control bits from `send_actions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionFlags(u8);

impl ActionFlags {
    pub const NONE: Self = Self(0);
    pub const THRUST: Self = Self(bot_abi::ACTION_THRUST as u8);
    pub const LEFT: Self = Self(bot_abi::ACTION_LEFT as u8);
    pub const RIGHT: Self = Self(bot_abi::ACTION_RIGHT as u8);

    /// Decode a raw guest bitmask. Returns None if any unknown bit is set.
    pub fn from_bits(bits: i32) -> Option<Self> {
        if bits & !bot_abi::ACTION_MASK != 0 {
            return None;
        }
        Some(Self(bits as u8))
    }

    pub fn bits(self) -> i32 {
        self.0 as i32
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Net heading change in units of turn_rate: +1 left, -1 right, 0 both/neither.
    pub fn turn_direction(self) -> f32 {
        match (self.contains(Self::LEFT), self.contains(Self::RIGHT)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

impl std::ops::BitOr for ActionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A bot's control request for one tick.
///
/// Both guest ABI variants land here: `send_actions` produces `Flags`,
/// `send_action` produces `Accel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// No thrust.
    #[default]
    Idle,
    Flags(ActionFlags),
    /// Requested acceleration vector, clamped to max_puck_accel on apply.
    Accel(Vec2),
}

impl Action {
    pub fn accel(x: f32, y: f32) -> Self {
        Self::Accel(Vec2::new(x, y))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bits_accepts_known_flags() {
        let flags = ActionFlags::from_bits(bot_abi::ACTION_THRUST | bot_abi::ACTION_LEFT).unwrap();
        assert!(flags.contains(ActionFlags::THRUST));
        assert!(flags.contains(ActionFlags::LEFT));
        assert!(!flags.contains(ActionFlags::RIGHT));
        assert_eq!(flags.bits(), 0b011);
    }

    #[test]
    fn from_bits_rejects_unknown_bits() {
        assert!(ActionFlags::from_bits(0b1000).is_none());
        assert!(ActionFlags::from_bits(-1).is_none());
    }

    #[test]
    fn left_and_right_cancel() {
        assert_eq!((ActionFlags::LEFT | ActionFlags::RIGHT).turn_direction(), 0.0);
        assert_eq!(ActionFlags::LEFT.turn_direction(), 1.0);
        assert_eq!(ActionFlags::RIGHT.turn_direction(), -1.0);
        assert_eq!(ActionFlags::NONE.turn_direction(), 0.0);
    }

    #[test]
    fn default_action_is_idle() {
        assert!(Action::default().is_idle());
    }
}
