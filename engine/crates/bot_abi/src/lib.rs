#![no_std]

// --- ABI Version ---

pub const ABI_VERSION_MAJOR: u32 = 1;
pub const ABI_VERSION_MINOR: u32 = 0;

// --- Guest exports ---

pub const EXPORT_INIT: &str = "init";
pub const EXPORT_UPDATE: &str = "update";
pub const EXPORT_MEMORY: &str = "memory";

// --- Host imports ---

pub const IMPORT_MODULE: &str = "env";
pub const IMPORT_SEND_ACTIONS: &str = "send_actions";
pub const IMPORT_SEND_ACTION: &str = "send_action";
pub const IMPORT_SET_COLOR: &str = "set_color";
pub const IMPORT_HOST_LOG: &str = "host_log";

// --- Action flags (send_actions) ---

pub const ACTION_THRUST: i32 = 0b001;
pub const ACTION_LEFT: i32 = 0b010;
pub const ACTION_RIGHT: i32 = 0b100;

/// Every bit a guest may legally set in `send_actions`.
pub const ACTION_MASK: i32 = ACTION_THRUST | ACTION_LEFT | ACTION_RIGHT;

// --- Wire layouts ---

/// `init` takes the arena config as four flattened f32 arguments.
pub const CONFIG_FIELDS: usize = 4;
/// `update` takes the bot's view as eight flattened f32 arguments.
pub const STATE_FIELDS: usize = 8;

/// Config as passed to `init`, in wire order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigWire {
    pub boundary_radius: f32,
    pub puck_radius: f32,
    pub max_puck_accel: f32,
    pub damping: f32,
}

impl ConfigWire {
    pub fn to_args(self) -> (f32, f32, f32, f32) {
        (
            self.boundary_radius,
            self.puck_radius,
            self.max_puck_accel,
            self.damping,
        )
    }

    pub fn to_array(self) -> [f32; CONFIG_FIELDS] {
        [
            self.boundary_radius,
            self.puck_radius,
            self.max_puck_accel,
            self.damping,
        ]
    }
}

/// Per-tick state as passed to `update`, in wire order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateWire {
    pub x_pos: f32,
    pub y_pos: f32,
    pub x_vel: f32,
    pub y_vel: f32,
    pub enemy_x_pos: f32,
    pub enemy_y_pos: f32,
    pub enemy_x_vel: f32,
    pub enemy_y_vel: f32,
}

impl StateWire {
    pub fn to_args(self) -> (f32, f32, f32, f32, f32, f32, f32, f32) {
        (
            self.x_pos,
            self.y_pos,
            self.x_vel,
            self.y_vel,
            self.enemy_x_pos,
            self.enemy_y_pos,
            self.enemy_x_vel,
            self.enemy_y_vel,
        )
    }

    pub fn to_array(self) -> [f32; STATE_FIELDS] {
        [
            self.x_pos,
            self.y_pos,
            self.x_vel,
            self.y_vel,
            self.enemy_x_pos,
            self.enemy_y_pos,
            self.enemy_x_vel,
            self.enemy_y_vel,
        ]
    }
}

// --- Log Levels ---

pub const LOG_TRACE: u32 = 0;
pub const LOG_DEBUG: u32 = 1;
pub const LOG_INFO: u32 = 2;
pub const LOG_WARN: u32 = 3;
pub const LOG_ERROR: u32 = 4;

/// Longest guest log line the host will copy out of linear memory.
pub const MAX_LOG_BYTES: u32 = 1024;

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn flags_are_disjoint_bits() {
        assert_eq!(ACTION_THRUST & ACTION_LEFT, 0);
        assert_eq!(ACTION_THRUST & ACTION_RIGHT, 0);
        assert_eq!(ACTION_LEFT & ACTION_RIGHT, 0);
        assert_eq!(ACTION_MASK, 0b111);
    }

    #[test]
    fn config_wire_order() {
        let cfg = ConfigWire {
            boundary_radius: 1.0,
            puck_radius: 2.0,
            max_puck_accel: 3.0,
            damping: 4.0,
        };
        assert_eq!(cfg.to_array(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cfg.to_args(), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn state_wire_order() {
        let state = StateWire {
            x_pos: 1.0,
            y_pos: 2.0,
            x_vel: 3.0,
            y_vel: 4.0,
            enemy_x_pos: 5.0,
            enemy_y_pos: 6.0,
            enemy_x_vel: 7.0,
            enemy_y_vel: 8.0,
        };
        assert_eq!(state.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn abi_version_constants() {
        assert_eq!(ABI_VERSION_MAJOR, 1);
        assert_eq!(ABI_VERSION_MINOR, 0);
    }
}
