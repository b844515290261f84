#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be > 0, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("boundary_radius ({boundary_radius}) must exceed puck_radius ({puck_radius})")]
    PuckTooLarge {
        boundary_radius: f32,
        puck_radius: f32,
    },

    #[error("damping must be in [0, 1), got {0}")]
    DampingOutOfRange(f32),

    #[error("turn_rate must be >= 0, got {0}")]
    NegativeTurnRate(f32),
}
