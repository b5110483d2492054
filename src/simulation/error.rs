use std::fmt;

/// Failures the simulation core reports to its caller.
///
/// Numerical edge cases (coincident particles, zero-length vectors) are
/// handled inside the integrator and never show up here.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Every slot of the fixed-capacity particle pool is occupied.
    PoolFull { capacity: usize },
    /// A spawned particle is larger than the radius the grid was sized for.
    RadiusExceedsCell { radius: f32, max_radius: f32 },
    /// A spawned particle's radius is zero, negative or not finite.
    InvalidRadius { radius: f32 },
    /// A spawn position with a NaN or infinite component.
    InvalidPosition { x: f32, y: f32 },
    /// More particles than the bin index was allocated for.
    CapacityExceeded { particles: usize, capacity: usize },
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::PoolFull { capacity } => {
                write!(f, "particle pool is full ({capacity} slots)")
            }
            SimError::RadiusExceedsCell { radius, max_radius } => {
                write!(f, "particle radius {radius} exceeds the grid's maximum radius {max_radius}")
            }
            SimError::InvalidRadius { radius } => write!(f, "particle radius {radius} is not a positive finite number"),
            SimError::InvalidPosition { x, y } => write!(f, "spawn position ({x}, {y}) is not finite"),
            SimError::CapacityExceeded { particles, capacity } => {
                write!(f, "{particles} particles do not fit in a bin index of capacity {capacity}")
            }
            SimError::InvalidConfig(reason) => write!(f, "invalid simulation config: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}
