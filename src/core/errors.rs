use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error("Invalid duration: {0}. Must be finite and positive")]
    InvalidDuration(f64),

    #[error("Channel capacity must be at least one qubit")]
    InvalidCapacity,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Security threshold {0} must be between 0.0 and 0.5")]
    InvalidThreshold(f64),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("Channel configuration: {0}")]
    Channel(#[from] ChannelError),

    #[error("Malformed configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Reasons a Bell test could not be run. Rendered into `BellResult::error`
/// instead of being returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BellTestError {
    #[error("No entangled pairs available")]
    NoPairs,

    #[error("Pair index {index} out of range ({available} pairs available)")]
    IndexOutOfBounds { index: usize, available: usize },

    #[error("Pair {0} has already been measured")]
    AlreadyMeasured(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}
