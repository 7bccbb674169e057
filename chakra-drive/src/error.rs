//! Error types for ChakraDrive

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ChakraDrive error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error talking to an actuator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No tacho motor answered on the requested port
    #[error("Actuator not found on port {0}")]
    ActuatorNotFound(String),

    /// Speed fraction outside (0, 1]
    #[error("Invalid speed fraction {0}: must be in (0, 1]")]
    InvalidSpeed(f32),

    /// Actuator attribute could not be parsed
    #[error("Invalid value {value:?} for attribute {attribute}")]
    InvalidAttribute {
        /// Attribute name (e.g. "max_speed")
        attribute: &'static str,
        /// Raw value read back
        value: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker thread could not be started
    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(String),

    /// Drive subsystem has been shut down
    #[error("Drive subsystem is shut down")]
    ShutDown,
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
