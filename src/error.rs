//! Error types for DrishtiBot

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DrishtiBot error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Camera failure (open/read)
    #[error("Camera error: {0}")]
    Camera(String),

    /// Detector inference failure
    #[error("Detector error: {0}")]
    Detector(String),

    /// Actuator or servo failure
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Thread spawn or join failure
    #[error("Thread error: {0}")]
    Thread(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Whether the supervisor can recover by falling back to standby.
    ///
    /// Perception-side failures (camera, detector) are transient; anything
    /// touching actuators or the process environment ends the control loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Camera(_) | Error::Detector(_))
    }
}
