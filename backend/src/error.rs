//! Error types for the line map engine.
//!
//! Every fallible engine, registry, feed and configuration operation returns
//! [`EngineResult`]. The variants mirror how the refresh pipeline reacts:
//! invalid input skips the affected vehicle, an unavailable upstream degrades
//! the cycle to "no vehicles", and unknown lines or bad configuration are fatal
//! to the view that requested them.

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Malformed arguments, such as an empty station list or a NaN coordinate.
    /// Retrying with the same arguments fails the same way.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The realtime feed could not be fetched or decoded.
    /// The refresh cycle proceeds with zero vehicles.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The station registry has no line with this id.
    #[error("Unknown line: {0}")]
    UnknownLine(String),

    /// Configuration or registry file could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }

    /// Create an upstream-unavailable error.
    pub fn upstream(message: impl Into<String>) -> Self {
        EngineError::UpstreamUnavailable(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }

    /// Whether this error should tear down the view that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownLine(_) | EngineError::Configuration(_)
        )
    }

    /// Whether the next refresh cycle may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::UpstreamUnavailable(_))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::UpstreamUnavailable(err.to_string())
    }
}

impl From<prost::DecodeError> for EngineError {
    fn from(err: prost::DecodeError) -> Self {
        EngineError::UpstreamUnavailable(format!("Failed to decode feed: {}", err))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Configuration(format!("Failed to parse TOML: {}", err))
    }
}
