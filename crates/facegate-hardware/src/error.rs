//! Error types for Wiegand line operations.
//!
//! Only lifecycle problems are errors here. A read timeout is an absent
//! result and a wrong-length frame is filtered, so neither appears below.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while claiming or using Wiegand lines.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Operation called before `initialize()`.
    #[error("{component} not initialized")]
    NotInitialized { component: &'static str },

    /// Opening or claiming the GPIO resource failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Backend is gone (e.g. a mock whose device side was dropped).
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Line access failed after the lines were claimed.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid line configuration.
    #[error(transparent)]
    Core(#[from] facegate_core::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new not-initialized error.
    pub fn not_initialized(component: &'static str) -> Self {
        Self::NotInitialized { component }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Whether this is the contract violation of using an uninitialized side.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }
}
