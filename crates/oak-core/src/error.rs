//! Error types for cloud registration and events

use thiserror::Error;

/// Reasons a runtime can refuse a cloud operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    // Registry errors
    #[error("Empty name")]
    EmptyName,

    #[error("Name too long: {len} bytes, limit {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("Name already registered: {0}")]
    DuplicateName(String),

    #[error("Registry full: limit {0}")]
    RegistryFull(usize),

    // Event errors
    #[error("Event data too large: {len} bytes, limit {max}")]
    EventTooLarge { len: usize, max: usize },

    #[error("Not connected")]
    NotConnected,

    // Identity errors
    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    #[error("Cloud support disabled")]
    Disabled,
}

/// Result type for cloud operations
pub type CloudResult<T> = Result<T, CloudError>;
