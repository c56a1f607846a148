//! Error types for wirecraft

use thiserror::Error;

/// Result type alias for wirecraft operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wirecraft
#[derive(Error, Debug)]
pub enum Error {
    /// A parser or field encoder hit a length field that exceeds the buffer,
    /// an out-of-range compression pointer, an over-long domain name, or a
    /// fixed-size header that cannot be read entirely.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// Interface resolution failed
    #[error("invalid interface: {0}")]
    InvalidInterface(String),

    /// A dispatch-table registration conflicts with an existing entry
    #[error("conflicting registration for protocol id {0}")]
    RegistryConflict(u8),

    /// Network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not implemented
    #[error("operation not supported: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Create a malformed-packet error with a custom message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedPacket(msg.into())
    }

    /// Create an invalid-interface error with a custom message
    pub fn invalid_interface<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInterface(msg.into())
    }
}
