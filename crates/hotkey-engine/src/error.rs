use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the hotkey engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors originating from the block controller.
    #[error("WMI error: {0}")]
    Wmi(#[from] wmi::Error),

    /// Errors loading or validating configuration.
    #[error("Config error: {0}")]
    Config(#[from] config::Error),

    /// No configured scheme matches a GUID present in the directory.
    #[error("No hotkey scheme matches this device")]
    NoMatchingScheme,

    /// The daemon message could not be encoded.
    #[error("Daemon message encoding failed: {0}")]
    Codec(#[from] wmi_protocol::codec::Error),

    /// The daemon message could not be posted.
    #[error("Daemon error: {0}")]
    Daemon(String),

    /// A sibling service rejected a message.
    #[error("Service error: {0}")]
    Service(String),
}
