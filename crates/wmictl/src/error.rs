//! Error handling for the wmictl crate.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for wmictl operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a wmictl command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Directory decoding or block access failed.
    #[error("WMI error: {0}")]
    Wmi(#[from] wmi::Error),
    /// Configuration or firmware image parsing or validation errors.
    #[error("{}", .0.pretty())]
    Config(#[from] config::Error),
    /// Rule engine or driver errors.
    #[error("Hotkey engine error: {0}")]
    Engine(#[from] hotkey_engine::Error),
    /// Failed to render JSON output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A notify id argument could not be parsed.
    #[error("Invalid notify id {0:?}; expected 0..=255, decimal or 0x-prefixed hex")]
    NotifyId(String),
    /// A hex blob could not be parsed.
    #[error("Invalid hex input: {0}")]
    Hex(String),
}
