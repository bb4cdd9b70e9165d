//! Error types and result alias for the wmi crate.
use std::result::Result as StdResult;

use thiserror::Error;

use crate::{Guid, MethodName, Operation, platform::PlatformError};

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No block in the directory carries this GUID.
    #[error("No WMI block with GUID {0}")]
    NotFound(Guid),

    /// The block exists but its flags do not permit the operation.
    #[error("Operation {op} is not valid for block {guid}")]
    InvalidOperation {
        /// GUID of the resolved block.
        guid: Guid,
        /// The rejected operation.
        op: Operation,
    },

    /// The firmware call itself failed. The platform error is passed through untouched.
    #[error("Platform call {method} failed: {source}")]
    Platform {
        /// Name of the method that was evaluated.
        method: MethodName,
        /// Error reported by the platform.
        source: PlatformError,
    },

    /// The directory blob could not be turned into a block table.
    #[error("Malformed WMI directory: {0}")]
    MalformedDirectory(String),

    /// A GUID string did not have the canonical 8-4-4-4-12 hex shape.
    #[error("Invalid GUID string '{0}'")]
    InvalidGuid(String),
}
