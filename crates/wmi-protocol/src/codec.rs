use thiserror::Error;

use crate::DaemonMessage;

/// Errors from encoding/decoding daemon messages.
#[derive(Debug, Error)]
pub enum Error {
    /// Deserialization via rmp_serde failed.
    #[error(transparent)]
    Decode(#[from] rmp_serde::decode::Error),
    /// Serialization via rmp_serde failed.
    #[error(transparent)]
    Encode(#[from] rmp_serde::encode::Error),
}

/// Encode a message as a MessagePack map.
pub fn encode(msg: &DaemonMessage) -> Result<Vec<u8>, Error> {
    Ok(rmp_serde::to_vec_named(msg)?)
}

/// Decode a message produced by [`encode`].
///
/// # Errors
/// Returns an error if the payload is not a valid MessagePack `DaemonMessage`.
pub fn decode(bytes: &[u8]) -> Result<DaemonMessage, Error> {
    Ok(rmp_serde::from_slice(bytes)?)
}
