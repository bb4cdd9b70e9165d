//! Posting messages to the user-space daemon.
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;
use wmi_protocol::{DaemonMessage, EVENT_CODE, VENDOR_ID, codec};

use crate::{Error, Result};

/// A vendor-tagged event as it leaves the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonEvent {
    /// Vendor namespace the daemon filters on.
    pub vendor: &'static str,
    /// Event code within the vendor namespace.
    pub code: u32,
    /// Encoded [`DaemonMessage`].
    pub payload: Vec<u8>,
}

impl DaemonEvent {
    /// Wrap `msg` in the hotkey vendor tag and event code.
    pub fn new(msg: &DaemonMessage) -> Result<Self> {
        Ok(Self {
            vendor: VENDOR_ID,
            code: EVENT_CODE,
            payload: codec::encode(msg)?,
        })
    }

    /// Decode the carried message.
    pub fn message(&self) -> Result<DaemonMessage> {
        Ok(codec::decode(&self.payload)?)
    }
}

/// Destination for daemon-bound actions.
pub trait DaemonSink {
    /// Post one message.
    fn post(&self, msg: DaemonMessage) -> Result<()>;
}

/// A sink that forwards encoded events over a channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<DaemonEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes what it posts.
    pub fn new() -> (Self, Receiver<DaemonEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl DaemonSink for ChannelSink {
    fn post(&self, msg: DaemonMessage) -> Result<()> {
        trace!(kind = msg.kind, arg1 = msg.arg1, arg2 = msg.arg2, "post");
        let event = DaemonEvent::new(&msg)?;
        self.tx
            .send(event)
            .map_err(|_| Error::Daemon("receiver dropped".to_string()))
    }
}
