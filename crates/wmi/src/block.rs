//! Directory records and their 20-byte wire layout.
use std::fmt::{self, Display};

use bitflags::bitflags;
use serde::Serialize;

use crate::Guid;

/// Size of one record in the directory blob.
pub const RECORD_SIZE: usize = 20;

bitflags! {
    /// Capability bits carried in the last byte of each record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        /// Data collection must be enabled before and disabled after each query.
        const EXPENSIVE = 0x1;
        /// The block is a method.
        const METHOD = 0x2;
        /// The block takes and returns a string.
        const STRING = 0x4;
        /// The block is an event source.
        const EVENT = 0x8;
        // Firmware may set bits we do not interpret; keep them.
        const _ = !0;
    }
}

/// Two-character object id used to build data and method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub [u8; 2]);

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

/// The two aliasing interpretations of bytes 16 and 17, selected by [`Flags::EVENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Payload {
    /// Data or method block.
    Object(ObjectId),
    /// Event source.
    Event {
        /// Byte carried by firmware notifications for this block.
        notify_id: u8,
        /// Unused by firmware.
        reserved: u8,
    },
}

/// Opaque handle for a record, assigned at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One firmware-described block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    /// Identity of the block.
    pub guid: Guid,
    /// Object id or notify id, depending on [`Flags::EVENT`].
    pub payload: Payload,
    /// Number of addressable instances.
    pub instance_count: u8,
    /// Capability bits.
    pub flags: Flags,
}

impl Block {
    /// Decode one 20-byte record.
    pub fn decode(raw: &[u8; RECORD_SIZE]) -> Self {
        let mut guid = [0u8; 16];
        guid.copy_from_slice(&raw[..16]);
        let flags = Flags::from_bits_retain(raw[19]);
        let payload = if flags.contains(Flags::EVENT) {
            Payload::Event {
                notify_id: raw[16],
                reserved: raw[17],
            }
        } else {
            Payload::Object(ObjectId([raw[16], raw[17]]))
        };
        Self {
            guid: Guid::from_bytes(guid),
            payload,
            instance_count: raw[18],
            flags,
        }
    }

    /// Encode back into the 20-byte wire form.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut raw = [0u8; RECORD_SIZE];
        raw[..16].copy_from_slice(self.guid.as_bytes());
        let (a, b) = match self.payload {
            Payload::Object(ObjectId([a, b])) => (a, b),
            Payload::Event {
                notify_id,
                reserved,
            } => (notify_id, reserved),
        };
        raw[16] = a;
        raw[17] = b;
        raw[18] = self.instance_count;
        raw[19] = self.flags.bits();
        raw
    }

    /// Notify id, present only on event blocks.
    pub fn notify_id(&self) -> Option<u8> {
        match self.payload {
            Payload::Event { notify_id, .. } => Some(notify_id),
            Payload::Object(_) => None,
        }
    }

    /// Object id, present only on data and method blocks.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self.payload {
            Payload::Object(id) => Some(id),
            Payload::Event { .. } => None,
        }
    }

    /// True when the block is marked expensive.
    pub fn is_expensive(&self) -> bool {
        self.flags.contains(Flags::EXPENSIVE)
    }
}

/// Serializable view of a block, used for diagnostics dumps.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    /// Canonical GUID string.
    pub guid: Guid,
    /// Object id, for data and method blocks.
    pub object_id: Option<String>,
    /// Notify id, for event blocks.
    pub notify_id: Option<u8>,
    /// Reserved byte, for event blocks.
    pub reserved: Option<u8>,
    /// Instance count.
    pub instances: u8,
    /// Raw flag byte.
    pub flags: u8,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        let (object_id, notify_id, reserved) = match block.payload {
            Payload::Object(id) => (Some(id.to_string()), None, None),
            Payload::Event {
                notify_id,
                reserved,
            } => (None, Some(notify_id), Some(reserved)),
        };
        Self {
            guid: block.guid,
            object_id,
            notify_id,
            reserved,
            instances: block.instance_count,
            flags: block.flags.bits(),
        }
    }
}
