//! Firmware method names derived from block records.
use std::fmt::{self, Display, Write as _};

use crate::{Block, Error, Flags, ObjectId, Result};

/// A four-character firmware method name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodName([u8; 4]);

impl MethodName {
    /// Event data fetch, argument is the notify id.
    pub const EVENT_DATA: Self = Self(*b"_WED");
    /// Directory enumeration, no argument.
    pub const DIRECTORY: Self = Self(*b"_WDG");

    /// Build a name from its raw bytes.
    pub const fn from_bytes(raw: [u8; 4]) -> Self {
        Self(raw)
    }

    /// Raw byte form.
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Two-letter prefix followed by an object id.
    fn with_object(prefix: [u8; 2], id: ObjectId) -> Self {
        Self([prefix[0], prefix[1], id.0[0], id.0[1]])
    }

    /// `WE` followed by the notify id in two upper-case hex digits.
    fn event(notify_id: u8) -> Self {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        Self([
            b'W',
            b'E',
            HEX[usize::from(notify_id >> 4)],
            HEX[usize::from(notify_id & 0xF)],
        ])
    }
}

impl Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                f.write_char(b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodName({self})")
    }
}

impl PartialEq<&str> for MethodName {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_slice() == other.as_bytes()
    }
}

/// Block operations that map onto a per-block firmware method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Enable or disable event delivery (`WExx`).
    EventEnable,
    /// Enable or disable data collection (`WCxx`).
    DataCollection,
    /// Write a data block (`WSxx`).
    Set,
    /// Read a data block (`WQxx`).
    Query,
    /// Evaluate a method block (`WMxx`).
    Invoke,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EventEnable => "event-enable",
            Self::DataCollection => "data-collection",
            Self::Set => "set",
            Self::Query => "query",
            Self::Invoke => "invoke",
        };
        f.write_str(s)
    }
}

impl Operation {
    /// Every operation, in method-name order of the directory table.
    pub const ALL: [Self; 5] = [
        Self::EventEnable,
        Self::DataCollection,
        Self::Set,
        Self::Query,
        Self::Invoke,
    ];

    /// Whether a block with `flags` supports this operation.
    pub fn permitted(self, flags: Flags) -> bool {
        match self {
            Self::EventEnable => flags.contains(Flags::EVENT),
            Self::DataCollection => !flags.intersects(Flags::EVENT | Flags::METHOD),
            Self::Set | Self::Query => flags.intersects(Flags::STRING | Flags::EXPENSIVE),
            Self::Invoke => flags.contains(Flags::METHOD),
        }
    }
}

/// Compute the method name for `op` on `block`.
///
/// Fails with [`Error::InvalidOperation`] when the block lacks the required flag, or when the
/// required id lives under the other payload tag (e.g. a string block that is also an event).
pub fn method_name(block: &Block, op: Operation) -> Result<MethodName> {
    let invalid = || Error::InvalidOperation {
        guid: block.guid,
        op,
    };
    if !op.permitted(block.flags) {
        return Err(invalid());
    }
    let name = match op {
        Operation::EventEnable => MethodName::event(block.notify_id().ok_or_else(invalid)?),
        Operation::DataCollection => {
            MethodName::with_object(*b"WC", block.object_id().ok_or_else(invalid)?)
        }
        Operation::Set => MethodName::with_object(*b"WS", block.object_id().ok_or_else(invalid)?),
        Operation::Query => {
            MethodName::with_object(*b"WQ", block.object_id().ok_or_else(invalid)?)
        }
        Operation::Invoke => {
            MethodName::with_object(*b"WM", block.object_id().ok_or_else(invalid)?)
        }
    };
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Guid, Payload};

    fn block(payload: Payload, flags: Flags) -> Block {
        Block {
            guid: Guid::from_bytes([7; 16]),
            payload,
            instance_count: 1,
            flags,
        }
    }

    fn object(flags: Flags) -> Block {
        block(Payload::Object(ObjectId(*b"AB")), flags)
    }

    fn event(notify_id: u8) -> Block {
        block(
            Payload::Event {
                notify_id,
                reserved: 0,
            },
            Flags::EVENT,
        )
    }

    #[test]
    fn event_names_use_upper_hex() {
        assert_eq!(
            method_name(&event(0x1A), Operation::EventEnable).unwrap(),
            "WE1A"
        );
        assert_eq!(
            method_name(&event(0x05), Operation::EventEnable).unwrap(),
            "WE05"
        );
        assert_eq!(
            method_name(&event(0xF0), Operation::EventEnable).unwrap(),
            "WEF0"
        );
    }

    #[test]
    fn object_names_append_object_id() {
        let b = object(Flags::STRING | Flags::EXPENSIVE);
        assert_eq!(method_name(&b, Operation::Query).unwrap(), "WQAB");
        assert_eq!(method_name(&b, Operation::Set).unwrap(), "WSAB");
        assert_eq!(method_name(&b, Operation::DataCollection).unwrap(), "WCAB");
        assert_eq!(
            method_name(&object(Flags::METHOD), Operation::Invoke).unwrap(),
            "WMAB"
        );
    }

    #[test]
    fn missing_flag_is_invalid() {
        let cases = [
            (object(Flags::empty()), Operation::EventEnable),
            (object(Flags::METHOD), Operation::DataCollection),
            (event(1), Operation::DataCollection),
            (object(Flags::METHOD), Operation::Query),
            (object(Flags::METHOD), Operation::Set),
            (object(Flags::STRING), Operation::Invoke),
        ];
        for (b, op) in cases {
            assert!(
                matches!(method_name(&b, op), Err(Error::InvalidOperation { op: o, .. }) if o == op),
                "{op} accepted on {:?}",
                b.flags
            );
        }
    }

    #[test]
    fn wrong_payload_tag_is_invalid() {
        // String event block: flags allow a query but there is no object id to read.
        let b = block(
            Payload::Event {
                notify_id: 0xD0,
                reserved: 0,
            },
            Flags::EVENT | Flags::STRING,
        );
        assert!(matches!(
            method_name(&b, Operation::Query),
            Err(Error::InvalidOperation { .. })
        ));
        assert_eq!(method_name(&b, Operation::EventEnable).unwrap(), "WED0");
    }

    #[test]
    fn fixed_names() {
        assert_eq!(MethodName::EVENT_DATA, "_WED");
        assert_eq!(MethodName::DIRECTORY, "_WDG");
        assert_eq!(MethodName::from_bytes(*b"W\0AB").to_string(), "W\\x00AB");
    }
}
