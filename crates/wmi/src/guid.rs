//! Binary and canonical-string forms of block GUIDs.
//!
//! The first three fields of the canonical string are stored little-endian in
//! the 16-byte form, so the textual order is:
//!
//! ```text
//! bytes:  0 1 2 3 - 4 5 - 6 7 - 8 9 - 10 11 12 13 14 15
//! text:   3 2 1 0 - 5 4 - 7 6 - 8 9 - 10 11 12 13 14 15
//! ```
use std::{
    fmt::{self, Display, Write as _},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// Length of the canonical string form.
pub const GUID_STR_LEN: usize = 36;

/// Byte index emitted at each of the 16 hex-pair positions of the canonical string.
const TEXT_ORDER: [usize; 16] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

/// Hex-pair positions after which a hyphen is emitted.
const HYPHEN_AFTER: [usize; 4] = [3, 5, 7, 9];

/// A 16-byte block identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Wrap raw bytes as read from the directory.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw byte form.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parse the canonical `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` form. Either hex case is accepted.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidGuid(s.to_string());
        let text = s.as_bytes();
        if text.len() != GUID_STR_LEN {
            return Err(invalid());
        }

        let mut bytes = [0u8; 16];
        let mut pos = 0;
        for (pair, &index) in TEXT_ORDER.iter().enumerate() {
            let hi = text.get(pos).copied().and_then(hex_value).ok_or_else(invalid)?;
            let lo = text
                .get(pos + 1)
                .copied()
                .and_then(hex_value)
                .ok_or_else(invalid)?;
            bytes[index] = (hi << 4) | lo;
            pos += 2;
            if HYPHEN_AFTER.contains(&pair) {
                if text.get(pos) != Some(&b'-') {
                    return Err(invalid());
                }
                pos += 1;
            }
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(GUID_STR_LEN);
        for (pair, &index) in TEXT_ORDER.iter().enumerate() {
            write!(out, "{:02X}", self.0[index])?;
            if HYPHEN_AFTER.contains(&pair) {
                out.push('-');
            }
        }
        f.write_str(&out)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 16]> for Guid {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// The Tongfang hotkey event block.
    const TONGFANG: &str = "ABBC0F72-8EA1-11D1-00A0-C90629100000";

    #[test]
    fn first_three_fields_are_reversed() {
        let bytes = [
            0x72, 0x0F, 0xBC, 0xAB, 0xA1, 0x8E, 0xD1, 0x11, 0x00, 0xA0, 0xC9, 0x06, 0x29, 0x10,
            0x00, 0x00,
        ];
        assert_eq!(Guid::from_bytes(bytes).to_string(), TONGFANG);
        assert_eq!(Guid::parse(TONGFANG).unwrap().as_bytes(), &bytes);
    }

    #[test]
    fn lowercase_input_is_accepted_and_output_is_upper() {
        let g = Guid::parse(&TONGFANG.to_ascii_lowercase()).unwrap();
        assert_eq!(g.to_string(), TONGFANG);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        for s in [
            "",
            "ABBC0F72-8EA1-11D1-00A0-C9062910000",
            "ABBC0F72-8EA1-11D1-00A0-C906291000000",
            "ABBC0F72X8EA1-11D1-00A0-C90629100000",
            "ABBC0F7G-8EA1-11D1-00A0-C90629100000",
            "ABBC0F728EA1-11D1-00A0-C90629100000-",
        ] {
            assert!(
                matches!(Guid::parse(s), Err(Error::InvalidGuid(_))),
                "accepted {s:?}"
            );
        }
    }

    #[test]
    fn serde_uses_canonical_string() {
        let g = Guid::parse(TONGFANG).unwrap();
        let text = ron::to_string(&g).unwrap();
        assert_eq!(text, format!("\"{TONGFANG}\""));
        let back: Guid = ron::from_str(&text).unwrap();
        assert_eq!(back, g);
    }

    proptest! {
        #[test]
        fn bytes_round_trip(bytes in any::<[u8; 16]>()) {
            let g = Guid::from_bytes(bytes);
            let parsed = Guid::parse(&g.to_string()).unwrap();
            prop_assert_eq!(parsed.as_bytes(), &bytes);
        }

        #[test]
        fn canonical_strings_round_trip(s in "[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}") {
            prop_assert_eq!(Guid::parse(&s).unwrap().to_string(), s);
        }
    }
}
