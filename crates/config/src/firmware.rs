//! Firmware images: a directory plus canned method replies, for simulation.
use std::collections::BTreeMap;

use serde::Deserialize;
use wmi::{Block, Directory, Flags, Guid, MethodName, ObjectId, Payload, TablePlatform, Value};

use crate::Error;

/// A simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    /// Directory records in table order.
    pub blocks: Vec<Block>,
    /// Fixed replies by method name.
    pub methods: Vec<(MethodName, Value)>,
    /// `_WED` replies by notify id.
    pub event_data: BTreeMap<u8, Value>,
}

impl FirmwareImage {
    /// The directory blob the image serves from `_WDG`.
    pub fn directory_blob(&self) -> Result<Vec<u8>, Error> {
        Directory::from_blocks(self.blocks.clone())
            .map(|d| d.to_blob())
            .map_err(|e| Error::validation(format!("firmware image: {e}")))
    }

    /// A table platform serving this image. Methods without a reply succeed with no result.
    pub fn into_platform(self) -> Result<TablePlatform, Error> {
        let mut p = TablePlatform::with_directory(self.directory_blob()?);
        p.accept_unknown(true);
        for (name, value) in self.methods {
            p.respond(name, value);
        }
        for (id, value) in self.event_data {
            p.event_data(id, value);
        }
        Ok(p)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBlock {
    guid: String,
    #[serde(default)]
    object_id: Option<String>,
    #[serde(default)]
    notify_id: Option<u8>,
    #[serde(default)]
    reserved: u8,
    #[serde(default = "one")]
    instances: u8,
    flags: u8,
}

fn one() -> u8 {
    1
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawFirmware {
    blocks: Vec<RawBlock>,
    methods: BTreeMap<String, Value>,
    event_data: BTreeMap<u8, Value>,
}

impl RawBlock {
    fn validate(self, index: usize) -> Result<Block, Error> {
        let bad = |m: String| Error::validation(format!("firmware block {index}: {m}"));
        let guid = Guid::parse(&self.guid).map_err(|e| bad(e.to_string()))?;
        let flags = Flags::from_bits_retain(self.flags);
        let payload = if flags.contains(Flags::EVENT) {
            if self.object_id.is_some() {
                return Err(bad("event block carries `object_id`".to_string()));
            }
            let notify_id = self
                .notify_id
                .ok_or_else(|| bad("event block needs `notify_id`".to_string()))?;
            Payload::Event {
                notify_id,
                reserved: self.reserved,
            }
        } else {
            if self.notify_id.is_some() {
                return Err(bad("non-event block carries `notify_id`".to_string()));
            }
            let id = self
                .object_id
                .ok_or_else(|| bad("non-event block needs `object_id`".to_string()))?;
            let raw: [u8; 2] = id
                .as_bytes()
                .try_into()
                .map_err(|_| bad(format!("object id {id:?} is not two bytes")))?;
            Payload::Object(ObjectId(raw))
        };
        Ok(Block {
            guid,
            payload,
            instance_count: self.instances,
            flags,
        })
    }
}

impl RawFirmware {
    pub(crate) fn validate(self) -> Result<FirmwareImage, Error> {
        let blocks = self
            .blocks
            .into_iter()
            .enumerate()
            .map(|(i, b)| b.validate(i))
            .collect::<Result<Vec<_>, _>>()?;
        if blocks.is_empty() {
            return Err(Error::validation("firmware image has no blocks"));
        }
        let methods = self
            .methods
            .into_iter()
            .map(|(name, value)| {
                let raw: [u8; 4] = name.as_bytes().try_into().map_err(|_| {
                    Error::validation(format!("method name {name:?} is not four bytes"))
                })?;
                Ok((MethodName::from_bytes(raw), value))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(FirmwareImage {
            blocks,
            methods,
            event_data: self.event_data,
        })
    }
}
