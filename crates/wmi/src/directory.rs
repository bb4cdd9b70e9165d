//! The block table decoded from a `_WDG` blob.
use crate::{Block, BlockId, Error, Guid, RECORD_SIZE, Result};

/// Ordered, immutable table of blocks.
///
/// Lookups scan the whole table and keep the **last** match, so when firmware lists a GUID
/// or notify id twice the later record shadows the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    blocks: Vec<Block>,
}

impl Directory {
    /// Decode a directory blob. The length must be a positive multiple of [`RECORD_SIZE`].
    pub fn parse(blob: &[u8]) -> Result<Self> {
        if blob.is_empty() {
            return Err(Error::MalformedDirectory("directory is empty".to_string()));
        }
        if blob.len() % RECORD_SIZE != 0 {
            return Err(Error::MalformedDirectory(format!(
                "length {} is not a multiple of {}",
                blob.len(),
                RECORD_SIZE
            )));
        }
        let blocks = blob
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| {
                let mut raw = [0u8; RECORD_SIZE];
                raw.copy_from_slice(chunk);
                Block::decode(&raw)
            })
            .collect();
        Ok(Self { blocks })
    }

    /// Build a directory from already decoded blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Error::MalformedDirectory("directory is empty".to_string()));
        }
        Ok(Self { blocks })
    }

    /// Encode back into blob form.
    pub fn to_blob(&self) -> Vec<u8> {
        self.blocks.iter().flat_map(|b| b.encode()).collect()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a parsed directory; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks with their handles, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId::new(i as u32), b))
    }

    /// Block for a handle returned by this directory.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// Last block carrying `guid`.
    pub fn find(&self, guid: &Guid) -> Option<(BlockId, &Block)> {
        self.iter().filter(|(_, b)| b.guid == *guid).last()
    }

    /// Last event block carrying `notify_id`.
    pub fn find_by_notify_id(&self, notify_id: u8) -> Option<(BlockId, &Block)> {
        self.iter()
            .filter(|(_, b)| b.notify_id() == Some(notify_id))
            .last()
    }
}
