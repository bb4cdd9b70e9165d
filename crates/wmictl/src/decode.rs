//! `decode`: print the blocks of a directory blob.
use std::fs;

use serde::Serialize;
use wmi::{BlockSummary, Directory, Operation, method_name};

use crate::{
    cli::DecodeArgs,
    error::{Error, Result},
};

/// One decoded record, with the firmware methods it exposes.
#[derive(Debug, Serialize)]
pub struct DecodedBlock {
    /// Position in the table.
    pub index: usize,
    /// Decoded fields.
    #[serde(flatten)]
    pub block: BlockSummary,
    /// Names of the methods the block's flags permit.
    pub methods: Vec<String>,
}

/// Decode `blob` into printable records.
pub fn decode(blob: &[u8]) -> Result<Vec<DecodedBlock>> {
    let dir = Directory::parse(blob)?;
    Ok(dir
        .iter()
        .enumerate()
        .map(|(index, (_, block))| DecodedBlock {
            index,
            block: BlockSummary::from(block),
            methods: Operation::ALL
                .into_iter()
                .filter_map(|op| method_name(block, op).ok())
                .map(|m| m.to_string())
                .collect(),
        })
        .collect())
}

/// Parse hex text into bytes, ignoring whitespace.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(Error::Hex(format!("odd number of digits ({})", digits.len())));
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let s = String::from_utf8_lossy(pair);
            u8::from_str_radix(&s, 16).map_err(|_| Error::Hex(format!("bad byte {s:?}")))
        })
        .collect()
}

/// Run the `decode` subcommand.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let blob = if args.hex {
        parse_hex(&fs::read_to_string(&args.path)?)?
    } else {
        fs::read(&args.path)?
    };
    let blocks = decode(&blob)?;
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
