//! ACPI-WMI block directory access.
//!
//! A device exposes a `_WDG` directory of 20-byte block records. This crate decodes that
//! directory, derives the per-block firmware method names (`WExx`, `WCxx`, `WQxx`, `WSxx`,
//! `WMxx`), brackets queries on expensive blocks, and routes firmware notifications to the
//! handler registered on the matching event block.
//!
//! The firmware itself is reached through the [`Platform`] trait. [`TablePlatform`] is a
//! canned implementation used for simulation and tests.
#![warn(missing_docs)]

mod block;
mod controller;
mod directory;
mod error;
mod guid;
mod method;
pub mod platform;

pub use block::{Block, BlockId, BlockSummary, Flags, ObjectId, Payload, RECORD_SIZE};
pub use controller::{Binding, Controller, DispatchOutcome, EventHandler, Options};
pub use directory::Directory;
pub use error::{Error, Result};
pub use guid::{GUID_STR_LEN, Guid};
pub use method::{MethodName, Operation, method_name};
pub use platform::{Call, Platform, PlatformError, TablePlatform, Value};
