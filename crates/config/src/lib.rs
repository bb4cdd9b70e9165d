//! Configuration for the WMI hotkey driver: schemes of hotkey rules, the action table, and
//! firmware images used for simulation.
#![allow(missing_docs)]

mod action;
mod error;
mod firmware;
mod loader;
mod rule;
mod scheme;

#[cfg(test)]
mod test_parse;

pub use action::{Action, ActionTable, Direction};
pub use error::{Error, excerpt_at};
pub use firmware::FirmwareImage;
pub use loader::{load_firmware_from_path, load_firmware_from_str, load_from_path, load_from_str};
pub use rule::HotkeyRule;
pub use scheme::{Config, DEFAULT_SERVICE_TIMEOUT, Scheme};
