//! Hotkey Engine
//!
//! Turns firmware hotkey notifications into actions:
//! - [`RuleEngine`] matches `(notify id, event data)` against an ordered rule table and fires
//!   every match
//! - [`SystemExecutor`] resolves action ids through the action table and performs them via a
//!   [`DaemonSink`], a [`ServiceLocator`] and [`PowerControl`]
//! - [`HotkeyDriver`] selects a scheme for a device and installs the rule engine on its event
//!   blocks
//!
//! Everything runs synchronously on the caller's thread. The only wait is the bounded
//! service lookup performed by touchpad and brightness actions.

mod daemon;
mod driver;
mod error;
mod executor;
mod rules;
pub mod services;

pub use daemon::{ChannelSink, DaemonEvent, DaemonSink};
pub use driver::HotkeyDriver;
pub use error::{Error, Result};
pub use executor::{ActionExecutor, LogOnlyPower, PowerControl, SystemExecutor};
pub use rules::{RuleEngine, coerce_event_data};
pub use services::{Reply, Service, ServiceLocator, ServiceMatch, ServiceMessage};
