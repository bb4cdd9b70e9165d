//! Sibling input services reached by the executor.
//!
//! Locating a service may block for up to the configured timeout; every other call is
//! immediate. A missing service is not an error at this layer, callers log and move on.
use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{Error, Result};

/// HID usage page of keyboard keys.
pub const HID_PAGE_KEYBOARD: u16 = 0x07;
/// HID usage of F14, mapped to brightness down.
pub const HID_USAGE_F14: u16 = 0x69;
/// HID usage of F15, mapped to brightness up.
pub const HID_USAGE_F15: u16 = 0x6A;

/// How to find a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMatch {
    /// Services publishing boolean property `key` equal to `value`.
    Property {
        /// Property name.
        key: &'static str,
        /// Required value.
        value: bool,
    },
    /// Services of class `name`.
    Class(&'static str),
}

impl ServiceMatch {
    /// The touchpad driver.
    pub const TOUCHPAD: Self = Self::Property {
        key: "RM,deliverNotifications",
        value: true,
    };
    /// The HID event service that accepts synthesized keys.
    pub const HID_EVENT: Self = Self::Class("IOHIDEventService");
}

impl fmt::Display for ServiceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property { key, value } => write!(f, "{key}={value}"),
            Self::Class(name) => f.write_str(name),
        }
    }
}

/// Messages a service may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMessage {
    /// Enable or disable the touchpad.
    SetTouchStatus(bool),
    /// Ask whether the touchpad is enabled.
    GetTouchStatus,
    /// Synthesize one key transition.
    KeyboardEvent {
        /// HID usage page.
        usage_page: u16,
        /// HID usage within the page.
        usage: u16,
        /// Press (true) or release (false).
        pressed: bool,
    },
}

/// Reply to a [`ServiceMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Accepted, nothing to report.
    Done,
    /// Current touchpad state.
    TouchStatus(bool),
}

/// A located service.
pub trait Service {
    /// Deliver `msg` to the service.
    fn message(&self, msg: ServiceMessage) -> Result<Reply>;
}

/// Finds services by match criteria.
pub trait ServiceLocator {
    /// Wait up to `timeout` for a service matching `matching`.
    fn wait_for(&self, matching: ServiceMatch, timeout: Duration) -> Option<Arc<dyn Service>>;
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Arc<L> {
    fn wait_for(&self, matching: ServiceMatch, timeout: Duration) -> Option<Arc<dyn Service>> {
        (**self).wait_for(matching, timeout)
    }
}

/// A locator that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoServices;

impl ServiceLocator for NoServices {
    fn wait_for(&self, _matching: ServiceMatch, _timeout: Duration) -> Option<Arc<dyn Service>> {
        None
    }
}

/// In-memory touchpad that records what it receives.
#[derive(Debug)]
pub struct MockTouchpad {
    enabled: Mutex<bool>,
    log: Mutex<Vec<ServiceMessage>>,
}

impl MockTouchpad {
    /// A touchpad starting in state `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Mutex::new(enabled),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Current state.
    pub fn enabled(&self) -> bool {
        *self.enabled.lock()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<ServiceMessage> {
        self.log.lock().clone()
    }
}

impl Service for MockTouchpad {
    fn message(&self, msg: ServiceMessage) -> Result<Reply> {
        self.log.lock().push(msg);
        match msg {
            ServiceMessage::SetTouchStatus(on) => {
                *self.enabled.lock() = on;
                Ok(Reply::Done)
            }
            ServiceMessage::GetTouchStatus => Ok(Reply::TouchStatus(self.enabled())),
            ServiceMessage::KeyboardEvent { .. } => {
                Err(Error::Service("touchpad does not take keys".to_string()))
            }
        }
    }
}

/// In-memory HID event service that records synthesized keys.
#[derive(Debug, Default)]
pub struct MockHidEvents {
    log: Mutex<Vec<ServiceMessage>>,
}

impl MockHidEvents {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<ServiceMessage> {
        self.log.lock().clone()
    }
}

impl Service for MockHidEvents {
    fn message(&self, msg: ServiceMessage) -> Result<Reply> {
        self.log.lock().push(msg);
        Ok(Reply::Done)
    }
}

/// A locator over a fixed list of services; records every lookup.
#[derive(Default)]
pub struct MockServices {
    services: Vec<(ServiceMatch, Arc<dyn Service>)>,
    lookups: Mutex<Vec<(ServiceMatch, Duration)>>,
}

impl MockServices {
    /// Create an empty locator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `service` discoverable under `matching`.
    pub fn with(mut self, matching: ServiceMatch, service: Arc<dyn Service>) -> Self {
        self.services.push((matching, service));
        self
    }

    /// Lookups made so far, with the timeout each was given.
    pub fn lookups(&self) -> Vec<(ServiceMatch, Duration)> {
        self.lookups.lock().clone()
    }
}

impl ServiceLocator for MockServices {
    fn wait_for(&self, matching: ServiceMatch, timeout: Duration) -> Option<Arc<dyn Service>> {
        self.lookups.lock().push((matching, timeout));
        self.services
            .iter()
            .find(|(m, _)| *m == matching)
            .map(|(_, s)| s.clone())
    }
}
