//! Hotkey rules: `(guid, notify_id, event_data) -> action_id`.
use serde::{Deserialize, Serialize};
use wmi::Guid;

use crate::Error;

/// One validated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotkeyRule {
    /// Event block the rule listens on.
    pub guid: Guid,
    /// Notify id of that event block.
    pub notify_id: u8,
    /// Event data value that triggers the rule.
    pub event_data: i32,
    /// Entry in the action table to run.
    pub action_id: u8,
}

impl HotkeyRule {
    /// True when this rule fires for `notify_id` carrying `value`.
    pub fn matches(&self, notify_id: u8, value: i32) -> bool {
        self.notify_id == notify_id && self.event_data == value
    }
}

/// A rule as written in the file. Every field is optional here so that a missing field is
/// reported with the rule's position rather than as a bare RON shape error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawRule {
    guid: Option<String>,
    notify_id: Option<i64>,
    event_data: Option<i64>,
    action_id: Option<i64>,
}

impl RawRule {
    /// Validate into a [`HotkeyRule`]. `scheme` and `index` locate the rule in errors.
    pub(crate) fn validate(self, scheme: &str, index: usize) -> Result<HotkeyRule, Error> {
        let bad = |message: String| Error::MalformedRule {
            path: None,
            scheme: scheme.to_string(),
            index,
            message,
        };
        let missing = |field: &str| bad(format!("missing field `{field}`"));

        let guid = self.guid.ok_or_else(|| missing("guid"))?;
        let guid = Guid::parse(&guid).map_err(|e| bad(format!("field `guid`: {e}")))?;

        let notify_id = self.notify_id.ok_or_else(|| missing("notify_id"))?;
        let notify_id = u8::try_from(notify_id)
            .map_err(|_| bad(format!("field `notify_id`: {notify_id} is not in 0..=255")))?;

        let event_data = self.event_data.ok_or_else(|| missing("event_data"))?;
        let event_data = coerce_event_data(event_data).ok_or_else(|| {
            bad(format!(
                "field `event_data`: {event_data} does not fit in 32 bits"
            ))
        })?;

        let action_id = self.action_id.ok_or_else(|| missing("action_id"))?;
        let action_id = u8::try_from(action_id)
            .map_err(|_| bad(format!("field `action_id`: {action_id} is not in 0..=255")))?;

        Ok(HotkeyRule {
            guid,
            notify_id,
            event_data,
            action_id,
        })
    }
}

/// Accept any signed 32-bit value, and unsigned 32-bit values reinterpreted as signed, so that
/// firmware codes such as `0xFFFFFFFF` can be written as they appear in dumps.
fn coerce_event_data(raw: i64) -> Option<i32> {
    if let Ok(v) = i32::try_from(raw) {
        return Some(v);
    }
    u32::try_from(raw).ok().map(|v| v as i32)
}
