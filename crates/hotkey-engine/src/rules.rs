//! Matching notifications against the rule table.
use std::sync::Arc;

use config::HotkeyRule;
use tracing::debug;
use wmi::{Block, EventHandler, Value};

use crate::ActionExecutor;

/// Event data as the rule table sees it: integers truncated to 32 bits, anything else zero.
pub fn coerce_event_data(data: Option<&Value>) -> i32 {
    match data {
        Some(Value::Integer(n)) => *n as u32 as i32,
        _ => 0,
    }
}

/// An ordered rule table bound to an executor. Installed as the handler on event blocks.
#[derive(Clone)]
pub struct RuleEngine {
    rules: Arc<[HotkeyRule]>,
    executor: Arc<dyn ActionExecutor>,
}

impl RuleEngine {
    /// Bind `rules`, kept in the given order, to `executor`.
    pub fn new(rules: Vec<HotkeyRule>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            rules: rules.into(),
            executor,
        }
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[HotkeyRule] {
        &self.rules
    }

    /// Action ids that fire for `notify_id` carrying `value`, in table order.
    pub fn matching(&self, notify_id: u8, value: i32) -> impl Iterator<Item = u8> + '_ {
        self.rules
            .iter()
            .filter(move |r| r.matches(notify_id, value))
            .map(|r| r.action_id)
    }

    /// Run every matching rule. Returns how many fired.
    pub fn handle(&self, notify_id: u8, data: Option<&Value>) -> usize {
        let value = coerce_event_data(data);
        debug!(
            notify_id = format_args!("{notify_id:#04x}"),
            value = format_args!("{value:#x}"),
            "hotkey event"
        );
        let mut fired = 0;
        for action_id in self.matching(notify_id, value) {
            self.executor.execute(action_id);
            fired += 1;
        }
        if fired == 0 {
            debug!(notify_id, value, "no rule matched");
        }
        fired
    }
}

impl EventHandler for RuleEngine {
    fn on_event(&self, block: &Block, data: Option<&Value>) {
        // Handlers are only installed on event blocks.
        if let Some(notify_id) = block.notify_id() {
            self.handle(notify_id, data);
        }
    }
}
