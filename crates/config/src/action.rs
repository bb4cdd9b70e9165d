//! The action table: what each rule's `action_id` does.
use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

/// Direction for stepped adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Increase.
    Up,
    /// Decrease.
    Down,
}

/// Closed set of things a hotkey can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Post a raw daemon message `(type, arg1, arg2)`.
    SendDaemonMessage(i32, i32, i32),
    /// Flip the touchpad between enabled and disabled.
    ToggleTouchpad,
    /// Step display brightness.
    AdjustBrightness(Direction),
    /// Step keyboard backlight.
    AdjustKeyboardBacklight(Direction),
    /// Toggle Wi-Fi.
    ToggleWifi,
    /// Lock the screen.
    LockScreen,
    /// Cycle display output.
    SwitchDisplay,
    /// Toggle airplane mode.
    ToggleAirplaneMode,
    /// Put the machine to sleep.
    Sleep,
}

/// Mapping from action id to action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionTable(BTreeMap<u8, Action>);

impl Default for ActionTable {
    fn default() -> Self {
        use Action::*;
        use Direction::*;
        Self(BTreeMap::from([
            (0, Sleep),
            (1, LockScreen),
            (2, SwitchDisplay),
            (3, ToggleAirplaneMode),
            (4, ToggleTouchpad),
            (5, AdjustKeyboardBacklight(Down)),
            (6, AdjustKeyboardBacklight(Up)),
            (7, AdjustBrightness(Down)),
            (8, AdjustBrightness(Up)),
            (9, ToggleWifi),
        ]))
    }
}

impl ActionTable {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Action bound to `id`.
    pub fn get(&self, id: u8) -> Option<&Action> {
        self.0.get(&id)
    }

    /// Bind `id` to `action`, returning the previous binding.
    pub fn insert(&mut self, id: u8, action: Action) -> Option<Action> {
        self.0.insert(id, action)
    }

    /// Apply `overrides` on top of this table.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (u8, Action)>) -> Self {
        self.0.extend(overrides);
        self
    }

    /// Entries in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, u8, Action> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
