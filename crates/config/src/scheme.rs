//! Top-level configuration and per-platform hotkey schemes.
use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use wmi::Guid;

use crate::{Action, ActionTable, Error, HotkeyRule, rule::RawRule};

/// Default bound on waiting for a sibling input service.
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Hotkey rules for one platform family, selected by the presence of a GUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheme {
    /// The scheme applies when the directory carries this GUID.
    pub guid_match: Guid,
    /// Rules in evaluation order.
    pub rules: Vec<HotkeyRule>,
}

impl Scheme {
    /// Distinct rule GUIDs, in order of first appearance.
    pub fn guids(&self) -> Vec<Guid> {
        let mut out: Vec<Guid> = Vec::new();
        for r in &self.rules {
            if !out.contains(&r.guid) {
                out.push(r.guid);
            }
        }
        out
    }
}

/// Fully validated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Log every block at load time and enable every event block.
    pub debug: bool,
    /// Bound on waiting for a sibling input service.
    pub service_timeout: Duration,
    /// Default action table with any configured overrides applied.
    pub actions: ActionTable,
    /// Schemes keyed by name.
    pub schemes: BTreeMap<String, Scheme>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
            actions: ActionTable::default(),
            schemes: BTreeMap::new(),
        }
    }
}

impl Config {
    /// First scheme, in name order, whose `guid_match` satisfies `has_guid`.
    pub fn select_scheme(&self, has_guid: impl Fn(&Guid) -> bool) -> Option<(&str, &Scheme)> {
        self.schemes
            .iter()
            .find(|(_, s)| has_guid(&s.guid_match))
            .map(|(name, s)| (name.as_str(), s))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawScheme {
    guid_match: Option<String>,
    events: Vec<RawRule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawConfig {
    debug: bool,
    service_timeout_ms: Option<u64>,
    actions: BTreeMap<u8, Action>,
    schemes: BTreeMap<String, RawScheme>,
}

impl RawConfig {
    /// Validate every scheme and rule. The first problem aborts the whole load.
    pub(crate) fn validate(self) -> Result<Config, Error> {
        let mut schemes = BTreeMap::new();
        for (name, raw) in self.schemes {
            let guid_match = raw.guid_match.ok_or_else(|| {
                Error::validation(format!("scheme '{name}': missing field `guid_match`"))
            })?;
            let guid_match = Guid::parse(&guid_match).map_err(|e| {
                Error::validation(format!("scheme '{name}': field `guid_match`: {e}"))
            })?;
            let rules = raw
                .events
                .into_iter()
                .enumerate()
                .map(|(i, r)| r.validate(&name, i))
                .collect::<Result<Vec<_>, _>>()?;
            schemes.insert(name, Scheme { guid_match, rules });
        }
        let service_timeout = self
            .service_timeout_ms
            .map_or(DEFAULT_SERVICE_TIMEOUT, Duration::from_millis);
        Ok(Config {
            debug: self.debug,
            service_timeout,
            actions: ActionTable::default().with_overrides(self.actions),
            schemes,
        })
    }
}
