use std::sync::Arc;

use config::{Config, Scheme};
use tracing::{debug, info, warn};
use wmi::{Controller, Guid, Platform};

use crate::{ActionExecutor, Error, Result, RuleEngine};

/// Binds one hotkey scheme to the event blocks of one controller.
///
/// Construct with [`HotkeyDriver::probe`], then [`start`](Self::start) to register handlers and
/// [`stop`](Self::stop) to remove them again. The driver does not own the controller.
pub struct HotkeyDriver {
    /// Name of the selected scheme.
    scheme_name: String,
    /// The selected scheme.
    scheme: Scheme,
    /// Handler installed on every rule GUID.
    engine: RuleEngine,
    /// GUIDs whose handler is currently installed by this driver.
    registered: Vec<Guid>,
}

impl HotkeyDriver {
    /// Select the first scheme, in name order, whose `guid_match` is present in the directory.
    pub fn probe<P: Platform>(
        config: &Config,
        controller: &Controller<P>,
        executor: Arc<dyn ActionExecutor>,
    ) -> Result<Self> {
        let (name, scheme) = config
            .select_scheme(|g| controller.has_guid(g))
            .ok_or(Error::NoMatchingScheme)?;
        info!(scheme = name, rules = scheme.rules.len(), "hotkey scheme selected");
        Ok(Self {
            scheme_name: name.to_string(),
            scheme: scheme.clone(),
            engine: RuleEngine::new(scheme.rules.clone(), executor),
            registered: Vec::new(),
        })
    }

    /// Name of the selected scheme.
    pub fn scheme_name(&self) -> &str {
        &self.scheme_name
    }

    /// The selected scheme.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// The rule engine installed as handler.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// GUIDs currently registered by this driver.
    pub fn registered(&self) -> &[Guid] {
        &self.registered
    }

    /// Register the rule engine once per distinct rule GUID.
    ///
    /// Stops at the first failure. Handlers already installed, including one whose enable call
    /// failed, stay tracked so that [`stop`](Self::stop) removes them.
    pub fn start<P: Platform>(&mut self, controller: &mut Controller<P>) -> Result<()> {
        for guid in self.scheme.guids() {
            if self.registered.contains(&guid) {
                continue;
            }
            let res = controller.register(&guid, self.engine.clone());
            if controller.is_registered(&guid) {
                self.registered.push(guid);
            }
            res?;
            debug!(%guid, "hotkey handler registered");
        }
        info!(
            scheme = %self.scheme_name,
            guids = self.registered.len(),
            "hotkey driver started"
        );
        Ok(())
    }

    /// Unregister every GUID this driver registered. All are attempted; the first failure is
    /// returned.
    pub fn stop<P: Platform>(&mut self, controller: &mut Controller<P>) -> Result<()> {
        let mut first = None;
        for guid in self.registered.drain(..) {
            if let Err(e) = controller.unregister(&guid) {
                warn!(%guid, error = %e, "unregister failed");
                first.get_or_insert(e);
            }
        }
        info!(scheme = %self.scheme_name, "hotkey driver stopped");
        first.map_or(Ok(()), |e| Err(e.into()))
    }
}
