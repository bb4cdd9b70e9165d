//! Block registry, event dispatch and data-block access over a loaded directory.
use std::collections::HashMap;

use tracing::{debug, info, trace, warn};

use crate::{
    Block, BlockId, BlockSummary, Directory, Error, Guid, MethodName, Operation, Result,
    method::method_name,
    platform::{MAX_ARGS, Platform, Value},
};

/// Receiver for notifications on one event block.
pub trait EventHandler {
    /// Called with the block that fired and the data fetched for it, if the fetch succeeded.
    fn on_event(&self, block: &Block, data: Option<&Value>);
}

impl<F> EventHandler for F
where
    F: Fn(&Block, Option<&Value>),
{
    fn on_event(&self, block: &Block, data: Option<&Value>) {
        self(block, data)
    }
}

/// A target object paired with a plain function, invoked as `action(target, block, data)`.
pub struct Binding<T> {
    /// Object the action operates on.
    target: T,
    /// Function receiving the target, the block and the event data.
    action: fn(&T, &Block, Option<&Value>),
}

impl<T> Binding<T> {
    /// Pair `target` with `action`.
    pub fn new(target: T, action: fn(&T, &Block, Option<&Value>)) -> Self {
        Self { target, action }
    }
}

impl<T> EventHandler for Binding<T> {
    fn on_event(&self, block: &Block, data: Option<&Value>) {
        (self.action)(&self.target, block, data)
    }
}

/// What happened to a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler was invoked for the block.
    Delivered(BlockId),
    /// No event block carries the notify id.
    UnknownEvent,
    /// The block exists but nothing is registered on it.
    Unregistered(BlockId),
}

/// Controller construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Log every block at load time and enable every event block immediately.
    pub debug: bool,
}

/// Owns the block directory of one device and routes its notifications.
///
/// Handler registration takes `&mut self` and dispatch takes `&self`, so callers cannot
/// interleave the two without their own synchronisation.
pub struct Controller<P> {
    /// Method-call interface of the device.
    platform: P,
    /// Table decoded at load time.
    directory: Directory,
    /// Installed handlers, keyed by block handle.
    handlers: HashMap<BlockId, Box<dyn EventHandler>>,
}

impl<P: Platform> Controller<P> {
    /// Enumerate the directory through `platform` and build a controller with default options.
    pub fn load(platform: P) -> Result<Self> {
        Self::load_with(platform, Options::default())
    }

    /// Enumerate the directory through `platform`.
    ///
    /// Any failure here leaves nothing behind: the controller is only returned fully built.
    pub fn load_with(platform: P, options: Options) -> Result<Self> {
        let result = platform
            .evaluate(MethodName::DIRECTORY, &[])
            .map_err(|source| Error::Platform {
                method: MethodName::DIRECTORY,
                source,
            })?;
        let blob = result.as_ref().and_then(Value::as_buffer).ok_or_else(|| {
            Error::MalformedDirectory("directory method did not return a buffer".to_string())
        })?;
        debug!(len = blob.len(), "directory blob");
        let directory = Directory::parse(blob)?;
        let controller = Self::from_directory(platform, directory);
        info!(blocks = controller.directory.len(), "wmi directory loaded");

        if options.debug {
            controller.enable_all_events();
        }
        Ok(controller)
    }

    /// Wrap an already decoded directory.
    pub fn from_directory(platform: P, directory: Directory) -> Self {
        Self {
            platform,
            directory,
            handlers: HashMap::new(),
        }
    }

    /// Log every block and switch on every event block.
    fn enable_all_events(&self) {
        for (id, block) in self.directory.iter() {
            debug!(block = %id, summary = ?BlockSummary::from(block), "wmi block");
        }
        for (_, block) in self.directory.iter() {
            if block.notify_id().is_none() {
                continue;
            }
            match self.set_event_enable(&block.guid, true) {
                Ok(()) => debug!(guid = %block.guid, "debug: event enabled"),
                Err(e) => warn!(guid = %block.guid, error = %e, "debug: event enable failed"),
            }
        }
    }

    /// The platform this controller calls into.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The decoded directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// True when some block carries `guid`.
    pub fn has_guid(&self, guid: &Guid) -> bool {
        self.directory.find(guid).is_some()
    }

    /// Last block carrying `guid`.
    pub fn find_block(&self, guid: &Guid) -> Result<&Block> {
        self.lookup(guid).map(|(_, b)| b)
    }

    fn lookup(&self, guid: &Guid) -> Result<(BlockId, &Block)> {
        self.directory.find(guid).ok_or_else(|| {
            debug!(%guid, "block not found");
            Error::NotFound(*guid)
        })
    }

    /// Resolve the block for `guid` and the method implementing `op` on it.
    fn resolve(&self, guid: &Guid, op: Operation) -> Result<(BlockId, &Block, MethodName)> {
        let (id, block) = self.lookup(guid)?;
        let name = method_name(block, op)?;
        Ok((id, block, name))
    }

    fn call(&self, method: MethodName, args: &[Value]) -> Result<Option<Value>> {
        debug_assert!(args.len() <= MAX_ARGS);
        trace!(%method, args = args.len(), "call");
        self.platform
            .evaluate(method, args)
            .map_err(|source| Error::Platform { method, source })
    }

    /// Turn event delivery for an event block on or off (`WExx`).
    pub fn set_event_enable(&self, guid: &Guid, enabled: bool) -> Result<()> {
        let (_, _, name) = self.resolve(guid, Operation::EventEnable)?;
        self.call(name, &[Value::from(enabled)]).map(drop)
    }

    /// Turn data collection for a data block on or off (`WCxx`).
    pub fn set_block_enable(&self, guid: &Guid, enabled: bool) -> Result<()> {
        let (_, _, name) = self.resolve(guid, Operation::DataCollection)?;
        self.call(name, &[Value::from(enabled)]).map(drop)
    }

    /// Install `handler` on the event block for `guid` and enable the event.
    ///
    /// An existing handler on the same block is replaced. The handler stays installed even
    /// if the enable call then fails; that failure is returned.
    pub fn register(&mut self, guid: &Guid, handler: impl EventHandler + 'static) -> Result<()> {
        let (id, block, _) = self.resolve(guid, Operation::EventEnable)?;
        if self.handlers.contains_key(&id) {
            debug!(%guid, "replacing handler");
        }
        debug!(%guid, notify_id = ?block.notify_id(), "register");
        self.handlers.insert(id, Box::new(handler));
        self.set_event_enable(guid, true)
    }

    /// Remove the handler for `guid` and disable the event.
    pub fn unregister(&mut self, guid: &Guid) -> Result<()> {
        let (id, _, _) = self.resolve(guid, Operation::EventEnable)?;
        self.handlers.remove(&id);
        debug!(%guid, "unregister");
        self.set_event_enable(guid, false)
    }

    /// True when a handler is installed on the block resolved for `guid`.
    pub fn is_registered(&self, guid: &Guid) -> bool {
        self.directory
            .find(guid)
            .is_some_and(|(id, _)| self.handlers.contains_key(&id))
    }

    /// Read instance `instance` of a data block (`WQxx`).
    ///
    /// Expensive blocks are bracketed by `WCxx(1)` / `WCxx(0)`. A failing enable aborts the
    /// query; once enabled, the disable is always attempted and its failure only logged.
    pub fn query(&self, guid: &Guid, instance: u8) -> Result<Option<Value>> {
        let (_, block, name) = self.resolve(guid, Operation::Query)?;
        let expensive = block.is_expensive();
        if expensive {
            self.set_block_enable(guid, true)?;
        }
        let result = self.call(name, &[Value::from(instance)]);
        if expensive && let Err(e) = self.set_block_enable(guid, false) {
            warn!(%guid, error = %e, "failed to disable data collection");
        }
        result
    }

    /// Write instance `instance` of a data block (`WSxx`).
    pub fn set(&self, guid: &Guid, instance: u8, payload: Value) -> Result<()> {
        let (_, _, name) = self.resolve(guid, Operation::Set)?;
        self.call(name, &[Value::from(instance), payload]).map(drop)
    }

    /// Evaluate method `method_id` of a method block (`WMxx`).
    pub fn invoke(
        &self,
        guid: &Guid,
        instance: u8,
        method_id: u32,
        payload: Value,
    ) -> Result<Option<Value>> {
        let (_, _, name) = self.resolve(guid, Operation::Invoke)?;
        self.call(
            name,
            &[Value::from(instance), Value::from(method_id), payload],
        )
    }

    /// Fetch the data attached to a notification (`_WED`).
    pub fn event_data(&self, notify_id: u8) -> Result<Option<Value>> {
        self.call(MethodName::EVENT_DATA, &[Value::from(notify_id)])
    }

    /// Route one firmware notification to the handler registered for its block.
    ///
    /// Never fails: a data fetch error is logged and the handler receives no data, and
    /// notifications for unknown or unregistered blocks are dropped.
    pub fn dispatch(&self, notify_id: u8) -> DispatchOutcome {
        let data = match self.event_data(notify_id) {
            Ok(data) => data,
            Err(e) => {
                warn!(notify_id, error = %e, "failed to fetch event data");
                None
            }
        };
        debug!(notify_id = format_args!("{notify_id:#04x}"), data = ?data, "event");

        let Some((id, block)) = self.directory.find_by_notify_id(notify_id) else {
            debug!(notify_id, "unknown event, no matching block");
            return DispatchOutcome::UnknownEvent;
        };
        let Some(handler) = self.handlers.get(&id) else {
            debug!(notify_id, guid = %block.guid, "unknown event, not registered");
            return DispatchOutcome::Unregistered(id);
        };
        handler.on_event(block, data.as_ref());
        DispatchOutcome::Delivered(id)
    }
}
