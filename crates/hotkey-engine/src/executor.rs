//! Turning action ids into effects.
use std::{sync::Arc, time::Duration};

use config::{Action, ActionTable, DEFAULT_SERVICE_TIMEOUT, Direction};
use tracing::{debug, info, warn};
use wmi_protocol::{DaemonMessage, MessageType};

use crate::{
    DaemonSink, Error, Result,
    services::{
        HID_PAGE_KEYBOARD, HID_USAGE_F14, HID_USAGE_F15, Reply, ServiceLocator, ServiceMatch,
        ServiceMessage,
    },
};

/// Runs the action bound to an id.
pub trait ActionExecutor {
    /// Perform action `action_id`. Failures are the executor's to log; nothing propagates.
    fn execute(&self, action_id: u8);
}

impl<E: ActionExecutor + ?Sized> ActionExecutor for Arc<E> {
    fn execute(&self, action_id: u8) {
        (**self).execute(action_id)
    }
}

/// System power requests.
pub trait PowerControl {
    /// Ask the system to sleep.
    fn request_sleep(&self) -> Result<()>;
}

impl<F> PowerControl for F
where
    F: Fn() -> Result<()>,
{
    fn request_sleep(&self) -> Result<()> {
        self()
    }
}

/// Power control that only logs the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyPower;

impl PowerControl for LogOnlyPower {
    fn request_sleep(&self) -> Result<()> {
        info!("sleep requested");
        Ok(())
    }
}

/// Executor backed by an [`ActionTable`], a daemon sink, a service locator and power control.
pub struct SystemExecutor {
    actions: ActionTable,
    daemon: Box<dyn DaemonSink>,
    services: Box<dyn ServiceLocator>,
    power: Box<dyn PowerControl>,
    service_timeout: Duration,
}

impl SystemExecutor {
    /// Build an executor resolving ids against `actions`. Service lookups wait
    /// [`DEFAULT_SERVICE_TIMEOUT`] until [`with_service_timeout`](Self::with_service_timeout) says otherwise.
    pub fn new(
        actions: ActionTable,
        daemon: impl DaemonSink + 'static,
        services: impl ServiceLocator + 'static,
        power: impl PowerControl + 'static,
    ) -> Self {
        Self {
            actions,
            daemon: Box::new(daemon),
            services: Box::new(services),
            power: Box::new(power),
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
        }
    }

    /// Bound service lookups by `timeout` instead of the default.
    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout = timeout;
        self
    }

    /// The table ids are resolved against.
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Perform `action` directly.
    pub fn perform(&self, action: Action) -> Result<()> {
        match action {
            Action::SendDaemonMessage(kind, arg1, arg2) => {
                self.daemon.post(DaemonMessage::new(kind, arg1, arg2))
            }
            Action::ToggleWifi => self.notify(MessageType::ToggleWifi),
            Action::LockScreen => self.notify(MessageType::LockScreen),
            Action::SwitchDisplay => self.notify(MessageType::SwitchDisplay),
            Action::ToggleAirplaneMode => self.notify(MessageType::ToggleAirplaneMode),
            Action::AdjustKeyboardBacklight(Direction::Down) => {
                self.notify(MessageType::KeyboardBacklightDown)
            }
            Action::AdjustKeyboardBacklight(Direction::Up) => {
                self.notify(MessageType::KeyboardBacklightUp)
            }
            Action::ToggleTouchpad => self.toggle_touchpad(),
            Action::AdjustBrightness(dir) => self.adjust_brightness(dir),
            Action::Sleep => self.power.request_sleep(),
        }
    }

    fn notify(&self, kind: MessageType) -> Result<()> {
        self.daemon.post(DaemonMessage::of(kind))
    }

    /// Enable or disable the touchpad. A missing touchpad service is logged, not an error.
    pub fn set_touchpad(&self, enabled: bool) -> Result<()> {
        let Some(svc) = self
            .services
            .wait_for(ServiceMatch::TOUCHPAD, self.service_timeout)
        else {
            warn!(matching = %ServiceMatch::TOUCHPAD, "touchpad service not found");
            return Ok(());
        };
        debug!(enabled, "set touchpad");
        svc.message(ServiceMessage::SetTouchStatus(enabled))
            .map(drop)
    }

    fn toggle_touchpad(&self) -> Result<()> {
        let Some(svc) = self
            .services
            .wait_for(ServiceMatch::TOUCHPAD, self.service_timeout)
        else {
            warn!(matching = %ServiceMatch::TOUCHPAD, "touchpad service not found");
            return Ok(());
        };
        let enabled = match svc.message(ServiceMessage::GetTouchStatus)? {
            Reply::TouchStatus(on) => on,
            other => {
                return Err(Error::Service(format!(
                    "unexpected touch status reply {other:?}"
                )));
            }
        };
        debug!(from = enabled, to = !enabled, "toggle touchpad");
        svc.message(ServiceMessage::SetTouchStatus(!enabled))
            .map(drop)
    }

    fn adjust_brightness(&self, dir: Direction) -> Result<()> {
        let Some(svc) = self
            .services
            .wait_for(ServiceMatch::HID_EVENT, self.service_timeout)
        else {
            warn!(matching = %ServiceMatch::HID_EVENT, "HID event service not found");
            return Ok(());
        };
        let usage = match dir {
            Direction::Down => HID_USAGE_F14,
            Direction::Up => HID_USAGE_F15,
        };
        for pressed in [true, false] {
            svc.message(ServiceMessage::KeyboardEvent {
                usage_page: HID_PAGE_KEYBOARD,
                usage,
                pressed,
            })?;
        }
        Ok(())
    }
}

impl ActionExecutor for SystemExecutor {
    fn execute(&self, action_id: u8) {
        let Some(action) = self.actions.get(action_id).copied() else {
            warn!(action_id, "no action bound to id");
            return;
        };
        info!(action_id, ?action, "execute");
        if let Err(e) = self.perform(action) {
            warn!(action_id, ?action, error = %e, "action failed");
        }
    }
}
