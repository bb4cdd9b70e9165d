//! `simulate`: run a hotkey scheme against a firmware image.
use std::{sync::Arc, time::Duration};

use config::{Config, FirmwareImage};
use hotkey_engine::{
    ChannelSink, HotkeyDriver, LogOnlyPower, ServiceMatch, ServiceMessage, SystemExecutor,
    services::{MockHidEvents, MockServices, MockTouchpad},
};
use serde::Serialize;
use tracing::{debug, info};
use wmi::{Controller, DispatchOutcome, Options};
use wmi_protocol::DaemonMessage;

use crate::{
    cli::SimulateArgs,
    error::{Error, Result},
};

/// What one notification produced.
#[derive(Debug, Serialize)]
pub struct Delivery {
    /// Notify id delivered.
    pub notify_id: u8,
    /// Dispatch outcome.
    pub outcome: String,
    /// Messages posted to the daemon while handling it.
    pub messages: Vec<DaemonMessage>,
    /// Service lookups made while handling it, as `match within timeout`.
    pub lookups: Vec<String>,
    /// Messages the touchpad and HID event services received, in that order.
    pub service_messages: Vec<String>,
}

/// Result of a whole simulation run.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Scheme selected for the image.
    pub scheme: String,
    /// One entry per delivered notification.
    pub deliveries: Vec<Delivery>,
    /// Firmware method calls, in order, rendered as `NAME(args)`.
    pub calls: Vec<String>,
}

/// Parse a notify id written in decimal or `0x`-prefixed hex.
pub fn parse_notify_id(s: &str) -> Result<u8> {
    let t = s.trim();
    let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => t.parse(),
    };
    parsed.map_err(|_| Error::NotifyId(s.to_string()))
}

fn describe(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Delivered(id) => format!("delivered {id}"),
        DispatchOutcome::UnknownEvent => "unknown event".to_string(),
        DispatchOutcome::Unregistered(id) => format!("unregistered {id}"),
    }
}

fn render_lookup((matching, timeout): &(ServiceMatch, Duration)) -> String {
    format!("{matching} within {}", humantime::format_duration(*timeout))
}

fn render_message(msg: &ServiceMessage) -> String {
    match msg {
        ServiceMessage::SetTouchStatus(on) => format!("touchpad set {on}"),
        ServiceMessage::GetTouchStatus => "touchpad get".to_string(),
        ServiceMessage::KeyboardEvent {
            usage_page,
            usage,
            pressed,
        } => format!(
            "key {usage_page:#04x}:{usage:#04x} {}",
            if *pressed { "down" } else { "up" }
        ),
    }
}

/// Attach `cfg` to a device built from `image`, deliver `notify_ids`, and detach.
///
/// The device has an enabled touchpad and a HID event service, so touchpad and
/// brightness actions show up as lookups bounded by `service_timeout`.
pub fn simulate(
    image: FirmwareImage,
    cfg: &Config,
    notify_ids: &[u8],
    service_timeout: Duration,
) -> Result<Report> {
    let platform = image.into_platform()?;
    let mut controller = Controller::load_with(platform, Options { debug: cfg.debug })?;

    let (sink, rx) = ChannelSink::new();
    let touchpad = Arc::new(MockTouchpad::new(true));
    let hid = Arc::new(MockHidEvents::new());
    let services = Arc::new(
        MockServices::new()
            .with(ServiceMatch::TOUCHPAD, touchpad.clone())
            .with(ServiceMatch::HID_EVENT, hid.clone()),
    );
    let executor = SystemExecutor::new(cfg.actions.clone(), sink, services.clone(), LogOnlyPower)
        .with_service_timeout(service_timeout);
    let mut driver = HotkeyDriver::probe(cfg, &controller, Arc::new(executor))?;
    driver.start(&mut controller)?;

    let mut deliveries = Vec::with_capacity(notify_ids.len());
    for &notify_id in notify_ids {
        let seen = (
            services.lookups().len(),
            touchpad.messages().len(),
            hid.messages().len(),
        );
        let outcome = controller.dispatch(notify_id);
        let messages = rx
            .try_iter()
            .map(|ev| ev.message())
            .collect::<hotkey_engine::Result<Vec<_>>>()?;
        let lookups = services.lookups()[seen.0..]
            .iter()
            .map(render_lookup)
            .collect();
        let service_messages = touchpad.messages()[seen.1..]
            .iter()
            .chain(&hid.messages()[seen.2..])
            .map(render_message)
            .collect();
        debug!(notify_id, outcome = ?outcome, posted = messages.len(), "simulated");
        deliveries.push(Delivery {
            notify_id,
            outcome: describe(outcome),
            messages,
            lookups,
            service_messages,
        });
    }

    driver.stop(&mut controller)?;
    info!(scheme = driver.scheme_name(), events = deliveries.len(), "simulation complete");
    Ok(Report {
        scheme: driver.scheme_name().to_string(),
        deliveries,
        calls: controller
            .platform()
            .calls()
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

/// Run the `simulate` subcommand.
pub fn run(args: &SimulateArgs) -> Result<()> {
    let ids = args
        .notify_ids
        .iter()
        .map(|s| parse_notify_id(s))
        .collect::<Result<Vec<_>>>()?;
    let image = config::load_firmware_from_path(&args.firmware)?;
    let cfg = config::load_from_path(&args.config)?;
    let timeout = args.service_timeout.unwrap_or(cfg.service_timeout);
    let mut report = simulate(image, &cfg, &ids, timeout)?;
    if !args.calls {
        report.calls.clear();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
