use std::{sync::Arc, time::Duration};

use config::{Action, ActionTable, Config, Direction, HotkeyRule, Scheme};
use hotkey_engine::{
    ActionExecutor, ChannelSink, DaemonEvent, Error, HotkeyDriver, LogOnlyPower,
    Result as EngineResult, ServiceMatch, ServiceMessage, SystemExecutor,
    services::{MockHidEvents, MockServices, MockTouchpad, NoServices},
};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use wmi::{
    Block, Controller, DispatchOutcome, Directory, Flags, Guid, MethodName, ObjectId, Payload,
    PlatformError, TablePlatform, Value,
};
use wmi_protocol::{DaemonMessage, MessageType};

const TONGFANG: &str = "ABBC0F72-8EA1-11D1-00A0-C90629100000";

/// Executor that only records which ids it was asked to run.
#[derive(Default)]
struct Recorder(Mutex<Vec<u8>>);

impl ActionExecutor for Recorder {
    fn execute(&self, action_id: u8) {
        self.0.lock().push(action_id);
    }
}

fn guid(s: &str) -> Guid {
    Guid::parse(s).unwrap()
}

fn event_block(g: &str, notify_id: u8) -> Block {
    Block {
        guid: guid(g),
        payload: Payload::Event {
            notify_id,
            reserved: 0,
        },
        instance_count: 1,
        flags: Flags::EVENT,
    }
}

fn data_block(g: &str, id: &[u8; 2]) -> Block {
    Block {
        guid: guid(g),
        payload: Payload::Object(ObjectId(*id)),
        instance_count: 1,
        flags: Flags::EXPENSIVE,
    }
}

fn platform(blocks: Vec<Block>) -> TablePlatform {
    let blob = Directory::from_blocks(blocks).unwrap().to_blob();
    let mut p = TablePlatform::with_directory(blob);
    p.accept_unknown(true);
    p
}

fn rule(g: &str, notify_id: u8, event_data: i32, action_id: u8) -> HotkeyRule {
    HotkeyRule {
        guid: guid(g),
        notify_id,
        event_data,
        action_id,
    }
}

fn config_with(name: &str, guid_match: &str, rules: Vec<HotkeyRule>) -> Config {
    let mut cfg = Config::default();
    cfg.schemes.insert(
        name.to_string(),
        Scheme {
            guid_match: guid(guid_match),
            rules,
        },
    );
    cfg
}

fn messages(rx: &Receiver<DaemonEvent>) -> Vec<DaemonMessage> {
    rx.try_iter().map(|ev| ev.message().unwrap()).collect()
}

#[test]
fn tongfang_wifi_and_lock_fire_in_order() {
    let mut p = platform(vec![event_block(TONGFANG, 0x1A)]);
    p.event_data(0x1A, Value::Integer(1));
    let mut controller = Controller::load(p).unwrap();

    let cfg = config_with(
        "tongfang",
        TONGFANG,
        vec![rule(TONGFANG, 0x1A, 1, 9), rule(TONGFANG, 0x1A, 1, 1)],
    );
    let (sink, rx) = ChannelSink::new();
    let executor = SystemExecutor::new(cfg.actions.clone(), sink, NoServices, LogOnlyPower);
    let mut driver = HotkeyDriver::probe(&cfg, &controller, Arc::new(executor)).unwrap();
    assert_eq!(driver.scheme_name(), "tongfang");
    driver.start(&mut controller).unwrap();
    // One registration for the shared GUID.
    assert_eq!(driver.registered(), &[guid(TONGFANG)]);
    let enables: Vec<_> = controller
        .platform()
        .calls()
        .into_iter()
        .filter(|c| c.method == "WE1A")
        .collect();
    assert_eq!(enables.len(), 1);
    assert_eq!(enables[0].args, vec![Value::Integer(1)]);

    let outcome = controller.dispatch(0x1A);
    assert!(matches!(outcome, DispatchOutcome::Delivered(_)));
    assert_eq!(
        messages(&rx),
        vec![
            DaemonMessage::of(MessageType::ToggleWifi),
            DaemonMessage::of(MessageType::LockScreen),
        ]
    );

    // Unknown notification: dropped, nothing executed.
    assert_eq!(controller.dispatch(0x99), DispatchOutcome::UnknownEvent);
    assert!(messages(&rx).is_empty());

    driver.stop(&mut controller).unwrap();
    assert!(!controller.is_registered(&guid(TONGFANG)));
    let last = controller.platform().calls().pop().unwrap();
    assert_eq!(last.method, MethodName::from_bytes(*b"WE1A"));
    assert_eq!(last.args, vec![Value::Integer(0)]);
}

#[test]
fn event_data_selects_rules() {
    let mut p = platform(vec![event_block(TONGFANG, 0x1A)]);
    p.event_data(0x1A, Value::Integer(2));
    let mut controller = Controller::load(p).unwrap();
    let cfg = config_with(
        "tongfang",
        TONGFANG,
        vec![rule(TONGFANG, 0x1A, 1, 9), rule(TONGFANG, 0x1A, 2, 7)],
    );
    let rec = Arc::new(Recorder::default());
    let mut driver = HotkeyDriver::probe(&cfg, &controller, rec.clone()).unwrap();
    driver.start(&mut controller).unwrap();
    controller.dispatch(0x1A);
    assert_eq!(*rec.0.lock(), vec![7]);
}

#[test]
fn failed_event_data_fetch_matches_zero() {
    let mut p = platform(vec![event_block(TONGFANG, 0x1A)]);
    p.fail_event_data(0x1A, PlatformError::new(PlatformError::ERROR, "boom"));
    let mut controller = Controller::load(p).unwrap();
    let cfg = config_with("t", TONGFANG, vec![rule(TONGFANG, 0x1A, 0, 4)]);
    let rec = Arc::new(Recorder::default());
    let mut driver = HotkeyDriver::probe(&cfg, &controller, rec.clone()).unwrap();
    driver.start(&mut controller).unwrap();
    assert!(matches!(
        controller.dispatch(0x1A),
        DispatchOutcome::Delivered(_)
    ));
    assert_eq!(*rec.0.lock(), vec![4]);
}

#[test]
fn probe_picks_first_present_scheme_by_name() {
    let other = "05901221-D566-11D1-B2F0-00A0C9062910";
    let controller = Controller::load(platform(vec![
        event_block(TONGFANG, 0x1A),
        data_block(other, b"AA"),
    ]))
    .unwrap();
    let mut cfg = config_with("b", TONGFANG, vec![]);
    cfg.schemes.insert(
        "a".to_string(),
        Scheme {
            guid_match: guid("00000000-0000-0000-0000-000000000001"),
            rules: vec![],
        },
    );
    cfg.schemes.insert(
        "c".to_string(),
        Scheme {
            guid_match: guid(other),
            rules: vec![],
        },
    );
    let driver =
        HotkeyDriver::probe(&cfg, &controller, Arc::new(Recorder::default())).unwrap();
    assert_eq!(driver.scheme_name(), "b");
}

#[test]
fn probe_without_match_fails() {
    let controller = Controller::load(platform(vec![event_block(TONGFANG, 0x1A)])).unwrap();
    let cfg = config_with("x", "00000000-0000-0000-0000-000000000001", vec![]);
    assert!(matches!(
        HotkeyDriver::probe(&cfg, &controller, Arc::new(Recorder::default())),
        Err(Error::NoMatchingScheme)
    ));
}

#[test]
fn start_reports_registration_failure() {
    let data = "05901221-D566-11D1-B2F0-00A0C9062910";
    let mut controller = Controller::load(platform(vec![
        event_block(TONGFANG, 0x1A),
        data_block(data, b"AA"),
    ]))
    .unwrap();
    // A rule on a data block cannot be registered.
    let cfg = config_with(
        "t",
        TONGFANG,
        vec![rule(TONGFANG, 0x1A, 1, 9), rule(data, 0xAA, 1, 9)],
    );
    let mut driver =
        HotkeyDriver::probe(&cfg, &controller, Arc::new(Recorder::default())).unwrap();
    assert!(matches!(
        driver.start(&mut controller),
        Err(Error::Wmi(wmi::Error::InvalidOperation { .. }))
    ));
    assert_eq!(driver.registered(), &[guid(TONGFANG)]);
    driver.stop(&mut controller).unwrap();
    assert!(driver.registered().is_empty());
}

#[test]
fn unknown_action_id_is_ignored() {
    let (sink, rx) = ChannelSink::new();
    let exec = SystemExecutor::new(ActionTable::empty(), sink, NoServices, LogOnlyPower);
    exec.execute(3);
    assert!(messages(&rx).is_empty());
}

#[test]
fn daemon_actions() {
    let (sink, rx) = ChannelSink::new();
    let table = ActionTable::default().with_overrides([(20, Action::SendDaemonMessage(42, 1, -1))]);
    let exec = SystemExecutor::new(table, sink, NoServices, LogOnlyPower);
    for id in [2, 3, 5, 6, 20] {
        exec.execute(id);
    }
    assert_eq!(
        messages(&rx),
        vec![
            DaemonMessage::of(MessageType::SwitchDisplay),
            DaemonMessage::of(MessageType::ToggleAirplaneMode),
            DaemonMessage::of(MessageType::KeyboardBacklightDown),
            DaemonMessage::of(MessageType::KeyboardBacklightUp),
            DaemonMessage::new(42, 1, -1),
        ]
    );
}

#[test]
fn sleep_goes_to_power_control() {
    let (sink, rx) = ChannelSink::new();
    let slept = Arc::new(Mutex::new(0));
    let counter = slept.clone();
    let exec = SystemExecutor::new(ActionTable::default(), sink, NoServices, move || -> EngineResult<()> {
        *counter.lock() += 1;
        Ok(())
    });
    exec.execute(0);
    assert_eq!(*slept.lock(), 1);
    assert!(messages(&rx).is_empty());
}

#[test]
fn touchpad_toggles_and_sets() {
    let pad = Arc::new(MockTouchpad::new(true));
    let services = MockServices::new().with(ServiceMatch::TOUCHPAD, pad.clone());
    let (sink, _rx) = ChannelSink::new();
    let exec = SystemExecutor::new(ActionTable::default(), sink, services, LogOnlyPower)
        .with_service_timeout(Duration::from_millis(5));

    exec.execute(4);
    assert!(!pad.enabled());
    exec.execute(4);
    assert!(pad.enabled());
    exec.set_touchpad(false).unwrap();
    assert!(!pad.enabled());
    assert_eq!(
        pad.messages(),
        vec![
            ServiceMessage::GetTouchStatus,
            ServiceMessage::SetTouchStatus(false),
            ServiceMessage::GetTouchStatus,
            ServiceMessage::SetTouchStatus(true),
            ServiceMessage::SetTouchStatus(false),
        ]
    );
}

#[test]
fn service_lookups_are_bounded() {
    let services = Arc::new(MockServices::new());
    let (sink, _rx) = ChannelSink::new();
    let exec = SystemExecutor::new(ActionTable::default(), sink, services.clone(), LogOnlyPower);
    // Missing service is logged, not an error.
    exec.set_touchpad(true).unwrap();
    exec.execute(8);
    assert_eq!(
        services.lookups(),
        vec![
            (ServiceMatch::TOUCHPAD, Duration::from_secs(1)),
            (ServiceMatch::HID_EVENT, Duration::from_secs(1)),
        ]
    );
}

#[test]
fn brightness_presses_and_releases_function_keys() {
    let hid = Arc::new(MockHidEvents::new());
    let services = MockServices::new().with(ServiceMatch::HID_EVENT, hid.clone());
    let (sink, _rx) = ChannelSink::new();
    let exec = SystemExecutor::new(ActionTable::default(), sink, services, LogOnlyPower);
    exec.perform(Action::AdjustBrightness(Direction::Down)).unwrap();
    exec.perform(Action::AdjustBrightness(Direction::Up)).unwrap();
    let key = |usage, pressed| ServiceMessage::KeyboardEvent {
        usage_page: 0x07,
        usage,
        pressed,
    };
    assert_eq!(
        hid.messages(),
        vec![
            key(0x69, true),
            key(0x69, false),
            key(0x6A, true),
            key(0x6A, false)
        ]
    );
}
