//! Refresh-cycle behaviour against a scripted projector

use std::sync::Arc;

use pjlink_client::mock::{Call, DeviceState, Failure, MockConnector, MockDevice, Op};
use pjlink_client::{ErrorSeverity, InputSource, LampStatus, MuteState, PowerState, ProjectorFault};
use pjlink_coordinator::{
    ConnectionParams, Coordinator, CoordinatorError, CoordinatorStatus, UpdateKind,
};
use rstest::rstest;

// ============================================================================
// Test Helpers
// ============================================================================

fn setup(password: Option<&str>) -> (Coordinator, MockDevice) {
    let device = MockDevice::new(DeviceState::default());
    let connector = MockConnector::new(device.clone());
    let params = ConnectionParams::new(
        "192.168.1.40",
        4352,
        "Living Room",
        "utf-8",
        password.map(str::to_string),
    );
    (Coordinator::new(params, Arc::new(connector)), device)
}

fn authenticate_calls(device: &MockDevice) -> Vec<Call> {
    device
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Authenticate(_)))
        .collect()
}

// ============================================================================
// Snapshot contents
// ============================================================================

#[test]
fn refresh_publishes_full_snapshot() {
    let (coordinator, device) = setup(None);
    device.update(|s| {
        s.mute = MuteState { audio: true, video: false };
        s.errors.insert("filter".to_string(), ErrorSeverity::Warning);
    });

    let snapshot = coordinator.refresh().unwrap();

    assert_eq!(snapshot.device_id, "192.168.1.40");
    assert_eq!(snapshot.name, "Living Room");
    assert_eq!(snapshot.manufacturer, "EPSON");
    assert_eq!(snapshot.product_name, "EB-W05");
    assert!(snapshot.power);
    assert_eq!(snapshot.power_state, PowerState::On);
    assert_eq!(snapshot.input, Some(InputSource::new("RGB", "1")));
    assert_eq!(snapshot.inputs.as_ref().map(Vec::len), Some(3));
    assert_eq!(snapshot.lamps.get(&1), Some(&true));
    assert_eq!(snapshot.lamp_hours.get(&1), Some(&1200));
    assert_eq!(snapshot.errors.get("filter"), Some(&ErrorSeverity::Warning));
    assert_eq!(snapshot.audio_mute, Some(true));
    assert_eq!(snapshot.video_mute, Some(false));

    assert!(Arc::ptr_eq(&snapshot, &coordinator.snapshot().unwrap()));
}

#[rstest]
#[case(PowerState::On, true)]
#[case(PowerState::WarmUp, true)]
#[case(PowerState::Off, false)]
#[case(PowerState::Cooling, false)]
fn refresh_derives_power(#[case] state: PowerState, #[case] expected: bool) {
    let (coordinator, device) = setup(None);
    device.update(|s| s.power = state);

    let snapshot = coordinator.refresh().unwrap();

    assert_eq!(snapshot.power, expected);
    assert_eq!(snapshot.power_state, state);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[test]
fn failed_connect_keeps_previous_snapshot() {
    let (coordinator, device) = setup(None);
    let first = coordinator.refresh().unwrap();

    device.fail(Op::Connect, Failure::Timeout);
    let err = coordinator.refresh().unwrap_err();

    assert!(matches!(err, CoordinatorError::Unavailable(_)));
    assert!(!coordinator.last_update_success());
    assert_eq!(coordinator.status(), CoordinatorStatus::Unavailable);
    let current = coordinator.snapshot().unwrap();
    assert!(Arc::ptr_eq(&first, &current));
}

#[test]
fn failed_connect_signals_listeners() {
    let (coordinator, device) = setup(None);
    let updates = coordinator.updates();
    device.fail(Op::Connect, Failure::Refused);

    assert!(coordinator.refresh().is_err());

    let event = updates.try_recv().unwrap();
    match event.kind {
        UpdateKind::Failed { reason } => assert!(reason.contains("projector unavailable")),
        other => panic!("Expected Failed event, got {:?}", other),
    }
}

#[test]
fn every_listener_sees_each_refresh() {
    let (coordinator, _device) = setup(None);
    let first = coordinator.updates();
    let second = coordinator.updates();

    coordinator.refresh().unwrap();

    for updates in [&first, &second] {
        let event = updates.try_recv().unwrap();
        assert!(matches!(event.kind, UpdateKind::Published { generation: 1 }));
        assert!(updates.try_recv().is_none());
    }
}

#[test]
fn dropped_listener_does_not_hold_events() {
    let (coordinator, _device) = setup(None);
    drop(coordinator.updates());

    for _ in 0..50 {
        coordinator.refresh().unwrap();
    }

    let late = coordinator.updates();
    assert!(late.try_recv().is_none());
    coordinator.refresh().unwrap();
    let event = late.try_recv().unwrap();
    assert!(matches!(event.kind, UpdateKind::Published { generation: 51 }));
    assert!(late.try_recv().is_none());
}

#[test]
fn lamp_failure_only_empties_lamps() {
    let (coordinator, device) = setup(None);
    device.fail(Op::GetLamps, Failure::Fault(ProjectorFault::UndefinedCommand));

    let snapshot = coordinator.refresh().unwrap();

    assert!(snapshot.lamps.is_empty());
    assert!(snapshot.lamp_hours.is_empty());
    assert!(snapshot.power);
    assert_eq!(snapshot.manufacturer, "EPSON");
    assert_eq!(snapshot.input, Some(InputSource::new("RGB", "1")));
    assert!(snapshot.inputs.is_some());
    assert_eq!(snapshot.audio_mute, Some(false));
    assert!(coordinator.last_update_success());
}

#[rstest]
#[case(Op::GetInput)]
#[case(Op::GetInputs)]
#[case(Op::GetErrors)]
#[case(Op::GetMute)]
fn optional_field_failure_does_not_fail_refresh(#[case] op: Op) {
    let (coordinator, device) = setup(None);
    device.fail(op, Failure::Fault(ProjectorFault::UnavailableTime));

    let snapshot = coordinator.refresh().unwrap();

    match op {
        Op::GetInput => assert!(snapshot.input.is_none()),
        Op::GetInputs => assert!(snapshot.inputs.is_none()),
        Op::GetErrors => assert!(snapshot.errors.is_empty()),
        Op::GetMute => {
            assert!(snapshot.audio_mute.is_none());
            assert!(snapshot.video_mute.is_none());
        }
        _ => unreachable!(),
    }
    assert!(snapshot.power);
}

#[test]
fn failed_optional_read_is_not_retried() {
    let (coordinator, device) = setup(None);
    device.fail(Op::GetInputs, Failure::Timeout);

    coordinator.refresh().unwrap();

    assert_eq!(device.count(|c| *c == Call::GetInputs), 1);
}

#[test]
fn every_session_is_closed() {
    let (coordinator, device) = setup(None);

    coordinator.refresh().unwrap();
    device.fail(Op::GetLamps, Failure::Timeout);
    coordinator.refresh().unwrap();
    device.fail(Op::GetPower, Failure::Timeout);
    assert!(coordinator.refresh().is_err());
    assert!(coordinator.turn_on().is_err());
    device.heal_all();
    coordinator.turn_off().unwrap();
    coordinator.mute_video(true).unwrap();

    assert_eq!(device.open_sessions(), 0);
    let connects = device.count(|c| matches!(c, Call::Connect { .. }));
    assert_eq!(device.count(|c| *c == Call::Close), connects);
}

#[test]
fn recovers_after_failure() {
    let (coordinator, device) = setup(None);
    device.fail(Op::Connect, Failure::Timeout);
    assert!(coordinator.refresh().is_err());
    assert!(coordinator.snapshot().is_none());

    device.heal(Op::Connect);
    coordinator.refresh().unwrap();

    assert!(coordinator.last_update_success());
    assert_eq!(coordinator.status(), CoordinatorStatus::Available);
}

#[test]
fn snapshot_is_replaced_not_merged() {
    let (coordinator, device) = setup(None);
    let first = coordinator.refresh().unwrap();
    assert_eq!(first.lamps.len(), 1);

    device.update(|s| s.lamps.clear());
    let second = coordinator.refresh().unwrap();

    assert!(second.lamps.is_empty());
    assert_eq!(first.lamps.len(), 1);
}

// ============================================================================
// Credentials
// ============================================================================

#[test]
fn empty_password_reaches_client_as_none() {
    let (coordinator, device) = setup(Some(""));

    coordinator.refresh().unwrap();

    assert_eq!(authenticate_calls(&device), vec![Call::Authenticate(None)]);
}

#[test]
fn password_reaches_client() {
    let (coordinator, device) = setup(Some("secret"));

    coordinator.turn_on().unwrap();

    assert_eq!(
        authenticate_calls(&device),
        vec![Call::Authenticate(Some("secret".to_string()))]
    );
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn turn_on_when_already_on_is_noop() {
    let (coordinator, device) = setup(None);
    let snapshot = coordinator.refresh().unwrap();
    assert!(snapshot.power);

    coordinator.turn_on().unwrap();

    assert_eq!(device.count(|c| matches!(c, Call::SetPower(_))), 0);
}

#[test]
fn turn_on_from_standby() {
    let (coordinator, device) = setup(None);
    device.update(|s| s.power = PowerState::Off);

    coordinator.turn_on().unwrap();
    coordinator.turn_on().unwrap();

    assert_eq!(device.count(|c| *c == Call::SetPower(PowerState::On)), 1);
    assert!(coordinator.refresh().unwrap().power);
}

#[test]
fn select_source_then_refresh_reports_new_input() {
    let device = MockDevice::new(DeviceState {
        input: InputSource::new("Lbl", "2"),
        inputs: vec![InputSource::new("Lbl", "1"), InputSource::new("Lbl", "2")],
        ..DeviceState::default()
    });
    let params = ConnectionParams::new("10.0.0.2", 4352, "Hall", "utf-8", None);
    let coordinator = Coordinator::new(params, Arc::new(MockConnector::new(device.clone())));
    coordinator.refresh().unwrap();

    coordinator.select_source("Lbl 1").unwrap();
    let snapshot = coordinator.refresh().unwrap();

    assert_eq!(snapshot.source().as_deref(), Some("Lbl 1"));
}

#[test]
fn select_source_uses_stale_snapshot() {
    let (coordinator, device) = setup(None);
    coordinator.refresh().unwrap();

    // The projector gains an input the snapshot does not know about yet
    device.update(|s| s.inputs.push(InputSource::new("NETWORK", "1")));
    let err = coordinator.select_source("NETWORK 1").unwrap_err();
    assert!(matches!(err, CoordinatorError::UnknownSource(_)));

    coordinator.refresh().unwrap();
    coordinator.select_source("NETWORK 1").unwrap();
    assert_eq!(device.state().input, InputSource::new("NETWORK", "1"));
}

#[test]
fn rejected_power_command_propagates() {
    let (coordinator, device) = setup(None);
    device.update(|s| s.power = PowerState::Off);
    device.fail(Op::SetPower, Failure::Fault(ProjectorFault::UnavailableTime));

    let err = coordinator.turn_on().unwrap_err();

    assert!(matches!(
        err,
        CoordinatorError::Device(pjlink_client::ClientError::Protocol(ProjectorFault::UnavailableTime))
    ));
    assert_eq!(device.state().power, PowerState::Off);
}

#[test]
fn lamp_list_order_preserved() {
    let (coordinator, device) = setup(None);
    device.update(|s| {
        s.lamps = vec![
            LampStatus { hours: 5, on: false },
            LampStatus { hours: 7, on: true },
        ]
    });

    let snapshot = coordinator.refresh().unwrap();

    assert_eq!(snapshot.lamps.get(&1), Some(&false));
    assert_eq!(snapshot.lamps.get(&2), Some(&true));
}
