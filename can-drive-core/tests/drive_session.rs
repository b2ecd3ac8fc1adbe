// End-to-end session behaviour against the in-memory transport

use can_drive_core::command::encoder::{DRIVE_ID, SEND_ORDER};
use can_drive_core::{
    encode, ControlConfig, DriveCommand, Gear, MemoryTransport, RawFrame, SchedulerState,
    Session, SignalBoard,
};
use std::time::{Duration, Instant};

fn session(heartbeat_ms: u64) -> Session<MemoryTransport, SignalBoard> {
    let config = ControlConfig::new()
        .with_interface("vcan0")
        .with_poll_interval(Duration::from_millis(5))
        .with_heartbeat_interval(Duration::from_millis(heartbeat_ms))
        .with_inter_frame_delay(Duration::ZERO);
    Session::new(MemoryTransport::new("vcan0"), SignalBoard::new(), config)
}

fn frame_sets(sent: &[RawFrame]) -> Vec<&[RawFrame]> {
    assert_eq!(sent.len() % 5, 0, "partial frame set on the bus: {:?}", sent);
    sent.chunks(5).collect()
}

#[test]
fn start_then_stop_sends_exactly_two_frame_sets() {
    let mut session = session(500);
    let command = DriveCommand::new(10.0, 0.0).unwrap();

    session.start_drive(command).unwrap();
    session.stop_drive().unwrap();

    let sent = session.transport().sent();
    let sets = frame_sets(sent);
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0], encode(&command).frames().as_slice());
    assert_eq!(sets[1], encode(&DriveCommand::STOP).frames().as_slice());
    assert_eq!(session.stats().frame_sets_sent, 2);
    assert_eq!(session.scheduler_state(), SchedulerState::Idle);
}

#[test]
fn every_frame_set_follows_send_order() {
    let mut session = session(500);
    session.start_drive(DriveCommand::new(3.0, 12.0).unwrap()).unwrap();
    session.tick(Instant::now() + Duration::from_millis(600)).unwrap();
    session.stop_drive().unwrap();

    for set in frame_sets(session.transport().sent()) {
        let ids: Vec<u32> = set.iter().map(|f| f.can_id()).collect();
        let expected: Vec<u32> = SEND_ORDER.iter().map(|&id| id as u32).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn heartbeat_resends_updated_command() {
    let mut session = session(500);
    session.start_drive(DriveCommand::new(10.0, 0.0).unwrap()).unwrap();

    let reverse = DriveCommand::new(-2.0, 0.0).unwrap();
    session.update_drive(reverse).unwrap();
    // No forced re-send on update
    assert_eq!(session.transport().sent().len(), 5);

    session.tick(Instant::now() + Duration::from_millis(600)).unwrap();
    let sent = session.transport().sent();
    assert_eq!(sent.len(), 10);

    let drive = sent[9];
    assert_eq!(drive.can_id(), DRIVE_ID as u32);
    assert_eq!(drive.data()[3], Gear::Reverse.code());
    assert_eq!(&drive.data()[6..8], &[20, 0]);
}

#[test]
fn run_for_polls_and_beats() {
    let mut session = session(20);
    for _ in 0..3 {
        session
            .transport_mut()
            .push_inbound(RawFrame::new(0x0A0, &[0, 0, 0, 0, 0x32, 0, 0, 0xFF]).unwrap());
    }

    session.start_drive(DriveCommand::new(1.0, 0.0).unwrap()).unwrap();
    session.run_for(Duration::from_millis(70)).unwrap();

    assert_eq!(session.transport().pending_inbound(), 0);
    assert_eq!(session.sink().value("Battery SOC (%)"), Some("20.00"));
    assert_eq!(session.sink().value("Battery SOH (%)"), Some("255"));
    // Initial burst plus at least one heartbeat
    assert!(session.stats().frame_sets_sent >= 2);
    frame_sets(session.transport().sent());
}

#[test]
fn stop_without_heartbeat_never_sends_a_third_set() {
    let mut session = session(50);
    session.start_drive(DriveCommand::new(4.0, -3.0).unwrap()).unwrap();
    session.stop_drive().unwrap();

    // Heartbeat is disarmed; ticking well past the interval sends nothing
    session.tick(Instant::now() + Duration::from_secs(1)).unwrap();
    assert_eq!(frame_sets(session.transport().sent()).len(), 2);
}
