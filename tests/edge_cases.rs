//! Edge case and boundary condition tests for the lift controller

use rs_lift::{
    hal::{MockFeed, MockRelay},
    sensor::{decode_line, DecodeError, LevelPresence},
    CommandOutcome, ControlError, Direction, Level, LiftController, LiftState, Position,
    SimulationEngine,
};

fn lift_at(level: Level) -> LiftController<MockRelay> {
    let mut lift = LiftController::new(MockRelay::new(), MockFeed::new());
    lift.on_presence(LevelPresence::new(level, true), 0).unwrap();
    lift
}

// ============================================================================
// Sensor Line Tests
// ============================================================================

#[test]
fn malformed_lines_change_nothing() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::First, 0).unwrap();
    let before = lift.status(10);

    for line in [
        "",
        "garbage",
        "G LIFT HERE",
        "X : LIFT HERE",
        "G : DOOR OPEN",
        "G : LIFT HERE : extra",
        "Sensor node ready\r\n",
    ] {
        assert_eq!(lift.ingest_line(line, 10).unwrap(), None, "{line:?}");
    }

    assert_eq!(lift.status(10), before);
}

#[test]
fn crlf_terminated_lines_decode() {
    assert_eq!(
        decode_line("B : LIFT HERE\r\n"),
        Ok(LevelPresence::new(Level::Basement, true))
    );
    assert_eq!(
        decode_line("2 : LIFT AWAY\n"),
        Ok(LevelPresence::new(Level::Second, false))
    );
}

#[test]
fn decode_errors_name_the_problem() {
    assert!(matches!(decode_line("nonsense"), Err(DecodeError::Malformed(_))));
    assert!(matches!(
        decode_line("3 : LIFT HERE"),
        Err(DecodeError::UnknownLevel { .. })
    ));
    assert!(matches!(
        decode_line("1 : DOOR OPEN"),
        Err(DecodeError::UnknownStatus {
            level: Level::First,
            ..
        })
    ));
}

#[test]
fn away_for_another_level_keeps_position() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::Second, 0).unwrap();

    lift.ingest_line("1 : LIFT AWAY", 100).unwrap();
    assert_eq!(lift.position(), Some(Position::At(Level::Ground)));
}

#[test]
fn away_while_idle_does_not_move_estimate() {
    let mut lift = lift_at(Level::First);
    lift.ingest_line("1 : LIFT AWAY", 100).unwrap();

    assert_eq!(lift.position(), Some(Position::At(Level::First)));
    assert_eq!(lift.state(), LiftState::Idle);
}

// ============================================================================
// Position Edge Cases
// ============================================================================

#[test]
fn request_before_any_report_is_rejected() {
    let mut lift = LiftController::new(MockRelay::new(), MockFeed::new());

    let err = lift.request_floor(Level::Second, 0).unwrap_err();
    assert!(matches!(err, ControlError::PositionUnknown));
    assert!(lift.relay_output().writes.is_empty());
    assert_eq!(lift.target(), None);
}

#[test]
fn stop_between_levels_reports_last_level() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::Second, 0).unwrap();
    lift.ingest_line("G : LIFT AWAY", 500).unwrap();
    assert_eq!(
        lift.position(),
        Position::between(Level::Ground, Level::First)
    );

    lift.stop(1000).unwrap();
    assert_eq!(lift.position(), Some(Position::At(Level::Ground)));
    assert_eq!(lift.status(1000).position_label(), "G");
}

#[test]
fn stopped_in_gap_drives_back_towards_last_level() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::Second, 0).unwrap();
    lift.ingest_line("G : LIFT AWAY", 500).unwrap();
    lift.stop(1000).unwrap();

    // The sensor at G no longer sees the cab, so this is a real trip down.
    let outcome = lift.request_floor(Level::Ground, 2000).unwrap();
    assert_eq!(outcome, CommandOutcome::Moving(Direction::Down));

    lift.ingest_line("G : LIFT HERE", 3000).unwrap();
    assert_eq!(lift.state(), LiftState::Idle);
    assert_eq!(lift.position(), Some(Position::At(Level::Ground)));
}

#[test]
fn request_present_level_while_moving_arrives() {
    let mut lift = lift_at(Level::Ground);
    lift.set_manual(Direction::Up, true, 0).unwrap();

    let outcome = lift.request_floor(Level::Ground, 10).unwrap();
    assert_eq!(outcome, CommandOutcome::Arrived(Level::Ground));
    assert_eq!(lift.state(), LiftState::Idle);
    assert!(!lift.is_energized());
}

// ============================================================================
// Terminal Level Tests
// ============================================================================

#[test]
fn manual_drive_stops_at_top() {
    let mut lift = lift_at(Level::First);
    lift.set_manual(Direction::Up, true, 0).unwrap();

    lift.ingest_line("1 : LIFT AWAY", 500).unwrap();
    lift.ingest_line("2 : LIFT HERE", 3000).unwrap();

    assert_eq!(lift.state(), LiftState::Idle);
    assert!(!lift.relays().up);
    assert_eq!(lift.position(), Some(Position::At(Level::Second)));
}

#[test]
fn manual_drive_passes_intermediate_levels() {
    let mut lift = lift_at(Level::Second);
    lift.set_manual(Direction::Down, true, 0).unwrap();

    lift.ingest_line("2 : LIFT AWAY", 500).unwrap();
    lift.ingest_line("1 : LIFT HERE", 3000).unwrap();
    assert_eq!(lift.state(), LiftState::GoingDown);

    lift.ingest_line("1 : LIFT AWAY", 3500).unwrap();
    lift.ingest_line("G : LIFT HERE", 6000).unwrap();
    assert_eq!(lift.state(), LiftState::GoingDown);
}

#[test]
fn manual_down_at_bottom_is_guarded() {
    let mut lift = lift_at(Level::Basement);
    let outcome = lift.set_manual(Direction::Down, true, 0).unwrap();

    assert_eq!(outcome, CommandOutcome::Guarded(Direction::Down));
    assert!(!lift.is_energized());
}

#[test]
fn manual_release_drops_both_relays() {
    let mut lift = lift_at(Level::Ground);
    lift.set_manual(Direction::Up, true, 0).unwrap();

    // Releasing the other direction still stops the lift.
    let outcome = lift.set_manual(Direction::Down, false, 100).unwrap();
    assert_eq!(outcome, CommandOutcome::Stopped);
    assert!(!lift.is_energized());
    assert_eq!(lift.state(), LiftState::Idle);
}

// ============================================================================
// Relay Failure Tests
// ============================================================================

#[test]
fn failed_engage_leaves_lift_idle() {
    let mut lift = lift_at(Level::Ground);
    lift.relay_output_mut().fail_writes = true;

    let err = lift.request_floor(Level::First, 0).unwrap_err();
    assert!(err.is_actuator());
    assert_eq!(lift.state(), LiftState::Idle);
    assert_eq!(lift.target(), None);
}

#[test]
fn failed_stop_cancels_trip_and_keeps_state() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::Second, 0).unwrap();
    lift.relay_output_mut().fail_writes = true;

    let err = lift.stop(100).unwrap_err();
    assert!(matches!(
        err,
        ControlError::Actuator {
            channel: Direction::Up,
            ..
        }
    ));
    assert_eq!(lift.target(), None);
    assert_eq!(lift.state(), LiftState::GoingUp);
    assert!(lift.relays().up);

    // Next attempt goes through once the relay recovers.
    lift.relay_output_mut().fail_writes = false;
    lift.stop(200).unwrap();
    assert_eq!(lift.state(), LiftState::Idle);
    assert!(!lift.relays().up);
}

#[test]
fn failed_reversal_stops_simulated_cab() {
    let mut lift = LiftController::new(MockRelay::new(), SimulationEngine::new());
    lift.update(0).unwrap();
    lift.request_floor(Level::Second, 0).unwrap();
    let mut now = 0;
    while now < 1_000 {
        now += 20;
        lift.update(now).unwrap();
    }
    assert_eq!(
        lift.position(),
        Position::between(Level::Ground, Level::First)
    );

    lift.relay_output_mut().failing_channel = Some(Direction::Down);
    assert!(lift.request_floor(Level::Basement, now).is_err());
    assert!(!lift.is_energized());
    assert_eq!(lift.state(), LiftState::Idle);
    assert_eq!(lift.target(), None);

    // Nothing drives the cab any more, so no further sensor changes arrive.
    let settled = lift.status(now);
    while now < 5_000 {
        now += 20;
        lift.update(now).unwrap();
    }
    assert_eq!(lift.position(), settled.position);
    assert_eq!(lift.position(), Some(Position::At(Level::Ground)));
    assert_eq!(lift.state(), LiftState::Idle);
}

// ============================================================================
// Reversal Tests
// ============================================================================

#[test]
fn reversal_never_overlaps_relays() {
    let mut lift = lift_at(Level::First);
    lift.request_floor(Level::Second, 0).unwrap();
    lift.request_floor(Level::Basement, 10).unwrap();
    lift.request_floor(Level::Second, 20).unwrap();

    assert!(!lift.relay_output().ever_both_on());
    assert_eq!(lift.state(), LiftState::GoingUp);
    assert_eq!(lift.target(), Some(Level::Second));
}

#[test]
fn repeated_request_writes_once() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::Second, 0).unwrap();
    lift.request_floor(Level::Second, 10).unwrap();

    assert_eq!(lift.relay_output().writes, vec![(Direction::Up, true)]);
}

// ============================================================================
// Display Message Tests
// ============================================================================

#[test]
fn message_reverts_to_state_label() {
    let mut lift = lift_at(Level::Ground);
    lift.request_floor(Level::First, 0).unwrap();
    assert_eq!(lift.status(100).display_message, "Level 1 requested");
    assert_eq!(lift.status(2_500).display_message, "Going Up");

    lift.stop(3_000).unwrap();
    assert_eq!(lift.status(3_100).display_message, "Emergency STOP");
    assert_eq!(lift.status(6_000).display_message, "Idle");
}
