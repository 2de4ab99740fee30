//! Integration tests for the inbound → gate → FSM → outputs → status
//! pipeline of `LockController`, driven through mock adapters.

use super::mock_hw::Door;

use doorlock::app::events::{AppEvent, StatusNotice};
use doorlock::config::{DebouncePolicy, LockConfig};
use doorlock::error::{AuthError, CommsError};
use doorlock::fsm::StateId;

const UNLOCKED: &str = "Door unlocked";
const SECURED: &str = "Door secured";
const OPENING: &str = "Door opening";

fn config_with_debounce(ms: u64) -> LockConfig {
    LockConfig {
        debounce_ms: ms,
        ..LockConfig::default()
    }
}

// ── Unlock window ─────────────────────────────────────────────

#[test]
fn unlock_window_times_out_without_press() {
    let mut door = Door::new(LockConfig::default());
    door.send_unlock(1);
    door.tick(0);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
    assert!(door.hw.indicator_on());

    door.tick(60_000);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);

    door.tick(60_001);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert!(!door.hw.indicator_on());
    assert!(!door.hw.strike_on());
    assert_eq!(door.statuses(), vec![UNLOCKED, SECURED]);
    assert_eq!(door.hw.strike_writes(), 0);
}

#[test]
fn second_unlock_extends_window() {
    let mut door = Door::new(LockConfig::default());
    door.send_unlock(1);
    door.tick(0);

    door.send_unlock(2);
    door.tick(30_000);
    door.tick(60_001);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);

    door.tick(90_001);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert_eq!(door.statuses(), vec![UNLOCKED, UNLOCKED, SECURED]);
}

// ── Button path ───────────────────────────────────────────────

#[test]
fn press_during_window_opens_then_secures() {
    let mut door = Door::new(config_with_debounce(500));
    door.send_unlock(1);
    door.button.press();
    door.tick(0); // unlock applied, edge armed
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);

    door.tick(500);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);

    door.tick(501); // read confirmed
    assert_eq!(door.controller.state(), StateId::Opening);
    assert!(door.hw.strike_on());
    assert!(!door.hw.indicator_on());

    door.tick(501 + 1_000);
    assert!(door.hw.strike_on());

    door.tick(501 + 1_000 + 1);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert!(!door.hw.strike_on());
    assert_eq!(door.statuses(), vec![UNLOCKED, SECURED, OPENING]);
}

#[test]
fn press_while_secured_is_ignored() {
    let mut door = Door::new(LockConfig::default());
    door.button.press();
    door.tick(0);
    door.tick(100);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert_eq!(door.hw.strike_writes(), 0);
    assert!(door.statuses().is_empty());

    // The stale press does not carry over into a later window.
    door.send_unlock(1);
    door.tick(200);
    door.tick(300);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
}

#[test]
fn bounces_collapse_into_one_press() {
    let mut door = Door::new(LockConfig::default());
    door.send_unlock(1);
    door.tick(0);

    door.button.press();
    door.tick(10);
    door.button.release();
    door.tick(20);
    door.button.press();
    door.tick(30);

    door.tick(61); // 51 ms after the first edge
    assert_eq!(door.controller.state(), StateId::Opening);
    assert_eq!(door.hw.strike_writes(), 1);
}

#[test]
fn extend_policy_restarts_window_on_each_edge() {
    let config = LockConfig {
        debounce_policy: DebouncePolicy::Extend,
        ..LockConfig::default()
    };
    let mut door = Door::new(config);
    door.send_unlock(1);
    door.tick(0);

    door.button.press();
    door.tick(10);
    door.button.glitch();
    door.tick(40);

    door.tick(61);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
    door.tick(91);
    assert_eq!(door.controller.state(), StateId::Opening);
}

#[test]
fn unlock_during_opening_opens_window_after_pulse() {
    let mut door = Door::new(config_with_debounce(10));
    door.send_unlock(1);
    door.tick(0);
    door.button.press();
    door.tick(1);
    door.tick(12);
    assert_eq!(door.controller.state(), StateId::Opening);

    door.send_unlock(2);
    door.tick(13);
    assert_eq!(door.controller.state(), StateId::Opening);

    door.tick(12 + 1_000 + 1);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert!(!door.hw.strike_on());

    door.tick(12 + 1_000 + 2);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
    assert!(door.hw.indicator_on());
    assert_eq!(door.statuses(), vec![UNLOCKED, SECURED, OPENING, UNLOCKED]);
}

#[test]
fn retried_unlock_during_opening_still_opens_window() {
    let mut door = Door::new(config_with_debounce(10));
    door.send_unlock(1);
    door.tick(0);
    door.button.press();
    door.tick(1);
    door.tick(12);

    door.send_unlock(2);
    door.tick(13);
    // The sender saw no status change and retries the same command.
    door.send_unlock(2);
    door.tick(14);
    assert_eq!(
        door.sink
            .count(|e| *e == AppEvent::CommandRejected(AuthError::Replayed)),
        1
    );

    door.tick(12 + 1_000 + 1);
    door.tick(12 + 1_000 + 2);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);

    door.tick(12 + 1_000 + 2 + 60_000 + 1);
    assert_eq!(door.controller.state(), StateId::Secured);
}

// ── Command gate ──────────────────────────────────────────────

#[test]
fn forged_payload_is_rejected_silently() {
    let mut door = Door::new(LockConfig::default());
    let mut payload = door
        .signer
        .sign(doorlock::app::commands::Command::Unlock, 7);
    let last = payload.len() - 3;
    payload[last] = if payload[last] == b'A' { b'B' } else { b'A' };

    let topic = door.controller.config().command_topic.clone();
    door.transport.push_inbound(&topic, payload);
    door.pump_inbound();
    door.tick(0);

    assert_eq!(door.controller.state(), StateId::Secured);
    assert!(door.sink.events.contains(&AppEvent::CommandRejected(AuthError::InvalidSignature)));
    assert!(door.transport.published.is_empty());
}

#[test]
fn replayed_command_is_rejected() {
    let mut door = Door::new(LockConfig::default());
    door.send_unlock(100);
    door.tick(0);
    door.tick(60_001);
    assert_eq!(door.controller.state(), StateId::Secured);

    door.send_unlock(100);
    door.tick(60_002);
    assert_eq!(door.controller.state(), StateId::Secured);
    assert_eq!(
        door.sink
            .count(|e| *e == AppEvent::CommandRejected(AuthError::Replayed)),
        1
    );
}

#[test]
fn replay_guard_can_be_disabled() {
    let config = LockConfig {
        replay_guard: false,
        ..LockConfig::default()
    };
    let mut door = Door::new(config);
    door.send_unlock(100);
    door.tick(0);
    door.tick(60_001);

    door.send_unlock(100);
    door.tick(60_002);
    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
}

#[test]
fn messages_on_other_topics_are_ignored() {
    let mut door = Door::new(LockConfig::default());
    let payload = door
        .signer
        .sign(doorlock::app::commands::Command::Unlock, 1);
    door.transport.push_inbound("testarhs/other", payload);
    door.pump_inbound();
    door.tick(0);

    assert_eq!(door.controller.state(), StateId::Secured);
    assert_eq!(door.sink.events, vec![AppEvent::Started(StateId::Secured)]);
}

#[test]
fn inbound_flood_is_throttled() {
    let config = LockConfig {
        inbound_rate_per_sec: 2,
        ..LockConfig::default()
    };
    let mut door = Door::new(config);
    let topic = door.controller.config().command_topic.clone();
    for _ in 0..3 {
        door.transport.push_inbound(&topic, b"junk".to_vec());
    }
    door.pump_inbound();
    assert_eq!(
        door.sink
            .count(|e| *e == AppEvent::CommandRejected(AuthError::Throttled)),
        1
    );
}

// ── Status delivery ───────────────────────────────────────────

#[test]
fn publish_failure_does_not_block_the_door() {
    let mut door = Door::new(config_with_debounce(10));
    door.transport.fail_publish = true;

    door.send_unlock(1);
    door.tick(0);
    door.button.press();
    door.tick(1);
    door.tick(12);
    assert_eq!(door.controller.state(), StateId::Opening);
    assert!(door.hw.strike_on());

    assert_eq!(
        door.sink.count(|e| matches!(
            e,
            AppEvent::PublishFailed {
                error: CommsError::PublishFailed,
                ..
            }
        )),
        3
    );
}

#[test]
fn offline_door_still_unlocks() {
    let mut door = Door::new(LockConfig::default());
    door.transport.connected = false;
    door.send_unlock(1);
    door.tick(0);

    assert_eq!(door.controller.state(), StateId::UnlockedWindow);
    assert!(door.hw.indicator_on());
    assert!(door.sink.events.contains(&AppEvent::PublishFailed {
        notice: StatusNotice::Unlocked,
        error: CommsError::TransportUnavailable,
    }));
}

#[test]
fn state_changes_are_reported_in_order() {
    let mut door = Door::new(LockConfig::default());
    door.send_unlock(1);
    door.tick(0);
    door.tick(60_001);

    let changes: Vec<_> = door
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (StateId::Secured, StateId::UnlockedWindow),
            (StateId::UnlockedWindow, StateId::Secured),
        ]
    );
}
