//! Tests for the interactive menu

use std::future::{pending, ready};
use std::time::Duration;

use telegram_manager::{Controller, SessionEnd};

use super::support::{channel, group, user, MockPlatform};

async fn run_script(platform: MockPlatform, script: &str) -> (telegram_manager::Result<SessionEnd>, String) {
    let (manager, _) = platform.into_manager();
    let mut out = Vec::new();
    let result = Controller::new(manager, script.as_bytes(), &mut out)
        .run_until(pending())
        .await;
    (result, String::from_utf8(out).unwrap())
}

fn sample() -> MockPlatform {
    MockPlatform::new(vec![
        group("G1", 1),
        group("G2", 2),
        channel("C1", 3),
    ])
}

#[tokio::test]
async fn list_prints_buckets_with_indices() {
    let platform = MockPlatform::new(vec![group("Team", 11), channel("News", 21), user("Alice", 31)]);
    let calls = platform.calls();

    let (result, out) = run_script(platform, "1\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert!(out.contains("=== GROUPS ===\n1. Team (ID: 11)"));
    assert!(out.contains("=== CHANNELS ===\n1. News (ID: 21)"));
    assert!(out.contains("=== PRIVATE CHATS ===\n1. Alice (ID: 31)"));
    assert!(calls.left_ids().is_empty());
    assert_eq!(calls.disconnect_count(), 1);
}

#[tokio::test]
async fn confirmed_groups_leave_hits_only_groups() {
    let platform = sample();
    let calls = platform.calls();

    let (result, out) = run_script(platform, "2\n1\ny\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert_eq!(calls.left_ids(), vec![1, 2]);
    assert!(out.contains("You are about to leave 2 chats/channels. Confirm? (y/n): "));
    assert!(out.contains("Leaving G1...\nLeaving G2..."));
    assert!(out.contains("Successfully left 2 out of 2 chats/channels."));
    assert_eq!(calls.disconnect_count(), 1);
}

#[tokio::test]
async fn uppercase_y_also_confirms() {
    let platform = sample();
    let calls = platform.calls();

    let (_, _) = run_script(platform, "2\n2\nY\n3\n").await;

    assert_eq!(calls.left_ids(), vec![3]);
}

#[tokio::test]
async fn declining_confirmation_leaves_nothing() {
    let platform = sample();
    let calls = platform.calls();

    let (result, out) = run_script(platform, "2\n3\nn\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert!(out.contains("You are about to leave 3 chats/channels."));
    assert!(calls.left_ids().is_empty());
}

#[tokio::test]
async fn empty_selection_skips_confirmation() {
    let platform = MockPlatform::new(vec![user("Alice", 31)]);
    let calls = platform.calls();

    let (result, out) = run_script(platform, "2\n3\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert!(out.contains("No chats selected to leave."));
    assert!(!out.contains("Confirm?"));
    assert!(calls.left_ids().is_empty());
}

#[tokio::test]
async fn invalid_sub_choice_selects_nothing() {
    let platform = sample();
    let calls = platform.calls();

    let (_, out) = run_script(platform, "2\n9\n3\n").await;

    assert!(out.contains("No chats selected to leave."));
    assert!(calls.left_ids().is_empty());
}

#[tokio::test]
async fn failed_leave_is_reported_and_loop_continues() {
    let platform = sample().rejecting(&[1]);
    let calls = platform.calls();

    let (result, out) = run_script(platform, "2\n1\ny\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert_eq!(calls.left_ids(), vec![1, 2]);
    assert!(out.contains("Error leaving G1: Telegram API error: CHAT_ADMIN_REQUIRED"));
    assert!(out.contains("Successfully left 1 out of 2 chats/channels."));
}

#[tokio::test]
async fn unknown_option_redisplays_menu() {
    let platform = sample();

    let (result, out) = run_script(platform, "banana\n3\n").await;

    assert_eq!(result.unwrap(), SessionEnd::Exited);
    assert!(out.contains("Invalid option. Please try again."));
    assert_eq!(out.matches("=== TELEGRAM MANAGER ===").count(), 2);
}

#[tokio::test]
async fn closed_input_ends_session_and_disconnects() {
    let platform = sample();
    let calls = platform.calls();

    let (result, _) = run_script(platform, "").await;

    assert_eq!(result.unwrap(), SessionEnd::InputClosed);
    assert_eq!(calls.disconnect_count(), 1);
}

#[tokio::test]
async fn error_in_loop_still_disconnects_once() {
    let platform = sample().failing_fetch();
    let calls = platform.calls();

    let (result, out) = run_script(platform, "1\n3\n").await;

    assert!(result.is_err());
    assert!(out.contains("Error: Telegram API error: connection reset"));
    assert_eq!(calls.disconnect_count(), 1);
}

#[tokio::test]
async fn interrupt_disconnects_once_with_message() {
    let platform = sample();
    let calls = platform.calls();
    let (manager, _) = platform.into_manager();

    let mut out = Vec::new();
    let result = Controller::new(manager, "2\n1\ny\n".as_bytes(), &mut out)
        .run_until(ready(()))
        .await;

    assert_eq!(result.unwrap(), SessionEnd::Interrupted);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Program terminated by user."));
    assert!(calls.left_ids().is_empty());
    assert_eq!(calls.disconnect_count(), 1);
}

#[tokio::test]
async fn interrupt_mid_bulk_leave_keeps_completed_leaves() {
    let platform = MockPlatform::new(vec![group("G1", 1), group("G2", 2), group("G3", 3)]);
    let calls = platform.calls();
    let (manager, _) = platform.into_manager();

    // Each leave is followed by a 500 ms pause, so the signal lands after
    // the second attempt and before the third.
    let mut out = Vec::new();
    let result = Controller::new(manager, "2\n1\ny\n3\n".as_bytes(), &mut out)
        .run_until(tokio::time::sleep(Duration::from_millis(700)))
        .await;

    assert_eq!(result.unwrap(), SessionEnd::Interrupted);
    assert_eq!(calls.left_ids(), vec![1, 2]);
    assert_eq!(calls.disconnect_count(), 1);

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Leaving G2..."));
    assert!(!out.contains("Leaving G3..."));
    assert!(!out.contains("Successfully left"));
    assert!(out.contains("Program terminated by user."));
}
