use crate::helpers::test_settings;

use sync_core::events::BridgeEvent;
use sync_core::store::ConfigState;

use tempfile::TempDir;

/// **VALUE**: Verifies a saved file is read back into current on start-up
/// without becoming a baseline.
///
/// **WHY THIS MATTERS**: Only the peer can confirm a baseline. Treating the
/// local file as one would hide edits made before the last shutdown.
#[tokio::test]
async fn given_saved_file_when_loaded_then_current_restored_without_baseline() {
    // GIVEN: A state that received and saved a config
    let dir = TempDir::new().expect("Failed to create temp dir");
    let settings = test_settings(&dir);
    let first = ConfigState::from_settings(&settings);
    first.apply_received("[MOTOR]SPEED=100\n").await;

    // WHEN: A new state loads the file
    let second = ConfigState::from_settings(&settings);
    let found = second.load_from_file().await.expect("Load should succeed");

    // THEN: Values are back, baseline is not
    assert!(found);
    assert_eq!(second.get("MOTOR", "SPEED").await.as_deref(), Some("100"));
    assert!(!second.has_baseline().await);
    assert!(second.is_changed("MOTOR", "SPEED", "100").await);
}

#[tokio::test]
async fn given_no_file_when_loaded_then_store_stays_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = ConfigState::from_settings(&test_settings(&dir));

    let found = state.load_from_file().await.expect("Load should succeed");

    assert!(!found);
    assert_eq!(state.stats().await.keys, 0);
}

#[tokio::test]
async fn given_received_config_when_edits_collected_then_only_edits_are_changed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = ConfigState::from_settings(&test_settings(&dir));
    state.apply_received("[A]X=1\n[A]Y=2\n").await;

    let collected = state
        .collect([
            ("A".to_string(), "X".to_string(), "1".to_string()),
            ("A".to_string(), "Y".to_string(), "3".to_string()),
        ])
        .await;

    assert_eq!(collected, 2);
    let changed = state.changed_entries().await;
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].key, "Y");
    assert_eq!(changed[0].value, "3");
}

#[tokio::test]
async fn given_edits_when_reset_then_received_values_return() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = ConfigState::from_settings(&test_settings(&dir));
    state.apply_received("[A]X=1\n").await;
    state.set("A", "X", "9").await;

    state.reset().await;

    assert_eq!(state.get("A", "X").await.as_deref(), Some("1"));
    assert!(state.changed_entries().await.is_empty());
}

#[tokio::test]
async fn given_subscriber_when_config_applied_then_event_carries_payload() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let state = ConfigState::from_settings(&test_settings(&dir));
    let mut events = state.events().subscribe();

    let items = state.apply_received("[A]X=1\n[B]Y=2\n").await;

    assert_eq!(items, 2);
    assert_eq!(
        events.recv().await.expect("Event expected"),
        BridgeEvent::ConfigReceived {
            payload: "[A]X=1\n[B]Y=2\n".to_string()
        }
    );
}

/// **BUG THIS CATCHES**: A failed file write must not roll back the receipt.
#[tokio::test]
async fn given_unwritable_config_path_when_config_applied_then_memory_still_updates() {
    // GIVEN: config_path points at a directory
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = test_settings(&dir);
    settings.config_path = dir.path().to_path_buf();
    let state = ConfigState::from_settings(&settings);

    // WHEN: A config is received
    state.apply_received("[A]X=1\n").await;

    // THEN: Store and baseline are updated regardless
    assert_eq!(state.get("A", "X").await.as_deref(), Some("1"));
    assert!(state.has_baseline().await);
    assert!(state.save().await.is_err());
}
