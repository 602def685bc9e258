use crate::store::{ChangedEntry, ConfigStore};

use std::time::{Duration, UNIX_EPOCH};

fn received(text: &str) -> ConfigStore {
    let mut store = ConfigStore::new();
    store.load_text(text);
    store.commit_baseline(UNIX_EPOCH + Duration::from_secs(1));
    store
}

/// **VALUE**: Verifies loading text replaces the store instead of merging.
///
/// **WHY THIS MATTERS**: A key the controller no longer has must disappear
/// locally, otherwise it is resurrected on the next send.
#[test]
fn given_existing_contents_when_new_text_loaded_then_old_keys_are_gone() {
    // GIVEN: A store with two sections
    let mut store = ConfigStore::new();
    store.load_text("[A]X=1\n[B]Y=2\n");

    // WHEN: Different text is loaded
    let items = store.load_text("[C]Z=3\n");

    // THEN: Only the new content remains
    assert_eq!(items, 1);
    assert_eq!(store.get("A", "X"), None);
    assert_eq!(store.get("B", "Y"), None);
    assert_eq!(store.get("C", "Z"), Some("3"));
}

/// **VALUE**: Verifies baseline and current never share section maps.
///
/// **BUG THIS CATCHES**: A shallow copy would make every edit look unchanged
/// because the baseline would move with it.
#[test]
fn given_committed_baseline_when_current_edited_then_baseline_is_untouched() {
    // GIVEN: A received configuration
    let mut store = received("[MOTOR]SPEED=100\n");

    // WHEN: The user edits the value
    store.set("MOTOR", "SPEED", "200");

    // THEN: Baseline still holds the received value and the edit shows as changed
    assert_eq!(store.baseline()["MOTOR"]["SPEED"], "100");
    assert_eq!(store.get("MOTOR", "SPEED"), Some("200"));
    assert!(store.is_changed("MOTOR", "SPEED", "200"));
}

#[test]
fn given_edits_when_reset_then_current_matches_baseline_again() {
    let mut store = received("[MOTOR]SPEED=100\n");
    store.set("MOTOR", "SPEED", "200");
    store.set("NEW", "KEY", "value");

    store.reset();

    assert_eq!(store.current(), store.baseline());
    assert_eq!(store.get("NEW", "KEY"), None);

    // Editing after a reset must still leave the baseline alone
    store.set("MOTOR", "SPEED", "300");
    assert_eq!(store.baseline()["MOTOR"]["SPEED"], "100");
}

#[test]
fn given_no_baseline_when_reset_then_store_is_emptied() {
    let mut store = ConfigStore::new();
    store.load_text("[A]X=1\n");

    store.reset();

    assert!(store.current().is_empty());
    assert!(!store.has_baseline());
}

#[test]
fn given_key_absent_from_baseline_when_checked_then_it_counts_as_changed() {
    let store = received("[MOTOR]SPEED=100\n");

    assert!(store.is_changed("MOTOR", "TORQUE", "1"));
    assert!(store.is_changed("OTHER", "SPEED", "100"));
    assert!(!store.is_changed("MOTOR", "SPEED", "100"));
}

#[test]
fn given_comparison_when_values_differ_only_in_case_then_it_counts_as_changed() {
    let store = received("[S]MODE=Auto\n");

    assert!(store.is_changed("S", "MODE", "auto"));
}

#[test]
fn given_mixed_edits_when_changed_entries_listed_then_sorted_and_complete() {
    let mut store = received("[B]K=1\n[A]K=1\n");
    store.set("B", "K", "2");
    store.set("A", "NEW", "x");
    store.set("A", "K", "1");

    let changed = store.changed_entries();

    assert_eq!(
        changed,
        vec![
            ChangedEntry {
                section: "A".to_string(),
                key: "NEW".to_string(),
                value: "x".to_string(),
            },
            ChangedEntry {
                section: "B".to_string(),
                key: "K".to_string(),
                value: "2".to_string(),
            },
        ]
    );
}

#[test]
fn given_store_when_stats_taken_then_counts_and_receipt_time_reported() {
    let mut store = ConfigStore::new();
    assert_eq!(store.stats().last_received, None);

    store.load_text("[A]X=1\n[A]Y=2\n[B]Z=3\n");
    store.commit_baseline(UNIX_EPOCH + Duration::from_secs(5));
    store.ensure_section("EMPTY");

    assert_eq!(store.sections(), vec!["A", "B", "EMPTY"]);
    let stats = store.stats();
    assert_eq!(stats.sections, 3);
    assert_eq!(stats.keys, 3);
    assert_eq!(
        stats.last_received,
        Some(UNIX_EPOCH + Duration::from_secs(5))
    );
    assert!(store.has_baseline());
}
