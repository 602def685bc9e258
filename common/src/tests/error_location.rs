use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that a captured location points at this test file.
///
/// **WHY THIS MATTERS**: Every transport and persistence error in the bridge carries an
/// `ErrorLocation`. If capture breaks, log lines lose the only pointer back to the failing
/// read or write.
#[test]
fn given_caller_location_when_error_location_created_then_points_at_this_file() {
    // GIVEN/WHEN: A location captured here
    let location = ErrorLocation::from(Location::caller());

    // THEN: File, line and column are populated
    assert!(location.file.ends_with("error_location.rs"));
    assert!(location.line > 0);
    assert!(location.column > 0);
}

/// **VALUE**: Verifies the `[file:line:column]` rendering used in every error message.
#[test]
fn given_error_location_when_displayed_then_renders_bracketed_triplet() {
    // GIVEN: A fixed location
    let location = ErrorLocation {
        file: "src/transport/frame.rs",
        line: 42,
        column: 7,
    };

    // WHEN: Formatting it
    let rendered = location.to_string();

    // THEN: The bracketed triplet is produced
    assert_eq!(rendered, "[src/transport/frame.rs:42:7]");
}

/// **VALUE**: Verifies that `caller()` reports the call site when used behind `#[track_caller]`.
///
/// **BUG THIS CATCHES**: Would catch a constructor that forgets `#[track_caller]`, which
/// would make every error report the constructor's own line instead of the failing call.
#[test]
fn given_track_caller_helper_when_called_twice_then_lines_differ() {
    // GIVEN: A helper that captures via `caller()`
    #[track_caller]
    fn capture() -> ErrorLocation {
        ErrorLocation::caller()
    }

    // WHEN: Capturing from two consecutive lines
    let first = capture();
    let second = capture();

    // THEN: Same file, sequential lines
    assert_eq!(first.file, second.file);
    assert_eq!(first.line + 1, second.line);
}
