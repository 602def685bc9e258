use crate::store::parser::parse;

/// **VALUE**: Verifies the wire form `[SECTION]KEY=VALUE` is read one record per line.
///
/// **WHY THIS MATTERS**: This is exactly what the remote controller sends. If a
/// record is dropped the store silently loses a setting and the next send
/// removes it from the controller too.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Inline records are treated as bare section headers
/// - The value is not trimmed
/// - Records for the same section overwrite the section instead of adding keys
#[test]
fn given_wire_records_when_parsed_then_every_key_lands_in_its_section() {
    // GIVEN: Three wire records over two sections
    let text = "[MOTOR]SPEED=100 \n[MOTOR]ACCEL=5\n[SENSOR]GAIN=1.5\n";

    // WHEN: Parsed
    let parsed = parse(text);

    // THEN: Both sections hold their keys with trimmed values
    assert_eq!(parsed.items, 3);
    assert_eq!(parsed.sections.len(), 2);
    assert_eq!(parsed.sections["MOTOR"]["SPEED"], "100");
    assert_eq!(parsed.sections["MOTOR"]["ACCEL"], "5");
    assert_eq!(parsed.sections["SENSOR"]["GAIN"], "1.5");
}

#[test]
fn given_persisted_form_when_parsed_then_keys_follow_their_header() {
    let text = "# comment\n; other comment\n\n[MOTOR]\nSPEED = 100\nACCEL=5\n\n[SENSOR]\nGAIN=1.5\n";

    let parsed = parse(text);

    assert_eq!(parsed.items, 3);
    assert_eq!(parsed.sections["MOTOR"]["SPEED"], "100");
    assert_eq!(parsed.sections["MOTOR"]["ACCEL"], "5");
    assert_eq!(parsed.sections["SENSOR"]["GAIN"], "1.5");
}

/// **VALUE**: Verifies a stray length header on the first line is ignored.
///
/// **BUG THIS CATCHES**: Would catch the length leaking in as a key or
/// later numeric keys being skipped as well.
#[test]
fn given_leading_numeric_line_when_parsed_then_only_first_is_skipped() {
    // GIVEN: A payload that still carries its "12" header, plus a numeric key later
    let text = "12\n[S]\n42=x\n";

    // WHEN: Parsed
    let parsed = parse(text);

    // THEN: The header is gone, the numeric key is kept
    assert_eq!(parsed.items, 1);
    assert_eq!(parsed.sections["S"]["42"], "x");
}

#[test]
fn given_key_value_before_any_header_when_parsed_then_it_is_ignored() {
    let parsed = parse("ORPHAN=1\n[S]\nK=V\n");

    assert_eq!(parsed.items, 1);
    assert_eq!(parsed.sections.len(), 1);
    assert_eq!(parsed.sections["S"]["K"], "V");
}

#[test]
fn given_header_without_keys_when_parsed_then_empty_section_exists() {
    let parsed = parse("[EMPTY]\n");

    assert_eq!(parsed.items, 0);
    assert!(parsed.sections["EMPTY"].is_empty());
}

#[test]
fn given_crlf_line_endings_when_parsed_then_carriage_returns_are_not_kept() {
    let parsed = parse("[S]A=1\r\n[S]B=2\r\n");

    assert_eq!(parsed.sections["S"]["A"], "1");
    assert_eq!(parsed.sections["S"]["B"], "2");
}

#[test]
fn given_value_containing_equals_when_parsed_then_split_happens_at_first_equals() {
    let parsed = parse("[NET]URL=http://host/?a=b\n");

    assert_eq!(parsed.sections["NET"]["URL"], "http://host/?a=b");
}

#[test]
fn given_duplicate_key_when_parsed_then_last_value_wins() {
    let parsed = parse("[S]K=first\n[S]K=second\n");

    assert_eq!(parsed.items, 2);
    assert_eq!(parsed.sections["S"]["K"], "second");
}

#[test]
fn given_unparseable_lines_when_parsed_then_they_are_skipped() {
    // Unterminated header and junk text inside a section
    let parsed = parse("[BROKEN\n[S]\njust some words\nK=V\n");

    assert_eq!(parsed.items, 1);
    assert_eq!(parsed.sections.len(), 1);
    assert_eq!(parsed.sections["S"]["K"], "V");
}

#[test]
fn given_empty_text_when_parsed_then_nothing_is_produced() {
    let parsed = parse("");

    assert_eq!(parsed.items, 0);
    assert!(parsed.sections.is_empty());
}

#[test]
fn given_header_form_and_inline_form_when_parsed_then_results_match() {
    let grouped = parse("[S]\nK=V\n");
    let inline = parse("[S]K=V\n");

    assert_eq!(grouped.sections, inline.sections);
    assert_eq!(inline.sections["S"]["K"], "V");
}

#[test]
fn given_inline_record_after_header_when_parsed_then_header_stays_current() {
    let parsed = parse("[A]\n[B]X=1\nY=2\n");

    assert_eq!(parsed.sections["B"]["X"], "1");
    assert_eq!(parsed.sections["A"]["Y"], "2");
}
