use super::Sections;

/// Changed unless the baseline holds exactly `candidate` for (section, key).
///
/// A key with no baseline entry counts as changed: there is nothing to compare against.
pub(crate) fn is_changed(baseline: &Sections, section: &str, key: &str, candidate: &str) -> bool {
    baseline
        .get(section)
        .and_then(|entries| entries.get(key))
        .is_none_or(|original| original != candidate)
}
