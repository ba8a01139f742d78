//! Assertions for teardown invariants.

use disposecore::DisposeMode;

use crate::probe::CleanupLog;

/// Asserts that the probes named in `registered` were cleaned up in the
/// reverse of the given registration order, followed by `owner`.
pub fn assert_reverse_teardown(log: &CleanupLog, registered: &[&str], owner: &str) {
    let mut expected: Vec<String> = registered.iter().rev().map(ToString::to_string).collect();
    expected.push(owner.to_string());

    assert_eq!(
        log.names(),
        expected,
        "teardown did not follow reverse registration order"
    );
}

/// Asserts that every name in the log appears exactly once.
pub fn assert_each_cleaned_once(log: &CleanupLog) {
    let names = log.names();
    for name in &names {
        assert_eq!(
            log.count_of(name),
            1,
            "{name} was cleaned up more than once: {names:?}"
        );
    }
}

/// Asserts that every recorded cleanup was triggered through `mode`.
pub fn assert_all_in_mode(log: &CleanupLog, mode: DisposeMode) {
    for record in log.records() {
        assert_eq!(
            record.mode, mode,
            "{} was cleaned up through the {} path",
            record.name, record.mode
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disposecore::Cleanup;

    #[test]
    fn reverse_teardown_passes_on_expected_order() {
        let log = CleanupLog::new();
        for name in ["c", "b", "a"] {
            log.probe(name).cleanup(DisposeMode::Explicit).unwrap();
        }

        assert_reverse_teardown(&log, &["b", "c"], "a");
        assert_each_cleaned_once(&log);
        assert_all_in_mode(&log, DisposeMode::Explicit);
    }

    #[test]
    #[should_panic(expected = "reverse registration order")]
    fn reverse_teardown_rejects_forward_order() {
        let log = CleanupLog::new();
        for name in ["b", "c", "a"] {
            log.probe(name).cleanup(DisposeMode::Explicit).unwrap();
        }

        assert_reverse_teardown(&log, &["b", "c"], "a");
    }
}
