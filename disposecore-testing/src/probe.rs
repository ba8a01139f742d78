//! Recording payloads for observing teardown.
//!
//! A [`CleanupLog`] is a shared, ordered record of cleanup calls. Every
//! [`Probe`] created from the same log appends to it, so a test can build a
//! graph of disposables and assert the exact order they were released in.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use disposecore::lock_zone::MutexRecovery;
use disposecore::{Cleanup, DisposeError, DisposeMode, DisposeResult};

/// One observed cleanup call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRecord {
    /// Name of the probe that was cleaned up.
    pub name: String,
    /// Path that triggered the cleanup.
    pub mode: DisposeMode,
}

/// Shared, ordered record of cleanup calls.
#[derive(Debug, Clone, Default)]
pub struct CleanupLog {
    records: Arc<Mutex<Vec<CleanupRecord>>>,
}

impl CleanupLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe that records into this log under `name`.
    pub fn probe(&self, name: impl Into<String>) -> Probe {
        Probe {
            name: name.into(),
            log: self.clone(),
            calls: AtomicUsize::new(0),
            failure: None,
        }
    }

    /// A probe that records into this log and then reports `message` as a
    /// cleanup failure.
    pub fn failing_probe(&self, name: impl Into<String>, message: impl Into<String>) -> Probe {
        Probe {
            failure: Some(message.into()),
            ..self.probe(name)
        }
    }

    fn push(&self, record: CleanupRecord) {
        self.records.lock_recover().push(record);
    }

    /// Every record, in call order.
    pub fn records(&self) -> Vec<CleanupRecord> {
        self.records.lock_recover().clone()
    }

    /// Names of cleaned up probes, in call order.
    pub fn names(&self) -> Vec<String> {
        self.records().into_iter().map(|record| record.name).collect()
    }

    /// How many times `name` was cleaned up.
    pub fn count_of(&self, name: &str) -> usize {
        self.records()
            .iter()
            .filter(|record| record.name == name)
            .count()
    }

    /// Number of recorded cleanup calls.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether nothing was cleaned up yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A payload that records its cleanup in a [`CleanupLog`].
#[derive(Debug)]
pub struct Probe {
    name: String,
    log: CleanupLog,
    calls: AtomicUsize,
    failure: Option<String>,
}

impl Probe {
    /// The probe's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many times cleanup was called on this probe.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Cleanup for Probe {
    fn cleanup(&self, mode: DisposeMode) -> DisposeResult<()> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push(CleanupRecord {
            name: self.name.clone(),
            mode,
        });

        match &self.failure {
            Some(message) => Err(DisposeError::CleanupFailed(message.clone())),
            None => Ok(()),
        }
    }
}

/// Counts observable cleanup effects.
///
/// Usable directly as a [`Cleanup`] payload, or cloned into a closure
/// passed to [`disposecore::dispose_fn`].
#[derive(Debug, Clone, Default)]
pub struct EffectCounter {
    count: Arc<AtomicUsize>,
}

impl EffectCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one effect.
    pub fn record(&self) {
        let _ = self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of recorded effects.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Cleanup for EffectCounter {
    fn cleanup(&self, _mode: DisposeMode) -> DisposeResult<()> {
        self.record();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_share_one_log() {
        let log = CleanupLog::new();
        let a = log.probe("a");
        let b = log.failing_probe("b", "boom");

        a.cleanup(DisposeMode::Explicit).unwrap();
        assert!(b.cleanup(DisposeMode::Implicit).is_err());

        assert_eq!(log.names(), vec!["a", "b"]);
        assert_eq!(log.records()[1].mode, DisposeMode::Implicit);
        assert_eq!(a.calls(), 1);
        assert_eq!(log.count_of("b"), 1);
    }

    #[test]
    fn effect_counter_counts() {
        let counter = EffectCounter::new();
        let clone = counter.clone();
        clone.record();
        counter.cleanup(DisposeMode::Explicit).unwrap();
        assert_eq!(counter.count(), 2);
    }
}
