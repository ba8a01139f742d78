//! Leak tracking for disposable instances.
//!
//! Instances built with [`DisposeConfig::track`](crate::config::DisposeConfig)
//! register here at construction and unregister when they are released.
//! Anything still registered after a long time, and every release that came
//! through the implicit path, points at a missing explicit `dispose()`.

use std::collections::HashMap;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::ResourceLabel;
use crate::gate::DisposeMode;
use crate::lock_zone::MutexRecovery;

const UNLABELLED: &str = "<unlabelled>";

/// Identifier handed out by [`DisposeMonitor::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingId(Uuid);

impl TrackingId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
struct LiveEntry {
    label: String,
    registered_at: Instant,
    location: Option<&'static Location<'static>>,
}

/// A tracked instance that has been alive longer than a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentialLeak {
    /// Tracking identifier.
    pub id: TrackingId,
    /// Label of the instance, or `<unlabelled>`.
    pub label: String,
    /// Source location where the instance was constructed.
    pub location: Option<String>,
    /// How long the instance has been alive.
    pub age: Duration,
}

/// Registry of live tracked instances.
#[derive(Debug, Default)]
pub struct DisposeMonitor {
    live: Mutex<HashMap<TrackingId, LiveEntry>>,
    explicit_releases: AtomicU64,
    implicit_releases: AtomicU64,
}

impl DisposeMonitor {
    /// Create a new monitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly constructed instance.
    pub fn register(
        &self,
        label: Option<&ResourceLabel>,
        location: Option<&'static Location<'static>>,
    ) -> TrackingId {
        let id = TrackingId::new();
        let entry = LiveEntry {
            label: label.map_or_else(|| UNLABELLED.to_string(), ToString::to_string),
            registered_at: Instant::now(),
            location,
        };
        self.live.lock_recover().insert(id.clone(), entry);
        id
    }

    /// Record that an instance was released through `mode`.
    pub fn release(&self, id: &TrackingId, mode: DisposeMode) {
        if self.live.lock_recover().remove(id).is_none() {
            return;
        }
        let counter = match mode {
            DisposeMode::Explicit => &self.explicit_releases,
            DisposeMode::Implicit => &self.implicit_releases,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the tracked population.
    pub fn stats(&self) -> MonitorStats {
        let live = self.live.lock_recover();
        let mut by_label = HashMap::new();
        let mut oldest_live_age = Duration::ZERO;

        for entry in live.values() {
            *by_label.entry(entry.label.clone()).or_insert(0) += 1;
            oldest_live_age = oldest_live_age.max(entry.registered_at.elapsed());
        }

        MonitorStats {
            total_live: live.len(),
            by_label,
            oldest_live_age,
            explicit_releases: self.explicit_releases.load(Ordering::Relaxed),
            implicit_releases: self.implicit_releases.load(Ordering::Relaxed),
        }
    }

    /// Instances alive for at least `threshold`, oldest first.
    pub fn find_potential_leaks(&self, threshold: Duration) -> Vec<PotentialLeak> {
        let mut leaks: Vec<PotentialLeak> = self
            .live
            .lock_recover()
            .iter()
            .filter(|(_, entry)| entry.registered_at.elapsed() >= threshold)
            .map(|(id, entry)| PotentialLeak {
                id: id.clone(),
                label: entry.label.clone(),
                location: entry.location.map(ToString::to_string),
                age: entry.registered_at.elapsed(),
            })
            .collect();
        leaks.sort_by(|a, b| b.age.cmp(&a.age));
        leaks
    }

    /// Whether `id` is still registered.
    pub fn is_live(&self, id: &TrackingId) -> bool {
        self.live.lock_recover().contains_key(id)
    }
}

/// Statistics about tracked instances
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorStats {
    /// Tracked instances not yet released
    pub total_live: usize,
    /// Live instances grouped by label
    pub by_label: HashMap<String, usize>,
    /// Age of the oldest live instance
    pub oldest_live_age: Duration,
    /// Instances released by an explicit `dispose()`
    pub explicit_releases: u64,
    /// Instances released by the implicit safety net
    pub implicit_releases: u64,
}

static GLOBAL_MONITOR: OnceLock<DisposeMonitor> = OnceLock::new();

/// The process-wide monitor used by tracked disposables.
pub fn global_monitor() -> &'static DisposeMonitor {
    GLOBAL_MONITOR.get_or_init(DisposeMonitor::new)
}
