//! Registry of dependents released before their owner.
//!
//! Dependents are torn down last-registered-first, mirroring the order in
//! which stack values are dropped. In guarded mode both registration and
//! the whole teardown pass run inside the write side of a [`LockZone`], so a
//! registration either lands before teardown (and is released by it) or
//! waits until teardown has finished. In unguarded mode no zone exists;
//! the list is detached in one step when teardown begins and anything
//! registered afterwards is left for the caller to release.
//!
//! The zone is not reentrant: a dependent that registers with the owner
//! currently tearing it down, on the same thread, blocks.

use std::sync::{Arc, Mutex, RwLockWriteGuard};

use crate::config::ConcurrencyMode;
use crate::disposable::Dispose;
use crate::errors::DisposeError;
use crate::gate::DisposeMode;
use crate::lock_zone::{LockZone, MutexRecovery};

/// Synchronization chosen at construction.
#[derive(Debug)]
enum Guard {
    Unguarded,
    Guarded(LockZone),
}

impl Guard {
    fn exclusive(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        match self {
            Self::Unguarded => None,
            Self::Guarded(zone) => Some(zone.write()),
        }
    }
}

#[derive(Default)]
struct Slots {
    // Stays empty, without allocating, until the first registration.
    dependents: Vec<Arc<dyn Dispose>>,
    drained: bool,
}

/// Ordered collection of dependents owned for teardown.
pub struct DependentRegistry {
    guard: Guard,
    slots: Mutex<Slots>,
}

impl DependentRegistry {
    /// Creates an empty registry for the given mode.
    pub fn new(mode: ConcurrencyMode) -> Self {
        let guard = match mode {
            ConcurrencyMode::Unguarded => Guard::Unguarded,
            ConcurrencyMode::Guarded => Guard::Guarded(LockZone::new()),
        };

        Self {
            guard,
            slots: Mutex::new(Slots::default()),
        }
    }

    /// The mode this registry was built with.
    pub const fn mode(&self) -> ConcurrencyMode {
        match self.guard {
            Guard::Unguarded => ConcurrencyMode::Unguarded,
            Guard::Guarded(_) => ConcurrencyMode::Guarded,
        }
    }

    /// Appends a dependent. No deduplication: registering the same
    /// dependent twice asks it to dispose twice.
    ///
    /// Returns `false` when a teardown pass has already taken the list, in
    /// which case the dependent is kept but never released by this registry.
    pub fn push(&self, dependent: Arc<dyn Dispose>) -> bool {
        let _zone = self.guard.exclusive();
        let mut slots = self.slots.lock_recover();
        slots.dependents.push(dependent);
        !slots.drained
    }

    /// Number of registered dependents not yet taken by a teardown pass.
    pub fn len(&self) -> usize {
        self.slots.lock_recover().dependents.len()
    }

    /// Whether no registered dependents are left untaken.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every registered dependent, newest first, then runs
    /// `finish` while still inside the zone.
    ///
    /// All dependents are attempted even if some fail; failures are
    /// returned in the order they happened, followed by `finish`'s own.
    pub fn teardown<F>(&self, mode: DisposeMode, finish: F) -> Vec<DisposeError>
    where
        F: FnOnce() -> Result<(), DisposeError>,
    {
        let _zone = self.guard.exclusive();
        let dependents = {
            let mut slots = self.slots.lock_recover();
            slots.drained = true;
            std::mem::take(&mut slots.dependents)
        };

        let mut failures = Vec::new();
        for (position, dependent) in dependents.iter().enumerate().rev() {
            let result = match mode {
                DisposeMode::Explicit => dependent.dispose(),
                DisposeMode::Implicit => dependent.finalize(),
            };
            if let Err(error) = result {
                tracing::warn!(position, %mode, %error, "dependent failed to dispose");
                failures.push(error);
            }
        }

        if let Err(error) = finish() {
            failures.push(error);
        }
        failures
    }
}

impl std::fmt::Debug for DependentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependentRegistry")
            .field("mode", &self.mode())
            .field("dependents", &self.len())
            .finish()
    }
}
