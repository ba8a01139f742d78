//! Scoped reader/writer locking that survives poisoning.
//!
//! A [`LockZone`] hands out read or write access for the duration of a
//! scope; access is released when the returned guard is dropped, including
//! during unwinding. Cleanup hooks are user code and may panic while a zone
//! is held, which would poison a plain `std` lock. Disposal must still be
//! able to make progress afterwards, so every acquisition here recovers
//! from poison instead of propagating it.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for `RwLock` to provide recovery from poisoned locks.
pub trait RwLockRecovery<T> {
    /// Acquires a read lock, recovering from poison if necessary.
    ///
    /// The data may be in an inconsistent state after a panic, so callers
    /// should validate it after acquiring the lock.
    fn read_recover(&self) -> RwLockReadGuard<'_, T>;

    /// Acquires a write lock, recovering from poison if necessary.
    fn write_recover(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockRecovery<T> for RwLock<T> {
    fn read_recover(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_recover(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Extension trait for `Mutex` to provide recovery from poisoned locks.
pub trait MutexRecovery<T> {
    /// Locks the mutex, recovering from poison if necessary.
    fn lock_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexRecovery<T> for Mutex<T> {
    fn lock_recover(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A reader/writer mutual-exclusion zone.
///
/// The zone protects no data of its own; it orders critical sections that
/// touch state living elsewhere. Hold [`LockZone::write`] for mutations and
/// [`LockZone::read`] for observations that must not interleave with them.
#[derive(Debug, Default)]
pub struct LockZone {
    lock: RwLock<()>,
}

impl LockZone {
    /// Creates a new, unlocked zone.
    pub const fn new() -> Self {
        Self {
            lock: RwLock::new(()),
        }
    }

    /// Enters the zone with shared access until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read_recover()
    }

    /// Enters the zone with exclusive access until the guard is dropped.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write_recover()
    }

    /// Runs `f` with shared access to the zone.
    pub fn with_read<R>(&self, f: impl FnOnce() -> R) -> R {
        let _zone = self.read();
        f()
    }

    /// Runs `f` with exclusive access to the zone.
    pub fn with_write<R>(&self, f: impl FnOnce() -> R) -> R {
        let _zone = self.write();
        f()
    }
}
