//! The disposal contract.
//!
//! [`Disposable`] wraps a payload implementing [`Cleanup`] and guarantees
//! that the payload's cleanup runs exactly once, whether disposal is
//! requested explicitly through [`Disposable::dispose`], implicitly when the
//! instance is dropped without being disposed, or both at once from several
//! threads. Dependents registered with [`Disposable::also_dispose`] are
//! released first, newest first.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use disposecore::{Cleanup, Disposable, DisposeMode, DisposeResult};
//!
//! struct Connection;
//!
//! impl Cleanup for Connection {
//!     fn cleanup(&self, mode: DisposeMode) -> DisposeResult<()> {
//!         println!("closing connection ({mode})");
//!         Ok(())
//!     }
//! }
//!
//! let session = Disposable::new(());
//! let connection = Arc::new(Disposable::new(Connection));
//! session.also_dispose(connection.clone());
//!
//! session.dispose()?;
//! assert!(connection.is_disposed());
//! // A second request is absorbed.
//! session.dispose()?;
//! # Ok::<(), disposecore::DisposeError>(())
//! ```

use std::ops::Deref;
use std::panic::Location;
use std::sync::Arc;

use crate::config::{ConcurrencyMode, DisposeConfig, ResourceLabel};
use crate::errors::{DisposeError, DisposeResult};
use crate::gate::{DisposeGate, DisposeMode, DisposeState};
use crate::monitor::{global_monitor, TrackingId};
use crate::registry::DependentRegistry;

/// Anything that can be released.
///
/// Implementations must be idempotent: the contract composes only if every
/// participant absorbs repeated requests. [`Disposable`] implements this
/// trait, so disposables can depend on one another.
pub trait Dispose: Send + Sync {
    /// Deterministic, caller-initiated release.
    fn dispose(&self) -> DisposeResult<()>;

    /// Release requested by an owner that is itself being finalized.
    ///
    /// Defaults to [`Dispose::dispose`] for resources that make no
    /// distinction between the two paths.
    fn finalize(&self) -> DisposeResult<()> {
        self.dispose()
    }

    /// Whether release has completed.
    fn is_disposed(&self) -> bool;
}

impl<D: Dispose + ?Sized> Dispose for Arc<D> {
    fn dispose(&self) -> DisposeResult<()> {
        (**self).dispose()
    }

    fn finalize(&self) -> DisposeResult<()> {
        (**self).finalize()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

/// Cleanup logic of a disposable payload.
///
/// Called at most once per [`Disposable`], after all of its dependents have
/// been released. With [`DisposeMode::Implicit`] the call comes from a
/// destructor: release only state the payload owns outright.
pub trait Cleanup {
    /// Releases the payload's state.
    fn cleanup(&self, mode: DisposeMode) -> DisposeResult<()>;
}

/// A unit payload turns [`Disposable`] into a pure owning container that
/// only releases its dependents.
impl Cleanup for () {
    fn cleanup(&self, _mode: DisposeMode) -> DisposeResult<()> {
        Ok(())
    }
}

/// A payload whose cleanup is guaranteed to run exactly once.
///
/// Dereferences to the payload for use while live.
pub struct Disposable<T: Cleanup> {
    gate: DisposeGate,
    registry: DependentRegistry,
    label: Option<ResourceLabel>,
    tracking: Option<TrackingId>,
    payload: T,
}

impl<T: Cleanup> Disposable<T> {
    /// Wraps `payload` with the default configuration: unguarded,
    /// unlabelled, untracked.
    #[track_caller]
    pub fn new(payload: T) -> Self {
        Self::with_config(payload, DisposeConfig::default())
    }

    /// Wraps `payload` with the given concurrency mode.
    #[track_caller]
    pub fn with_mode(payload: T, mode: impl Into<ConcurrencyMode>) -> Self {
        Self::with_config(payload, DisposeConfig::with_mode(mode.into()))
    }

    /// Wraps `payload` with a full configuration.
    #[track_caller]
    pub fn with_config(payload: T, config: DisposeConfig) -> Self {
        let location = Location::caller();
        let tracking = config
            .track
            .then(|| global_monitor().register(config.label.as_ref(), Some(location)));

        Self {
            gate: DisposeGate::new(),
            registry: DependentRegistry::new(config.concurrency),
            label: config.label,
            tracking,
            payload,
        }
    }

    /// Registers a dependent to be released before this instance's own
    /// cleanup, after every dependent registered later.
    ///
    /// A dependent that lands after the teardown pass has taken the
    /// dependent list is accepted but never released by this instance;
    /// releasing it is left to the caller. In guarded mode a registration
    /// racing a dispose request either lands before that point or waits
    /// for the pass to finish.
    pub fn also_dispose(&self, dependent: Arc<dyn Dispose>) {
        if !self.registry.push(dependent) {
            tracing::warn!(
                label = self.label_field(),
                state = %self.gate.state(),
                "dependent registered after teardown took the dependent list; it will not be released by this instance"
            );
        }
    }

    /// Explicitly releases this instance.
    ///
    /// Only the first request, across all threads and the implicit path,
    /// performs teardown; every other request returns `Ok(())` immediately.
    pub fn dispose(&self) -> DisposeResult<()> {
        self.fire_dispose(DisposeMode::Explicit)
    }

    /// Runs the implicit release path now, as dropping an undisposed
    /// instance would. A no-op once the instance was explicitly disposed.
    pub fn finalize(&self) -> DisposeResult<()> {
        if self.gate.is_finalize_suppressed() {
            return Ok(());
        }
        self.fire_dispose(DisposeMode::Implicit)
    }

    fn fire_dispose(&self, mode: DisposeMode) -> DisposeResult<()> {
        if !self.gate.try_trigger(mode) {
            tracing::trace!(label = self.label_field(), %mode, "dispose already triggered");
            return Ok(());
        }

        if matches!(mode, DisposeMode::Implicit) {
            tracing::warn!(
                label = self.label_field(),
                "instance was not explicitly disposed; releasing implicitly"
            );
        }
        tracing::debug!(
            label = self.label_field(),
            %mode,
            dependents = self.registry.len(),
            "teardown started"
        );

        // Leaves the monitor even if a cleanup hook unwinds.
        let _release = MonitorRelease {
            id: self.tracking.as_ref(),
            mode,
        };
        let failures = self
            .registry
            .teardown(mode, || self.payload.cleanup(mode));
        self.gate.mark_disposed();

        if mode.is_disposing() {
            self.gate.suppress_finalize();
        }

        tracing::debug!(
            label = self.label_field(),
            %mode,
            failures = failures.len(),
            "teardown completed"
        );
        DisposeError::collect(failures)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DisposeState {
        self.gate.state()
    }

    /// Whether disposal has been explicitly requested, even if another
    /// path performed the teardown.
    pub fn is_dispose_requested(&self) -> bool {
        self.gate.is_explicitly_invoked()
    }

    /// Whether any path has started disposal.
    pub fn is_dispose_triggered(&self) -> bool {
        self.gate.is_triggered()
    }

    /// Whether disposal has fully completed.
    pub fn is_disposed(&self) -> bool {
        self.gate.is_disposed()
    }

    /// Number of registered dependents not yet taken by a teardown pass.
    ///
    /// Once disposed, this counts only late registrations, which this
    /// instance will never release.
    pub fn dependent_count(&self) -> usize {
        self.registry.len()
    }

    /// Concurrency mode chosen at construction.
    pub const fn mode(&self) -> ConcurrencyMode {
        self.registry.mode()
    }

    /// Label given at construction.
    pub const fn label(&self) -> Option<&ResourceLabel> {
        self.label.as_ref()
    }

    /// Identifier in the global monitor, when tracking was enabled.
    pub const fn tracking_id(&self) -> Option<&TrackingId> {
        self.tracking.as_ref()
    }

    /// The wrapped payload.
    pub const fn get(&self) -> &T {
        &self.payload
    }

    fn label_field(&self) -> &str {
        self.label.as_ref().map_or("<unlabelled>", |label| label.as_ref())
    }
}

struct MonitorRelease<'a> {
    id: Option<&'a TrackingId>,
    mode: DisposeMode,
}

impl Drop for MonitorRelease<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            global_monitor().release(id, self.mode);
        }
    }
}

impl<T: Cleanup> Deref for Disposable<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}

impl<T> Dispose for Disposable<T>
where
    T: Cleanup + Send + Sync,
{
    fn dispose(&self) -> DisposeResult<()> {
        Self::dispose(self)
    }

    fn finalize(&self) -> DisposeResult<()> {
        Self::finalize(self)
    }

    fn is_disposed(&self) -> bool {
        Self::is_disposed(self)
    }
}

impl<T: Cleanup> Drop for Disposable<T> {
    fn drop(&mut self) {
        if self.gate.is_finalize_suppressed() {
            return;
        }
        if let Err(error) = self.fire_dispose(DisposeMode::Implicit) {
            tracing::error!(
                label = self.label_field(),
                %error,
                "implicit disposal failed"
            );
        }
    }
}

impl<T: Cleanup + std::fmt::Debug> std::fmt::Debug for Disposable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("state", &self.gate.state())
            .field("label", &self.label)
            .field("registry", &self.registry)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
