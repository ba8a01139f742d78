//! Scope-bound disposal helpers.
//!
//! [`DisposeScope`] releases a resource explicitly when the scope that owns
//! it ends, including on early return and unwinding. [`DisposeFn`] turns a
//! one-shot closure into a dependent that can be registered with
//! [`Disposable::also_dispose`](crate::Disposable::also_dispose).

use std::fmt;
use std::ops::Deref;
use std::sync::Mutex;

use crate::disposable::Dispose;
use crate::errors::DisposeResult;
use crate::lock_zone::MutexRecovery;

/// Explicitly disposes its resource when dropped.
///
/// Unlike the implicit safety net, the release performed here is a normal
/// explicit `dispose()`. Call [`DisposeScope::release`] to dispose early and
/// observe the result; a failure during the drop-time release is logged.
pub struct DisposeScope<D: Dispose> {
    resource: Option<D>,
}

impl<D: Dispose> DisposeScope<D> {
    /// Create a new scope around `resource`
    pub const fn new(resource: D) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    /// Dispose the resource now and end the scope.
    pub fn release(mut self) -> DisposeResult<()> {
        match self.resource.take() {
            Some(resource) => resource.dispose(),
            None => Ok(()),
        }
    }

    /// End the scope without disposing, handing the resource back.
    pub fn into_inner(mut self) -> Option<D> {
        self.resource.take()
    }

    /// Access the resource within the scope
    pub const fn get(&self) -> Option<&D> {
        self.resource.as_ref()
    }
}

impl<D: Dispose> Deref for DisposeScope<D> {
    type Target = D;

    fn deref(&self) -> &Self::Target {
        // `resource` is only emptied by methods that consume the scope.
        match &self.resource {
            Some(resource) => resource,
            None => unreachable!("scope resource is present until the scope is consumed"),
        }
    }
}

impl<D: Dispose> Drop for DisposeScope<D> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            if let Err(error) = resource.dispose() {
                tracing::error!(%error, "scoped disposal failed");
            }
        }
    }
}

impl<D: Dispose + fmt::Debug> fmt::Debug for DisposeScope<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeScope")
            .field("resource", &self.resource)
            .finish()
    }
}

/// Extension trait for wrapping disposables in a scope.
pub trait DisposeExt: Dispose + Sized {
    /// Dispose `self` explicitly when the returned scope ends.
    fn scoped(self) -> DisposeScope<Self> {
        DisposeScope::new(self)
    }
}

impl<D: Dispose> DisposeExt for D {}

/// A closure that runs at most once when disposed.
pub struct DisposeFn<F> {
    action: Mutex<Option<F>>,
}

impl<F> DisposeFn<F>
where
    F: FnOnce() -> DisposeResult<()> + Send,
{
    /// Wrap `action`
    pub const fn new(action: F) -> Self {
        Self {
            action: Mutex::new(Some(action)),
        }
    }
}

/// Shorthand for [`DisposeFn::new`].
pub const fn dispose_fn<F>(action: F) -> DisposeFn<F>
where
    F: FnOnce() -> DisposeResult<()> + Send,
{
    DisposeFn::new(action)
}

impl<F> Dispose for DisposeFn<F>
where
    F: FnOnce() -> DisposeResult<()> + Send,
{
    fn dispose(&self) -> DisposeResult<()> {
        let action = self.action.lock_recover().take();
        action.map_or(Ok(()), |action| action())
    }

    fn is_disposed(&self) -> bool {
        self.action.lock_recover().is_none()
    }
}

impl<F> fmt::Debug for DisposeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeFn")
            .field("pending", &self.action.lock_recover().is_some())
            .finish()
    }
}
