//! Error types for DisposeCore.
//!
//! Disposal itself has almost no fallible paths: repeated dispose requests
//! are absorbed by the idempotence gate and poisoned locks are recovered.
//! The only failures that surface come from cleanup hooks, either the
//! owner's own hook or one of its registered dependents.
//!
//! # Error Categories
//!
//! - **CleanupFailed**: a hook reported that it could not release its state
//! - **Io**: a hook wrapping an OS handle failed while closing it
//! - **Teardown**: several hooks failed during one teardown pass
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use disposecore::errors::{DisposeError, DisposeResult};
//!
//! fn close_socket(socket: &Socket) -> DisposeResult<()> {
//!     socket.shutdown().map_err(DisposeError::from)
//! }
//! ```

use thiserror::Error;

/// Errors reported by a teardown pass.
///
/// A failing dependent never aborts teardown: every dependent is attempted
/// and the owner's own hook still runs. The failures are collected and
/// reported together once the pass has finished.
#[derive(Debug, Error)]
pub enum DisposeError {
    /// A cleanup hook could not release its state.
    #[error("cleanup failed: {0}")]
    CleanupFailed(String),

    /// An I/O operation failed while releasing an OS resource.
    #[error("I/O error during cleanup: {0}")]
    Io(#[from] std::io::Error),

    /// More than one hook failed during a single teardown pass.
    ///
    /// Errors are kept in the order they occurred.
    #[error("{} failures during teardown", .0.len())]
    Teardown(Vec<DisposeError>),
}

impl DisposeError {
    /// Folds the failures of one teardown pass into a single result.
    pub(crate) fn collect(mut failures: Vec<Self>) -> DisposeResult<()> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Self::Teardown(failures)),
        }
    }

    /// Number of individual hook failures this error represents.
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Teardown(failures) => failures.iter().map(Self::failure_count).sum(),
            Self::CleanupFailed(_) | Self::Io(_) => 1,
        }
    }
}

/// Type alias for disposal results
pub type DisposeResult<T> = Result<T, DisposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_without_failures_is_ok() {
        assert!(DisposeError::collect(Vec::new()).is_ok());
    }

    #[test]
    fn collect_single_failure_is_returned_as_is() {
        let result = DisposeError::collect(vec![DisposeError::CleanupFailed("socket".into())]);

        match result {
            Err(DisposeError::CleanupFailed(message)) => assert_eq!(message, "socket"),
            other => panic!("expected CleanupFailed, got {other:?}"),
        }
    }

    #[test]
    fn collect_many_failures_keeps_order() {
        let result = DisposeError::collect(vec![
            DisposeError::CleanupFailed("first".into()),
            DisposeError::CleanupFailed("second".into()),
        ]);

        let Err(DisposeError::Teardown(failures)) = result else {
            panic!("expected Teardown error");
        };
        let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["cleanup failed: first", "cleanup failed: second"]
        );
    }

    #[test]
    fn failure_count_flattens_nested_teardowns() {
        let nested = DisposeError::Teardown(vec![
            DisposeError::CleanupFailed("a".into()),
            DisposeError::Teardown(vec![
                DisposeError::CleanupFailed("b".into()),
                DisposeError::Io(std::io::Error::other("c")),
            ]),
        ]);

        assert_eq!(nested.failure_count(), 3);
        assert_eq!(nested.to_string(), "2 failures during teardown");
    }
}
