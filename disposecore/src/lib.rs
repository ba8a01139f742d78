//! `DisposeCore` - exactly-once resource disposal
//!
//! This library provides a disposal contract for resources that must be
//! released exactly once, no matter how many callers ask, from which thread,
//! or whether anyone asks at all:
//!
//! - an atomic idempotence gate decides which request runs the teardown;
//! - dependents registered with an owner are released before it, newest
//!   first;
//! - an optional lock zone serializes registration against teardown for
//!   instances shared across threads, and costs nothing when not requested;
//! - dropping an instance that was never disposed releases it implicitly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use disposecore::{Cleanup, ConcurrencyMode, Disposable, DisposeMode, DisposeResult};
//!
//! struct TempDir(&'static str);
//!
//! impl Cleanup for TempDir {
//!     fn cleanup(&self, mode: DisposeMode) -> DisposeResult<()> {
//!         if mode.is_disposing() {
//!             println!("removing {}", self.0);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let workspace = Arc::new(Disposable::with_mode(TempDir("work"), ConcurrencyMode::Guarded));
//! workspace.also_dispose(Arc::new(Disposable::new(TempDir("work/cache"))));
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| workspace.dispose());
//!     s.spawn(|| workspace.dispose());
//! });
//! assert!(workspace.is_disposed());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod disposable;
pub mod errors;
pub mod gate;
pub mod lock_zone;
pub mod monitor;
pub mod registry;
pub mod scope;

pub use config::{ConcurrencyMode, DisposeConfig, ResourceLabel};
pub use disposable::{Cleanup, Disposable, Dispose};
pub use errors::{DisposeError, DisposeResult};
pub use gate::{DisposeMode, DisposeState};
pub use lock_zone::LockZone;
pub use monitor::{global_monitor, DisposeMonitor, MonitorStats, PotentialLeak, TrackingId};
pub use scope::{dispose_fn, DisposeExt, DisposeFn, DisposeScope};
