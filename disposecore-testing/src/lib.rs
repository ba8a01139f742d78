//! Testing utilities for the `DisposeCore` disposal library.
//!
//! - [`probe`]: payloads that record when and how they were cleaned up
//! - [`assertions`]: checks for teardown order and exactly-once release
//! - [`generators`]: `proptest` strategies for disposal scenarios
//! - [`contract`]: a reusable behavioral suite for any `Dispose` type
//! - [`logging`]: tracing output for test runs

#![forbid(unconditional_recursion, unsafe_code)]
#![deny(
    bad_style,
    non_ascii_idents,
    rust_2018_idioms,
    unused_imports,
    unused_must_use
)]

pub mod assertions;
pub mod contract;
pub mod generators;
pub mod logging;
pub mod probe;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use disposecore_testing::prelude::*;
/// ```
pub mod prelude {
    pub use super::assertions::*;
    pub use super::generators::*;
    pub use super::logging::init_test_logging;
    pub use super::probe::*;
}
