//! Property test generators for disposal scenarios.
//!
//! These `proptest` strategies describe how a disposable graph is built and
//! how hard it is hammered: how many dependents, how many threads, and which
//! mix of explicit and implicit requests arrive.

use disposecore::{ConcurrencyMode, DisposeMode};
use proptest::prelude::*;

/// Number of dependents registered with one owner.
pub fn arb_dependent_count() -> impl Strategy<Value = usize> {
    0usize..24
}

/// Number of threads racing to dispose the same instance.
pub fn arb_thread_count() -> impl Strategy<Value = usize> {
    1usize..8
}

/// Either concurrency mode.
pub fn arb_concurrency_mode() -> impl Strategy<Value = ConcurrencyMode> {
    prop_oneof![Just(ConcurrencyMode::Unguarded), Just(ConcurrencyMode::Guarded)]
}

/// Which disposal path a single request takes.
pub fn arb_dispose_mode() -> impl Strategy<Value = DisposeMode> {
    prop_oneof![Just(DisposeMode::Explicit), Just(DisposeMode::Implicit)]
}

/// A non-empty sequence of disposal requests.
///
/// # Example
/// ```rust,ignore
/// use proptest::prelude::*;
/// use disposecore_testing::generators::arb_dispose_requests;
///
/// proptest! {
///     #[test]
///     fn cleanup_runs_once(requests in arb_dispose_requests()) {
///         // issue every request, then count cleanups
///     }
/// }
/// ```
pub fn arb_dispose_requests() -> impl Strategy<Value = Vec<DisposeMode>> {
    prop::collection::vec(arb_dispose_mode(), 1..16)
}
