//! Behavioral contract every [`Dispose`] implementation must satisfy.
//!
//! Each scenario takes a factory that builds a fresh resource around an
//! [`EffectCounter`]; the resource must record exactly one effect on the
//! counter when it is released. Invoke [`dispose_contract_tests!`] to turn
//! the whole suite into `#[test]` functions for a given factory.

use std::fmt;
use std::sync::{Arc, Barrier};
use std::thread;

use disposecore::Dispose;

use crate::probe::EffectCounter;

/// Threads used by the concurrent scenarios.
pub const CONTRACT_THREADS: usize = 8;

/// A contract scenario that did not hold.
#[derive(Debug)]
pub struct ContractTestFailure {
    scenario: &'static str,
    detail: String,
}

impl ContractTestFailure {
    fn new(scenario: &'static str, detail: impl Into<String>) -> Self {
        Self {
            scenario,
            detail: detail.into(),
        }
    }

    fn effects(scenario: &'static str, observed: usize) -> Self {
        Self::new(
            scenario,
            format!("expected exactly one cleanup effect, observed {observed}"),
        )
    }

    fn dispose_error(scenario: &'static str, error: &dyn fmt::Display) -> Self {
        Self::new(scenario, format!("dispose returned unexpected error: {error}"))
    }
}

impl fmt::Display for ContractTestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.scenario, self.detail)
    }
}

impl std::error::Error for ContractTestFailure {}

/// Result of one contract scenario.
pub type ContractTestResult = Result<(), ContractTestFailure>;

fn expect_single_effect(scenario: &'static str, counter: &EffectCounter) -> ContractTestResult {
    match counter.count() {
        1 => Ok(()),
        observed => Err(ContractTestFailure::effects(scenario, observed)),
    }
}

/// A live resource reports itself undisposed; a disposed one reports
/// itself disposed.
pub fn test_reports_disposed<F, D>(make_resource: F) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose,
{
    const SCENARIO: &str = "reports_disposed";
    let counter = EffectCounter::new();
    let resource = make_resource(counter.clone());

    if resource.is_disposed() {
        return Err(ContractTestFailure::new(
            SCENARIO,
            "fresh resource already reports disposed",
        ));
    }
    resource
        .dispose()
        .map_err(|error| ContractTestFailure::dispose_error(SCENARIO, &error))?;
    if !resource.is_disposed() {
        return Err(ContractTestFailure::new(
            SCENARIO,
            "resource does not report disposed after dispose()",
        ));
    }
    expect_single_effect(SCENARIO, &counter)
}

/// Repeated explicit requests release the resource once and never fail.
pub fn test_repeated_dispose_is_absorbed<F, D>(make_resource: F) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose,
{
    const SCENARIO: &str = "repeated_dispose_is_absorbed";
    let counter = EffectCounter::new();
    let resource = make_resource(counter.clone());

    for _ in 0..3 {
        resource
            .dispose()
            .map_err(|error| ContractTestFailure::dispose_error(SCENARIO, &error))?;
    }
    expect_single_effect(SCENARIO, &counter)
}

/// An implicit request after an explicit one is absorbed.
pub fn test_finalize_after_dispose_is_absorbed<F, D>(make_resource: F) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose,
{
    const SCENARIO: &str = "finalize_after_dispose_is_absorbed";
    let counter = EffectCounter::new();
    let resource = make_resource(counter.clone());

    resource
        .dispose()
        .map_err(|error| ContractTestFailure::dispose_error(SCENARIO, &error))?;
    resource
        .finalize()
        .map_err(|error| ContractTestFailure::dispose_error(SCENARIO, &error))?;
    expect_single_effect(SCENARIO, &counter)
}

/// Many threads racing explicit requests release the resource once.
pub fn test_concurrent_dispose_single_effect<F, D>(make_resource: F) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose + 'static,
{
    const SCENARIO: &str = "concurrent_dispose_single_effect";
    race(SCENARIO, make_resource, |_| false)
}

/// Threads racing a mix of explicit and implicit requests release the
/// resource once.
pub fn test_mixed_paths_single_effect<F, D>(make_resource: F) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose + 'static,
{
    const SCENARIO: &str = "mixed_paths_single_effect";
    race(SCENARIO, make_resource, |index| index % 2 == 1)
}

fn race<F, D>(
    scenario: &'static str,
    make_resource: F,
    implicit: impl Fn(usize) -> bool,
) -> ContractTestResult
where
    F: Fn(EffectCounter) -> D,
    D: Dispose + 'static,
{
    let counter = EffectCounter::new();
    let resource = Arc::new(make_resource(counter.clone()));
    let barrier = Arc::new(Barrier::new(CONTRACT_THREADS));

    let handles: Vec<_> = (0..CONTRACT_THREADS)
        .map(|index| {
            let resource = Arc::clone(&resource);
            let barrier = Arc::clone(&barrier);
            let implicit = implicit(index);
            thread::spawn(move || {
                let _ = barrier.wait();
                if implicit {
                    resource.finalize()
                } else {
                    resource.dispose()
                }
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| ContractTestFailure::new(scenario, "disposing thread panicked"))?
            .map_err(|error| ContractTestFailure::dispose_error(scenario, &error))?;
    }
    expect_single_effect(scenario, &counter)
}

/// Generates the full [`Dispose`] contract suite as a test module.
///
/// ```rust,ignore
/// use disposecore::Disposable;
/// use disposecore_testing::dispose_contract_tests;
///
/// dispose_contract_tests! {
///     suite = unguarded_disposable,
///     make_resource = |counter| Disposable::new(counter),
/// }
/// ```
#[macro_export]
macro_rules! dispose_contract_tests {
    (suite = $suite:ident, make_resource = $make_resource:expr $(,)?) => {
        mod $suite {
            use $crate::contract::{
                test_concurrent_dispose_single_effect, test_finalize_after_dispose_is_absorbed,
                test_mixed_paths_single_effect, test_repeated_dispose_is_absorbed,
                test_reports_disposed,
            };

            #[test]
            fn reports_disposed_contract() {
                test_reports_disposed($make_resource).expect("dispose contract failed");
            }

            #[test]
            fn repeated_dispose_is_absorbed_contract() {
                test_repeated_dispose_is_absorbed($make_resource)
                    .expect("dispose contract failed");
            }

            #[test]
            fn finalize_after_dispose_is_absorbed_contract() {
                test_finalize_after_dispose_is_absorbed($make_resource)
                    .expect("dispose contract failed");
            }

            #[test]
            fn concurrent_dispose_single_effect_contract() {
                test_concurrent_dispose_single_effect($make_resource)
                    .expect("dispose contract failed");
            }

            #[test]
            fn mixed_paths_single_effect_contract() {
                test_mixed_paths_single_effect($make_resource).expect("dispose contract failed");
            }
        }
    };
}

pub use crate::dispose_contract_tests;
