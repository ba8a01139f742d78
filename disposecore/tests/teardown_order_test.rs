use std::sync::{Arc, Barrier};
use std::thread;

use disposecore::{ConcurrencyMode, Disposable, DisposeError, DisposeMode, DisposeState};
use disposecore_testing::prelude::*;

/// Two threads explicitly dispose the same owner at the same moment. The
/// dependents go first, newest first, and the owner's hook runs once.
#[test]
fn concurrent_explicit_dispose_releases_dependents_in_reverse() {
    init_test_logging();

    // Given: owner A with dependents B then C
    let log = CleanupLog::new();
    let a = Arc::new(Disposable::with_mode(log.probe("A"), ConcurrencyMode::Guarded));
    a.also_dispose(Arc::new(Disposable::new(log.probe("B"))));
    a.also_dispose(Arc::new(Disposable::new(log.probe("C"))));
    let barrier = Arc::new(Barrier::new(2));

    // When: two threads dispose A simultaneously
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let a = Arc::clone(&a);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                a.dispose()
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .expect("disposing thread panicked")
            .expect("dispose succeeds");
    }

    // Then: C, B, then A's own cleanup, exactly once in total
    assert_reverse_teardown(&log, &["B", "C"], "A");
    assert_each_cleaned_once(&log);
    assert_eq!(a.calls(), 1);
    assert_all_in_mode(&log, DisposeMode::Explicit);
    assert_eq!(a.state(), DisposeState::Disposed);
}

/// Unguarded mode behaves exactly like guarded mode when used from one
/// thread.
#[test]
fn unguarded_and_guarded_agree_single_threaded() {
    init_test_logging();

    for mode in [ConcurrencyMode::Unguarded, ConcurrencyMode::Guarded] {
        let log = CleanupLog::new();
        let owner = Disposable::with_mode(log.probe("owner"), mode);
        let names = ["first", "second", "third", "fourth"];
        for name in names {
            owner.also_dispose(Arc::new(Disposable::new(log.probe(name))));
        }

        owner.dispose().expect("dispose succeeds");
        owner.dispose().expect("second dispose is absorbed");

        assert_reverse_teardown(&log, &names, "owner");
        assert_eq!(owner.mode(), mode);
    }
}

/// Nested owners tear down depth first: a dependent releases its own
/// dependents before itself, before the next older sibling.
#[test]
fn nested_graph_tears_down_depth_first() {
    let log = CleanupLog::new();
    let root = Disposable::new(log.probe("root"));
    let left = Arc::new(Disposable::new(log.probe("left")));
    let right = Arc::new(Disposable::new(log.probe("right")));
    right.also_dispose(Arc::new(Disposable::new(log.probe("right.0"))));
    right.also_dispose(Arc::new(Disposable::new(log.probe("right.1"))));
    root.also_dispose(left);
    root.also_dispose(right);

    root.dispose().expect("dispose succeeds");

    assert_eq!(
        log.names(),
        vec!["right.1", "right.0", "right", "left", "root"]
    );
}

/// A dependent shared by two owners is released once, by whichever owner
/// reaches it first.
#[test]
fn shared_dependent_released_once() {
    let log = CleanupLog::new();
    let shared = Arc::new(Disposable::new(log.probe("shared")));
    let first = Disposable::new(());
    let second = Disposable::new(());
    first.also_dispose(shared.clone());
    second.also_dispose(shared.clone());

    first.dispose().expect("dispose succeeds");
    second.dispose().expect("dispose succeeds");

    assert_eq!(log.count_of("shared"), 1);
    assert!(shared.is_disposed());
}

/// Registering after teardown completed is accepted, does not fail, and
/// does not release the late dependent.
#[test]
fn registration_after_disposal_is_not_retroactive() {
    let log = CleanupLog::new();
    let owner = Disposable::new(log.probe("owner"));
    owner.dispose().expect("dispose succeeds");

    let late = Arc::new(Disposable::new(log.probe("late")));
    owner.also_dispose(late.clone());
    owner.dispose().expect("absorbed");

    assert_eq!(log.names(), vec!["owner"]);
    assert!(!late.is_disposed());

    late.dispose().expect("caller releases the late dependent");
    assert_eq!(log.names(), vec!["owner", "late"]);
}

/// A failing dependent does not stop its siblings or the owner; all
/// failures come back to the caller that ran the teardown.
#[test]
fn failures_are_collected_after_full_teardown() {
    let log = CleanupLog::new();
    let owner = Disposable::new(log.failing_probe("owner", "owner broke"));
    owner.also_dispose(Arc::new(Disposable::new(log.probe("a"))));
    owner.also_dispose(Arc::new(Disposable::new(log.failing_probe("b", "b broke"))));
    owner.also_dispose(Arc::new(Disposable::new(log.probe("c"))));

    let error = owner.dispose().expect_err("failures are reported");

    assert_eq!(log.names(), vec!["c", "b", "a", "owner"]);
    match error {
        DisposeError::Teardown(failures) => {
            let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
            assert_eq!(
                messages,
                vec!["cleanup failed: b broke", "cleanup failed: owner broke"]
            );
        }
        other => panic!("expected Teardown, got {other:?}"),
    }
    assert!(owner.is_disposed());
    assert!(owner.dispose().is_ok());
}

/// Guarded registrations racing each other all land and are all released.
#[test]
fn concurrent_guarded_registration_is_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let log = CleanupLog::new();
    let owner = Arc::new(Disposable::with_mode(log.probe("owner"), Some(true)));

    thread::scope(|scope| {
        for t in 0..THREADS {
            let owner = Arc::clone(&owner);
            let log = log.clone();
            let _ = scope.spawn(move || {
                for i in 0..PER_THREAD {
                    owner.also_dispose(Arc::new(Disposable::new(log.probe(format!("{t}.{i}")))));
                }
            });
        }
    });
    assert_eq!(owner.dependent_count(), THREADS * PER_THREAD);

    owner.dispose().expect("dispose succeeds");

    assert_eq!(log.len(), THREADS * PER_THREAD + 1);
    assert_each_cleaned_once(&log);
    assert_eq!(log.names().last().map(String::as_str), Some("owner"));
}
