//! Dispose contract suite entry point.
//!
//! Every `Dispose` implementation shipped by disposecore runs the same
//! behavioral suite; new scenarios added to the macro apply to all of them.

use disposecore_testing::contract::dispose_contract_tests;

dispose_contract_tests! {
    suite = unguarded_disposable,
    make_resource = disposecore::Disposable::new,
}

dispose_contract_tests! {
    suite = guarded_disposable,
    make_resource = |counter| {
        disposecore::Disposable::with_mode(counter, disposecore::ConcurrencyMode::Guarded)
    },
}

dispose_contract_tests! {
    suite = composite_with_dependent,
    make_resource = |counter| {
        let owner = disposecore::Disposable::new(());
        owner.also_dispose(std::sync::Arc::new(disposecore::Disposable::new(counter)));
        owner
    },
}

dispose_contract_tests! {
    suite = dispose_fn,
    make_resource = |counter: disposecore_testing::probe::EffectCounter| {
        disposecore::dispose_fn(move || {
            counter.record();
            Ok(())
        })
    },
}

dispose_contract_tests! {
    suite = shared_handle,
    make_resource = |counter| std::sync::Arc::new(disposecore::Disposable::new(counter)),
}
