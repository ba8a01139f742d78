//! Log output for test runs.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default
/// `disposecore=debug`) that writes through the test harness capture.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("disposecore=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
