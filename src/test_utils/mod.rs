//! Test utilities for tmplpack.
//!
//! Shared by unit tests and the integration test suite (through the
//! `test-utils` feature).
//!
//! - [`init_test_logging`] - once-only tracing setup for tests
//! - [`TemplateFixture`] - writes template source trees with pinned
//!   modification times

pub mod fixtures;

pub use fixtures::TemplateFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, tests run
/// without a subscriber.
///
/// ```rust,no_run
/// tmplpack::test_utils::init_test_logging(None);
/// ```
///
/// ```bash
/// RUST_LOG=tmplpack=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
