//! Tracing initialization for tests

use once_cell::sync::Lazy;

static INIT: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Initializes the tracing subscriber once for the whole test binary
pub fn init() {
    Lazy::force(&INIT);
}
