use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the current thread.
pub(crate) fn setup_fmt_tracing(level: &str) -> DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
