use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,image_relay=debug,tower_http=info";

/// Install the global fmt subscriber, writing structured logs to stderr.
///
/// Honors `RUST_LOG`. Calling it twice is harmless; the second call is ignored.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("logging initialized");
    }
}
