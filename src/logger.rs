use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`; a
/// workflow run with step debug logging enabled (`RUNNER_DEBUG=1`) gets
/// `debug` output without further configuration.
pub fn init() {
    let default_level = if std::env::var_os("RUNNER_DEBUG").is_some_and(|v| v == "1") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
