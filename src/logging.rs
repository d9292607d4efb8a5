use tracing_subscriber::{EnvFilter, fmt};

/// Initializes the tracing subscriber for the binary.
///
/// The filter is taken from `RUST_LOG` when set (e.g. `RUST_LOG=debug` or
/// `RUST_LOG=courier_manager=trace`) and defaults to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes a verbose subscriber for tests. Safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
