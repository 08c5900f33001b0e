use tracing_subscriber::EnvFilter;

/// Sends logs to stderr so stdout only carries the issuance summary.
/// `RUST_LOG` takes precedence over `debug`.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,kube_user_csr={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
