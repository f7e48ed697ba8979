use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber; RUST_LOG overrides the defaults.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nl_sql=info,tower_http=info"));

    fmt().with_env_filter(env_filter).with_target(true).init();
}
