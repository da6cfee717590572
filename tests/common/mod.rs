use tracing_subscriber::EnvFilter;

// RUST_LOG=solrmap=trace shows parser dispatch
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
