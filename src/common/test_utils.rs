use crate::gpu::Gpu;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Returns a dedicated GPU context for tests, or None when no adapter is available.
pub(crate) fn test_gpu() -> Option<Gpu> {
    match Gpu::new() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping test - no GPU available: {}", e);
            None
        }
    }
}
