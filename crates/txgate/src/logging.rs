//! Tracing subscriber setup for the binary.

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    // Tracing may already be initialized by an embedding host.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_tolerated() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging after a second init");
    }
}
