//! Tracing subscriber initialisation.

use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::config::CheckoutConfig;

/// Installs the global subscriber: an `EnvFilter` built from
/// `config.log_level` and a plain or JSON fmt layer.
///
/// Fails if a global subscriber is already set.
pub fn init(config: &CheckoutConfig) -> Result<(), TryInitError> {
    if config.log_json {
        init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
    } else {
        init_with_layer(config, tracing_subscriber::fmt::layer().with_target(true))
    }
}

fn build_env_filter(config: &CheckoutConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_with_layer<L>(config: &CheckoutConfig, fmt_layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()
}
