//! Tweet Pulse — Binary Entrypoint
//! Boots the Axum HTTP server: config, classifier, corpus cache, metrics.

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tweet_pulse::api::{self, AppState};
use tweet_pulse::config::AppConfig;
use tweet_pulse::telemetry::Metrics;

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
/// `try_init` keeps us quiet if the runtime already installed a subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tweet_pulse=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load_default()?;
    info!(
        provider = %config.classifier.provider,
        corpus = %config.corpus.path.display(),
        max_results = config.query.max_results,
        bucket_minutes = config.timeline.bucket_minutes,
        "config loaded"
    );

    let state = AppState::from_config(config)?;

    // Warm the corpus cache so the first request doesn't pay for the load.
    let n = state.corpus.items().await.len();
    info!(items = n, "corpus ready");

    let mut router = api::create_router(state);
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!("metrics disabled: {e:#}"),
    }

    Ok(router.into())
}
