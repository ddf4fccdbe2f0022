use std::error::Error;

use ai_llm_service::telemetry;
use api::AppState;
use tracing::{Level, info};
use tracing_subscriber::{
    EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if present.
    // Deployments usually inject the environment directly.
    if let Err(err) = dotenvy::dotenv() {
        eprintln!("no .env loaded: {err}");
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,contextor=debug"))?;

    // Library-scoped layer for ai_llm_service, plain fmt for everything else.
    tracing_subscriber::registry()
        .with(env_filter.add_directive(telemetry::level_directive(Level::INFO)?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| {
                    !meta.target().starts_with(telemetry::TARGET_PREFIX)
                })),
        )
        .with(telemetry::layer())
        .init();

    let state = AppState::from_env()?;
    info!(
        catalog_records = state.catalog.len(),
        "application state initialized"
    );

    api::start(state).await?;

    Ok(())
}
