use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use retail_analytics::app;
use retail_analytics::config::{AppConfig, SalesSource};
use retail_analytics::external::fallback_provider::FallbackSalesProvider;
use retail_analytics::external::graphql::GraphQlProvider;
use retail_analytics::external::mock::MockSalesProvider;
use retail_analytics::external::pos_api::PosApiProvider;
use retail_analytics::external::sales_provider::SalesProvider;
use retail_analytics::logging::{init_logging, LoggingConfig};
use retail_analytics::services::failure_cache::FailureCache;
use retail_analytics::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let primary: Box<dyn SalesProvider> = match config.sales_source {
        SalesSource::Rest => {
            tracing::info!("Using REST point-of-sale backend at {}", config.pos_api_url);
            Box::new(
                PosApiProvider::new(config.pos_api_url.clone(), config.upstream_timeout)
                    .context("failed to create POS API client")?,
            )
        }
        SalesSource::GraphQl => {
            tracing::info!("Using GraphQL backend at {}/api/graphql", config.pos_api_url);
            Box::new(
                GraphQlProvider::new(&config.pos_api_url, config.upstream_timeout)
                    .context("failed to create GraphQL client")?,
            )
        }
    };

    if config.mock_fallback {
        tracing::info!("Mock data fallback enabled");
    }

    let failure_cache = FailureCache::new(config.failure_ttl);
    let provider = FallbackSalesProvider::new(
        primary,
        MockSalesProvider::new(),
        failure_cache.clone(),
        config.mock_fallback,
    );

    let state = AppState {
        sales_provider: Arc::new(provider),
        failure_cache: failure_cache.clone(),
    };

    // Drop expired failure entries so the cache does not grow with every SKU ever tried
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            failure_cache.cleanup_expired();
        }
    });

    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Retail analytics backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
