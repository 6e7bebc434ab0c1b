use std::net::SocketAddr;
use std::sync::Arc;

use triplix_api::{
    config::Config,
    db::{create_redis_client, Cache, CacheWriterHandle},
    routes::{create_router, AppState},
    services::generative::{DisabledModel, GeminiClient, GenerativeModel},
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let model: Arc<dyn GenerativeModel> = match GeminiClient::from_config(&config)? {
        Some(client) => {
            tracing::info!(model = %config.gemini_model, "Generative model enabled");
            Arc::new(client)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, running with heuristic fallbacks only");
            Arc::new(DisabledModel)
        }
    };

    let (cache, cache_writer) = connect_cache(&config).await?;

    let state = Arc::new(AppState::new(model, cache, config.cache_ttl_secs));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_cache(config: &Config) -> anyhow::Result<(Option<Cache>, Option<CacheWriterHandle>)> {
    let Some(redis_url) = config.redis_url.as_deref().filter(|url| !url.trim().is_empty()) else {
        tracing::info!("REDIS_URL not set, model response caching disabled");
        return Ok((None, None));
    };

    let client = create_redis_client(redis_url)?;
    let (cache, handle) = Cache::new(client).await;
    tracing::info!(ttl_secs = config.cache_ttl_secs, "Model response cache enabled");
    Ok((Some(cache), Some(handle)))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
