mod api;
mod middleware;

use std::sync::Arc;

use shopaudit_vision::VisionClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(shopaudit_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let keywords = Arc::new(shopaudit_core::load_keywords_or_default(
        config.keywords_path.as_deref(),
    )?);
    tracing::info!(brand = %keywords.brand, "brand keywords loaded");

    let vision = match config.vision_api_key.as_deref() {
        Some(key) => Some(Arc::new(VisionClient::with_base_url(
            key,
            config.vision_request_timeout_secs,
            config.vision_max_retries,
            config.vision_retry_backoff_base_ms,
            &config.vision_base_url,
        )?)),
        None => {
            tracing::warn!("VISION_API_KEY not set; /api/v1/detection/analyze will answer 503");
            None
        }
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        shopaudit_core::Environment::Development
    ))?;
    let rate_limit = rate_limit_state(&config);
    let app = build_app(
        AppState {
            config: Arc::clone(&config),
            keywords,
            vision,
        },
        auth,
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "shopaudit-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
