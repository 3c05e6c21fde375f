//! Application startup and lifecycle management.

use crate::config::{ProviderKind, RelayConfig};
use crate::handlers::{
    chat, generate, generate_mock, health_check, llm_recommendation, not_found, readiness_check,
};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, request_id_middleware};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub text_provider: Arc<dyn TextProvider>,
}

/// Construct the provider selected by configuration.
pub fn build_provider(config: &RelayConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    let provider: Arc<dyn TextProvider> = match config.provider {
        ProviderKind::Gemini => {
            let gemini_config = GeminiConfig {
                api_key: config.gemini.api_key.clone(),
                api_base: config.gemini.api_base.clone(),
                text_model: config.gemini.text_model.clone(),
                chat_model: config.gemini.chat_model.clone(),
                timeout: Duration::from_secs(config.gemini.timeout_secs),
            };
            let provider = GeminiTextProvider::new(gemini_config).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
            })?;

            tracing::info!(
                text_model = %config.gemini.text_model,
                chat_model = %config.gemini.chat_model,
                "Initialized Gemini text provider"
            );
            Arc::new(provider)
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock text provider; no requests will reach Gemini");
            Arc::new(MockTextProvider::new())
        }
    };

    Ok(provider)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/generate", post(generate))
        .route("/api/generate-bard", post(generate_mock))
        .route("/api/chat", post(chat))
        .route("/api/llm-recommendation", post(llm_recommendation))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the provider named in `config`.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build around an already constructed provider.
    pub async fn build_with_provider(
        config: RelayConfig,
        text_provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let address = config.common.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            provider = text_provider.name(),
            "Prompt relay listening on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router: build_router(AppState { text_provider }),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
