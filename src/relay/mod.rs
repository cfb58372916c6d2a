//! HTTP relay for the AI mentor chat
//!
//! Exposes:
//! - GET  /api/status           - health check
//! - POST /api/ai-mentor        - single JSON reply, two-tier fallback
//! - POST /api/ai-mentor-stream - plain-text stream paced like typing,
//!   three-tier fallback
//!
//! The provider client and configuration are constructed once at startup
//! and injected through `AppState`; handlers hold no hidden globals.

mod handlers;
pub mod pacing;

use anyhow::Result;
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::provider::{GeminiClient, Provider};

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no API key is configured; every request then degrades
    /// straight to the canned tier.
    pub provider: Option<Arc<dyn Provider>>,
}

impl AppState {
    /// Build state from config, constructing the live client when a key
    /// is present.
    pub fn new(config: Config) -> Self {
        let provider = match GeminiClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn Provider>),
            Err(e) => {
                tracing::warn!(error = %e, "Live completions disabled, serving canned replies only");
                None
            }
        };
        Self::with_provider(config, provider)
    }

    /// Build state with an explicit provider (or none). Tests use this to
    /// substitute stubs.
    pub fn with_provider(config: Config, provider: Option<Arc<dyn Provider>>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(handlers::status_handler))
        .route("/api/ai-mentor", post(handlers::mentor_handler))
        .route("/api/ai-mentor-stream", post(handlers::mentor_stream_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn run(config: Config) -> Result<()> {
    let bind_address = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Mentor relay listening on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
