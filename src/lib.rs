//! # Themis - HTTP API Mock Server
//!
//! Themis answers HTTP requests on behalf of an API that only exists as a
//! description: a list of operations with their declared responses, examples
//! and schemas.
//!
//! ## Features
//!
//! - **Negotiation**: status code, media type and example chosen from the
//!   request, its `Accept` header and `Prefer` overrides
//! - **Synthesis**: bodies and headers generated from schemas, either static
//!   or randomized with `fake`
//! - **Validation**: requests checked against the declared shape; invalid
//!   requests get a client-error response
//! - **Health Checks**: `/_themis/health`, `/_themis/health/ready`,
//!   `/_themis/health/live`
//! - **Live Reload**: operations reloaded when their files change
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use themis::adapters::health_handler::HealthHandler;
//! use themis::adapters::http_handler::MockServerState;
//! use themis::adapters::router::OperationCatalog;
//! use themis::config::Settings;
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let catalog = Arc::new(RwLock::new(OperationCatalog::new(settings.operations)));
//!     let state = MockServerState::new(catalog.clone(), settings.mock);
//!     let app = themis::create_app(state, Arc::new(HealthHandler::new(catalog)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:4010").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: operation model, mock types and ports
//! - **Adapters**: negotiator, example generator, mocker, validator, router
//!   and HTTP handlers
//! - **Config**: settings layering, operation loading and live reload

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::health_handler::HealthHandler;
use crate::adapters::http_handler::{handle_mock_request, MockServerState};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum application: health endpoints under `/_themis`, every
/// other request goes to the mock handler.
pub fn create_app(state: MockServerState, health_handler: Arc<HealthHandler>) -> Router {
    let health_router: Router<MockServerState> = Router::new()
        .route("/_themis/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/_themis/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/_themis/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    Router::new()
        .merge(health_router)
        .fallback(handle_mock_request)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
