//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: the operations behind each route, over the stores
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs with their schemas, response envelope
//! - `errors.rs`: error taxonomy to status code + error envelope

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;

use mentorhub_infra::{AppConfig, Stores};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Uses Postgres when `database_url` is configured, in-memory stores otherwise.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let stores = match &config.database_url {
        Some(url) => Stores::postgres(url)
            .await
            .context("failed to initialise postgres stores")?,
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            Stores::in_memory()
        }
    };
    Ok(build_app_with(config, stores))
}

/// Build the router over explicit store handles.
pub fn build_app_with(config: &AppConfig, stores: Stores) -> Router {
    let services = Arc::new(services::AppServices::new(config, stores));
    let auth_state = middleware::AuthState {
        jwt: Arc::new(services.jwt().clone()),
    };

    // Protected routes: require a valid session token.
    let protected = routes::protected().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(services)),
        )
}
