use axum::{routing::get, Router};

pub mod answers;
pub mod auth;
pub mod mentors;
pub mod questions;
pub mod system;

/// Routes reachable without a session token.
pub fn public() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(auth::public())
        .merge(mentors::public())
}

/// Routes behind the auth middleware.
pub fn protected() -> Router {
    Router::new()
        .merge(auth::protected())
        .merge(mentors::protected())
        .merge(questions::router())
        .merge(answers::router())
}
