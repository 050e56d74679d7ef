//! HTTP API: router, middleware, validated extractors and handlers.

pub mod app;
pub mod context;
pub mod middleware;
pub mod validation;
