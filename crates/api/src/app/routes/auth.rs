use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::app::dto::{self, LoginRequest, RegisterMenteeRequest, RegisterMentorRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::validation::ValidatedJson;

pub fn public() -> Router {
    Router::new()
        .route("/auth/mentor", post(register_mentor))
        .route("/auth/mentee", post(register_mentee))
        .route("/auth/login", post(login))
}

pub fn protected() -> Router {
    Router::new().route("/auth/me", get(me))
}

pub async fn register_mentor(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedJson(body): ValidatedJson<RegisterMentorRequest>,
) -> Result<Response, ApiError> {
    let session = services.register_mentor(body).await?;
    Ok(dto::envelope(StatusCode::CREATED, "Mentor created successfully", session))
}

pub async fn register_mentee(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedJson(body): ValidatedJson<RegisterMenteeRequest>,
) -> Result<Response, ApiError> {
    let session = services.register_mentee(body).await?;
    Ok(dto::envelope(StatusCode::CREATED, "Mentee created successfully", session))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = services.login(body).await?;
    Ok(dto::envelope(StatusCode::OK, "Login successful", session))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let member = services.me(&principal).await?;
    Ok(dto::envelope(StatusCode::OK, "Account retrieved successfully", member))
}
