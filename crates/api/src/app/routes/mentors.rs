use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Router,
};

use mentorhub_mentorship::MentorProfileUpdate;

use crate::app::dto::{self, ChangePasswordRequest, MentorPath, PageQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub fn public() -> Router {
    Router::new()
        .route("/mentors", get(list_mentors))
        .route("/mentors/:id", get(get_mentor))
}

pub fn protected() -> Router {
    Router::new()
        .route("/mentors/change-password", put(change_password))
        .route("/mentors/update-profile", put(update_profile))
}

pub async fn list_mentors(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_mentors(query.pagination()).await?;
    Ok(dto::envelope(StatusCode::OK, "Mentors retrieved successfully", page))
}

pub async fn get_mentor(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedPath(path): ValidatedPath<MentorPath>,
) -> Result<Response, ApiError> {
    let mentor = services.get_mentor(path.id).await?;
    Ok(dto::envelope(StatusCode::OK, "Mentor retrieved successfully", mentor))
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    services.change_password(&principal, body).await?;
    Ok(dto::envelope(StatusCode::OK, "Password changed successfully", serde_json::Value::Null))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(update): ValidatedJson<MentorProfileUpdate>,
) -> Result<Response, ApiError> {
    let record = services.update_mentor_profile(&principal, update).await?;
    Ok(dto::envelope(StatusCode::OK, "Profile updated successfully", record))
}
