use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};

use mentorhub_mentorship::QuestionUpdate;

use crate::app::dto::{self, CreateQuestionRequest, PageQuery, QuestionPath};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub fn router() -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/:id", get(get_question).patch(update_question))
}

pub async fn create_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<CreateQuestionRequest>,
) -> Result<Response, ApiError> {
    let question = services.create_question(&principal, body).await?;
    Ok(dto::envelope(StatusCode::CREATED, "Question created successfully", question))
}

pub async fn list_questions(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Response, ApiError> {
    let page = services.list_questions(query.pagination()).await?;
    Ok(dto::envelope(StatusCode::OK, "Questions retrieved successfully", page))
}

pub async fn get_question(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedPath(path): ValidatedPath<QuestionPath>,
) -> Result<Response, ApiError> {
    let question = services.get_question(path.id).await?;
    Ok(dto::envelope(StatusCode::OK, "Question retrieved successfully", question))
}

pub async fn update_question(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedPath(path): ValidatedPath<QuestionPath>,
    ValidatedJson(update): ValidatedJson<QuestionUpdate>,
) -> Result<Response, ApiError> {
    let question = services.update_question(&principal, path.id, update).await?;
    Ok(dto::envelope(StatusCode::OK, "Question updated successfully", question))
}
