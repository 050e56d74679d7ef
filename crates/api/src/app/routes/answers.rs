use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, patch},
    Router,
};

use mentorhub_infra::AnswerFilter;
use mentorhub_mentorship::Vote;

use crate::app::dto::{self, AnswerListQuery, AnswerPath, CreateAnswerRequest, UpdateAnswerRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

pub fn router() -> Router {
    Router::new()
        .route("/answers", get(list_answers).post(create_answer))
        .route("/answers/upvote/:id", patch(upvote_answer))
        .route("/answers/downvote/:id", patch(downvote_answer))
        .route("/answers/:id", get(get_answer).patch(update_answer))
}

pub async fn create_answer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedJson(body): ValidatedJson<CreateAnswerRequest>,
) -> Result<Response, ApiError> {
    let answer = services.create_answer(&principal, body).await?;
    Ok(dto::envelope(StatusCode::CREATED, "Answer created successfully", answer))
}

pub async fn list_answers(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedQuery(query): ValidatedQuery<AnswerListQuery>,
) -> Result<Response, ApiError> {
    let filter = AnswerFilter {
        question: query.question_id,
        sort: query.sort,
    };
    let page = services.list_answers(filter, query.pagination()).await?;
    Ok(dto::envelope(StatusCode::OK, "Answers retrieved successfully", page))
}

pub async fn get_answer(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedPath(path): ValidatedPath<AnswerPath>,
) -> Result<Response, ApiError> {
    let answer = services.get_answer(path.id).await?;
    Ok(dto::envelope(StatusCode::OK, "Answer retrieved successfully", answer))
}

pub async fn update_answer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    ValidatedPath(path): ValidatedPath<AnswerPath>,
    ValidatedJson(body): ValidatedJson<UpdateAnswerRequest>,
) -> Result<Response, ApiError> {
    let answer = services.update_answer(&principal, path.id, body.body).await?;
    Ok(dto::envelope(StatusCode::OK, "Answer updated successfully", answer))
}

pub async fn upvote_answer(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedPath(path): ValidatedPath<AnswerPath>,
) -> Result<Response, ApiError> {
    let answer = services.vote(path.id, Vote::Up).await?;
    Ok(dto::envelope(StatusCode::OK, "Answer upvoted successfully", answer))
}

pub async fn downvote_answer(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedPath(path): ValidatedPath<AnswerPath>,
) -> Result<Response, ApiError> {
    let answer = services.vote(path.id, Vote::Down).await?;
    Ok(dto::envelope(StatusCode::OK, "Answer downvoted successfully", answer))
}
