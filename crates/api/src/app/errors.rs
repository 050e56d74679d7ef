use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use mentorhub_auth::{PasswordError, TokenError};
use mentorhub_core::{DomainError, FieldViolation, ViolationKind};
use mentorhub_infra::StoreError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Input failed schema validation; the first violation decides the status.
    #[error("request validation failed")]
    Validation(Vec<FieldViolation>),

    /// Detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(e) => domain_status(e),
            ApiError::Validation(violations) => match violations.first().map(|v| v.kind) {
                Some(ViolationKind::Policy) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::MissingField(_) | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::PolicyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::InvalidCredential | DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Domain(e) => json_error(status, e.to_string(), None),
            ApiError::Validation(violations) => {
                let message = violations
                    .first()
                    .map(|v| v.message.clone())
                    .unwrap_or_else(|| "Invalid request".to_string());
                json_error(status, message, Some(violations))
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                json_error(status, INTERNAL_MESSAGE, None)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => {
                DomainError::conflict(format!("{email} already exists")).into()
            }
            StoreError::NotFound(kind) => DomainError::not_found(format!("{kind} not found")).into(),
            StoreError::Backend(detail) => ApiError::internal(detail),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => ApiError::internal(detail),
            _ => DomainError::unauthorized(crate::middleware::INVALID_TOKEN).into(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Error envelope: `{statusCode, message, errors?}`.
pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
    errors: Option<Vec<FieldViolation>>,
) -> Response {
    let mut body = json!({
        "statusCode": status.as_u16(),
        "message": message.into(),
    });
    if let Some(errors) = errors {
        body["errors"] = json!(errors);
    }
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorhub_core::{Rule, Schema};

    #[test]
    fn domain_errors_map_to_their_status() {
        let cases = [
            (DomainError::missing("x"), 400),
            (DomainError::validation("x"), 400),
            (DomainError::policy("x"), 422),
            (DomainError::conflict("x"), 409),
            (DomainError::InvalidCredential, 401),
            (DomainError::unauthorized("x"), 401),
            (DomainError::forbidden("x"), 403),
            (DomainError::not_found("x"), 404),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status().as_u16(), status);
        }
    }

    #[test]
    fn validation_status_follows_first_violation() {
        fn strict(_: &str) -> Result<(), mentorhub_core::Violation> {
            Err(mentorhub_core::Violation::policy("too weak"))
        }
        let schema = Schema::new()
            .field("password", "Password", [Rule::Required, Rule::Secret, Rule::Check(strict)])
            .field("email", "Email", [Rule::Required, Rule::Email]);

        let violations = schema
            .validate(&json!({ "password": "abc" }))
            .unwrap_err();
        assert_eq!(ApiError::Validation(violations).status(), StatusCode::UNPROCESSABLE_ENTITY);

        let violations = schema.validate(&json!({ "password": "" })).unwrap_err();
        assert_eq!(ApiError::Validation(violations).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_backend_failures_are_internal() {
        let err = ApiError::from(StoreError::Backend("connection refused".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
