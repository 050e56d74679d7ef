//! Validated extractors.
//!
//! Body, query string and path parameters all go through the same
//! [`Schema`](mentorhub_core::Schema) interpreter: the raw input is turned into a
//! JSON object, validated and normalised, and only then deserialised into the
//! handler's type. Rejections use the standard error envelope.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use mentorhub_core::{DomainError, Schema};

use crate::app::errors::ApiError;

/// Types that declare the schema their raw input must satisfy.
pub trait HasSchema {
    fn schema() -> Schema;
}

/// Run `T`'s schema over `raw` and deserialise the normalised result.
pub fn validate_into<T>(raw: &Value, source: &'static str) -> Result<T, ApiError>
where
    T: DeserializeOwned + HasSchema,
{
    let normalised = T::schema().validate(raw).map_err(|violations| {
        tracing::warn!(
            source,
            fields = ?violations.iter().map(|v| v.field.as_str()).collect::<Vec<_>>(),
            "request validation failed"
        );
        ApiError::Validation(violations)
    })?;

    serde_json::from_value(Value::Object(normalised)).map_err(|e| {
        tracing::warn!(source, error = %e, "validated input did not deserialize");
        DomainError::validation(format!("invalid {source}: {e}")).into()
    })
}

fn strings_to_object(pairs: HashMap<String, String>) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<Map<_, _>>(),
    )
}

/// JSON body validated against `T::schema()`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + HasSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|e| {
            tracing::warn!(error = %e, "JSON extraction failed");
            ApiError::from(DomainError::validation("request body must be valid JSON"))
        })?;
        validate_into(&value, "body").map(ValidatedJson)
    }
}

/// Query string validated against `T::schema()`.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + HasSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "query extraction failed");
                ApiError::from(DomainError::validation("query string is malformed"))
            })?;
        validate_into(&strings_to_object(pairs), "query").map(ValidatedQuery)
    }
}

/// Path parameters validated against `T::schema()`.
#[derive(Debug, Clone)]
pub struct ValidatedPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + HasSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "path extraction failed");
                ApiError::from(DomainError::validation("path parameters are malformed"))
            })?;
        validate_into(&strings_to_object(params), "path").map(ValidatedPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorhub_core::Rule;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        page: Option<u32>,
        limit: Option<u32>,
    }

    impl HasSchema for Paging {
        fn schema() -> Schema {
            Schema::new()
                .field("page", "Page", [Rule::Integer { min: Some(1), max: None }])
                .field("limit", "Limit", [Rule::Integer { min: Some(1), max: Some(100) }])
        }
    }

    #[test]
    fn query_strings_are_coerced_to_integers() {
        let raw = strings_to_object(HashMap::from([
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), " 10 ".to_string()),
        ]));
        let paging: Paging = validate_into(&raw, "query").unwrap();
        assert_eq!(paging, Paging { page: Some(2), limit: Some(10) });
    }

    #[test]
    fn out_of_range_and_unknown_values_are_rejected() {
        let err = validate_into::<Paging>(&json!({ "limit": "0" }), "query").unwrap_err();
        let ApiError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        assert_eq!(violations[0].message, "Limit must be greater than or equal to 1");

        let err = validate_into::<Paging>(&json!({ "offset": "3" }), "query").unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
    }
}
