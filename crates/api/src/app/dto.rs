use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use mentorhub_auth::PasswordPolicy;
use mentorhub_core::{AnswerId, MentorId, QuestionId, Rule, Schema, Violation};
use mentorhub_infra::Pagination;
use mentorhub_mentorship::{AnswerSort, MentorProfileUpdate, QuestionUpdate};

use crate::validation::HasSchema;

const NAME_MAX: usize = 100;
const TITLE_MAX: usize = 200;
const TEXT_MAX: usize = 5000;

const YEARS: Rule = Rule::Integer { min: Some(0), max: Some(80) };
const PAGE: Rule = Rule::Integer { min: Some(1), max: None };
const LIMIT: Rule = Rule::Integer { min: Some(1), max: Some(Pagination::MAX_LIMIT as i64) };

/// Password policy as a schema check: blank is "missing" (400), weak is "policy" (422).
fn password_policy(candidate: &str) -> Result<(), Violation> {
    PasswordPolicy::default().check(candidate).map_err(|v| {
        if v.is_missing() {
            Violation::missing(v.to_string())
        } else {
            Violation::policy(v.to_string())
        }
    })
}

/// Success envelope: `{statusCode, message, data}`.
pub fn envelope<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

// -------------------------
// Auth
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMentorRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub track: String,
    pub specialization: Option<String>,
    pub years_of_experience: Option<u32>,
    pub bio: Option<String>,
}

impl HasSchema for RegisterMentorRequest {
    fn schema() -> Schema {
        account_fields()
            .field("specialization", "Specialization", [Rule::Text, Rule::MaxLength(NAME_MAX)])
            .field("yearsOfExperience", "Years of experience", [YEARS])
            .field("bio", "Bio", [Rule::Text, Rule::MaxLength(TEXT_MAX)])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMenteeRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub track: String,
}

impl HasSchema for RegisterMenteeRequest {
    fn schema() -> Schema {
        account_fields()
    }
}

fn account_fields() -> Schema {
    Schema::new()
        .field("firstname", "Firstname", [Rule::Required, Rule::Text, Rule::MaxLength(NAME_MAX)])
        .field("lastname", "Lastname", [Rule::Required, Rule::Text, Rule::MaxLength(NAME_MAX)])
        .field("email", "Email", [Rule::Required, Rule::Email])
        .field(
            "password",
            "Password",
            [Rule::Required, Rule::Secret, Rule::Check(password_policy)],
        )
        .field("track", "Track", [Rule::Required, Rule::Text, Rule::MaxLength(NAME_MAX)])
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl HasSchema for LoginRequest {
    fn schema() -> Schema {
        Schema::new()
            .field("email", "Email", [Rule::Required, Rule::Email])
            .field("password", "Password", [Rule::Required, Rule::Secret])
    }
}

// -------------------------
// Mentors
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl HasSchema for ChangePasswordRequest {
    fn schema() -> Schema {
        Schema::new()
            .field("oldPassword", "Old password", [Rule::Required, Rule::Secret])
            .field(
                "newPassword",
                "New password",
                [Rule::Required, Rule::Secret, Rule::Check(password_policy)],
            )
    }
}

impl HasSchema for MentorProfileUpdate {
    fn schema() -> Schema {
        Schema::new()
            .field("firstname", "Firstname", [Rule::Text, Rule::MaxLength(NAME_MAX)])
            .field("lastname", "Lastname", [Rule::Text, Rule::MaxLength(NAME_MAX)])
            .field("track", "Track", [Rule::Text, Rule::MaxLength(NAME_MAX)])
            .field("specialization", "Specialization", [Rule::Text, Rule::MaxLength(NAME_MAX)])
            .field("yearsOfExperience", "Years of experience", [YEARS])
            .field("bio", "Bio", [Rule::Text, Rule::MaxLength(TEXT_MAX)])
    }
}

#[derive(Debug, Deserialize)]
pub struct MentorPath {
    pub id: MentorId,
}

impl HasSchema for MentorPath {
    fn schema() -> Schema {
        Schema::new().field("id", "Id", [Rule::Required, Rule::Uuid])
    }
}

// -------------------------
// Paging
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

impl HasSchema for PageQuery {
    fn schema() -> Schema {
        Schema::new()
            .field("page", "Page", [PAGE])
            .field("limit", "Limit", [LIMIT])
    }
}

// -------------------------
// Questions
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl HasSchema for CreateQuestionRequest {
    fn schema() -> Schema {
        Schema::new()
            .field("title", "Title", [Rule::Required, Rule::Text, Rule::MaxLength(TITLE_MAX)])
            .field("body", "Body", [Rule::Required, Rule::Text, Rule::MaxLength(TEXT_MAX)])
            .field("tags", "Tags", [Rule::TextList])
    }
}

impl HasSchema for QuestionUpdate {
    fn schema() -> Schema {
        Schema::new()
            .field("title", "Title", [Rule::Text, Rule::MaxLength(TITLE_MAX)])
            .field("body", "Body", [Rule::Text, Rule::MaxLength(TEXT_MAX)])
            .field("tags", "Tags", [Rule::TextList])
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionPath {
    pub id: QuestionId,
}

impl HasSchema for QuestionPath {
    fn schema() -> Schema {
        Schema::new().field("id", "Id", [Rule::Required, Rule::Uuid])
    }
}

// -------------------------
// Answers
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    pub question_id: QuestionId,
    pub body: String,
}

impl HasSchema for CreateAnswerRequest {
    fn schema() -> Schema {
        Schema::new()
            .field("questionId", "Question id", [Rule::Required, Rule::Uuid])
            .field("body", "Body", [Rule::Required, Rule::Text, Rule::MaxLength(TEXT_MAX)])
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAnswerRequest {
    pub body: String,
}

impl HasSchema for UpdateAnswerRequest {
    fn schema() -> Schema {
        Schema::new().field("body", "Body", [Rule::Required, Rule::Text, Rule::MaxLength(TEXT_MAX)])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerListQuery {
    pub question_id: Option<QuestionId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort: AnswerSort,
}

impl AnswerListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

impl HasSchema for AnswerListQuery {
    fn schema() -> Schema {
        Schema::new()
            .field("questionId", "Question id", [Rule::Uuid])
            .field("page", "Page", [PAGE])
            .field("limit", "Limit", [LIMIT])
            .field("sort", "Sort", [Rule::Text, Rule::OneOf(AnswerSort::NAMES)])
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerPath {
    pub id: AnswerId,
}

impl HasSchema for AnswerPath {
    fn schema() -> Schema {
        Schema::new().field("id", "Id", [Rule::Required, Rule::Uuid])
    }
}

// -------------------------
// Responses
// -------------------------

/// `data` of a successful registration or login.
#[derive(Debug, Serialize)]
pub struct SessionView<U> {
    pub token: String,
    pub user: U,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::errors::ApiError;
    use crate::validation::validate_into;

    fn mentor_body() -> serde_json::Value {
        json!({
            "firstname": "John",
            "lastname": "Doe",
            "email": "JohnDoe@Test.com",
            "password": "Securepassword1@",
            "track": "SRE",
            "specialization": "DevOps",
            "yearsOfExperience": 5,
        })
    }

    fn first_violation(err: ApiError) -> (u16, String) {
        let status = err.status().as_u16();
        match err {
            ApiError::Validation(v) => (status, v[0].message.clone()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn registration_body_is_normalised() {
        let req: RegisterMentorRequest = validate_into(&mentor_body(), "body").unwrap();
        assert_eq!(req.email, "johndoe@test.com");
        assert_eq!(req.years_of_experience, Some(5));
        assert_eq!(req.password, "Securepassword1@");
    }

    #[test]
    fn blank_required_fields_report_their_label() {
        for (field, label) in [
            ("firstname", "Firstname"),
            ("lastname", "Lastname"),
            ("email", "Email"),
            ("password", "Password"),
            ("track", "Track"),
        ] {
            let mut body = mentor_body();
            body[field] = json!("");
            let err = validate_into::<RegisterMentorRequest>(&body, "body").unwrap_err();
            assert_eq!(first_violation(err), (400, format!("{label} is required")));
        }
    }

    #[test]
    fn weak_passwords_are_policy_violations() {
        for weak in ["password", "PASSWORD", "Password", "Password1"] {
            let mut body = mentor_body();
            body["password"] = json!(weak);
            let err = validate_into::<RegisterMentorRequest>(&body, "body").unwrap_err();
            assert_eq!(
                first_violation(err),
                (
                    422,
                    "password must contain uppercase, lowercase, number and special character"
                        .to_string()
                )
            );
        }
    }

    #[test]
    fn answer_query_rejects_unknown_sort() {
        let err = validate_into::<AnswerListQuery>(&json!({ "sort": "bogus" }), "query").unwrap_err();
        assert_eq!(
            first_violation(err),
            (400, "Sort must be one of [newest, oldest, votes]".to_string())
        );

        let q: AnswerListQuery = validate_into(&json!({ "sort": "votes" }), "query").unwrap();
        assert_eq!(q.sort, AnswerSort::Votes);
        assert_eq!(q.pagination(), Pagination::default());
    }

    #[test]
    fn path_ids_must_be_uuids() {
        let err = validate_into::<QuestionPath>(&json!({ "id": "42" }), "path").unwrap_err();
        assert_eq!(first_violation(err), (400, "Id must be a valid id".to_string()));
    }
}
