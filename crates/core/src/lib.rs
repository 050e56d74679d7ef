//! `mentorhub-core`: shared domain primitives.
//!
//! Pure building blocks with no HTTP or storage concerns: identifiers, the error
//! taxonomy, and the declarative validation interpreter used by every route.

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::{Entity, not_found_message};
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, AnswerId, MenteeId, MentorId, QuestionId};
pub use validation::{FieldSchema, FieldViolation, Rule, Schema, Violation, ViolationKind};
