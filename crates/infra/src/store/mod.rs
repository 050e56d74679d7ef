//! Persistent stores for accounts, profiles, questions and answers.
//!
//! Each resource has an async trait; `InMemoryStore` (dev/tests) and
//! `PostgresStore` implement all of them. Email uniqueness is the only
//! cross-record constraint and is enforced by the store at creation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use mentorhub_core::{AccountId, AnswerId, MenteeId, MentorId, QuestionId};
use mentorhub_mentorship::{
    Account, Answer, AnswerSort, Mentee, MenteeRecord, Mentor, MentorRecord, Question, Vote,
};

pub mod in_memory;
pub mod postgres;
mod schema;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An account with this email already exists.
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    /// The record to update does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Page request for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.unwrap_or(defaults.page).max(1),
            limit: limit.unwrap_or(defaults.limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Slice an already-ordered collection down to this page.
    pub fn slice<T>(&self, items: Vec<T>) -> Paged<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        Paged::new(items, total, *self)
    }
}

/// One page of a listing plus enough metadata to fetch the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let has_more = pagination.offset() + (items.len() as u64) < total;
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
            has_more,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerFilter {
    pub question: Option<QuestionId>,
    pub sort: AnswerSort,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look an account up by (case-insensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Create a mentor account and profile atomically.
    ///
    /// Fails with `DuplicateEmail` if the email is taken; nothing is written then.
    async fn create_mentor(&self, account: Account, mentor: Mentor) -> Result<MentorRecord, StoreError>;

    /// Create a mentee account and profile atomically.
    async fn create_mentee(&self, account: Account, mentee: Mentee) -> Result<MenteeRecord, StoreError>;

    /// Persist changes to an existing account (password, names, track).
    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn get_mentor(&self, id: MentorId) -> Result<Option<MentorRecord>, StoreError>;

    async fn get_mentee(&self, id: MenteeId) -> Result<Option<MenteeRecord>, StoreError>;

    /// Persist changes to a mentor's account and profile together.
    async fn update_mentor(&self, record: &MentorRecord) -> Result<(), StoreError>;

    /// Mentors ordered by registration time, oldest first.
    async fn list_mentors(&self, page: Pagination) -> Result<Paged<MentorRecord>, StoreError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError>;

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StoreError>;

    async fn update_question(&self, question: &Question) -> Result<(), StoreError>;

    /// Questions ordered newest first.
    async fn list_questions(&self, page: Pagination) -> Result<Paged<Question>, StoreError>;
}

#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn insert_answer(&self, answer: &Answer) -> Result<(), StoreError>;

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StoreError>;

    async fn update_answer(&self, answer: &Answer) -> Result<(), StoreError>;

    async fn list_answers(&self, filter: AnswerFilter, page: Pagination) -> Result<Paged<Answer>, StoreError>;

    /// Atomically apply a vote; `None` if the answer does not exist.
    async fn vote(&self, id: AnswerId, vote: Vote) -> Result<Option<Answer>, StoreError>;
}

/// Store handles the application runs against.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub questions: Arc<dyn QuestionStore>,
    pub answers: Arc<dyn AnswerStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            accounts: store.clone(),
            questions: store.clone(),
            answers: store,
        }
    }

    /// Connect to Postgres and make sure the schema exists.
    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        let store = Arc::new(PostgresStore::connect(database_url).await?);
        store.ensure_schema().await?;
        Ok(Self {
            accounts: store.clone(),
            questions: store.clone(),
            answers: store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_inputs() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(1000)), Pagination { page: 1, limit: 100 });
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn slice_reports_has_more() {
        let page = Pagination::new(Some(1), Some(2)).slice(vec![1, 2, 3]);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 3);
        assert!(page.has_more);

        let last = Pagination::new(Some(2), Some(2)).slice(vec![1, 2, 3]);
        assert_eq!(last.items, vec![3]);
        assert!(!last.has_more);
    }
}
