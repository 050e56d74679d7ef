//! Infrastructure layer: configuration and persistent stores.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{
    AccountStore, AnswerFilter, AnswerStore, InMemoryStore, Paged, Pagination, PostgresStore,
    QuestionStore, StoreError, Stores,
};
