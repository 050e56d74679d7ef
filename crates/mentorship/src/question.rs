use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentorhub_core::{AccountId, Entity, QuestionId};

/// A question posted by any account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    pub author: AccountId,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn new(
        author: AccountId,
        title: String,
        body: String,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QuestionId::new(),
            author,
            title,
            body,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, account: AccountId) -> bool {
        self.author == account
    }

    pub fn apply(&mut self, update: QuestionUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

impl Entity for Question {
    const KIND: &'static str = "Question";
    type Id = QuestionId;

    fn id(&self) -> &QuestionId {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_only_supplied_fields() {
        let author = AccountId::new();
        let mut q = Question::new(author, "Title".into(), "Body".into(), vec!["rust".into()], Utc::now());

        q.apply(
            QuestionUpdate { body: Some("New body".into()), ..Default::default() },
            Utc::now(),
        );

        assert_eq!(q.title, "Title");
        assert_eq!(q.body, "New body");
        assert_eq!(q.tags, vec!["rust".to_string()]);
        assert!(q.is_authored_by(author));
        assert!(!q.is_authored_by(AccountId::new()));
    }
}
