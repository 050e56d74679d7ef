use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentorhub_core::{AccountId, AnswerId, Entity, QuestionId};

/// An answer to a question.
///
/// Votes are plain counters; there is no per-account vote bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(rename = "_id")]
    pub id: AnswerId,
    pub question: QuestionId,
    pub author: AccountId,
    pub body: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question: QuestionId, author: AccountId, body: String, now: DateTime<Utc>) -> Self {
        Self {
            id: AnswerId::new(),
            question,
            author,
            body,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, account: AccountId) -> bool {
        self.author == account
    }

    pub fn edit(&mut self, body: String, now: DateTime<Utc>) {
        self.body = body;
        self.updated_at = now;
    }

    pub fn upvote(&mut self) {
        self.upvotes = self.upvotes.saturating_add(1);
    }

    pub fn downvote(&mut self) {
        self.downvotes = self.downvotes.saturating_add(1);
    }

    pub fn cast(&mut self, vote: Vote) {
        match vote {
            Vote::Up => self.upvote(),
            Vote::Down => self.downvote(),
        }
    }

    /// Net score used by [`AnswerSort::Votes`].
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

impl Entity for Answer {
    const KIND: &'static str = "Answer";
    type Id = AnswerId;

    fn id(&self) -> &AnswerId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

/// Listing order for answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSort {
    #[default]
    Newest,
    Oldest,
    Votes,
}

impl AnswerSort {
    pub const NAMES: &'static [&'static str] = &["newest", "oldest", "votes"];

    /// Sort answers in place. Ties on votes fall back to newest first.
    pub fn apply(self, answers: &mut [Answer]) {
        match self {
            AnswerSort::Newest => answers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
            AnswerSort::Oldest => answers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))),
            AnswerSort::Votes => answers.sort_by(|a, b| {
                b.score()
                    .cmp(&a.score())
                    .then(b.created_at.cmp(&a.created_at))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn answer_at(offset_secs: i64) -> Answer {
        Answer::new(
            QuestionId::new(),
            AccountId::new(),
            "body".into(),
            Utc::now() + Duration::seconds(offset_secs),
        )
    }

    #[test]
    fn votes_are_independent_counters() {
        let mut a = answer_at(0);
        a.upvote();
        a.cast(Vote::Up);
        a.cast(Vote::Down);
        assert_eq!((a.upvotes, a.downvotes), (2, 1));
        assert_eq!(a.score(), 1);
    }

    #[test]
    fn sort_orders() {
        let old = answer_at(-60);
        let mut mid = answer_at(-30);
        let new = answer_at(0);
        mid.upvote();

        let mut list = vec![old.clone(), new.clone(), mid.clone()];
        AnswerSort::Newest.apply(&mut list);
        assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![new.id, mid.id, old.id]);

        AnswerSort::Oldest.apply(&mut list);
        assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![old.id, mid.id, new.id]);

        AnswerSort::Votes.apply(&mut list);
        assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![mid.id, new.id, old.id]);
    }
}
