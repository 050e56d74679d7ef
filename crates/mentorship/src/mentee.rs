use chrono::{DateTime, Utc};
use serde::Serialize;

use mentorhub_core::{Entity, MenteeId};

use crate::Account;

/// Mentee profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentee {
    #[serde(rename = "_id")]
    pub id: MenteeId,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mentee {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: MenteeId::new(),
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Mentee {
    const KIND: &'static str = "Mentee";
    type Id = MenteeId;

    fn id(&self) -> &MenteeId {
        &self.id
    }
}

/// A mentee's account together with its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenteeRecord {
    pub account: Account,
    pub mentee: Mentee,
}
