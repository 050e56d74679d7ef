use chrono::{DateTime, Utc};
use serde::Serialize;

use mentorhub_auth::Role;
use mentorhub_core::{AccountId, Entity, MenteeId, MentorId};

/// The profile record an account owns.
///
/// Serialises as the bare profile id, which is what the API exposes as `owner`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ProfileId {
    Mentor(MentorId),
    Mentee(MenteeId),
}

impl ProfileId {
    pub fn role(&self) -> Role {
        match self {
            ProfileId::Mentor(_) => Role::Mentor,
            ProfileId::Mentee(_) => Role::Mentee,
        }
    }
}

/// Registration input after validation and hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub track: String,
    pub password_hash: String,
}

/// A registered identity.
///
/// # Invariants
/// - `email` is stored lowercased and is unique across all accounts (enforced by
///   the store at creation).
/// - `password_hash` is a bcrypt hash and is never serialised.
/// - `account_type` always agrees with the kind of `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: AccountId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub track: String,
    pub account_type: Role,
    pub owner: ProfileId,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn register(new: NewAccount, owner: ProfileId, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            firstname: new.firstname,
            lastname: new.lastname,
            email: new.email.to_lowercase(),
            track: new.track,
            account_type: owner.role(),
            owner,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mentor_id(&self) -> Option<MentorId> {
        match self.owner {
            ProfileId::Mentor(id) => Some(id),
            ProfileId::Mentee(_) => None,
        }
    }

    pub fn mentee_id(&self) -> Option<MenteeId> {
        match self.owner {
            ProfileId::Mentee(id) => Some(id),
            ProfileId::Mentor(_) => None,
        }
    }

    pub fn set_password_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.password_hash = hash;
        self.updated_at = now;
    }

    /// Apply name/track changes; `None` leaves a field untouched.
    pub fn rename(
        &mut self,
        firstname: Option<&str>,
        lastname: Option<&str>,
        track: Option<&str>,
        now: DateTime<Utc>,
    ) {
        if let Some(v) = firstname {
            self.firstname = v.to_string();
        }
        if let Some(v) = lastname {
            self.lastname = v.to_string();
        }
        if let Some(v) = track {
            self.track = v.to_string();
        }
        self.updated_at = now;
    }
}

impl Entity for Account {
    const KIND: &'static str = "Account";
    type Id = AccountId;

    fn id(&self) -> &AccountId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            firstname: "John".into(),
            lastname: "Doe".into(),
            email: email.into(),
            track: "SRE".into(),
            password_hash: "$2b$04$hash".into(),
        }
    }

    #[test]
    fn register_lowercases_email_and_derives_account_type() {
        let mentor_id = MentorId::new();
        let account = Account::register(
            new_account("JohnDoe@Test.com"),
            ProfileId::Mentor(mentor_id),
            Utc::now(),
        );

        assert_eq!(account.email, "johndoe@test.com");
        assert_eq!(account.account_type, Role::Mentor);
        assert_eq!(account.mentor_id(), Some(mentor_id));
        assert_eq!(account.mentee_id(), None);
    }

    #[test]
    fn serialised_account_hides_the_hash_and_exposes_owner_id() {
        let mentee_id = MenteeId::new();
        let account = Account::register(new_account("a@b.com"), ProfileId::Mentee(mentee_id), Utc::now());
        let json = serde_json::to_value(&account).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["_id"], account.id.to_string());
        assert_eq!(json["owner"], mentee_id.to_string());
        assert_eq!(json["accountType"], "Mentee");
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn rename_touches_only_given_fields() {
        let mut account =
            Account::register(new_account("a@b.com"), ProfileId::Mentee(MenteeId::new()), Utc::now());
        let later = account.updated_at + chrono::Duration::seconds(5);

        account.rename(Some("Jane"), None, Some("Backend"), later);

        assert_eq!(account.firstname, "Jane");
        assert_eq!(account.lastname, "Doe");
        assert_eq!(account.track, "Backend");
        assert_eq!(account.updated_at, later);
    }
}
