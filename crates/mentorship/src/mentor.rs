use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentorhub_core::{Entity, MentorId};

use crate::Account;

/// Mentor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    #[serde(rename = "_id")]
    pub id: MentorId,
    pub specialization: Option<String>,
    pub years_of_experience: Option<u32>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mentor {
    pub fn new(
        specialization: Option<String>,
        years_of_experience: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MentorId::new(),
            specialization,
            years_of_experience,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Mentor {
    const KIND: &'static str = "Mentor";
    type Id = MentorId;

    fn id(&self) -> &MentorId {
        &self.id
    }
}

/// Editable profile fields; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub track: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<u32>,
    pub bio: Option<String>,
}

impl MentorProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A mentor's account together with its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentorRecord {
    pub account: Account,
    pub mentor: Mentor,
}

impl MentorRecord {
    /// Apply a profile update to both the account and the profile.
    pub fn apply(&mut self, update: &MentorProfileUpdate, now: DateTime<Utc>) {
        self.account.rename(
            update.firstname.as_deref(),
            update.lastname.as_deref(),
            update.track.as_deref(),
            now,
        );

        let mentor = &mut self.mentor;
        if let Some(v) = &update.specialization {
            mentor.specialization = Some(v.clone());
        }
        if let Some(v) = update.years_of_experience {
            mentor.years_of_experience = Some(v);
        }
        if let Some(v) = &update.bio {
            mentor.bio = Some(v.clone());
        }
        mentor.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewAccount, ProfileId};

    fn record() -> MentorRecord {
        let now = Utc::now();
        let mentor = Mentor::new(Some("DevOps".into()), Some(5), now);
        let account = Account::register(
            NewAccount {
                firstname: "John".into(),
                lastname: "Doe".into(),
                email: "johndoe@test.com".into(),
                track: "SRE".into(),
                password_hash: "x".into(),
            },
            ProfileId::Mentor(mentor.id),
            now,
        );
        MentorRecord { account, mentor }
    }

    #[test]
    fn apply_updates_account_and_profile_fields() {
        let mut rec = record();
        let update = MentorProfileUpdate {
            lastname: Some("Smith".into()),
            years_of_experience: Some(7),
            bio: Some("Ops person".into()),
            ..Default::default()
        };

        rec.apply(&update, Utc::now());

        assert_eq!(rec.account.firstname, "John");
        assert_eq!(rec.account.lastname, "Smith");
        assert_eq!(rec.mentor.specialization.as_deref(), Some("DevOps"));
        assert_eq!(rec.mentor.years_of_experience, Some(7));
        assert_eq!(rec.mentor.bio.as_deref(), Some("Ops person"));
    }

    #[test]
    fn record_serialises_as_account_and_mentor() {
        let rec = record();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["account"]["owner"], json["mentor"]["_id"]);
        assert_eq!(json["mentor"]["yearsOfExperience"], 5);
        assert_eq!(json["mentor"]["specialization"], "DevOps");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(MentorProfileUpdate::default().is_empty());
        assert!(!MentorProfileUpdate { bio: Some("x".into()), ..Default::default() }.is_empty());
    }
}
