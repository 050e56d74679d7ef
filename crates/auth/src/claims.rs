use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use mentorhub_core::AccountId;

use crate::{Role, TokenError};

/// Session token claims.
///
/// Timestamps are Unix seconds so the token stays readable by any standard JWT
/// library. The subject is carried as `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Subject: the authenticated account.
    pub id: AccountId,
    pub firstname: String,
    pub lastname: String,
    pub account_type: Role,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        id: AccountId,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        account_type: Role,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            firstname: firstname.into(),
            lastname: lastname.into(),
            account_type,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

/// Deterministically validate the time window of a set of claims.
///
/// Signature verification happens before this, in [`crate::Hs256Jwt`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims::new(AccountId::new(), "John", "Doe", Role::Mentor, now, ttl)
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::hours(1));
        assert_eq!(validate_claims(&claims, now), Ok(()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5));
        let at_expiry = now + Duration::minutes(5);
        assert_eq!(validate_claims(&claims, at_expiry), Err(TokenError::Expired));
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(10), Duration::hours(1));
        assert_eq!(validate_claims(&claims, now), Err(TokenError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::seconds(-30));
        assert_eq!(validate_claims(&claims, now), Err(TokenError::InvalidTimeWindow));
    }

    #[test]
    fn claims_serialise_with_camel_case_names() {
        let claims = claims_at(Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["id"], claims.id.to_string());
        assert_eq!(json["firstname"], "John");
        assert_eq!(json["accountType"], "Mentor");
        assert!(json["exp"].is_i64());
    }
}
