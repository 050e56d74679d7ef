//! HS256 session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

use crate::{SessionClaims, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Verifies bearer tokens presented by clients.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 token issuer and validator sharing one server-held secret.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Lifetime given to every token this issuer signs.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign claims built from `claims_for`, stamped with `now` and the configured TTL.
    pub fn issue(
        &self,
        claims_for: impl FnOnce(DateTime<Utc>, Duration) -> SessionClaims,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.sign(&claims_for(now, self.ttl))
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Time checks run against the injected `now` below, not the library clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)?.claims;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use mentorhub_core::AccountId;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret.as_bytes(), Duration::hours(1))
    }

    fn claims(now: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims::new(AccountId::new(), "Ada", "Lovelace", Role::Mentee, now, ttl)
    }

    #[test]
    fn issued_token_validates_back_to_the_same_claims() {
        let jwt = jwt("secret");
        let now = Utc::now();
        let id = AccountId::new();

        let token = jwt
            .issue(|at, ttl| SessionClaims::new(id, "Ada", "Lovelace", Role::Mentee, at, ttl), now)
            .unwrap();
        let decoded = jwt.validate(&token, now).unwrap();

        assert_eq!(decoded.id, id);
        assert_eq!(decoded.firstname, "Ada");
        assert_eq!(decoded.lastname, "Lovelace");
        assert_eq!(decoded.account_type, Role::Mentee);
        assert_eq!(decoded.exp - decoded.iat, 3600);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let now = Utc::now();
        let token = jwt("one").sign(&claims(now, Duration::hours(1))).unwrap();
        assert_eq!(jwt("two").validate(&token, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = jwt("secret");
        let issued = Utc::now() - Duration::hours(2);
        let token = jwt.sign(&claims(issued, Duration::hours(1))).unwrap();
        assert_eq!(jwt.validate(&token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = jwt("secret").validate("not.a.jwt", Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let jwt = jwt("secret");
        let now = Utc::now();
        let token = jwt.sign(&claims(now, Duration::hours(1))).unwrap();
        let forged = jwt.sign(&claims(now, Duration::days(365))).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];
        let tampered = parts.join(".");

        assert_eq!(jwt.validate(&tampered, now), Err(TokenError::InvalidSignature));
    }
}
