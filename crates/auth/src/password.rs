//! Password policy and bcrypt hashing.
//!
//! The policy answers *why* a candidate password is unacceptable so callers can
//! surface the exact reason: a missing password is a different failure (400) from
//! one that is present but too weak (422).
//!
//! Hash comparison goes through `bcrypt::verify`, which compares digests in
//! constant time.

use thiserror::Error;

/// bcrypt work factor used outside of tests.
pub const DEFAULT_COST: u32 = 12;

/// Why a candidate password was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("Password is required")]
    Missing,

    #[error("password must be at least {0} characters long")]
    TooShort(usize),

    #[error("password must contain uppercase, lowercase, number and special character")]
    MissingCharacterClass,
}

impl PolicyViolation {
    /// `Missing` is an absent-field error; the others are content-rule failures.
    pub fn is_missing(&self) -> bool {
        matches!(self, PolicyViolation::Missing)
    }
}

/// Stateless rule set applied before a password is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password.
    ///
    /// Character classes are checked before length, so a short password that also
    /// lacks a class reports the class message.
    pub fn check(&self, password: &str) -> Result<(), PolicyViolation> {
        if password.is_empty() {
            return Err(PolicyViolation::Missing);
        }

        let has = |pred: fn(&char) -> bool| password.chars().any(|c| pred(&c));
        let classes_ok = (!self.require_uppercase || has(char::is_ascii_uppercase))
            && (!self.require_lowercase || has(char::is_ascii_lowercase))
            && (!self.require_digit || has(char::is_ascii_digit))
            && (!self.require_special || has(char::is_ascii_punctuation));
        if !classes_ok {
            return Err(PolicyViolation::MissingCharacterClass);
        }

        if password.chars().count() < self.min_length {
            return Err(PolicyViolation::TooShort(self.min_length));
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("failed to verify password: {0}")]
    Verify(String),
}

/// Hash `password` with bcrypt at the given cost (4..=31).
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Compare `password` against a stored bcrypt hash.
///
/// `Ok(false)` means a mismatch; `Err` means the stored hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|e| PasswordError::Verify(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn empty_password_is_missing() {
        let err = PasswordPolicy::default().check("").unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.to_string(), "Password is required");
    }

    #[test]
    fn each_missing_class_is_a_policy_violation() {
        let policy = PasswordPolicy::default();
        for weak in ["password", "PASSWORD", "Password", "Password1", "password1@", "PASSWORD1@"] {
            let err = policy.check(weak).unwrap_err();
            assert_eq!(err, PolicyViolation::MissingCharacterClass, "input: {weak}");
            assert_eq!(
                err.to_string(),
                "password must contain uppercase, lowercase, number and special character"
            );
        }
    }

    #[test]
    fn short_password_with_all_classes_is_too_short() {
        let err = PasswordPolicy::default().check("Ab1!").unwrap_err();
        assert_eq!(err, PolicyViolation::TooShort(8));
        assert!(!err.is_missing());
    }

    #[test]
    fn strong_passwords_pass() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.check("Abc123!@"), Ok(()));
        assert_eq!(policy.check("Securepassword1@"), Ok(()));
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Securepassword1@", TEST_COST).unwrap();
        assert_ne!(hash, "Securepassword1@");
        assert!(verify_password("Securepassword1@", &hash).unwrap());
        assert!(!verify_password("Securepassword1!", &hash).unwrap());
    }

    #[test]
    fn verify_against_garbage_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-bcrypt-hash").is_err());
    }

    proptest! {
        #[test]
        fn passwords_without_uppercase_never_pass(pw in "[a-z0-9!@#$%^&*]{1,24}") {
            prop_assert_eq!(
                PasswordPolicy::default().check(&pw),
                Err(PolicyViolation::MissingCharacterClass)
            );
        }

        #[test]
        fn passwords_with_every_class_pass(
            upper in "[A-Z]{2}",
            lower in "[a-z]{2}",
            digits in "[0-9]{2}",
            special in "[!@#$%^&*?]{2}",
        ) {
            let pw = format!("{upper}{lower}{digits}{special}");
            prop_assert_eq!(PasswordPolicy::default().check(&pw), Ok(()));
        }
    }
}
