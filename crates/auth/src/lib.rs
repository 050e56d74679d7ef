//! `mentorhub-auth`: credential and session-token primitives.
//!
//! This crate has no HTTP or storage dependency: it knows how to
//! check a password against the policy, hash and verify it, and issue or verify a
//! signed session token. Looking identities up is the caller's job.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{SessionClaims, validate_claims};
pub use password::{
    DEFAULT_COST, PasswordError, PasswordPolicy, PolicyViolation, hash_password, verify_password,
};
pub use roles::Role;
pub use token::{Hs256Jwt, JwtValidator, TokenError};
