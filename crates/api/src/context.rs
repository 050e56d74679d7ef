use mentorhub_auth::{Role, SessionClaims};
use mentorhub_core::AccountId;

/// Principal context for a request (the authenticated account).
///
/// Inserted by the auth middleware from verified session claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    account_id: AccountId,
    firstname: String,
    lastname: String,
    role: Role,
}

impl PrincipalContext {
    pub fn new(account_id: AccountId, firstname: String, lastname: String, role: Role) -> Self {
        Self {
            account_id,
            firstname,
            lastname,
            role,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<SessionClaims> for PrincipalContext {
    fn from(claims: SessionClaims) -> Self {
        Self::new(claims.id, claims.firstname, claims.lastname, claims.account_type)
    }
}
