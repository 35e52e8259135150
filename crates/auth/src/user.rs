//! User accounts.

use marketplace_core::{DomainError, Entity, FieldViolation, UserId};

use crate::Role;

/// Opaque credential material, compared verbatim.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, attempt: &str) -> bool {
        self.0 == attempt
    }

    /// Raw material, for persistence adapters only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A user account.
///
/// # Invariants
/// - `username` is unique within the identity store.
/// - `id` is assigned by the store on first save and never changes.
///
/// Equality ignores the credential.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<UserId>,
    pub username: String,
    pub credential: Credential,
    pub role: Role,
}

impl User {
    pub fn new(username: impl Into<String>, credential: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            username: username.into(),
            credential: Credential::new(credential),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut violations = Vec::new();
        if self.username.trim().is_empty() {
            violations.push(FieldViolation::new("username", "must not be blank"));
        }
        if self.credential.expose().is_empty() {
            violations.push(FieldViolation::new("password", "must not be empty"));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.username == other.username && self.role == other.role
    }
}

impl Eq for User {}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Option<UserId> {
        self.id
    }
}
