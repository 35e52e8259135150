//! Single-session actor context and the authentication service that drives it.

use std::sync::{PoisonError, RwLock};

use marketplace_audit::{ActorSource, AuditService};
use marketplace_core::DomainError;

use crate::{User, UserRepository};

pub const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";
pub const LOGIN_FAILURE: &str = "LOGIN_FAILURE";
pub const LOGOUT: &str = "LOGOUT";

/// The process-wide "current session": zero or one authenticated user.
///
/// States are `Empty` and `Authenticated(user)`. Each transition replaces the
/// whole slot under a write lock, so readers never see a half-updated actor.
#[derive(Debug, Default)]
pub struct ActorContext {
    current: RwLock<Option<User>>,
}

impl ActorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Move to `Authenticated(user)`, returning whoever held the slot before.
    pub fn authenticate(&self, user: User) -> Option<User> {
        self.replace(Some(user))
    }

    /// Move to `Empty`, returning whoever held the slot before.
    pub fn clear(&self) -> Option<User> {
        self.replace(None)
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(User::is_admin)
    }

    /// Put `previous` back, but only while `installed` still holds the slot.
    /// Returns whether the slot was rolled back.
    pub fn roll_back(&self, installed: &User, previous: Option<User>) -> bool {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref() != Some(installed) {
            return false;
        }
        *slot = previous;
        true
    }

    fn replace(&self, next: Option<User>) -> Option<User> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, next)
    }
}

/// Authentication and session management.
pub trait AuthService: Send + Sync {
    /// Attempt a login. `Ok(None)` means the username is unknown or the
    /// credential did not match; the session is left unchanged in that case.
    fn login(&self, username: &str, password: &str) -> Result<Option<User>, DomainError>;

    fn logout(&self) -> Result<(), DomainError>;

    fn current_user(&self) -> Option<User>;

    fn is_admin(&self) -> bool;
}

/// Authentication backed by an identity store, recording every attempt in the
/// audit trail.
///
/// Also serves as the audit service's [`ActorSource`] once wired.
///
/// A successful login while already authenticated replaces the current actor.
pub struct SessionAuthService<U, A> {
    users: U,
    audit: A,
    context: ActorContext,
}

impl<U, A> SessionAuthService<U, A>
where
    U: UserRepository,
    A: AuditService,
{
    pub fn new(users: U, audit: A) -> Self {
        Self {
            users,
            audit,
            context: ActorContext::new(),
        }
    }

    pub fn context(&self) -> &ActorContext {
        &self.context
    }
}

impl<U, A> AuthService for SessionAuthService<U, A>
where
    U: UserRepository,
    A: AuditService,
{
    fn login(&self, username: &str, password: &str) -> Result<Option<User>, DomainError> {
        let candidate = self
            .users
            .find_by_username(username)?
            .filter(|user| user.credential.matches(password));

        let Some(user) = candidate else {
            tracing::info!(username, "login rejected");
            self.audit
                .log_action(&format!("{LOGIN_FAILURE}: username={username}"))?;
            return Ok(None);
        };

        // Set the actor first so the success entry is attributed to them.
        let previous = self.context.authenticate(user.clone());
        if let Err(err) = self.audit.log_action(LOGIN_SUCCESS) {
            // A login that landed since ours keeps the slot.
            if !self.context.roll_back(&user, previous) {
                tracing::debug!(username, "session changed before rollback");
            }
            return Err(err.into());
        }

        tracing::info!(username, role = %user.role, "login succeeded");
        Ok(Some(user))
    }

    fn logout(&self) -> Result<(), DomainError> {
        // Logged while the actor is still set, so the entry names who left.
        self.audit.log_action(LOGOUT)?;
        if let Some(user) = self.context.clear() {
            tracing::info!(username = %user.username, "logged out");
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.context.current()
    }

    fn is_admin(&self) -> bool {
        self.context.is_admin()
    }
}

impl<U, A> ActorSource for SessionAuthService<U, A>
where
    U: UserRepository,
    A: AuditService,
{
    fn current_actor(&self) -> Option<String> {
        self.context.current().map(|user| user.username)
    }
}
