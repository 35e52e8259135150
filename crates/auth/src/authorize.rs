//! Role gating for operations above the catalog layer.
//!
//! - No IO
//! - No panics
//! - Pure predicate over the current session

use marketplace_core::DomainError;

use crate::{AuthService, User};

/// The current actor, or `Unauthenticated`.
pub fn require_authenticated<A>(auth: &A) -> Result<User, DomainError>
where
    A: AuthService + ?Sized,
{
    auth.current_user().ok_or(DomainError::Unauthenticated)
}

/// The current actor if they hold the admin role.
///
/// `Unauthenticated` when nobody is logged in, `Forbidden` for any other role.
pub fn require_admin<A>(auth: &A) -> Result<User, DomainError>
where
    A: AuthService + ?Sized,
{
    let user = require_authenticated(auth)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(DomainError::Forbidden)
    }
}
