//! `marketplace-auth`: identity store, single-session authentication and role gating.
//!
//! This crate is intentionally decoupled from HTTP and storage engines.

pub mod authorize;
pub mod repository;
pub mod role;
pub mod session;
pub mod user;

pub use authorize::{require_admin, require_authenticated};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use role::Role;
pub use session::{ActorContext, AuthService, SessionAuthService};
pub use user::{Credential, User};
