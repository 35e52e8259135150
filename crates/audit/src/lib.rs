//! `marketplace-audit`: append-only audit trail and the service that writes it.
//!
//! Entries are attributed to the current actor through the [`ActorSource`]
//! capability, which is bound after construction to break the dependency
//! cycle with authentication.

pub mod actor;
pub mod entry;
pub mod repository;
pub mod service;

pub use actor::{ActorSource, NoActor};
pub use entry::{AuditEntry, SYSTEM_ACTOR};
pub use repository::{AuditRepository, InMemoryAuditRepository};
pub use service::{AuditService, AuditServiceImpl, WiringError};
