//! Audit service: formats and appends entries attributed to the current actor.

use std::sync::{Arc, Weak};

use chrono::Utc;
use once_cell::sync::OnceCell;
use thiserror::Error;

use marketplace_core::RepositoryError;

use crate::actor::{ActorSource, NoActor};
use crate::entry::{AuditEntry, SYSTEM_ACTOR};
use crate::repository::AuditRepository;

/// Records user and system actions.
pub trait AuditService: Send + Sync {
    /// Append one entry attributed to whoever is the current actor right now.
    ///
    /// Exactly one durable append per call; storage failures are returned,
    /// never swallowed.
    fn log_action(&self, action: &str) -> Result<(), RepositoryError>;

    /// Ordered snapshot of every entry recorded so far.
    fn history(&self) -> Result<Vec<AuditEntry>, RepositoryError>;
}

impl<S> AuditService for Arc<S>
where
    S: AuditService + ?Sized,
{
    fn log_action(&self, action: &str) -> Result<(), RepositoryError> {
        (**self).log_action(action)
    }

    fn history(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        (**self).history()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WiringError {
    #[error("actor source is already bound")]
    AlreadyBound,
}

/// Audit service with a late-bound actor source.
///
/// Construction needs only the trail. The actor source (normally the
/// authentication service, which itself needs this service) is supplied once
/// afterwards via [`bind_actor_source`](Self::bind_actor_source). Until then
/// every entry is attributed to `SYSTEM`.
///
/// The source is held as a `Weak`; once it is dropped, entries fall back to
/// `SYSTEM` again.
pub struct AuditServiceImpl<R> {
    repository: R,
    actor_source: OnceCell<Weak<dyn ActorSource>>,
}

impl<R> AuditServiceImpl<R>
where
    R: AuditRepository,
{
    /// Phase one of wiring: bound to the trail only.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            actor_source: OnceCell::new(),
        }
    }

    /// Phase three of wiring: supply the actor source. Write-once.
    pub fn bind_actor_source<S>(&self, source: &Arc<S>) -> Result<(), WiringError>
    where
        S: ActorSource + 'static,
    {
        let weak: Weak<dyn ActorSource> = Arc::downgrade(source) as Weak<dyn ActorSource>;
        self.actor_source
            .set(weak)
            .map_err(|_| WiringError::AlreadyBound)?;
        tracing::debug!("audit actor source bound");
        Ok(())
    }

    pub fn is_wired(&self) -> bool {
        self.actor_source.get().is_some()
    }

    fn current_actor(&self) -> String {
        let name = match self.actor_source.get().and_then(Weak::upgrade) {
            Some(source) => source.current_actor(),
            None => NoActor.current_actor(),
        };
        name.unwrap_or_else(|| SYSTEM_ACTOR.to_string())
    }
}

impl<R> AuditService for AuditServiceImpl<R>
where
    R: AuditRepository,
{
    fn log_action(&self, action: &str) -> Result<(), RepositoryError> {
        let entry = AuditEntry::new(Utc::now(), self.current_actor(), action);
        tracing::debug!(actor = %entry.actor, action = %entry.action, "audit");
        self.repository.append(entry)
    }

    fn history(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        self.repository.find_all()
    }
}
