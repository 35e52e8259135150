//! Audit trail storage boundary.

use std::sync::{Arc, Mutex};

use marketplace_core::RepositoryError;

use crate::entry::AuditEntry;

/// Durable append-only log of audit entries.
///
/// Appends are serialized by the implementation; reads return entries in
/// insertion order.
pub trait AuditRepository: Send + Sync {
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError>;

    /// Snapshot of every entry, oldest first.
    fn find_all(&self) -> Result<Vec<AuditEntry>, RepositoryError>;
}

impl<S> AuditRepository for Arc<S>
where
    S: AuditRepository + ?Sized,
{
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        (**self).append(entry)
    }

    fn find_all(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        (**self).find_all()
    }
}

/// In-memory audit trail for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditRepository for InMemoryAuditRepository {
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::lock_poisoned("audit.append"))?;
        entries.push(entry);
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RepositoryError::lock_poisoned("audit.find_all"))?;
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn returns_entries_in_append_order() {
        let repo = InMemoryAuditRepository::new();
        for action in ["E1", "E2", "E3"] {
            repo.append(AuditEntry::new(Utc::now(), "SYSTEM", action)).unwrap();
        }

        let actions: Vec<_> = repo
            .find_all()
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, ["E1", "E2", "E3"]);
    }

    #[test]
    fn snapshot_is_detached_from_the_log() {
        let repo = InMemoryAuditRepository::new();
        repo.append(AuditEntry::new(Utc::now(), "SYSTEM", "E1")).unwrap();

        let mut snapshot = repo.find_all().unwrap();
        snapshot.clear();

        assert_eq!(repo.find_all().unwrap().len(), 1);
    }
}
