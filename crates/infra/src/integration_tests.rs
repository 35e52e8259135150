//! Integration tests for the wired services over in-memory stores.
//!
//! Verifies:
//! - Audit attribution follows the session (SYSTEM before login and after logout)
//! - Catalog writes are audited under the acting user
//! - Admin seeding is idempotent

#[cfg(test)]
mod tests {
    use marketplace_audit::{AuditService, SYSTEM_ACTOR};
    use marketplace_auth::{AuthService, Role, UserRepository};
    use marketplace_catalog::{CatalogService, Product, SearchCriteria};
    use marketplace_core::{DomainError, Price};

    use crate::{Marketplace, Repositories};

    fn setup() -> (Marketplace, Repositories) {
        let repositories = Repositories::in_memory();
        let marketplace = Marketplace::wire(repositories.clone()).unwrap();
        assert!(marketplace.seed_admin("admin", "admin").unwrap());
        (marketplace, repositories)
    }

    fn actors_and_actions(m: &Marketplace) -> Vec<(String, String)> {
        m.audit
            .history()
            .unwrap()
            .into_iter()
            .map(|e| (e.actor, e.action))
            .collect()
    }

    #[test]
    fn session_drives_audit_attribution() {
        let (m, _) = setup();

        m.audit.log_action("BOOT").unwrap();
        assert!(m.auth.login("admin", "nope").unwrap().is_none());
        m.auth.login("admin", "admin").unwrap().unwrap();
        m.catalog
            .add(Product::new("Book", "Books", "Acme", Price::from_minor(1000), 3))
            .unwrap();
        m.catalog
            .search(&SearchCriteria::any().with_category("books"))
            .unwrap();
        m.auth.logout().unwrap();
        m.audit.log_action("SHUTDOWN").unwrap();

        let log = actors_and_actions(&m);
        let actors: Vec<&str> = log.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(
            actors,
            [SYSTEM_ACTOR, SYSTEM_ACTOR, "admin", "admin", "admin", "admin", SYSTEM_ACTOR]
        );
        assert!(log[1].1.starts_with("LOGIN_FAILURE"));
        assert_eq!(log[2].1, "LOGIN_SUCCESS");
        assert!(log[3].1.starts_with("ADD_PRODUCT"));
        assert!(log[4].1.starts_with("CACHE_MISS"));
        assert_eq!(log[5].1, "LOGOUT");
    }

    #[test]
    fn seeding_is_idempotent() {
        let (m, repositories) = setup();
        assert!(!m.seed_admin("admin", "other").unwrap());

        let stored = repositories.users.find_by_username("admin").unwrap().unwrap();
        assert_eq!(stored.role, Role::Admin);
        assert!(stored.credential.matches("admin"));
    }

    #[test]
    fn seeding_rejects_blank_credentials() {
        let (m, _) = setup();
        assert!(matches!(
            m.seed_admin("  ", "x"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn clones_share_one_session() {
        let (m, _) = setup();
        let other = m.clone();
        m.auth.login("admin", "admin").unwrap();
        assert!(other.auth.is_admin());
        assert_eq!(other.auth.current_user().unwrap().username, "admin");
    }
}
