//! Store-backed repository implementations

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{CompanyRepository, UserRepository};
use crate::credentials::PasswordHash;
use crate::error::Result;
use crate::session::{ActiveUserStream, SessionManager};
use crate::storage::LocalStorage;
use crate::types::{fresh_id, Company, CompanyCategory, User, UserRole};

/// User repository persisting through [`LocalStorage`] and [`SessionManager`]
pub struct LocalUserRepository {
    storage: Arc<LocalStorage>,
    session: Arc<SessionManager>,
}

impl LocalUserRepository {
    pub fn new(storage: Arc<LocalStorage>, session: Arc<SessionManager>) -> Self {
        Self { storage, session }
    }
}

#[async_trait]
impl UserRepository for LocalUserRepository {
    fn active_user_stream(&self) -> ActiveUserStream {
        self.session.subscribe()
    }

    async fn active_user(&self) -> Result<Option<User>> {
        match self.session.active_user_id().await? {
            Some(id) => self.storage.user_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn validate_credentials(&self, email: &str, password: &str) -> Result<bool> {
        let Some(user) = self.storage.user_by_email(email).await? else {
            debug!(email, "credential check for unknown email");
            return Ok(false);
        };

        if !user.password.verify(password) {
            return Ok(false);
        }

        let mut updated = user;
        updated.is_active = true;
        self.storage.save_user(&updated).await?;
        self.session.set_active(updated).await?;
        Ok(true)
    }

    async fn register_user(&self, full_name: &str, email: &str, password: &str) -> Result<User> {
        let user = User {
            id: fresh_id(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: PasswordHash::derive(password),
            role: None,
            is_active: true,
        };

        self.storage.save_user(&user).await?;
        self.session.set_active(user.clone()).await?;
        info!(user_id = user.id, "registered new user");
        Ok(user)
    }

    async fn update_user_role(&self, user_id: i64, role: UserRole) -> Result<()> {
        let Some(user) = self.storage.user_by_id(user_id).await? else {
            // Unknown ids are a silent no-op, matching the storage contract
            return Ok(());
        };

        let mut updated = user;
        updated.role = Some(role);
        self.storage.save_user(&updated).await?;

        if self.session.active_user_id().await? == Some(user_id) {
            self.session.publish(Some(updated));
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        if let Some(id) = self.session.active_user_id().await? {
            if let Some(user) = self.storage.user_by_id(id).await? {
                let mut updated = user;
                updated.is_active = false;
                self.storage.save_user(&updated).await?;
            }
        }
        self.session.clear().await
    }
}

/// Company repository persisting through [`LocalStorage`]
pub struct LocalCompanyRepository {
    storage: Arc<LocalStorage>,
}

impl LocalCompanyRepository {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl CompanyRepository for LocalCompanyRepository {
    async fn create_company(
        &self,
        owner_user_id: i64,
        name: &str,
        category: CompanyCategory,
        employees_count: u32,
    ) -> Result<Company> {
        let company = Company {
            id: fresh_id(),
            name: name.to_string(),
            category,
            employees_count,
        };

        self.storage.save_company(&company).await?;
        self.storage
            .link_company_to_user(company.id, owner_user_id)
            .await?;
        info!(company_id = company.id, owner_user_id, "created company");
        Ok(company)
    }

    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>> {
        self.storage.companies_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecodePolicy;
    use crate::store::MemoryStore;

    async fn setup() -> (Arc<LocalStorage>, Arc<SessionManager>) {
        let store: Arc<dyn crate::store::KeyValueStore> = Arc::new(MemoryStore::new());
        let storage = Arc::new(LocalStorage::new(store.clone(), DecodePolicy::Lenient));
        let session = Arc::new(SessionManager::load(store, &storage).await.unwrap());
        (storage, session)
    }

    fn user_repo(
        storage: &Arc<LocalStorage>,
        session: &Arc<SessionManager>,
    ) -> LocalUserRepository {
        LocalUserRepository::new(Arc::clone(storage), Arc::clone(session))
    }

    #[tokio::test]
    async fn test_register_sets_active_user_with_no_role() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);

        let user = repo
            .register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();

        assert!(user.is_active);
        assert_eq!(user.role, None);

        let active = repo.active_user().await.unwrap().unwrap();
        assert_eq!(active.id, user.id);
        assert_eq!(active.email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_validate_credentials_exact_match_only() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);
        repo.register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();
        repo.logout().await.unwrap();

        assert!(repo
            .validate_credentials("ana@x.com", "secret1")
            .await
            .unwrap());
        repo.logout().await.unwrap();

        // Wrong password
        assert!(!repo
            .validate_credentials("ana@x.com", "secret2")
            .await
            .unwrap());
        // Case-sensitive email
        assert!(!repo
            .validate_credentials("Ana@x.com", "secret1")
            .await
            .unwrap());
        // Unknown email
        assert!(!repo
            .validate_credentials("nobody@x.com", "secret1")
            .await
            .unwrap());
        assert!(repo.active_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_credentials_reactivates_user() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);
        let registered = repo
            .register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();
        repo.logout().await.unwrap();

        assert!(repo
            .validate_credentials("ana@x.com", "secret1")
            .await
            .unwrap());

        let active = repo.active_user().await.unwrap().unwrap();
        assert_eq!(active.id, registered.id);
        assert!(active.is_active);
    }

    #[tokio::test]
    async fn test_update_role_reflected_in_active_user() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);
        let user = repo
            .register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();

        repo.update_user_role(user.id, UserRole::Admin).await.unwrap();

        let active = repo.active_user().await.unwrap().unwrap();
        assert_eq!(active.role, Some(UserRole::Admin));
        // Stream observed the refreshed record as well
        assert_eq!(
            session.current().unwrap().role,
            Some(UserRole::Admin)
        );
    }

    #[tokio::test]
    async fn test_update_role_unknown_id_is_a_noop() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);
        repo.register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();

        repo.update_user_role(999_999, UserRole::Admin).await.unwrap();

        let active = repo.active_user().await.unwrap().unwrap();
        assert_eq!(active.role, None);
    }

    #[tokio::test]
    async fn test_logout_deactivates_and_clears_pointer() {
        let (storage, session) = setup().await;
        let repo = user_repo(&storage, &session);
        let user = repo
            .register_user("Ana", "ana@x.com", "secret1")
            .await
            .unwrap();

        repo.logout().await.unwrap();

        assert!(repo.active_user().await.unwrap().is_none());
        let stored = storage.user_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_create_company_links_to_owner() {
        let (storage, _session) = setup().await;
        let repo = LocalCompanyRepository::new(Arc::clone(&storage));

        // No active-user check at this layer; the caller owns that decision
        let company = repo
            .create_company(7, "Acme", CompanyCategory::Retail, 20)
            .await
            .unwrap();

        assert!(company.id >= 1);
        assert_eq!(company.name, "Acme");

        let linked = repo.companies_for_user(7).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, company.id);
    }

    #[tokio::test]
    async fn test_companies_for_user_without_links_is_empty() {
        let (storage, _session) = setup().await;
        let repo = LocalCompanyRepository::new(storage);
        assert!(repo.companies_for_user(1).await.unwrap().is_empty());
    }
}
