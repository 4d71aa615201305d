//! In-memory repository test doubles
//!
//! These implementations follow the authoritative repository contracts
//! exactly: credential validation requires a real hash match, registration
//! assigns fresh ids, role updates no-op on unknown ids. They exist so tests
//! and UI previews can run without a settings backend, with optional
//! simulated latency and call counters for verification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::sleep;

use super::{CompanyRepository, UserRepository};
use crate::credentials::PasswordHash;
use crate::error::Result;
use crate::session::ActiveUserStream;
use crate::types::{fresh_id, Company, CompanyCategory, User, UserRole};

/// In-memory user repository for tests and previews
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    current: watch::Sender<Option<User>>,
    delay: Duration,
    validate_calls: Arc<Mutex<usize>>,
    register_calls: Arc<Mutex<usize>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(0))
    }

    /// Create a repository that sleeps before every operation
    pub fn with_delay(delay: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            users: Mutex::new(Vec::new()),
            current,
            delay,
            validate_calls: Arc::new(Mutex::new(0)),
            register_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of times `validate_credentials` has been called
    pub fn validate_call_count(&self) -> usize {
        *self.validate_calls.lock().unwrap()
    }

    /// Number of times `register_user` has been called
    pub fn register_call_count(&self) -> usize {
        *self.register_calls.lock().unwrap()
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }

    fn upsert(&self, user: User) {
        let mut users = self.users.lock().unwrap();
        users.retain(|u| u.id != user.id);
        users.push(user);
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    fn active_user_stream(&self) -> ActiveUserStream {
        self.current.subscribe()
    }

    async fn active_user(&self) -> Result<Option<User>> {
        self.simulate_latency().await;
        Ok(self.current.borrow().clone())
    }

    async fn validate_credentials(&self, email: &str, password: &str) -> Result<bool> {
        *self.validate_calls.lock().unwrap() += 1;
        self.simulate_latency().await;

        let matched = {
            let users = self.users.lock().unwrap();
            users
                .iter()
                .find(|u| u.email == email && u.password.verify(password))
                .cloned()
        };

        match matched {
            Some(user) => {
                let mut updated = user;
                updated.is_active = true;
                self.upsert(updated.clone());
                self.current.send_replace(Some(updated));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn register_user(&self, full_name: &str, email: &str, password: &str) -> Result<User> {
        *self.register_calls.lock().unwrap() += 1;
        self.simulate_latency().await;

        let user = User {
            id: fresh_id(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: PasswordHash::derive(password),
            role: None,
            is_active: true,
        };

        self.upsert(user.clone());
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn update_user_role(&self, user_id: i64, role: UserRole) -> Result<()> {
        self.simulate_latency().await;

        let updated = {
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id == user_id) {
                Some(user) => {
                    user.role = Some(role);
                    Some(user.clone())
                }
                None => None,
            }
        };

        if let Some(user) = updated {
            let is_current = self
                .current
                .borrow()
                .as_ref()
                .is_some_and(|u| u.id == user_id);
            if is_current {
                self.current.send_replace(Some(user));
            }
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.simulate_latency().await;

        let current = self.current.borrow().clone();
        if let Some(user) = current {
            let mut updated = user;
            updated.is_active = false;
            self.upsert(updated);
        }
        self.current.send_replace(None);
        Ok(())
    }
}

/// In-memory company repository for tests and previews
pub struct InMemoryCompanyRepository {
    companies: Mutex<Vec<Company>>,
    links: Mutex<HashMap<i64, Vec<i64>>>,
    delay: Duration,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(0))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            companies: Mutex::new(Vec::new()),
            links: Mutex::new(HashMap::new()),
            delay,
        }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl Default for InMemoryCompanyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn create_company(
        &self,
        owner_user_id: i64,
        name: &str,
        category: CompanyCategory,
        employees_count: u32,
    ) -> Result<Company> {
        self.simulate_latency().await;

        let company = Company {
            id: fresh_id(),
            name: name.to_string(),
            category,
            employees_count,
        };

        self.companies.lock().unwrap().push(company.clone());
        let mut links = self.links.lock().unwrap();
        let owned = links.entry(owner_user_id).or_default();
        if !owned.contains(&company.id) {
            owned.push(company.id);
        }
        Ok(company)
    }

    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>> {
        self.simulate_latency().await;

        let links = self.links.lock().unwrap();
        let companies = self.companies.lock().unwrap();
        let owned = links.get(&user_id).cloned().unwrap_or_default();
        Ok(owned
            .into_iter()
            .filter_map(|id| companies.iter().find(|c| c.id == id).cloned())
            .collect())
    }
}
