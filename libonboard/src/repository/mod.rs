//! Repository contracts for the onboarding flows
//!
//! These traits are the seam between the view-models and the data layer.
//! `local` implements them over the key-value-backed storage; `memory` is a
//! clearly-labeled test double that follows the same contract (identical
//! validation semantics, optional simulated latency).

use async_trait::async_trait;

use crate::error::Result;
use crate::session::ActiveUserStream;
use crate::types::{Company, CompanyCategory, User, UserRole};

pub mod local;
pub mod memory;

pub use local::{LocalCompanyRepository, LocalUserRepository};
pub use memory::{InMemoryCompanyRepository, InMemoryUserRepository};

/// Access to users and the active session
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Reactive stream of the currently authenticated user, if any
    fn active_user_stream(&self) -> ActiveUserStream;

    /// The currently active user, resolved through the persisted pointer
    async fn active_user(&self) -> Result<Option<User>>;

    /// Check a credential pair against the stored users
    ///
    /// Returns `true` iff a stored user matches the email exactly
    /// (case-sensitive) and the password verifies against the stored hash.
    /// On success the matched user is marked active and becomes the session.
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<bool>;

    /// Register a new user and make them the active session
    ///
    /// Always succeeds for well-formed input; a fresh random id is assigned
    /// and no duplicate-email check is performed.
    async fn register_user(&self, full_name: &str, email: &str, password: &str) -> Result<User>;

    /// Assign a role to a user; unknown ids are a silent no-op
    async fn update_user_role(&self, user_id: i64, role: UserRole) -> Result<()>;

    /// Mark the active user inactive and clear the session
    async fn logout(&self) -> Result<()>;
}

/// Access to companies and their owner links
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Create a company with a fresh id and link it to its owner
    async fn create_company(
        &self,
        owner_user_id: i64,
        name: &str,
        category: CompanyCategory,
        employees_count: u32,
    ) -> Result<Company>;

    /// Companies linked to a user, in link order
    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>>;
}
