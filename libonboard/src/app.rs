//! Application facade for Onboard
//!
//! `OnboardApp` is the single entry point for embedding the onboarding flow:
//! it owns the shared store, session, repositories, and navigator, and hands
//! out view-models wired to them. Frontends (CLI, TUI, GUI) consume this API
//! instead of assembling the pieces themselves.
//!
//! # Example
//!
//! ```no_run
//! use libonboard::app::OnboardApp;
//!
//! # async fn example() -> libonboard::Result<()> {
//! let app = OnboardApp::new().await?;
//!
//! let register = app.register_view_model();
//! register.on_full_name_change("Ana");
//! register.on_email_change("ana@example.com");
//! register.on_password_change("secret1");
//! register.on_confirm_password_change("secret1");
//! register.on_register_requested();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::{resolve_store_path, Config};
use crate::error::Result;
use crate::navigation::Navigator;
use crate::repository::{
    CompanyRepository, LocalCompanyRepository, LocalUserRepository, UserRepository,
};
use crate::session::SessionManager;
use crate::storage::LocalStorage;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::viewmodel::{
    CreateCompanyViewModel, LoginViewModel, RegisterViewModel, RoleSelectionViewModel,
};

/// Main application facade coordinating storage, session, and navigation
///
/// All components share the same store and session; repositories returned by
/// [`users`](Self::users) and [`companies`](Self::companies) observe and
/// mutate the same state the view-models do.
pub struct OnboardApp {
    storage: Arc<LocalStorage>,
    session: Arc<SessionManager>,
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    navigator: Navigator,
}

impl OnboardApp {
    /// Create an application with configuration from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the backing
    /// settings file cannot be opened.
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create an application with custom configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        let path = resolve_store_path(&config.storage.path);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(path).await?);
        Self::with_store(store, config).await
    }

    /// Create an application backed by volatile in-memory storage
    ///
    /// Useful for tests and previews; nothing survives the process.
    pub async fn in_memory() -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self::with_store(store, Config::default_config()).await
    }

    async fn with_store(store: Arc<dyn KeyValueStore>, config: Config) -> Result<Self> {
        let storage = Arc::new(LocalStorage::new(
            Arc::clone(&store),
            config.storage.decode_policy,
        ));
        let session = Arc::new(SessionManager::load(store, &storage).await?);

        let users: Arc<dyn UserRepository> = Arc::new(LocalUserRepository::new(
            Arc::clone(&storage),
            Arc::clone(&session),
        ));
        let companies: Arc<dyn CompanyRepository> =
            Arc::new(LocalCompanyRepository::new(Arc::clone(&storage)));

        Ok(Self {
            storage,
            session,
            users,
            companies,
            navigator: Navigator::new(),
        })
    }

    /// The shared local storage layer
    pub fn storage(&self) -> &Arc<LocalStorage> {
        &self.storage
    }

    /// The session manager owning the active-user stream
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The user repository
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// The company repository
    pub fn companies(&self) -> &Arc<dyn CompanyRepository> {
        &self.companies
    }

    /// The navigator owning the route backstack
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Build a login view-model wired to the shared repositories
    pub fn login_view_model(&self) -> LoginViewModel {
        LoginViewModel::new(Arc::clone(&self.users))
    }

    /// Build a registration view-model wired to the shared repositories
    pub fn register_view_model(&self) -> RegisterViewModel {
        RegisterViewModel::new(Arc::clone(&self.users))
    }

    /// Build a role-selection view-model wired to the shared repositories
    pub fn role_selection_view_model(&self) -> RoleSelectionViewModel {
        RoleSelectionViewModel::new(Arc::clone(&self.users))
    }

    /// Build a company-creation view-model wired to the shared repositories
    pub fn create_company_view_model(&self) -> CreateCompanyViewModel {
        CreateCompanyViewModel::new(Arc::clone(&self.companies), Arc::clone(&self.users))
    }
}
