//! Onboard - local-first user onboarding flows
//!
//! This library provides the storage, session, repository, and screen
//! state-machine layers behind an onboarding flow: registration, login,
//! role selection, and company creation, persisted through a small
//! key-value settings store.

pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod repository;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;
pub mod viewmodel;

// Re-export commonly used types
pub use app::OnboardApp;
pub use config::{Config, DecodePolicy};
pub use error::{OnboardError, Result};
pub use navigation::{Navigator, Route};
pub use session::SessionManager;
pub use storage::LocalStorage;
pub use types::{Company, CompanyCategory, User, UserRole};
