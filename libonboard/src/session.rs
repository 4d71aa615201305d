//! Active-user session management
//!
//! `SessionManager` is the single owner of the persisted active-user pointer
//! and its reactive stream. Repositories go through it instead of touching
//! the `active_user_id` key directly, which keeps the read/write contract in
//! one place and guarantees every subscriber observes the same ordered
//! sequence of session states.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::Result;
use crate::storage::LocalStorage;
use crate::store::KeyValueStore;
use crate::types::User;

pub(crate) const ACTIVE_USER_KEY: &str = "active_user_id";

/// Receiver half of the active-user stream
pub type ActiveUserStream = watch::Receiver<Option<User>>;

/// Owner of the single-session active-user pointer
///
/// At most one user is active system-wide. The watch channel holds the most
/// recent session state; late subscribers see the current value immediately
/// and then every subsequent transition in order.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Option<User>>,
}

impl SessionManager {
    /// Create a session manager, seeding the stream from the persisted pointer
    pub async fn load(store: Arc<dyn KeyValueStore>, storage: &LocalStorage) -> Result<Self> {
        let (current, _) = watch::channel(None);
        let manager = Self { store, current };

        if let Some(id) = manager.active_user_id().await? {
            let user = storage.user_by_id(id).await?;
            manager.current.send_replace(user);
        }

        Ok(manager)
    }

    /// Persist the pointer and publish the user as the active session
    pub async fn set_active(&self, user: User) -> Result<()> {
        self.store.put_i64(ACTIVE_USER_KEY, user.id).await?;
        self.current.send_replace(Some(user));
        Ok(())
    }

    /// The persisted active-user id, if any
    pub async fn active_user_id(&self) -> Result<Option<i64>> {
        self.store.get_i64(ACTIVE_USER_KEY).await
    }

    /// Remove the pointer and publish an empty session
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(ACTIVE_USER_KEY).await?;
        self.current.send_replace(None);
        Ok(())
    }

    /// Refresh the stream after an in-place update of the active user
    ///
    /// Does not touch the persisted pointer; callers use this when the user
    /// record changed (for example a role assignment) but the session did not.
    pub fn publish(&self, user: Option<User>) {
        self.current.send_replace(user);
    }

    /// Subscribe to the active-user stream
    pub fn subscribe(&self) -> ActiveUserStream {
        self.current.subscribe()
    }

    /// The current session state
    pub fn current(&self) -> Option<User> {
        self.current.borrow().clone()
    }
}
