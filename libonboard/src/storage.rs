//! Local persistence for users, companies and their links
//!
//! Entities are serialized as JSON arrays into the flat key-value store:
//! `users` and `companies` hold the full collections, `user_companies_<id>`
//! holds the ordered company-id list for one user. Every read re-decodes and
//! every write re-encodes the whole collection; there are no partial updates.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::config::DecodePolicy;
use crate::error::{Result, StorageError};
use crate::store::KeyValueStore;
use crate::types::{Company, User};

pub(crate) const USERS_KEY: &str = "users";
pub(crate) const COMPANIES_KEY: &str = "companies";

fn user_companies_key(user_id: i64) -> String {
    format!("user_companies_{}", user_id)
}

/// Storage layer over the key-value settings backend
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
    decode_policy: DecodePolicy,
}

impl LocalStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, decode_policy: DecodePolicy) -> Self {
        Self {
            store,
            decode_policy,
        }
    }

    /// Decode a stored JSON collection according to the decode policy
    ///
    /// Under `Lenient` (the historical behavior) malformed payloads are
    /// logged and treated as absent data; under `Strict` they surface as
    /// `StorageError::Corrupt`.
    fn decode_collection<T: DeserializeOwned>(&self, key: &str, payload: &str) -> Result<Vec<T>> {
        match serde_json::from_str(payload) {
            Ok(items) => Ok(items),
            Err(e) => match self.decode_policy {
                DecodePolicy::Lenient => {
                    warn!(key, error = %e, "discarding undecodable stored collection");
                    Ok(Vec::new())
                }
                DecodePolicy::Strict => Err(StorageError::Corrupt {
                    key: key.to_string(),
                    detail: e.to_string(),
                }
                .into()),
            },
        }
    }

    async fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.store.get_string(key).await? {
            Some(payload) => self.decode_collection(key, &payload),
            None => Ok(Vec::new()),
        }
    }

    async fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let payload = serde_json::to_string(items).map_err(StorageError::SerializeError)?;
        self.store.put_string(key, &payload).await
    }

    /// Upsert a user by id into the stored user list
    pub async fn save_user(&self, user: &User) -> Result<()> {
        let mut users = self.users().await?;
        users.retain(|u| u.id != user.id);
        users.push(user.clone());
        self.write_collection(USERS_KEY, &users).await
    }

    /// All stored users
    pub async fn users(&self) -> Result<Vec<User>> {
        self.read_collection(USERS_KEY).await
    }

    /// Find a user by exact (case-sensitive) email
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users().await?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    /// Find a user by id
    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let users = self.users().await?;
        Ok(users.into_iter().find(|u| u.id == user_id))
    }

    /// Upsert a company by id into the stored company list
    pub async fn save_company(&self, company: &Company) -> Result<()> {
        let mut companies = self.companies().await?;
        companies.retain(|c| c.id != company.id);
        companies.push(company.clone());
        self.write_collection(COMPANIES_KEY, &companies).await
    }

    /// All stored companies
    pub async fn companies(&self) -> Result<Vec<Company>> {
        self.read_collection(COMPANIES_KEY).await
    }

    /// Add a company to a user's link list, deduplicating on insert
    pub async fn link_company_to_user(&self, company_id: i64, user_id: i64) -> Result<()> {
        let key = user_companies_key(user_id);
        let mut links: Vec<i64> = self.read_collection(&key).await?;
        if !links.contains(&company_id) {
            links.push(company_id);
            self.write_collection(&key, &links).await?;
        }
        Ok(())
    }

    /// Companies linked to a user, in link order
    ///
    /// Links to companies that no longer exist resolve to nothing; company
    /// deletion is not implemented, so orphans only arise from manual edits.
    pub async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>> {
        let links: Vec<i64> = self.read_collection(&user_companies_key(user_id)).await?;
        let all = self.companies().await?;
        Ok(links
            .into_iter()
            .filter_map(|id| all.iter().find(|c| c.id == id).cloned())
            .collect())
    }

    /// Wipe every key in the namespace
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
