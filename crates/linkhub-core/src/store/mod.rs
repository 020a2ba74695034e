//! Link store adapters
//!
//! A `LinkStore` translates collection operations into backend requests and
//! normalizes their failures into `StoreError`. Every operation is scoped by
//! owner, even where the backend enforces row ownership on its own.
//!
//! ## Adapters
//!
//! - `SqliteLinkStore`: an embedded `links` table (file or in-memory)
//! - `RestLinkStore`: a PostgREST-style hosted table over HTTP
//! - `Backend`: picks one of the above from `Config`

pub mod rest;
pub mod schema;
pub mod sqlite;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::Session;
use crate::config::{BackendKind, Config};
use crate::error::StoreResult;
use crate::models::{Link, LinkPatch, NewLink, OwnerId};

pub use rest::RestLinkStore;
pub use sqlite::SqliteLinkStore;

/// Persistence contract for links
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// All links owned by `owner`, newest first
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Link>>;

    /// Persist a new link for `owner`, returning it with its assigned id and
    /// creation time
    async fn insert(&self, owner: &OwnerId, fields: &NewLink) -> StoreResult<Link>;

    /// Apply `patch` to the link `id` owned by `owner`
    ///
    /// Fails with `StoreError::NotFoundOrForbidden` if no such row exists
    /// for that owner.
    async fn update_by_id(&self, id: Uuid, owner: &OwnerId, patch: &LinkPatch)
        -> StoreResult<Link>;

    /// Delete the link `id` owned by `owner`
    ///
    /// Fails with `StoreError::NotFoundOrForbidden` if no such row exists
    /// for that owner.
    async fn delete_by_id(&self, id: Uuid, owner: &OwnerId) -> StoreResult<()>;
}

#[async_trait]
impl<T: LinkStore + ?Sized> LinkStore for Arc<T> {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Link>> {
        (**self).list_by_owner(owner).await
    }

    async fn insert(&self, owner: &OwnerId, fields: &NewLink) -> StoreResult<Link> {
        (**self).insert(owner, fields).await
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: &OwnerId,
        patch: &LinkPatch,
    ) -> StoreResult<Link> {
        (**self).update_by_id(id, owner, patch).await
    }

    async fn delete_by_id(&self, id: Uuid, owner: &OwnerId) -> StoreResult<()> {
        (**self).delete_by_id(id, owner).await
    }
}

/// The store selected by configuration
pub enum Backend {
    Sqlite(SqliteLinkStore),
    Rest(RestLinkStore),
}

impl Backend {
    /// Open the configured backend
    ///
    /// The REST backend authenticates with the session's access token when
    /// one is present.
    pub fn open(config: &Config, session: Option<&Session>) -> Result<Self> {
        match config.backend {
            BackendKind::Sqlite => {
                let store = SqliteLinkStore::open(&config.sqlite_path())
                    .context("Failed to open SQLite link store")?;
                Ok(Backend::Sqlite(store))
            }
            BackendKind::Rest => {
                let base_url = config
                    .rest_url
                    .as_deref()
                    .context("rest_url must be set to use the rest backend")?;
                let api_key = config
                    .api_key
                    .as_deref()
                    .context("api_key must be set to use the rest backend")?;
                let token = session.and_then(|s| s.access_token.as_deref());
                let store = RestLinkStore::new(base_url, api_key, token)
                    .context("Failed to create REST link store")?;
                Ok(Backend::Rest(store))
            }
        }
    }

    fn inner(&self) -> &dyn LinkStore {
        match self {
            Backend::Sqlite(store) => store,
            Backend::Rest(store) => store,
        }
    }
}

#[async_trait]
impl LinkStore for Backend {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Link>> {
        self.inner().list_by_owner(owner).await
    }

    async fn insert(&self, owner: &OwnerId, fields: &NewLink) -> StoreResult<Link> {
        self.inner().insert(owner, fields).await
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: &OwnerId,
        patch: &LinkPatch,
    ) -> StoreResult<Link> {
        self.inner().update_by_id(id, owner, patch).await
    }

    async fn delete_by_id(&self, id: Uuid, owner: &OwnerId) -> StoreResult<()> {
        self.inner().delete_by_id(id, owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, backend: BackendKind) -> Config {
        Config {
            data_dir: dir.path().to_path_buf(),
            backend,
            ..Config::default()
        }
    }

    #[test]
    fn test_open_sqlite_backend() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, BackendKind::Sqlite);

        let backend = Backend::open(&config, None).unwrap();
        assert!(matches!(backend, Backend::Sqlite(_)));
        assert!(config.sqlite_path().exists());
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, BackendKind::Rest);

        let err = Backend::open(&config, None).err().unwrap();
        assert!(err.to_string().contains("rest_url"));
    }

    #[test]
    fn test_open_rest_backend() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, BackendKind::Rest);
        config.rest_url = Some("https://project.example.co".to_string());
        config.api_key = Some("anon-key".to_string());

        let backend = Backend::open(&config, None).unwrap();
        assert!(matches!(backend, Backend::Rest(_)));
    }

    #[tokio::test]
    async fn test_backend_dispatches_to_sqlite() {
        let backend = Backend::Sqlite(SqliteLinkStore::open_in_memory().unwrap());
        let owner = OwnerId::new("alice");

        let link = backend
            .insert(&owner, &NewLink::new("Docs", "https://docs.rs", "learning"))
            .await
            .unwrap();
        let links = backend.list_by_owner(&owner).await.unwrap();
        assert_eq!(links, vec![link]);
    }
}
