//! LinkHub Core Library
//!
//! This crate provides the core of LinkHub, a personal bookmark manager:
//! each signed-in user keeps a categorized, searchable list of links in a
//! backend table.
//!
//! # Architecture
//!
//! - **Link store**: owner-scoped CRUD against a backend table
//! - **Link collection**: the in-memory list for the signed-in user, kept in
//!   step with the store after each confirmed operation
//! - **Views**: search filtering and category grouping over that list
//!
//! # Quick Start
//!
//! ```text
//! let store = SqliteLinkStore::open_in_memory()?;
//! let mut links = LinkCollection::new(store);
//! links.on_identity_change(Some(OwnerId::new("ada"))).await?;
//!
//! links.add(NewLink::new("Docs", "docs.rs", "learning")).await?;
//!
//! let found = views::filter(links.links(), "docs", None);
//! let grouped = views::group_by_category(found);
//! ```
//!
//! # Modules
//!
//! - `collection`: Link collection manager (main entry point)
//! - `store`: Link store contract and adapters
//! - `models`: Links and their input shapes
//! - `category`: Built-in category catalog
//! - `validation`: Input checks and URL normalization
//! - `views`: Filtering and grouping
//! - `auth`: Session-backed identity
//! - `config`: Application configuration

pub mod auth;
pub mod category;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;
pub mod views;

pub use auth::{AuthProvider, Session, SessionAuth};
pub use category::{Category, Icon, DEFAULT_CATEGORIES};
pub use collection::{LinkCollection, Notice, NoticeLevel, RefreshOutcome, Status};
pub use config::{BackendKind, Config};
pub use error::{LinkError, StoreError};
pub use models::{Link, LinkDraft, LinkPatch, NewLink, OwnerId};
pub use store::{Backend, LinkStore, RestLinkStore, SqliteLinkStore};
pub use validation::ValidationError;
