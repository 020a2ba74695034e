//! Data models for LinkHub
//!
//! Defines the stored `Link` record and the input shapes used to create,
//! patch, and save links. Field names follow the backend table columns so
//! the same types serialize directly into REST payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the user that owns a link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create a new owner id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A saved bookmark, as persisted by the link store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// Store-assigned identifier
    pub id: Uuid,
    /// Store-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Display title
    pub title: String,
    /// Absolute URL, always carrying a scheme
    pub url: String,
    /// Category id (see `category::DEFAULT_CATEGORIES`)
    pub category: String,
    /// Optional description
    pub description: Option<String>,
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
}

impl Link {
    /// Apply a patch to this link, leaving `id`, `created_at`, and
    /// `owner_id` untouched
    pub fn apply(&mut self, patch: &LinkPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref url) = patch.url {
            self.url = url.clone();
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
    }
}

/// Fields for a link that has not been stored yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub category: String,
    pub description: Option<String>,
}

impl NewLink {
    /// Create new link fields without a description
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: category.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial changes to an existing link
///
/// `None` leaves a field unchanged. For `description`, `Some(None)` clears it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LinkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub description: Option<Option<String>>,
}

impl LinkPatch {
    /// Check whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}

impl From<NewLink> for LinkPatch {
    /// A full replacement of every editable field
    fn from(fields: NewLink) -> Self {
        Self {
            title: Some(fields.title),
            url: Some(fields.url),
            category: Some(fields.category),
            description: Some(fields.description),
        }
    }
}

/// The payload of the link editing form
///
/// Carries an `id` only when an existing link is being edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LinkDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub category: String,
    pub description: String,
}

impl LinkDraft {
    /// Prefill a draft from a stored link
    pub fn from_link(link: &Link) -> Self {
        Self {
            id: Some(link.id),
            title: link.title.clone(),
            url: link.url.clone(),
            category: link.category.clone(),
            description: link.description.clone().unwrap_or_default(),
        }
    }

    /// Split into the target id and the raw fields
    pub fn into_parts(self) -> (Option<Uuid>, NewLink) {
        let description = if self.description.is_empty() {
            None
        } else {
            Some(self.description)
        };
        (
            self.id,
            NewLink {
                title: self.title,
                url: self.url,
                category: self.category,
                description,
            },
        )
    }
}

/// Serde helper distinguishing an absent field from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_link() -> Link {
        Link {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title: "Rust".to_string(),
            url: "https://rust-lang.org".to_string(),
            category: "learning".to_string(),
            description: Some("The book".to_string()),
            owner_id: OwnerId::new("alice"),
        }
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let mut link = sample_link();
        let before = link.clone();

        link.apply(&LinkPatch::default().title("Rustlang").description(None));

        assert_eq!(link.title, "Rustlang");
        assert!(link.description.is_none());
        assert_eq!(link.id, before.id);
        assert_eq!(link.created_at, before.created_at);
        assert_eq!(link.owner_id, before.owner_id);
        assert_eq!(link.url, before.url);
    }

    #[test]
    fn test_patch_serialization_skips_absent_fields() {
        let patch = LinkPatch::default().title("New");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"title": "New"}));

        let clear = LinkPatch::default().description(None);
        let json = serde_json::to_value(&clear).unwrap();
        assert_eq!(json, serde_json::json!({"description": null}));
    }

    #[test]
    fn test_patch_deserialization_null_description() {
        let patch: LinkPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));

        let patch: LinkPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_link_serializes_owner_as_user_id() {
        let link = sample_link();
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["user_id"], "alice");

        let back: Link = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }

    #[test]
    fn test_draft_round_trip_from_link() {
        let link = sample_link();
        let (id, fields) = LinkDraft::from_link(&link).into_parts();
        assert_eq!(id, Some(link.id));
        assert_eq!(fields.title, "Rust");
        assert_eq!(fields.description.as_deref(), Some("The book"));
    }

    #[test]
    fn test_draft_empty_description_is_absent() {
        let draft = LinkDraft {
            title: "Docs".to_string(),
            url: "docs.rs".to_string(),
            category: "learning".to_string(),
            ..Default::default()
        };
        let (id, fields) = draft.into_parts();
        assert!(id.is_none());
        assert!(fields.description.is_none());
    }
}
