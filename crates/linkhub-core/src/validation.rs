//! Input validation and URL normalization
//!
//! Runs before any store call. Every failing field is reported, so a form
//! can show all problems at once.

use reqwest::Url;
use serde::Serialize;
use thiserror::Error;

use crate::category;
use crate::models::{LinkPatch, NewLink};

/// Form fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Url,
    Category,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Url => "url",
            Field::Category => "category",
        };
        write!(f, "{}", name)
    }
}

/// A single field failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// One or more fields failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid input: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// The message for a field, if that field failed
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub const TITLE_REQUIRED: &str = "Title is required";
pub const URL_REQUIRED: &str = "URL is required";
pub const URL_INVALID: &str = "Please enter a valid URL";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const CATEGORY_UNKNOWN: &str = "Unknown category";

/// Prepend `https://` when the input carries no http(s) scheme
///
/// Surrounding whitespace is removed. The result is not checked; use
/// `normalize_url` for that.
pub fn with_scheme(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Normalize and check a user-entered URL
pub fn normalize_url(input: &str) -> Result<String, &'static str> {
    if input.trim().is_empty() {
        return Err(URL_REQUIRED);
    }

    if foreign_scheme(input.trim()) {
        return Err(URL_INVALID);
    }

    let candidate = with_scheme(input);
    let url = Url::parse(&candidate).map_err(|_| URL_INVALID)?;
    if !url.host_str().is_some_and(|h| !h.is_empty())
        || authority(&candidate).ends_with(':')
        || url.path().starts_with("//")
    {
        return Err(URL_INVALID);
    }
    Ok(candidate)
}

/// Check for an explicit `scheme://` prefix other than http(s)
fn foreign_scheme(input: &str) -> bool {
    let Some(end) = input.find("://") else {
        return false;
    };
    let scheme = &input[..end];
    let well_formed = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    well_formed && !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https")
}

/// The `host[:port]` text of a URL that starts with `scheme://`
fn authority(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Blank descriptions are stored as absent
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) -> String {
    let title = title.trim();
    if title.is_empty() {
        errors.push(FieldError {
            field: Field::Title,
            message: TITLE_REQUIRED,
        });
    }
    title.to_string()
}

fn check_url(url: &str, errors: &mut Vec<FieldError>) -> String {
    match normalize_url(url) {
        Ok(url) => url,
        Err(message) => {
            errors.push(FieldError {
                field: Field::Url,
                message,
            });
            String::new()
        }
    }
}

fn check_category(category: &str, errors: &mut Vec<FieldError>) -> String {
    let category = category.trim();
    if category.is_empty() {
        errors.push(FieldError {
            field: Field::Category,
            message: CATEGORY_REQUIRED,
        });
    } else if !category::is_known(category) {
        errors.push(FieldError {
            field: Field::Category,
            message: CATEGORY_UNKNOWN,
        });
    }
    category.to_string()
}

/// Validate and normalize fields for a new link
pub fn validate_new(fields: NewLink) -> Result<NewLink, ValidationError> {
    let mut errors = Vec::new();

    let title = check_title(&fields.title, &mut errors);
    let url = check_url(&fields.url, &mut errors);
    let category = check_category(&fields.category, &mut errors);

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    Ok(NewLink {
        title,
        url,
        category,
        description: normalize_description(fields.description),
    })
}

/// Validate and normalize the fields a patch carries
pub fn validate_patch(patch: LinkPatch) -> Result<LinkPatch, ValidationError> {
    let mut errors = Vec::new();

    let title = patch.title.map(|t| check_title(&t, &mut errors));
    let url = patch.url.map(|u| check_url(&u, &mut errors));
    let category = patch.category.map(|c| check_category(&c, &mut errors));

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    Ok(LinkPatch {
        title,
        url,
        category,
        description: patch.description.map(normalize_description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
        assert_eq!(normalize_url("  docs.rs ").unwrap(), "https://docs.rs");
    }

    #[test]
    fn test_existing_scheme_is_kept() {
        assert_eq!(normalize_url("http://x.com").unwrap(), "http://x.com");
        assert_eq!(
            normalize_url("https://example.com/a?b=c").unwrap(),
            "https://example.com/a?b=c"
        );
        assert_eq!(normalize_url("HTTP://X.com").unwrap(), "HTTP://X.com");
    }

    #[test]
    fn test_host_starting_with_http_still_gets_scheme() {
        assert_eq!(normalize_url("httpbin.org").unwrap(), "https://httpbin.org");
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        assert_eq!(normalize_url("ftp://x.com"), Err(URL_INVALID));
        assert_eq!(normalize_url("javascript://x.com"), Err(URL_INVALID));
    }

    #[test]
    fn test_mangled_http_scheme_is_rejected() {
        assert_eq!(normalize_url("https:/example.com"), Err(URL_INVALID));
        assert_eq!(normalize_url("https//example.com"), Err(URL_INVALID));
        assert_eq!(normalize_url("http:example.com"), Err(URL_INVALID));
    }

    #[test]
    fn test_ports_and_nested_urls_are_kept() {
        assert_eq!(
            normalize_url("localhost:8080/app").unwrap(),
            "https://localhost:8080/app"
        );
        assert_eq!(
            normalize_url("example.com/go?to=ftp://x.com").unwrap(),
            "https://example.com/go?to=ftp://x.com"
        );
    }

    #[test]
    fn test_empty_url_is_required() {
        assert_eq!(normalize_url(""), Err(URL_REQUIRED));
        assert_eq!(normalize_url("   "), Err(URL_REQUIRED));
    }

    #[test]
    fn test_malformed_url_is_invalid() {
        assert_eq!(normalize_url("not a url"), Err(URL_INVALID));
        assert_eq!(normalize_url("https://"), Err(URL_INVALID));
    }

    #[test]
    fn test_validate_new_normalizes() {
        let fields = NewLink::new("  Docs ", "docs.rs", "learning").with_description("   ");
        let valid = validate_new(fields).unwrap();
        assert_eq!(valid.title, "Docs");
        assert_eq!(valid.url, "https://docs.rs");
        assert_eq!(valid.category, "learning");
        assert!(valid.description.is_none());
    }

    #[test]
    fn test_validate_new_reports_every_field() {
        let err = validate_new(NewLink::new("", "", "")).unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert_eq!(err.message_for(Field::Title), Some(TITLE_REQUIRED));
        assert_eq!(err.message_for(Field::Url), Some(URL_REQUIRED));
        assert_eq!(err.message_for(Field::Category), Some(CATEGORY_REQUIRED));
    }

    #[test]
    fn test_validate_new_rejects_unknown_category() {
        let err = validate_new(NewLink::new("Cake", "cake.com", "recipes")).unwrap_err();
        assert_eq!(err.message_for(Field::Category), Some(CATEGORY_UNKNOWN));
        assert!(err.message_for(Field::Title).is_none());
    }

    #[test]
    fn test_validate_patch_checks_only_present_fields() {
        let patch = validate_patch(LinkPatch::default().title(" new ")).unwrap();
        assert_eq!(patch.title.as_deref(), Some("new"));
        assert!(patch.url.is_none());

        let err = validate_patch(LinkPatch::default().url("")).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.message_for(Field::Url), Some(URL_REQUIRED));
    }

    #[test]
    fn test_validate_patch_normalizes_description() {
        let patch = validate_patch(LinkPatch::default().description(Some(" ".into()))).unwrap();
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn test_error_display_lists_fields() {
        let err = validate_new(NewLink::new("", "example.com", "learning")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: title: Title is required");
    }
}
