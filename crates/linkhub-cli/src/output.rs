//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use linkhub_core::category::{self, Category};
use linkhub_core::views::CategoryGroups;
use linkhub_core::{Link, Notice, NoticeLevel, Session};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single link
    pub fn print_link(&self, link: &Link) {
        match self.format {
            OutputFormat::Human => {
                let label = category::label(&link.category);
                println!("ID:          {}", link.id);
                println!("Title:       {}", link.title);
                println!("URL:         {}", link.url);
                println!("Category:    {} {}", label.icon.glyph(), label.name);
                if let Some(ref desc) = link.description {
                    println!("Description: {}", desc);
                }
                println!("Created:     {}", link.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => {
                println!("{}", to_json(link));
            }
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print a flat list of links
    pub fn print_links(&self, links: &[&Link]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links found.");
                    return;
                }
                for link in links {
                    println!("{}", link_row(link));
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => {
                println!("{}", to_json(&links));
            }
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print links grouped under their categories
    pub fn print_groups(&self, groups: &CategoryGroups<'_>) {
        match self.format {
            OutputFormat::Human => {
                if groups.is_empty() {
                    println!("No links found.");
                    return;
                }
                let mut total = 0;
                for (id, links) in groups.iter() {
                    let label = category::label(id);
                    println!("{} {} ({})", label.icon.glyph(), label.name, links.len());
                    for link in links {
                        println!("  {}", link_row(link));
                    }
                    println!();
                    total += links.len();
                }
                println!("{} link(s)", total);
            }
            OutputFormat::Json => {
                let json_groups: Vec<_> = groups
                    .iter()
                    .map(|(id, links)| {
                        serde_json::json!({
                            "category": id,
                            "name": category::label(id).name,
                            "links": links,
                        })
                    })
                    .collect();
                println!("{}", to_json(&json_groups));
            }
            OutputFormat::Quiet => {
                for (_, links) in groups.iter() {
                    for link in links {
                        println!("{}", link.id);
                    }
                }
            }
        }
    }

    /// Print categories with their link counts
    pub fn print_categories(&self, categories: &[(&Category, usize)]) {
        match self.format {
            OutputFormat::Human => {
                for (category, count) in categories {
                    println!(
                        "{} {:<14} {:<14} ({}) {}",
                        category.icon.glyph(),
                        category.id,
                        category.name,
                        count,
                        category.description
                    );
                }
            }
            OutputFormat::Json => {
                let json_categories: Vec<_> = categories
                    .iter()
                    .map(|(category, count)| {
                        serde_json::json!({
                            "id": category.id,
                            "name": category.name,
                            "icon": category.icon.name(),
                            "description": category.description,
                            "count": count,
                        })
                    })
                    .collect();
                println!("{}", to_json(&json_categories));
            }
            OutputFormat::Quiet => {
                for (category, _) in categories {
                    println!("{}", category.id);
                }
            }
        }
    }

    /// Print the signed-in session
    pub fn print_session(&self, session: Option<&Session>) {
        match (self.format, session) {
            (OutputFormat::Human, Some(session)) => {
                println!("Signed in as {}", session.display_name());
                println!("User ID: {}", session.owner_id);
                if let Some(ref email) = session.email {
                    println!("Email:   {}", email);
                }
            }
            (OutputFormat::Human, None) => println!("Not signed in."),
            (OutputFormat::Json, session) => {
                println!(
                    "{}",
                    serde_json::json!({
                        "signed_in": session.is_some(),
                        "user_id": session.map(|s| s.owner_id.as_str()),
                        "email": session.and_then(|s| s.email.as_deref()),
                    })
                );
            }
            (OutputFormat::Quiet, Some(session)) => println!("{}", session.owner_id),
            (OutputFormat::Quiet, None) => {}
        }
    }

    /// Print notices raised by collection operations
    ///
    /// Errors go to stderr in every mode except quiet.
    pub fn print_notices(&self, notices: &[Notice]) {
        for notice in notices {
            match notice.level {
                NoticeLevel::Success => self.success(&notice.message),
                NoticeLevel::Error => self.error(&notice.message),
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("✗ {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"status": "error", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    })
}

/// One-line summary of a link
fn link_row(link: &Link) -> String {
    format!(
        "{} | {} | {}",
        &link.id.to_string()[..8],
        truncate(&link.title, 35),
        truncate(&link.url, 45)
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
