//! Link command handlers

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use linkhub_core::category;
use linkhub_core::views;
use linkhub_core::{Backend, Config, LinkCollection, LinkDraft, LinkPatch, NewLink};

use super::{open_collection, settle};
use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Fields given on the command line for a new link
pub struct AddArgs {
    pub url: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Fields given on the command line for an edit
#[derive(Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl EditArgs {
    fn into_patch(self) -> LinkPatch {
        let mut patch = LinkPatch::default();
        if let Some(title) = self.title {
            patch = patch.title(title);
        }
        if let Some(url) = self.url {
            patch = patch.url(url);
        }
        if let Some(category) = self.category {
            patch = patch.category(category);
        }
        if let Some(description) = self.description {
            // An empty description clears it
            patch = patch.description(Some(description));
        }
        patch
    }
}

/// Add a new link
pub async fn add(config: &Config, args: AddArgs, output: &Output) -> Result<()> {
    let mut links = open_collection(config, output).await?;

    let category = args
        .category
        .unwrap_or_else(|| category::default_category().id.to_string());
    let mut fields = NewLink::new(args.title.unwrap_or_default(), args.url, category);
    if let Some(description) = args.description {
        fields = fields.with_description(description);
    }

    let result = links.add(fields).await;
    let link = settle(&mut links, output, result)?;
    output.print_link(&link);
    Ok(())
}

/// List links grouped by category, optionally filtered
pub async fn list(
    config: &Config,
    search: Option<String>,
    category: Option<String>,
    flat: bool,
    output: &Output,
) -> Result<()> {
    let links = open_collection(config, output).await?;

    let query = search.unwrap_or_default();
    let found = views::filter(links.links(), &query, category.as_deref());
    if flat {
        output.print_links(&found);
    } else {
        output.print_groups(&views::group_by_category(found));
    }
    Ok(())
}

/// Show a single link
pub async fn show(config: &Config, id: String, output: &Output) -> Result<()> {
    let links = open_collection(config, output).await?;
    let uuid = parse_link_id(&id, &links)?;

    let link = links
        .find(uuid)
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;

    output.print_link(link);
    Ok(())
}

/// Edit a link
///
/// With no field flags and a human at the terminal, prompts for each field.
pub async fn edit(config: &Config, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let mut links = open_collection(config, output).await?;
    let uuid = parse_link_id(&id, &links)?;

    let patch = args.into_patch();
    let result = if patch.is_empty() {
        if !output.should_prompt() {
            bail!("Nothing to change. Pass --title, --url, --category, or --description.");
        }
        let link = links
            .find(uuid)
            .ok_or_else(|| anyhow!("Link not found: {}", id))?;
        let draft = prompt_draft(LinkDraft::from_link(link))?;
        links.save(draft).await
    } else {
        links.update(uuid, patch).await
    };

    let link = settle(&mut links, output, result)?;
    output.print_link(&link);
    Ok(())
}

/// Delete a link
pub async fn delete(config: &Config, id: String, yes: bool, output: &Output) -> Result<()> {
    let mut links = open_collection(config, output).await?;
    let uuid = parse_link_id(&id, &links)?;

    // Confirm deletion
    if output.should_prompt() && !yes {
        if let Some(link) = links.find(uuid) {
            println!(
                "Delete link: {} - {}",
                &link.id.to_string()[..8],
                link.title
            );
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled. Pass --yes to delete without asking.");
            return Ok(());
        }
    }

    let result = links.remove(uuid).await;
    settle(&mut links, output, result)?;
    Ok(())
}

/// Open a link in the default browser
pub async fn open(config: &Config, id: String, output: &Output) -> Result<()> {
    let links = open_collection(config, output).await?;
    let uuid = parse_link_id(&id, &links)?;

    let link = links
        .find(uuid)
        .ok_or_else(|| anyhow!("Link not found: {}", id))?;

    open::that(&link.url).with_context(|| format!("Failed to open {}", link.url))?;
    output.message(&format!("Opened {}", link.url));
    Ok(())
}

/// Search links
pub async fn search(config: &Config, query: String, output: &Output) -> Result<()> {
    let links = open_collection(config, output).await?;
    output.print_links(&views::filter(links.links(), &query, None));
    Ok(())
}

/// Parse a link ID (supports full UUID or prefix)
fn parse_link_id(id: &str, links: &LinkCollection<Backend>) -> Result<Uuid> {
    if let Some(uuid) = links.resolve_id(id) {
        return Ok(uuid);
    }

    let matches = links.matching_prefix(id);

    if matches.is_empty() {
        bail!("No link found matching: {}", id);
    }

    eprintln!("Multiple links match '{}':", id);
    for link in &matches {
        eprintln!("  {} - {}", link.id, link.title);
    }
    bail!("Ambiguous ID. Please provide more characters.");
}

/// Walk the user through each editable field
fn prompt_draft(mut draft: LinkDraft) -> Result<LinkDraft> {
    println!("Press Enter to keep current value, or type new value.\n");

    if let Some(title) = prompt_with_default("Title", &draft.title)? {
        draft.title = title;
    }
    if let Some(url) = prompt_with_default("URL", &draft.url)? {
        draft.url = url;
    }

    let ids: Vec<_> = category::DEFAULT_CATEGORIES.iter().map(|c| c.id).collect();
    println!("Categories: {}", ids.join(", "));
    if let Some(category) = prompt_with_default("Category", &draft.category)? {
        draft.category = category;
    }

    if let Some(description) = prompt_with_default("Description (- to clear)", &draft.description)? {
        draft.description = if description == "-" {
            String::new()
        } else {
            description
        };
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_args_without_flags_is_empty() {
        assert!(EditArgs::default().into_patch().is_empty());
    }

    #[test]
    fn test_edit_args_into_patch() {
        let patch = EditArgs {
            title: Some("Rust Docs".to_string()),
            description: Some(String::new()),
            ..Default::default()
        }
        .into_patch();

        assert_eq!(patch.title.as_deref(), Some("Rust Docs"));
        assert!(patch.url.is_none());
        assert!(patch.category.is_none());
        assert_eq!(patch.description, Some(Some(String::new())));
    }
}
