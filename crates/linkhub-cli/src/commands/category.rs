//! Category command handlers

use anyhow::Result;

use linkhub_core::views;
use linkhub_core::{Config, DEFAULT_CATEGORIES};

use super::open_collection;
use crate::output::Output;

/// List categories with how many links each holds
///
/// With an active category, only that category and the ones in use are
/// shown.
pub async fn list(config: &Config, active: Option<String>, output: &Output) -> Result<()> {
    let links = open_collection(config, output).await?;

    let groups = views::group_by_category(links.links());
    let categories: Vec<_> =
        views::visible_categories(DEFAULT_CATEGORIES, links.links(), active.as_deref())
            .into_iter()
            .map(|c| (c, groups.get(c.id).map_or(0, |members| members.len())))
            .collect();

    output.print_categories(&categories);

    let uncategorized: Vec<_> = groups
        .categories()
        .filter(|id| !linkhub_core::category::is_known(id))
        .collect();
    if !uncategorized.is_empty() && !output.is_quiet() && !output.is_json() {
        println!("\nOther categories in use: {}", uncategorized.join(", "));
    }
    Ok(())
}
