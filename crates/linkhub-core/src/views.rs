//! Derived views over a list of links
//!
//! Pure functions, recomputed on demand. Nothing here is stored.

use std::collections::HashSet;

use crate::category::Category;
use crate::models::Link;

/// Check whether a link matches a search query (case-insensitive)
///
/// An empty query matches everything. A missing description never matches.
pub fn matches_query(link: &Link, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    link.title.to_lowercase().contains(&needle)
        || link.url.to_lowercase().contains(&needle)
        || link
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Links matching both the query and the active category, in input order
pub fn filter<'a>(links: &'a [Link], query: &str, active_category: Option<&str>) -> Vec<&'a Link> {
    links
        .iter()
        .filter(|link| matches_query(link, query))
        .filter(|link| active_category.map_or(true, |c| link.category == c))
        .collect()
}

/// Links partitioned by category id
///
/// Groups appear in the order their category was first seen; links keep
/// their relative order within a group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryGroups<'a> {
    groups: Vec<(&'a str, Vec<&'a Link>)>,
}

impl<'a> CategoryGroups<'a> {
    /// The links in a category, if any
    pub fn get(&self, category: &str) -> Option<&[&'a Link]> {
        self.groups
            .iter()
            .find(|(id, _)| *id == category)
            .map(|(_, links)| links.as_slice())
    }

    /// Category ids in first-seen order
    pub fn categories(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(id, _)| *id)
    }

    /// Iterate over `(category id, links)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Link])> + '_ {
        self.groups.iter().map(|(id, links)| (*id, links.as_slice()))
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Partition links by category
pub fn group_by_category<'a, I>(links: I) -> CategoryGroups<'a>
where
    I: IntoIterator<Item = &'a Link>,
{
    let mut groups: Vec<(&'a str, Vec<&'a Link>)> = Vec::new();
    for link in links {
        match groups.iter_mut().find(|(id, _)| *id == link.category) {
            Some((_, members)) => members.push(link),
            None => groups.push((link.category.as_str(), vec![link])),
        }
    }
    CategoryGroups { groups }
}

/// The distinct category ids present in `links`
pub fn categories_in_use(links: &[Link]) -> HashSet<&str> {
    links.iter().map(|l| l.category.as_str()).collect()
}

/// Categories to offer in navigation
///
/// With no active filter every catalog category is shown. With a filter,
/// the active category is shown along with every category that has links.
pub fn visible_categories<'c>(
    catalog: &'c [Category],
    links: &[Link],
    active_category: Option<&str>,
) -> Vec<&'c Category> {
    let in_use = categories_in_use(links);
    catalog
        .iter()
        .filter(|c| match active_category {
            None => true,
            Some(active) => active == c.id || in_use.contains(c.id),
        })
        .collect()
}
