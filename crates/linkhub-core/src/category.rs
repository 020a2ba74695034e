//! Category catalog
//!
//! Categories are static configuration: a fixed list known at build time,
//! not stored per user. Links reference categories by id. A stored link may
//! carry an id that is not in the catalog; such links are still shown, under
//! their raw id and the fallback icon.

use serde::Serialize;

/// Icons available to categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Icon {
    Lightbulb,
    GraduationCap,
    ShoppingBag,
    BookOpen,
    Globe,
    Play,
    Coffee,
}

impl Icon {
    /// Icon used when a name or category is not recognized
    pub const FALLBACK: Icon = Icon::Globe;

    /// The icon name
    pub fn name(&self) -> &'static str {
        match self {
            Icon::Lightbulb => "Lightbulb",
            Icon::GraduationCap => "GraduationCap",
            Icon::ShoppingBag => "ShoppingBag",
            Icon::BookOpen => "BookOpen",
            Icon::Globe => "Globe",
            Icon::Play => "Play",
            Icon::Coffee => "Coffee",
        }
    }

    /// A terminal-friendly glyph for the icon
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Lightbulb => "💡",
            Icon::GraduationCap => "🎓",
            Icon::ShoppingBag => "🛍",
            Icon::BookOpen => "📖",
            Icon::Globe => "🌐",
            Icon::Play => "▶",
            Icon::Coffee => "☕",
        }
    }
}

/// A link category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: Icon,
    pub description: &'static str,
}

/// The built-in category list, in display order
pub const DEFAULT_CATEGORIES: &[Category] = &[
    Category {
        id: "ai-tools",
        name: "AI Tools",
        icon: Icon::Lightbulb,
        description: "Artificial intelligence tools and platforms",
    },
    Category {
        id: "learning",
        name: "Learning",
        icon: Icon::GraduationCap,
        description: "Educational websites and learning platforms",
    },
    Category {
        id: "shopping",
        name: "Shopping",
        icon: Icon::ShoppingBag,
        description: "Online stores and marketplaces",
    },
    Category {
        id: "reading",
        name: "Reading",
        icon: Icon::BookOpen,
        description: "News, blogs, and articles",
    },
    Category {
        id: "social",
        name: "Social",
        icon: Icon::Globe,
        description: "Social media platforms",
    },
    Category {
        id: "entertainment",
        name: "Entertainment",
        icon: Icon::Play,
        description: "Videos, music, and streaming services",
    },
    Category {
        id: "productivity",
        name: "Productivity",
        icon: Icon::Coffee,
        description: "Tools to boost your productivity",
    },
];

/// Find a catalog category by id
pub fn find(id: &str) -> Option<&'static Category> {
    DEFAULT_CATEGORIES.iter().find(|c| c.id == id)
}

/// Check whether an id names a catalog category
pub fn is_known(id: &str) -> bool {
    find(id).is_some()
}

/// The category preselected for a new link
pub fn default_category() -> &'static Category {
    &DEFAULT_CATEGORIES[0]
}

/// Display information for a category id, known or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub icon: Icon,
    pub known: bool,
}

/// Resolve a category id for display
///
/// Unknown ids are shown verbatim with the fallback icon.
pub fn label(id: &str) -> CategoryLabel<'_> {
    match find(id) {
        Some(category) => CategoryLabel {
            id: category.id,
            name: category.name,
            icon: category.icon,
            known: true,
        },
        None => CategoryLabel {
            id,
            name: id,
            icon: Icon::FALLBACK,
            known: false,
        },
    }
}
