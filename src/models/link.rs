//! Link classification types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of page a link is expected to lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    /// The football program home page on an athletics site
    FootballProgram,
    /// A coaching staff directory
    Coaches,
    /// A team roster
    Roster,
    /// Coaches preferred, roster accepted
    CoachesOrRoster,
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FootballProgram => "football program",
            Self::Coaches => "coaches",
            Self::Roster => "roster",
            Self::CoachesOrRoster => "coaches or roster",
        };
        f.write_str(name)
    }
}

/// A hyperlink considered during one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCandidate {
    /// Raw `href` attribute
    pub href: String,

    /// `href` joined onto the page URL
    pub absolute_url: String,

    /// Visible text of the anchor
    pub link_text: String,

    /// Whether the anchor sits inside a navigation-like container
    pub in_navigation: bool,
}

/// Outcome of classifying or probing for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Found { url: String, category: LinkCategory },
    NotFound,
}

impl Classification {
    pub fn found(url: impl Into<String>, category: LinkCategory) -> Self {
        Self::Found {
            url: url.into(),
            category,
        }
    }

    /// URL of the selected page, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found { url, .. } => Some(url),
            Self::NotFound => None,
        }
    }
}
