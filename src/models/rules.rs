//! Heuristic rule tables.
//!
//! Keyword lists, probe suffixes, table layouts and selectors are plain data
//! so that new site layouts can be handled from `config.toml` alone.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// All heuristic tables, under `[rules]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub classifier: ClassifierRules,

    #[serde(default)]
    pub probe: ProbeRules,

    #[serde(default)]
    pub extractor: ExtractorRules,

    #[serde(default)]
    pub bio: BioRules,
}

impl Rules {
    /// Check that no table the engine depends on is empty.
    pub fn validate(&self) -> Result<()> {
        for (name, rule) in [
            ("football", &self.classifier.football),
            ("coaches", &self.classifier.coaches),
            ("roster", &self.classifier.roster),
        ] {
            if rule.keywords.is_empty() {
                return Err(AppError::validation(format!(
                    "rules.classifier.{name}.keywords is empty"
                )));
            }
            if rule.nav_markers.is_empty() {
                return Err(AppError::validation(format!(
                    "rules.classifier.{name}.nav_markers is empty"
                )));
            }
        }
        for (name, rule) in [
            ("football", &self.probe.football),
            ("coaches", &self.probe.coaches),
            ("roster", &self.probe.roster),
        ] {
            if !rule.suffixes.is_empty() && rule.keywords.is_empty() {
                return Err(AppError::validation(format!(
                    "rules.probe.{name} has suffixes but no corroborating keywords"
                )));
            }
        }
        if self.extractor.table.table_selector.trim().is_empty()
            || self.extractor.table.row_selector.trim().is_empty()
        {
            return Err(AppError::validation(
                "rules.extractor.table selectors must be set",
            ));
        }
        if self.bio.heading_selector.trim().is_empty() {
            return Err(AppError::validation("rules.bio.heading_selector is empty"));
        }
        Ok(())
    }
}

/// Link classification tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Negative keywords shared by every category (other sports, sport codes)
    pub negative_keywords: Vec<String>,

    /// Regexes over `href` marking dated article links
    pub date_patterns: Vec<String>,

    pub football: CategoryRule,
    pub coaches: CategoryRule,
    pub roster: CategoryRule,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            negative_keywords: defaults::shared_negative_keywords(),
            date_patterns: strings(&[r"/\d{4}/\d{1,2}/\d{1,2}/", r"/\d{4}-\d{1,2}-\d{1,2}/"]),
            football: defaults::football_rule(),
            coaches: defaults::coaches_rule(),
            roster: defaults::roster_rule(),
        }
    }
}

/// Keyword rule for one link category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRule {
    /// Positive keywords matched against link text or href
    pub keywords: Vec<String>,

    /// At least one of these must also appear in text or href
    pub required_any: Vec<String>,

    /// Class-name fragments marking a navigation container
    pub nav_markers: Vec<String>,

    /// Negatives applied on top of the shared list
    pub extra_negative_keywords: Vec<String>,

    /// Matches whose absolute URL contains one of these are preferred
    pub preferred_url_markers: Vec<String>,

    /// Drop the query string from the selected URL
    pub strip_query: bool,

    /// The unscoped pass only runs when the page matches this regex
    pub page_pattern: Option<String>,
}

/// Conventional URL suffix probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeRules {
    pub football: ProbeRule,
    pub coaches: ProbeRule,
    pub roster: ProbeRule,
}

impl Default for ProbeRules {
    fn default() -> Self {
        Self {
            football: ProbeRule {
                suffixes: strings(&[
                    "/team/football",
                    "/sports/football",
                    "/football-team",
                    "/football-program",
                    "/football/schedule",
                    "/football/roster",
                    "/football/coaches",
                    "/football/home",
                    "/football/index",
                    "/football/team",
                    "/football/overview",
                ]),
                keywords: strings(&["football", "fball", "football team", "football program"]),
            },
            coaches: ProbeRule {
                suffixes: strings(&[
                    "/coaches",
                    "/coaching-staff",
                    "/football/coaches",
                    "/football/staff",
                    "/football/coaching-staff",
                    "/sports/football/coaches",
                    "/staff-directory",
                ]),
                keywords: strings(&["coach", "staff", "coaching staff"]),
            },
            roster: ProbeRule {
                suffixes: strings(&[
                    "/roster",
                    "/team-roster",
                    "/football/roster",
                    "/football/team-roster",
                    "/sports/football/roster",
                    "/football/roster.html",
                    "/football/team-roster.html",
                ]),
                keywords: strings(&["roster", "players", "team roster"]),
            },
        }
    }
}

/// Suffixes to try and the keywords that corroborate a hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeRule {
    pub suffixes: Vec<String>,
    pub keywords: Vec<String>,
}

/// Coach listing extraction tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorRules {
    pub table: TableLayout,

    /// Container selectors tried in order; the first with a match wins
    pub container_selectors: Vec<String>,

    /// Elements scanned by the generic strategy
    pub generic_selector: String,

    /// Generic candidates must mention one of these...
    pub generic_topic_keywords: Vec<String>,

    /// ...and one of these
    pub generic_contact_keywords: Vec<String>,

    /// Heading-like elements holding the coach name
    pub name_selector: String,

    /// Elements searched for position and sport text
    pub field_selector: String,

    pub position_keywords: Vec<String>,
    pub sport_keywords: Vec<String>,
}

impl Default for ExtractorRules {
    fn default() -> Self {
        Self {
            table: TableLayout::default(),
            container_selectors: strings(&[
                ".coach-card",
                ".staff-card",
                ".directory-item",
                ".staff-member",
                ".coach-profile",
                ".staff-profile",
                ".bio-card",
                ".personnel-card",
                ".coach",
                ".staff",
                ".directory-listing",
                ".staff-listing",
                "div.coach",
                "div.staff",
                "div.directory",
                "div.personnel",
            ]),
            generic_selector: "div, li, article".into(),
            generic_topic_keywords: strings(&["coach", "staff"]),
            generic_contact_keywords: strings(&["email", "phone", "@"]),
            name_selector: "h1, h2, h3, h4, h5, h6, strong, b".into(),
            field_selector: "p, div, span".into(),
            position_keywords: strings(&[
                "head coach",
                "assistant coach",
                "coach",
                "director",
                "coordinator",
            ]),
            sport_keywords: strings(&[
                "basketball",
                "football",
                "soccer",
                "baseball",
                "softball",
                "volleyball",
                "tennis",
                "golf",
                "track",
                "swimming",
            ]),
        }
    }
}

/// Positional cell mapping of a known staff table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub table_selector: String,
    pub row_selector: String,
    pub cell_selector: String,
    pub image_cell: usize,
    pub name_cell: usize,
    pub position_cell: usize,
    pub email_cell: usize,
    pub phone_cell: usize,

    /// Sport stamped on every row of this layout
    pub sport: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            table_selector: "table.sidearm-table".into(),
            row_selector: "tr.sidearm-coaches-coach".into(),
            cell_selector: "td, th".into(),
            image_cell: 0,
            name_cell: 1,
            position_cell: 2,
            email_cell: 3,
            phone_cell: 4,
            sport: "Football".into(),
        }
    }
}

/// Profile page tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BioRules {
    pub bio_selectors: Vec<String>,

    /// Paragraphs longer than this (in characters) form the fallback bio
    pub min_paragraph_chars: usize,

    pub heading_selector: String,

    /// Sibling tags that end a section
    pub stop_tags: Vec<String>,

    /// Sibling tags collected into a section
    pub section_tags: Vec<String>,

    pub education_keywords: Vec<String>,
    pub experience_keywords: Vec<String>,
}

impl Default for BioRules {
    fn default() -> Self {
        Self {
            bio_selectors: strings(&[
                ".bio",
                ".biography",
                ".coach-bio",
                ".staff-bio",
                ".profile-bio",
                ".about",
                ".description",
                ".coach-profile",
            ]),
            min_paragraph_chars: 100,
            heading_selector: "h2, h3, h4, strong".into(),
            stop_tags: strings(&["h2", "h3", "h4"]),
            section_tags: strings(&["p", "li", "div"]),
            education_keywords: strings(&[
                "education",
                "degree",
                "graduate",
                "university",
                "college",
                "school",
            ]),
            experience_keywords: strings(&[
                "experience",
                "career",
                "coaching",
                "history",
                "previous",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

mod defaults {
    use super::{CategoryRule, strings};

    pub fn shared_negative_keywords() -> Vec<String> {
        strings(&[
            // Other sports
            "soccer",
            "baseball",
            "basketball",
            "volleyball",
            "softball",
            "lacrosse",
            "tennis",
            "golf",
            "swimming",
            "diving",
            "track",
            "field",
            "cross country",
            "cross-country",
            "wrestling",
            "hockey",
            "rowing",
            "gymnastics",
            "rugby",
            "bowling",
            "fencing",
            "water polo",
            "beach volleyball",
            "field hockey",
            "skiing",
            "equestrian",
            // Sport codes
            "bsb",
            "mbkb",
            "wbkb",
            "mxc",
            "wxc",
            "mlax",
            "wlax",
            "msoc",
            "wsoc",
            "sball",
            "mswimdive",
            "wswimdive",
            "mten",
            "wten",
            "wvball",
            "w-baskbl",
            "m-xc",
            "w-xc",
            "w-softbl",
            "m-baskbl",
            "m-basebl",
            "w-volley",
            "c-swim",
            "social",
        ])
    }

    pub fn football_rule() -> CategoryRule {
        CategoryRule {
            keywords: strings(&[
                "football",
                "football program",
                "fball",
                "football team",
                "football home",
            ]),
            required_any: strings(&["football", "fball"]),
            nav_markers: strings(&["menu", "nav", "dropdown", "sports", "athletics"]),
            extra_negative_keywords: strings(&[
                "tickets",
                "season tickets",
                "ticket office",
                "box office",
                "purchase tickets",
                "buy tickets",
                "ticket sales",
                "ticket information",
                "seasontickets",
                "podcast",
                "product",
                "shop",
                "store",
                "team store",
                "merchandise",
                "php",
                "women",
                "vice",
                "hype",
                "season",
                "schedule",
                "news",
                "article",
                "output",
                "sb",
            ]),
            preferred_url_markers: Vec::new(),
            strip_query: true,
            page_pattern: Some(
                r"(?i)\b(football|fball|football[\s\-]?home|football[\s\-]?team|football[\s\-]?program)\b"
                    .into(),
            ),
        }
    }

    pub fn coaches_rule() -> CategoryRule {
        CategoryRule {
            keywords: strings(&[
                "coaches",
                "coaching staff",
                "staff directory",
                "football staff",
                "coaches & staff",
                "coaches and staff",
                "staff",
                "directory",
            ]),
            required_any: strings(&["coach", "staff"]),
            nav_markers: strings(&["menu", "nav", "dropdown", "coach", "staff", "football"]),
            extra_negative_keywords: staff_negative_keywords(),
            preferred_url_markers: strings(&["football", "coaches"]),
            strip_query: false,
            page_pattern: None,
        }
    }

    pub fn roster_rule() -> CategoryRule {
        CategoryRule {
            keywords: strings(&["roster", "team roster", "football roster", "players"]),
            required_any: strings(&["roster", "players"]),
            nav_markers: strings(&["menu", "nav", "dropdown", "roster", "football"]),
            extra_negative_keywords: staff_negative_keywords(),
            preferred_url_markers: Vec::new(),
            strip_query: true,
            page_pattern: None,
        }
    }

    fn staff_negative_keywords() -> Vec<String> {
        strings(&[
            // Site sections
            "esports",
            "dance-team",
            "cheerleading",
            "spirit",
            "news",
            "article",
            "press",
            "release",
            "voice",
            "tv",
            "clinic",
            "family",
            "camp",
            "youth",
            "fan",
            "shop",
            "store",
            "tickets",
            "department",
            "cycling",
            "wrest",
            "equest",
            "fh",
            "secure",
            "administration",
            "medicine",
            "pdf",
            "corner",
            "resources",
            "login",
            "register",
            "sign-up",
            "sign in",
            "sign-in",
            "log in",
            "log-in",
            "roger",
            "access",
            "roque",
            "jc",
            "sail",
            "sailing",
            "crew",
            // Gendered sport codes
            "mvball",
            "m-soc",
            "w-soc",
            "m-lax",
            "w-lax",
            "wwrest",
            "m-wrest",
            "m-gym",
            "w-gym",
            "m-swim",
            "w-swim",
            "m-ten",
            "w-ten",
            "m-golf",
            "w-golf",
            "m-track",
            "w-track",
            "m-fieldhockey",
            "w-fieldhockey",
            "m-wrestling",
            "w-wrestling",
            "m-rugby",
            "w-rugby",
            "m-rowing",
            "w-rowing",
            "m-gymnastics",
            "w-gymnastics",
            "m-equestrian",
            "w-equestrian",
            "m-waterpolo",
            "w-waterpolo",
            "m-beachvolleyball",
            "w-beachvolleyball",
            "m-skiing",
            "w-skiing",
            "m-fencing",
            "w-fencing",
            "m-bowling",
            "w-bowling",
            "m-dance",
            "w-dance",
            "m-cheerleading",
            "w-cheerleading",
            "m-esports",
            "w-esports",
            "m-voice",
            "w-voice",
            "m-tv",
            "w-tv",
            "m-clinic",
            "w-clinic",
            "m-family",
            "w-family",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_validate() {
        assert!(Rules::default().validate().is_ok());
    }

    #[test]
    fn empty_keywords_rejected() {
        let mut rules = Rules::default();
        rules.classifier.roster.keywords.clear();
        assert!(rules.validate().is_err());
    }
}
