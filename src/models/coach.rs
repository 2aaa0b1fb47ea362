//! Coach records.

use serde::{Deserialize, Serialize};

use crate::models::SchoolContext;

/// A coach or staff member found on a coaches/roster page.
///
/// Records are only created with a non-empty `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachRecord {
    pub name: String,

    #[serde(default, alias = "title")]
    pub position: Option<String>,

    #[serde(default)]
    pub sport: Option<String>,

    #[serde(default, alias = "fullBioLink")]
    pub profile_url: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    // School context
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,

    // Profile page enrichment
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<String>,
}

impl CoachRecord {
    /// Create a record with only a name. Returns `None` for a blank name.
    pub fn named(name: &str) -> Option<Self> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            ..Self::default()
        })
    }

    /// Stamp school fields onto the record.
    pub fn stamp(&mut self, school: &SchoolContext, sport: &str) {
        self.school_id = Some(school.school_id.clone());
        self.school_name = Some(school.school_name.clone());
        self.division = school.division.clone();
        self.conference = school.conference.clone();
        self.sport = Some(sport.to_string());
    }

    /// Merge profile page details; contact fields found there win.
    pub fn merge_bio(&mut self, details: BioDetails) {
        if details.bio.is_some() {
            self.bio = details.bio;
        }
        if !details.education.is_empty() {
            self.education = details.education;
        }
        if !details.experience.is_empty() {
            self.experience = details.experience;
        }
        if details.email.is_some() {
            self.email = details.email;
        }
        if details.phone.is_some() {
            self.phone = details.phone;
        }
    }
}

/// Fields scraped from a coach profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioDetails {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl BioDetails {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.education.is_empty()
            && self.experience.is_empty()
            && self.email.is_none()
            && self.phone.is_none()
    }
}
