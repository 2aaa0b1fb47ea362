// src/models/school.rs

//! School input records.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::normalize_site_url;

/// A school whose football staff should be collected.
///
/// Immutable input threaded through every pipeline stage; its fields are
/// stamped onto each emitted coach record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolContext {
    #[serde(alias = "ncaa_institution_id", alias = "orgId")]
    pub school_id: String,

    pub school_name: String,

    /// Athletics home page, possibly without a scheme
    #[serde(alias = "athletic_web_url")]
    pub athletics_url: String,

    #[serde(default)]
    pub division: Option<String>,

    #[serde(default)]
    pub conference: Option<String>,

    /// Known coaches or roster page; skips link discovery when set
    #[serde(default, alias = "roster_url", skip_serializing_if = "Option::is_none")]
    pub coaching_staff_url: Option<String>,
}

impl SchoolContext {
    /// Load a list of schools from a JSON file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Athletics URL with a scheme, or `None` when blank.
    pub fn athletics_url(&self) -> Option<String> {
        normalize_site_url(&self.athletics_url)
    }

    /// Pre-supplied coaches page, ignoring blank values.
    pub fn preset_coaches_url(&self) -> Option<String> {
        self.coaching_staff_url
            .as_deref()
            .and_then(normalize_site_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_upstream_field_names() {
        let json = r#"[{
            "ncaa_institution_id": "123",
            "school_name": "Example State",
            "athletic_web_url": "//goexample.com",
            "division": "I",
            "conference": "Big Example",
            "roster_url": ""
        }]"#;
        let schools: Vec<SchoolContext> = serde_json::from_str(json).unwrap();

        assert_eq!(schools[0].school_id, "123");
        assert_eq!(
            schools[0].athletics_url().as_deref(),
            Some("https://goexample.com")
        );
        assert_eq!(schools[0].preset_coaches_url(), None);
    }
}
