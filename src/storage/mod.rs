//! Storage abstractions for coach documents.
//!
//! Each successful school run becomes one `CoachDocument`, written twice:
//!
//! ```text
//! {output_dir}/
//! └── {prefix}/
//!     ├── coaches_{school_id}_{YYYYMMDD_HHMMSS}_raw_coaches.json   # Immutable snapshot
//!     └── coaches_{school_id}_latest.json                          # Overwritten each run
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{CoachRecord, SchoolRun};

// Re-export for convenience
pub use local::LocalStorage;

/// Format of the snapshot timestamp in keys and metadata.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Key of the timestamped snapshot
    pub snapshot_key: String,
    /// Key of the latest pointer copy
    pub latest_key: String,
    /// Number of coaches written
    pub coach_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Provenance header of a coach document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub school_name: String,

    #[serde(alias = "organization_id")]
    pub school_id: String,

    /// `YYYYMMDD_HHMMSS`, matching the snapshot key
    pub timestamp: String,

    /// Page the coaches were extracted from
    pub source_url: String,

    /// RFC 3339 time of the write
    pub scrape_date: String,
}

/// JSON document handed to storage for one school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachDocument {
    pub metadata: DocumentMetadata,
    pub coaches: Vec<CoachRecord>,

    /// Distinct coach emails in record order
    #[serde(default)]
    pub emails: Vec<String>,
}

impl CoachDocument {
    /// Build the document for a finished run at time `now`.
    pub fn from_run(run: &SchoolRun, now: DateTime<Utc>) -> Self {
        let mut emails: Vec<String> = Vec::new();
        for email in run.coaches.iter().filter_map(|c| c.email.as_ref()) {
            if !emails.contains(email) {
                emails.push(email.clone());
            }
        }

        Self {
            metadata: DocumentMetadata {
                school_name: run.school.school_name.clone(),
                school_id: run.school.school_id.clone(),
                timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
                source_url: run.coaches_url.clone().unwrap_or_default(),
                scrape_date: now.to_rfc3339(),
            },
            coaches: run.coaches.clone(),
            emails,
        }
    }
}

/// Trait for coach document storage backends.
#[async_trait]
pub trait CoachStorage: Send + Sync {
    /// Write the run's document as a timestamped snapshot and as the latest copy.
    async fn write_run(&self, run: &SchoolRun) -> Result<WriteMetadata>;

    /// Load the latest document for a school, if one was written.
    async fn load_latest(&self, school_id: &str) -> Result<Option<CoachDocument>>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::SchoolContext;

    #[test]
    fn test_document_collects_distinct_emails() {
        let school = SchoolContext {
            school_id: "9".into(),
            school_name: "Example Tech".into(),
            athletics_url: "goexample.com".into(),
            division: None,
            conference: None,
            coaching_staff_url: None,
        };
        let mut a = CoachRecord::named("A One").unwrap();
        a.email = Some("a@x.edu".into());
        let mut b = CoachRecord::named("B Two").unwrap();
        b.email = Some("a@x.edu".into());
        let c = CoachRecord::named("C Three").unwrap();

        let mut run = SchoolRun::start(&school).complete(vec![a, b, c]);
        run.coaches_url = Some("https://goexample.com/coaches".into());

        let now = Utc.with_ymd_and_hms(2024, 9, 1, 8, 5, 3).unwrap();
        let doc = CoachDocument::from_run(&run, now);

        assert_eq!(doc.emails, vec!["a@x.edu"]);
        assert_eq!(doc.coaches.len(), 3);
        assert_eq!(doc.metadata.timestamp, "20240901_080503");
        assert_eq!(doc.metadata.source_url, "https://goexample.com/coaches");
    }
}
