//! Per-school run results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CoachRecord, SchoolContext};

/// Pipeline stage a negative result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AthleticsUrl,
    FootballProgram,
    CoachesPage,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AthleticsUrl => "athletics url",
            Self::FootballProgram => "football program page",
            Self::CoachesPage => "coaches page",
        };
        f.write_str(name)
    }
}

/// Why a school run produced no coaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Network, timeout or non-2xx status after retries
    FetchFailure(String),
    /// No candidate link at the given stage
    NotFound(Stage),
    /// Coaches page fetched but no strategy recognised any record
    ExtractionEmpty,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailure(message) => write!(f, "fetch failure: {message}"),
            Self::NotFound(stage) => write!(f, "not found: {stage}"),
            Self::ExtractionEmpty => f.write_str("no coach records extracted"),
        }
    }
}

/// Result of one school pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolRun {
    pub school: SchoolContext,
    pub success: bool,
    pub coaches: Vec<CoachRecord>,
    pub football_url: Option<String>,

    /// Page the coach records were extracted from
    pub coaches_url: Option<String>,

    pub failure: Option<FailureReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SchoolRun {
    /// Start a run record; it stays unsuccessful until completed.
    pub fn start(school: &SchoolContext) -> Self {
        let now = Utc::now();
        Self {
            school: school.clone(),
            success: false,
            coaches: Vec::new(),
            football_url: None,
            coaches_url: None,
            failure: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Mark the run failed, discarding any partial records.
    pub fn fail(mut self, reason: FailureReason) -> Self {
        log::error!("{}: {}", self.school.school_name, reason);
        self.success = false;
        self.coaches.clear();
        self.failure = Some(reason);
        self.finished_at = Utc::now();
        self
    }

    /// Mark the run successful with the final records.
    pub fn complete(mut self, coaches: Vec<CoachRecord>) -> Self {
        self.success = true;
        self.coaches = coaches;
        self.failure = None;
        self.finished_at = Utc::now();
        self
    }
}
