// src/models/mod.rs

//! Domain models for the crawler.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod coach;
mod config;
mod link;
mod page;
mod rules;
mod run;
mod school;

// Re-export all public types
pub use coach::{BioDetails, CoachRecord};
pub use config::{AiConfig, Config, CrawlerConfig, StorageConfig};
pub use link::{AnchorCandidate, Classification, LinkCategory};
pub use page::{Page, ProbeResponse};
pub use rules::{
    BioRules, CategoryRule, ClassifierRules, ExtractorRules, ProbeRule, ProbeRules, Rules,
    TableLayout,
};
pub use run::{FailureReason, SchoolRun, Stage};
pub use school::SchoolContext;
