//! Service layer for the crawler.
//!
//! This module contains the stages of the page-finding engine:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Link classification (`LinkClassifier`)
//! - Suffix probing (`PatternProbe`)
//! - Coach listing extraction (`CoachExtractor`)
//! - Profile enrichment (`BioEnricher`)
//! - AI fallback parsing (`AiFallback`, `HttpAiParser`)

mod ai;
mod bio;
mod classifier;
pub mod extractor;
pub(crate) mod fetcher;
mod probe;

pub use ai::{AiFallback, HttpAiParser};
pub use bio::BioEnricher;
pub use classifier::LinkClassifier;
pub use extractor::{CoachExtractor, ExtractionStrategy};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use probe::PatternProbe;
