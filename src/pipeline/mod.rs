//! Pipeline entry points for crawler operations.
//!
//! - `SchoolPipeline`: Find and extract the football coaching staff of one school
//! - `run_batch`: Run many schools concurrently and store the results

pub mod batch;
pub mod school;

pub use batch::{BatchSummary, run_batch};
pub use school::SchoolPipeline;
