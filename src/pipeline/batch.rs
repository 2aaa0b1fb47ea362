// src/pipeline/batch.rs

//! Multi-school batch runs.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, FailureReason, SchoolContext, SchoolRun};
use crate::pipeline::SchoolPipeline;
use crate::services::{AiFallback, HttpAiParser, HttpFetcher};
use crate::storage::CoachStorage;
use crate::utils::log;

/// Outcome counts of a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub coaches: usize,
    pub storage_failures: usize,
}

/// Run every school, at most `crawler.max_concurrent` at a time, then store successes.
///
/// Only setup errors (invalid rules, AI client construction) are returned.
/// Per-school failures and storage failures are counted in the summary.
pub async fn run_batch(
    config: Arc<Config>,
    schools: &[SchoolContext],
    storage: &dyn CoachStorage,
) -> Result<BatchSummary> {
    let start_time = Utc::now();
    log::header(&format!("Coach crawl: {} schools", schools.len()));

    let mut pipeline = SchoolPipeline::new(&config)?;
    if let Some(ai) = HttpAiParser::from_config(&config.ai)? {
        let ai: Arc<dyn AiFallback> = Arc::new(ai);
        pipeline = pipeline.with_ai(ai);
    }
    let pipeline = &pipeline;

    let concurrency = config.crawler.max_concurrent.max(1);
    // Storage is written only once every school has finished.
    let runs: Vec<SchoolRun> = stream::iter(schools)
        .map(|school| {
            let config = Arc::clone(&config);
            async move { run_one(&config, pipeline, school).await }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut summary = BatchSummary {
        total: schools.len(),
        ..BatchSummary::default()
    };

    for run in &runs {
        if !run.success {
            summary.failed += 1;
            continue;
        }
        summary.succeeded += 1;
        summary.coaches += run.coaches.len();

        if let Err(e) = storage.write_run(run).await {
            summary.storage_failures += 1;
            ::log::error!(
                "Failed to store coaches for {}: {}",
                run.school.school_name,
                e
            );
        }
    }

    let elapsed = Utc::now() - start_time;
    log::summary(
        "Batch complete",
        &[
            ("Schools", summary.total.to_string()),
            ("Succeeded", summary.succeeded.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Coaches", summary.coaches.to_string()),
            ("Storage failures", summary.storage_failures.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    Ok(summary)
}

/// One school with its own HTTP client.
async fn run_one(config: &Config, pipeline: &SchoolPipeline, school: &SchoolContext) -> SchoolRun {
    match HttpFetcher::new(&config.crawler) {
        Ok(fetcher) => pipeline.run(&fetcher, school).await,
        Err(e) => SchoolRun::start(school).fail(FailureReason::FetchFailure(e.to_string())),
    }
}
