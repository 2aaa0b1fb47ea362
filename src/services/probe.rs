// src/services/probe.rs

//! Pattern-probe fallback.
//!
//! When no link on a page classifies, conventional URL suffixes are tried
//! directly against the site and the first page that answers 200 and
//! mentions a corroborating keyword is taken.

use url::Url;

use crate::models::{Classification, LinkCategory, ProbeRule, ProbeRules};
use crate::services::PageFetcher;
use crate::utils::{contains_any, lowercase_all};

/// Probes conventional URL suffixes per link category.
#[derive(Debug, Clone)]
pub struct PatternProbe {
    rules: ProbeRules,
}

impl PatternProbe {
    pub fn new(rules: &ProbeRules) -> Self {
        Self {
            rules: rules.clone(),
        }
    }

    /// Probe `base_url` for a `category` page. Network errors count as misses.
    pub async fn probe(
        &self,
        fetcher: &dyn PageFetcher,
        base_url: &str,
        category: LinkCategory,
    ) -> Classification {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                log::warn!("Cannot probe {}: {}", base_url, e);
                return Classification::NotFound;
            }
        };

        let plan: Vec<(LinkCategory, &ProbeRule)> = match category {
            LinkCategory::FootballProgram => vec![(category, &self.rules.football)],
            LinkCategory::Coaches => vec![(category, &self.rules.coaches)],
            LinkCategory::Roster => vec![(category, &self.rules.roster)],
            LinkCategory::CoachesOrRoster => vec![
                (LinkCategory::Coaches, &self.rules.coaches),
                (LinkCategory::Roster, &self.rules.roster),
            ],
        };

        for (found_category, rule) in plan {
            if let Some(url) = probe_rule(fetcher, &base, rule).await {
                log::info!("Found {} page by probing: {}", found_category, url);
                return Classification::found(url, found_category);
            }
        }

        log::debug!("No {} page found by probing {}", category, base_url);
        Classification::NotFound
    }
}

async fn probe_rule(fetcher: &dyn PageFetcher, base: &Url, rule: &ProbeRule) -> Option<String> {
    let keywords = lowercase_all(&rule.keywords);

    for suffix in &rule.suffixes {
        let Ok(candidate) = base.join(suffix) else {
            continue;
        };
        let candidate = candidate.to_string();

        match fetcher.probe(&candidate).await {
            Ok(response) if response.is_ok() => {
                if contains_any(&response.body.to_lowercase(), &keywords) {
                    return Some(candidate);
                }
                log::debug!("Probe {} answered 200 without keywords", candidate);
            }
            Ok(response) => log::debug!("Probe {} returned {}", candidate, response.status),
            Err(e) => log::debug!("Probe {} failed: {}", candidate, e),
        }
    }
    None
}
