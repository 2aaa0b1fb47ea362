// src/services/extractor/mod.rs

//! Coach record extraction.
//!
//! A coaches page is run through an ordered cascade of strategies. The first
//! strategy that yields at least one named record wins and the rest are
//! never invoked.

mod container;
mod table;

pub use container::{CssPatternStrategy, FieldExtractor, GenericTextStrategy};
pub use table::TableStrategy;

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{CoachRecord, ExtractorRules};

/// One way of reading coach records out of a page.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Records found in `document`. Links are resolved against `base`.
    fn extract(&self, document: &Html, base: &Url) -> Vec<CoachRecord>;
}

/// Ordered cascade of extraction strategies.
pub struct CoachExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl CoachExtractor {
    /// Table layout, then CSS container patterns, then the generic text scan.
    pub fn new(rules: &ExtractorRules) -> Result<Self> {
        let fields = FieldExtractor::new(rules)?;
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        strategies.push(Box::new(TableStrategy::new(&rules.table)?));
        strategies.push(Box::new(CssPatternStrategy::new(
            &rules.container_selectors,
            fields.clone(),
        )?));
        strategies.push(Box::new(GenericTextStrategy::new(rules, fields)?));
        Ok(Self::with_strategies(strategies))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract coach records. Never fails; an unusable page yields no records.
    pub fn extract(&self, html: &str, base_url: &str) -> Vec<CoachRecord> {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                log::warn!("Cannot extract coaches, bad base URL {}: {}", base_url, e);
                return Vec::new();
            }
        };
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let mut records = strategy.extract(&document, &base);
            records.retain(|r| !r.name.trim().is_empty());
            if !records.is_empty() {
                log::info!(
                    "Extracted {} coaches from {} using {} strategy",
                    records.len(),
                    base_url,
                    strategy.name()
                );
                return records;
            }
            log::debug!("{} strategy found no coaches on {}", strategy.name(), base_url);
        }

        log::warn!("No coaches extracted from {}", base_url);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://goexample.com/sports/football/coaches";

    fn extractor() -> CoachExtractor {
        CoachExtractor::new(&ExtractorRules::default()).unwrap()
    }

    fn boxed(strategy: impl ExtractionStrategy + 'static) -> Box<dyn ExtractionStrategy> {
        Box::new(strategy)
    }

    struct Fixed(Vec<CoachRecord>);

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _: &Html, _: &Url) -> Vec<CoachRecord> {
            self.0.clone()
        }
    }

    struct Unreachable;

    impl ExtractionStrategy for Unreachable {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        fn extract(&self, _: &Html, _: &Url) -> Vec<CoachRecord> {
            panic!("later strategy must not run");
        }
    }

    #[test]
    fn test_first_non_empty_strategy_short_circuits() {
        let extractor = CoachExtractor::with_strategies(vec![
            boxed(Fixed(Vec::new())),
            boxed(Fixed(vec![CoachRecord::named("Pat Smith").unwrap()])),
            boxed(Unreachable),
        ]);

        let records = extractor.extract("<html></html>", BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Pat Smith");
    }

    #[test]
    fn test_records_without_names_are_dropped() {
        let blank = CoachRecord {
            name: "   ".into(),
            ..CoachRecord::default()
        };
        let extractor = CoachExtractor::with_strategies(vec![
            boxed(Fixed(vec![blank])),
            boxed(Fixed(vec![CoachRecord::named("Lee Park").unwrap()])),
        ]);

        let records = extractor.extract("<html></html>", BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Lee Park");
    }

    #[test]
    fn test_table_layout_wins_over_containers() {
        let html = r#"
            <div class="coach-card"><h3>Card Person</h3></div>
            <table class="sidearm-table">
              <tr class="sidearm-coaches-coach">
                <td><img src="/img/jd.jpg"></td>
                <td><a href="/staff/jane-doe">Jane Doe</a></td>
                <td>Head Coach</td>
                <td><a href="mailto:jd@x.edu">jd@x.edu</a></td>
                <td></td>
              </tr>
            </table>"#;

        let records = extractor().extract(html, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jane Doe");
    }

    #[test]
    fn test_generic_scan_is_last_resort() {
        let html = r#"
            <ul>
              <li><strong>Sam Rivera</strong> Assistant Coach, email sam@x.edu</li>
            </ul>"#;

        let records = extractor().extract(html, BASE);
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| !r.name.is_empty()));
        assert!(records.iter().any(|r| r.name == "Sam Rivera"));
    }

    #[test]
    fn test_page_without_coaches_is_empty() {
        let html = "<html><body><p>Welcome to the athletics site.</p></body></html>";
        assert!(extractor().extract(html, BASE).is_empty());
    }

    #[test]
    fn test_bad_base_url_is_empty() {
        assert!(extractor().extract("<table></table>", "nope").is_empty());
    }
}
