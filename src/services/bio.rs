// src/services/bio.rs

//! Coach profile enrichment.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{BioDetails, BioRules, CoachRecord};
use crate::services::{AiFallback, PageFetcher};
use crate::utils::{contact_value, contains_any, element_text, lowercase_all, parse_selector};

/// Fetches coach profile pages and reads bio, education, experience and contact details.
pub struct BioEnricher {
    bio_selectors: Vec<Selector>,
    paragraph: Selector,
    heading: Selector,
    mailto: Selector,
    tel: Selector,
    min_paragraph_chars: usize,
    stop_tags: Vec<String>,
    section_tags: Vec<String>,
    education_keywords: Vec<String>,
    experience_keywords: Vec<String>,
}

impl BioEnricher {
    pub fn new(rules: &BioRules) -> Result<Self> {
        Ok(Self {
            bio_selectors: rules
                .bio_selectors
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            paragraph: parse_selector("p")?,
            heading: parse_selector(&rules.heading_selector)?,
            mailto: parse_selector("a[href^='mailto:']")?,
            tel: parse_selector("a[href^='tel:']")?,
            min_paragraph_chars: rules.min_paragraph_chars,
            stop_tags: lowercase_all(&rules.stop_tags),
            section_tags: lowercase_all(&rules.section_tags),
            education_keywords: lowercase_all(&rules.education_keywords),
            experience_keywords: lowercase_all(&rules.experience_keywords),
        })
    }

    /// Fetch the coach's profile page and merge what it holds into the record.
    ///
    /// Never fails: a missing profile URL or an unreachable page returns the
    /// record unchanged.
    pub async fn enrich(
        &self,
        fetcher: &dyn PageFetcher,
        ai: Option<&dyn AiFallback>,
        mut coach: CoachRecord,
        school_name: &str,
    ) -> CoachRecord {
        let Some(profile_url) = coach.profile_url.clone() else {
            log::warn!("No profile URL for {}, skipping bio scraping", coach.name);
            return coach;
        };

        log::info!("Scraping bio for {} from {}", coach.name, profile_url);
        let page = match fetcher.fetch(&profile_url).await {
            Ok(page) => page,
            Err(e) => {
                log::error!("Could not fetch profile page {}: {}", profile_url, e);
                return coach;
            }
        };

        let mut details = self.extract_bio(&page.html);
        if details.is_empty() {
            if let Some(ai) = ai {
                match ai.extract_bio(&page.html, &coach.name, school_name).await {
                    Ok(from_ai) => details = from_ai,
                    Err(e) => log::warn!("AI bio extraction failed for {}: {}", coach.name, e),
                }
            }
        }

        coach.merge_bio(details);
        coach
    }

    /// Read profile details out of a bio page.
    pub fn extract_bio(&self, html: &str) -> BioDetails {
        let document = Html::parse_document(html);

        BioDetails {
            bio: self.bio_text(&document),
            education: self.section(&document, &self.education_keywords),
            experience: self.section(&document, &self.experience_keywords),
            email: document
                .select(&self.mailto)
                .next()
                .and_then(|a| contact_value(&a, "mailto:")),
            phone: document
                .select(&self.tel)
                .next()
                .and_then(|a| contact_value(&a, "tel:")),
        }
    }

    /// First bio container, else every long paragraph joined by a blank line.
    fn bio_text(&self, document: &Html) -> Option<String> {
        let container = self
            .bio_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty());
        if container.is_some() {
            return container;
        }

        let paragraphs: Vec<String> = document
            .select(&self.paragraph)
            .map(|p| element_text(&p))
            .filter(|text| text.chars().count() > self.min_paragraph_chars)
            .collect();
        (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
    }

    /// Items under the first heading matching `keywords` that has any.
    fn section(&self, document: &Html, keywords: &[String]) -> Vec<String> {
        document
            .select(&self.heading)
            .filter(|h| contains_any(&element_text(h).to_lowercase(), keywords))
            .map(|h| self.collect_section(&h))
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }

    fn collect_section(&self, heading: &ElementRef<'_>) -> Vec<String> {
        let mut items = Vec::new();
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            let tag = sibling.value().name();
            if self.stop_tags.iter().any(|t| t == tag) {
                break;
            }
            if self.section_tags.iter().any(|t| t == tag) {
                let text = element_text(&sibling);
                if !text.is_empty() {
                    items.push(text);
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::fake::FakeFetcher;

    fn enricher() -> BioEnricher {
        BioEnricher::new(&BioRules::default()).unwrap()
    }

    const PROFILE: &str = r#"
        <html><body>
          <div class="coach-bio">Coach Doe enters her fifth season leading the program.</div>
          <h3>Education</h3>
          <p>B.A., State University, 2005</p>
          <p>M.Ed., Tech College, 2008</p>
          <h3>Coaching Experience</h3>
          <ul><li>2010-2015 Assistant, Central</li></ul>
          <div>2015-present Head Coach</div>
          <h4>Family</h4>
          <p>Married with two kids.</p>
          <a href="mailto:jane.doe@state.edu">Email</a>
          <a href="tel:555-0199">555-0199</a>
        </body></html>"#;

    #[test]
    fn test_extract_bio_reads_all_sections() {
        let details = enricher().extract_bio(PROFILE);

        assert_eq!(
            details.bio.as_deref(),
            Some("Coach Doe enters her fifth season leading the program.")
        );
        assert_eq!(
            details.education,
            vec!["B.A., State University, 2005", "M.Ed., Tech College, 2008"]
        );
        assert_eq!(details.experience, vec!["2015-present Head Coach"]);
        assert_eq!(details.email.as_deref(), Some("jane.doe@state.edu"));
        assert_eq!(details.phone.as_deref(), Some("555-0199"));
    }

    #[test]
    fn test_bio_falls_back_to_long_paragraphs() {
        let long = "x".repeat(101);
        let html = format!("<p>short</p><p>{long}</p><p>{long}</p><p>{}</p>", "y".repeat(100));
        let details = enricher().extract_bio(&html);
        assert_eq!(details.bio, Some(format!("{long}\n\n{long}")));
    }

    #[test]
    fn test_empty_page_yields_empty_details() {
        assert!(enricher().extract_bio("<html><body></body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_enrich_without_profile_url_is_unchanged() {
        let fetcher = FakeFetcher::new();
        let coach = CoachRecord::named("Al Brown").unwrap();

        let result = enricher()
            .enrich(&fetcher, None, coach.clone(), "State")
            .await;

        assert_eq!(result, coach);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_enrich_fetch_failure_is_unchanged() {
        let fetcher = FakeFetcher::new();
        let mut coach = CoachRecord::named("Al Brown").unwrap();
        coach.profile_url = Some("https://goexample.com/bio/al".into());
        coach.email = Some("al@listing.edu".into());

        let result = enricher()
            .enrich(&fetcher, None, coach.clone(), "State")
            .await;
        assert_eq!(result, coach);
    }

    #[tokio::test]
    async fn test_enrich_merges_and_overrides_contact() {
        let fetcher = FakeFetcher::new().page("https://goexample.com/bio/jane", PROFILE);
        let mut coach = CoachRecord::named("Jane Doe").unwrap();
        coach.profile_url = Some("https://goexample.com/bio/jane".into());
        coach.email = Some("old@listing.edu".into());
        coach.position = Some("Head Coach".into());

        let result = enricher().enrich(&fetcher, None, coach, "State").await;

        assert_eq!(result.email.as_deref(), Some("jane.doe@state.edu"));
        assert_eq!(result.position.as_deref(), Some("Head Coach"));
        assert_eq!(result.education.len(), 2);
        assert!(result.bio.is_some());
    }
}
