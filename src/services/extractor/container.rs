// src/services/extractor/container.rs

//! Container-based strategies: CSS card patterns and a generic text scan.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::ExtractionStrategy;
use crate::error::Result;
use crate::models::{CoachRecord, ExtractorRules};
use crate::utils::{
    contact_value, contains_any, element_text, lowercase_all, parse_selector, resolve_url,
};

/// Reads coach fields out of a single container element.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    name: Selector,
    field: Selector,
    link: Selector,
    mailto: Selector,
    tel: Selector,
    position_keywords: Vec<String>,
    sport_keywords: Vec<String>,
}

impl FieldExtractor {
    pub fn new(rules: &ExtractorRules) -> Result<Self> {
        Ok(Self {
            name: parse_selector(&rules.name_selector)?,
            field: parse_selector(&rules.field_selector)?,
            link: parse_selector("a[href]")?,
            mailto: parse_selector("a[href^='mailto:']")?,
            tel: parse_selector("a[href^='tel:']")?,
            position_keywords: lowercase_all(&rules.position_keywords),
            sport_keywords: lowercase_all(&rules.sport_keywords),
        })
    }

    /// Build a record from `container`, or `None` when it has no name.
    pub fn record(&self, container: &ElementRef<'_>, base: &Url) -> Option<CoachRecord> {
        let mut record = CoachRecord::named(&self.name_of(container)?)?;

        record.position = container
            .select(&self.field)
            .map(|el| element_text(&el))
            .find(|text| contains_any(&text.to_lowercase(), &self.position_keywords));

        record.sport = container.select(&self.field).find_map(|el| {
            let text = element_text(&el).to_lowercase();
            self.sport_keywords
                .iter()
                .find(|keyword| text.contains(keyword.as_str()))
                .map(|keyword| title_case(keyword))
        });

        record.profile_url = container
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_url(base, href));

        record.email = container
            .select(&self.mailto)
            .next()
            .and_then(|a| contact_value(&a, "mailto:"));

        record.phone = container
            .select(&self.tel)
            .next()
            .and_then(|a| contact_value(&a, "tel:"));

        Some(record)
    }

    /// First heading-like element, else the first text block.
    fn name_of(&self, container: &ElementRef<'_>) -> Option<String> {
        if let Some(heading) = container.select(&self.name).next() {
            let text = element_text(&heading);
            if !text.is_empty() {
                return Some(text);
            }
        }
        container
            .text()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// Containers from the first selector in the list that matches anything.
pub struct CssPatternStrategy {
    selectors: Vec<(String, Selector)>,
    fields: FieldExtractor,
}

impl CssPatternStrategy {
    pub fn new(container_selectors: &[String], fields: FieldExtractor) -> Result<Self> {
        let selectors = container_selectors
            .iter()
            .map(|s| parse_selector(s).map(|selector| (s.clone(), selector)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors, fields })
    }
}

impl ExtractionStrategy for CssPatternStrategy {
    fn name(&self) -> &'static str {
        "css pattern"
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CoachRecord> {
        let Some((raw, selector)) = self
            .selectors
            .iter()
            .find(|(_, selector)| document.select(selector).next().is_some())
        else {
            return Vec::new();
        };

        log::debug!("Using coach container selector '{}'", raw);
        document
            .select(selector)
            .filter_map(|el| self.fields.record(&el, base))
            .collect()
    }
}

/// Any block whose text mentions coaching staff along with contact details.
pub struct GenericTextStrategy {
    candidates: Selector,
    topic_keywords: Vec<String>,
    contact_keywords: Vec<String>,
    fields: FieldExtractor,
}

impl GenericTextStrategy {
    pub fn new(rules: &ExtractorRules, fields: FieldExtractor) -> Result<Self> {
        Ok(Self {
            candidates: parse_selector(&rules.generic_selector)?,
            topic_keywords: lowercase_all(&rules.generic_topic_keywords),
            contact_keywords: lowercase_all(&rules.generic_contact_keywords),
            fields,
        })
    }
}

impl ExtractionStrategy for GenericTextStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CoachRecord> {
        let matches: Vec<ElementRef<'_>> = document
            .select(&self.candidates)
            .filter(|el| {
                let text = element_text(el).to_lowercase();
                contains_any(&text, &self.topic_keywords)
                    && contains_any(&text, &self.contact_keywords)
            })
            .collect();
        let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();

        let mut records: Vec<CoachRecord> = Vec::new();
        for el in &matches {
            // A wrapper around matching cards is not a card itself.
            if el.descendants().skip(1).any(|node| ids.contains(&node.id())) {
                continue;
            }
            if let Some(record) = self.fields.record(el, base) {
                if !records.contains(&record) {
                    records.push(record);
                }
            }
        }
        records
    }
}

fn title_case(word: &str) -> String {
    word.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://goexample.com/staff-directory";

    fn fields() -> FieldExtractor {
        FieldExtractor::new(&ExtractorRules::default()).unwrap()
    }

    fn run(strategy: &dyn ExtractionStrategy, html: &str) -> Vec<CoachRecord> {
        let base = Url::parse(BASE).unwrap();
        strategy.extract(&Html::parse_document(html), &base)
    }

    #[test]
    fn test_css_cards_yield_full_records() {
        let strategy =
            CssPatternStrategy::new(&ExtractorRules::default().container_selectors, fields())
                .unwrap();
        let html = r#"
            <div class="staff-card">
              <h3><a href="/coaches/kim-lee">Kim Lee</a></h3>
              <span>Defensive Coordinator</span>
              <p>Football</p>
              <a href="mailto:klee@x.edu?subject=Hi">Email</a>
              <a href="tel:+1-555-0100">Call</a>
            </div>
            <div class="staff-card"><h3>Ray Ortiz</h3><span>Head Coach</span></div>"#;

        let records = run(&strategy, html);
        assert_eq!(records.len(), 2);

        let kim = &records[0];
        assert_eq!(kim.name, "Kim Lee");
        assert_eq!(kim.position.as_deref(), Some("Defensive Coordinator"));
        assert_eq!(kim.sport.as_deref(), Some("Football"));
        assert_eq!(
            kim.profile_url.as_deref(),
            Some("https://goexample.com/coaches/kim-lee")
        );
        assert_eq!(kim.email.as_deref(), Some("klee@x.edu"));
        assert_eq!(kim.phone.as_deref(), Some("+1-555-0100"));

        assert_eq!(records[1].name, "Ray Ortiz");
        assert_eq!(records[1].email, None);
    }

    #[test]
    fn test_css_uses_only_first_matching_selector() {
        let selectors = vec![".missing".to_string(), ".coach-card".into(), ".staff".into()];
        let strategy = CssPatternStrategy::new(&selectors, fields()).unwrap();
        let html = r#"
            <div class="staff"><h4>Staff Person</h4></div>
            <div class="coach-card"><h4>Card Person</h4></div>"#;

        let records = run(&strategy, html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Card Person");
    }

    #[test]
    fn test_name_falls_back_to_first_text_block() {
        let strategy = CssPatternStrategy::new(&[".coach".to_string()], fields()).unwrap();
        let html = r#"<div class="coach"><span> Dana White </span><span>Head Coach</span></div>"#;

        let records = run(&strategy, html);
        assert_eq!(records[0].name, "Dana White");
        assert_eq!(records[0].position.as_deref(), Some("Head Coach"));
    }

    #[test]
    fn test_generic_requires_topic_and_contact_words() {
        let strategy = GenericTextStrategy::new(&ExtractorRules::default(), fields()).unwrap();
        let html = r#"
            <article><h2>Chris Hall</h2><p>Assistant Coach</p><p>Phone: 555-0101</p></article>
            <article><h2>Season Preview</h2><p>The coach spoke to reporters.</p></article>"#;

        let records = run(&strategy, html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Chris Hall");
        assert_eq!(records[0].position.as_deref(), Some("Assistant Coach"));
    }

    #[test]
    fn test_generic_skips_wrapper_around_cards() {
        let strategy = GenericTextStrategy::new(&ExtractorRules::default(), fields()).unwrap();
        let html = r#"
            <div id="staff">
              <div><h3>Ann Lee</h3><span>Head Coach</span><a href="mailto:alee@x.edu">Email</a></div>
              <div><h3>Bo Kim</h3><span>Assistant Coach</span><a href="mailto:bkim@x.edu">Email</a></div>
            </div>"#;

        let records = run(&strategy, html);
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.name.as_str(), r.position.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Ann Lee", Some("Head Coach")),
                ("Bo Kim", Some("Assistant Coach"))
            ]
        );
        assert_eq!(records[1].email.as_deref(), Some("bkim@x.edu"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("football"), "Football");
        assert_eq!(title_case("track"), "Track");
    }
}
