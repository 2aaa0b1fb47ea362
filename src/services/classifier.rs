// src/services/classifier.rs

//! Link classification.
//!
//! Picks the football program, coaches or roster link out of a page using
//! the keyword tables under `[rules.classifier]`. Classification is pure: the
//! same HTML and base URL always select the same link.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{AnchorCandidate, CategoryRule, Classification, ClassifierRules, LinkCategory};
use crate::utils::{
    contains_any, element_text, lowercase_all, parse_selector, resolve_url, strip_query,
};

/// Tags whose class attribute can mark a navigation region.
const NAV_CONTAINER_TAGS: [&str; 3] = ["nav", "div", "ul"];

/// A category rule with lowercased keywords and compiled patterns.
#[derive(Debug)]
struct CompiledRule {
    keywords: Vec<String>,
    required_any: Vec<String>,
    nav_markers: Vec<String>,
    negatives: Vec<String>,
    preferred_url_markers: Vec<String>,
    strip_query: bool,
    page_pattern: Option<Regex>,
}

impl CompiledRule {
    fn compile(rule: &CategoryRule, shared_negatives: &[String]) -> Result<Self> {
        let mut negatives = lowercase_all(shared_negatives);
        negatives.extend(lowercase_all(&rule.extra_negative_keywords));

        Ok(Self {
            keywords: lowercase_all(&rule.keywords),
            required_any: lowercase_all(&rule.required_any),
            nav_markers: lowercase_all(&rule.nav_markers),
            negatives,
            preferred_url_markers: lowercase_all(&rule.preferred_url_markers),
            strip_query: rule.strip_query,
            page_pattern: rule.page_pattern.as_deref().map(Regex::new).transpose()?,
        })
    }

    fn hits_keyword(&self, anchor: &LoweredAnchor<'_>) -> bool {
        contains_any(&anchor.text, &self.keywords) || contains_any(&anchor.href, &self.keywords)
    }

    fn hits_required(&self, anchor: &LoweredAnchor<'_>) -> bool {
        contains_any(&anchor.text, &self.required_any)
            || contains_any(&anchor.href, &self.required_any)
    }

    fn is_negative(&self, anchor: &LoweredAnchor<'_>) -> bool {
        contains_any(&anchor.href, &self.negatives) || contains_any(&anchor.text, &self.negatives)
    }

    fn is_preferred(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        contains_any(&url, &self.preferred_url_markers)
    }

    fn finish(&self, url: &str) -> String {
        if self.strip_query {
            strip_query(url)
        } else {
            url.to_string()
        }
    }
}

/// Lowercased view of an anchor used for keyword tests.
struct LoweredAnchor<'a> {
    candidate: &'a AnchorCandidate,
    href: String,
    text: String,
}

impl<'a> LoweredAnchor<'a> {
    fn new(candidate: &'a AnchorCandidate) -> Self {
        Self {
            candidate,
            href: candidate.href.to_lowercase(),
            text: candidate.link_text.to_lowercase(),
        }
    }
}

/// Classifies page links into football program, coaches and roster pages.
#[derive(Debug)]
pub struct LinkClassifier {
    football: CompiledRule,
    coaches: CompiledRule,
    roster: CompiledRule,
    date_patterns: Vec<Regex>,
    anchor_selector: Selector,
}

impl LinkClassifier {
    /// Compile the classifier tables.
    pub fn new(rules: &ClassifierRules) -> Result<Self> {
        let date_patterns = rules
            .date_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            football: CompiledRule::compile(&rules.football, &rules.negative_keywords)?,
            coaches: CompiledRule::compile(&rules.coaches, &rules.negative_keywords)?,
            roster: CompiledRule::compile(&rules.roster, &rules.negative_keywords)?,
            date_patterns,
            anchor_selector: parse_selector("a[href]")?,
        })
    }

    /// Select the link for `category` from `html`, resolving hrefs against `base_url`.
    pub fn classify(&self, html: &str, base_url: &str, category: LinkCategory) -> Classification {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                log::warn!("Cannot classify links, bad base URL {}: {}", base_url, e);
                return Classification::NotFound;
            }
        };

        let document = Html::parse_document(html);
        let nav_markers = self.nav_markers(category);
        let anchors = self.collect_anchors(&document, &base, &nav_markers);
        log::debug!(
            "Classifying {} anchors on {} for {}",
            anchors.len(),
            base_url,
            category
        );

        let lowered: Vec<LoweredAnchor<'_>> = anchors
            .iter()
            .map(LoweredAnchor::new)
            .filter(|a| !self.is_dated(&a.href))
            .collect();

        let result = match category {
            LinkCategory::CoachesOrRoster => self.classify_combined(&lowered),
            single => self.classify_single(html, &lowered, single),
        };

        match &result {
            Classification::Found { url, category } => {
                log::info!("Found {} link: {}", category, url)
            }
            Classification::NotFound => log::debug!("No {} link on {}", category, base_url),
        }
        result
    }

    /// Every `<a href>` in document order.
    pub fn collect_anchors(
        &self,
        document: &Html,
        base: &Url,
        nav_markers: &[String],
    ) -> Vec<AnchorCandidate> {
        document
            .select(&self.anchor_selector)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim().to_string();
                let absolute_url = resolve_url(base, &href)?;
                Some(AnchorCandidate {
                    href,
                    absolute_url,
                    link_text: element_text(&a),
                    in_navigation: in_navigation(&a, nav_markers),
                })
            })
            .collect()
    }

    fn classify_single(
        &self,
        html: &str,
        anchors: &[LoweredAnchor<'_>],
        category: LinkCategory,
    ) -> Classification {
        let rule = self.rule(category);
        let matches = |scoped: bool| {
            anchors
                .iter()
                .filter(|a| !scoped || a.candidate.in_navigation)
                .filter(|a| !rule.is_negative(a))
                .filter(|a| rule.hits_keyword(a) && rule.hits_required(a))
                .map(|a| a.candidate)
                .collect::<Vec<_>>()
        };

        let mut found = matches(true);
        if found.is_empty() {
            let page_allows_unscoped = rule
                .page_pattern
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(html));
            if page_allows_unscoped {
                found = matches(false);
            }
        }

        let selected = found
            .iter()
            .find(|a| rule.is_preferred(&a.absolute_url))
            .or_else(|| found.first());

        match selected {
            Some(anchor) => Classification::found(rule.finish(&anchor.absolute_url), category),
            None => Classification::NotFound,
        }
    }

    fn classify_combined(&self, anchors: &[LoweredAnchor<'_>]) -> Classification {
        let (coaches, roster) = (&self.coaches, &self.roster);

        let partition = |scoped: bool| {
            let mut coach_links = Vec::new();
            let mut roster_links = Vec::new();
            for anchor in anchors.iter().filter(|a| !scoped || a.candidate.in_navigation) {
                // A coaches keyword claims the anchor even if it fails the other checks.
                if coaches.hits_keyword(anchor) {
                    if !coaches.is_negative(anchor) && coaches.hits_required(anchor) {
                        coach_links.push(anchor.candidate);
                    }
                } else if !roster.is_negative(anchor)
                    && roster.hits_keyword(anchor)
                    && roster.hits_required(anchor)
                {
                    roster_links.push(anchor.candidate);
                }
            }
            (coach_links, roster_links)
        };

        let (mut coach_links, mut roster_links) = partition(true);
        if coach_links.is_empty() && roster_links.is_empty() {
            (coach_links, roster_links) = partition(false);
        }

        if let Some(anchor) = coach_links
            .iter()
            .find(|a| coaches.is_preferred(&a.absolute_url))
        {
            return Classification::found(coaches.finish(&anchor.absolute_url), LinkCategory::Coaches);
        }
        if let Some(anchor) = roster_links.first() {
            return Classification::found(roster.finish(&anchor.absolute_url), LinkCategory::Roster);
        }
        if let Some(anchor) = coach_links.first() {
            return Classification::found(coaches.finish(&anchor.absolute_url), LinkCategory::Coaches);
        }
        Classification::NotFound
    }

    fn rule(&self, category: LinkCategory) -> &CompiledRule {
        match category {
            LinkCategory::FootballProgram => &self.football,
            LinkCategory::Coaches | LinkCategory::CoachesOrRoster => &self.coaches,
            LinkCategory::Roster => &self.roster,
        }
    }

    fn nav_markers(&self, category: LinkCategory) -> Vec<String> {
        match category {
            LinkCategory::CoachesOrRoster => {
                let mut markers = self.coaches.nav_markers.clone();
                for marker in &self.roster.nav_markers {
                    if !markers.contains(marker) {
                        markers.push(marker.clone());
                    }
                }
                markers
            }
            single => self.rule(single).nav_markers.clone(),
        }
    }

    fn is_dated(&self, href: &str) -> bool {
        self.date_patterns.iter().any(|p| p.is_match(href))
    }
}

/// Whether an ancestor `nav`/`div`/`ul` carries a navigation class marker.
fn in_navigation(anchor: &ElementRef<'_>, nav_markers: &[String]) -> bool {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| NAV_CONTAINER_TAGS.contains(&el.value().name()))
        .any(|el| {
            el.value()
                .attr("class")
                .map(|class| contains_any(&class.to_lowercase(), nav_markers))
                .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://goexample.com/";

    fn classifier() -> LinkClassifier {
        LinkClassifier::new(&ClassifierRules::default()).unwrap()
    }

    #[test]
    fn test_coaches_skips_negative_sport_link() {
        let html = r#"
            <ul class="main-menu">
              <li><a href="/m-soc/roster">Soccer Roster</a></li>
              <li><a href="/football/coaches">Coaches</a></li>
            </ul>"#;

        let result = classifier().classify(html, BASE, LinkCategory::Coaches);
        assert_eq!(
            result,
            Classification::found("https://goexample.com/football/coaches", LinkCategory::Coaches)
        );
    }

    #[test]
    fn test_negative_keyword_wins_over_positive() {
        let html = r#"<nav class="nav"><a href="/football/tickets">Football Tickets</a></nav>"#;
        assert_eq!(
            classifier().classify(html, BASE, LinkCategory::FootballProgram),
            Classification::NotFound
        );
    }

    #[test]
    fn test_football_program_prefers_navigation_and_strips_query() {
        let html = r#"
            <p><a href="/football-camp-info">Football</a></p>
            <div class="sports-dropdown">
              <a href="/sports/football?path=fball">Football</a>
            </div>"#;

        let result = classifier().classify(html, BASE, LinkCategory::FootballProgram);
        assert_eq!(result.url(), Some("https://goexample.com/sports/football"));
    }

    #[test]
    fn test_football_unscoped_pass_requires_page_pattern() {
        let html = r#"<p><a href="/fball/index">Home of the Fball Team</a></p>"#;
        let result = classifier().classify(html, BASE, LinkCategory::FootballProgram);
        assert_eq!(result.url(), Some("https://goexample.com/fball/index"));

        // No nav region and no football wording on the page at all.
        let rules = ClassifierRules {
            football: CategoryRule {
                page_pattern: Some(r"(?i)\bgridiron\b".into()),
                ..ClassifierRules::default().football
            },
            ..ClassifierRules::default()
        };
        let strict = LinkClassifier::new(&rules).unwrap();
        assert_eq!(
            strict.classify(html, BASE, LinkCategory::FootballProgram),
            Classification::NotFound
        );
    }

    #[test]
    fn test_dated_article_links_are_excluded() {
        let html = r#"
            <div class="nav">
              <a href="/2023/10/14/football-coaches-named">Football Coaches</a>
              <a href="/2023-10-14/coaches-recap">Coaches</a>
            </div>"#;
        assert_eq!(
            classifier().classify(html, BASE, LinkCategory::Coaches),
            Classification::NotFound
        );
    }

    #[test]
    fn test_coaches_keeps_query_string() {
        let html = r#"<div class="menu"><a href="/staff.aspx?path=football">Coaching Staff</a></div>"#;
        let result = classifier().classify(html, BASE, LinkCategory::Coaches);
        assert_eq!(
            result.url(),
            Some("https://goexample.com/staff.aspx?path=football")
        );
    }

    #[test]
    fn test_roster_strips_query() {
        let html = r#"<nav class="navbar"><a href="/sports/fball/roster?season=2024">Roster</a></nav>"#;
        let result = classifier().classify(html, BASE, LinkCategory::Roster);
        assert_eq!(
            result,
            Classification::found("https://goexample.com/sports/fball/roster", LinkCategory::Roster)
        );
    }

    #[test]
    fn test_combined_prefers_football_coaches_link() {
        let html = r#"
            <ul class="dropdown">
              <li><a href="/sports/fball/roster">Roster</a></li>
              <li><a href="/sports/football/coaches">Coaches</a></li>
            </ul>"#;
        let result = classifier().classify(html, BASE, LinkCategory::CoachesOrRoster);
        assert_eq!(
            result,
            Classification::found(
                "https://goexample.com/sports/football/coaches",
                LinkCategory::Coaches
            )
        );
    }

    #[test]
    fn test_combined_ranks_roster_before_generic_staff_link() {
        let html = r#"
            <ul class="dropdown">
              <li><a href="/staff.aspx">Staff</a></li>
              <li><a href="/roster.aspx?sport=fball">Roster</a></li>
            </ul>"#;
        let result = classifier().classify(html, BASE, LinkCategory::CoachesOrRoster);
        assert_eq!(
            result,
            Classification::found("https://goexample.com/roster.aspx", LinkCategory::Roster)
        );
    }

    #[test]
    fn test_combined_falls_back_to_generic_staff_link() {
        let html = r#"<ul class="dropdown"><li><a href="/staff.aspx?id=3">Staff</a></li></ul>"#;
        let result = classifier().classify(html, BASE, LinkCategory::CoachesOrRoster);
        assert_eq!(
            result,
            Classification::found("https://goexample.com/staff.aspx?id=3", LinkCategory::Coaches)
        );
    }

    #[test]
    fn test_combined_coaches_keyword_never_counts_as_roster() {
        // Hits the "directory" coaches keyword but lacks coach/staff, so it is dropped.
        let html = r#"<ul class="dropdown"><li><a href="/directory/roster">Directory Roster</a></li></ul>"#;
        assert_eq!(
            classifier().classify(html, BASE, LinkCategory::CoachesOrRoster),
            Classification::NotFound
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let html = r#"
            <div class="nav">
              <a href="/staff-list">Staff</a>
              <a href="/football/coaches">Football Coaches</a>
            </div>"#;
        let classifier = classifier();
        let first = classifier.classify(html, BASE, LinkCategory::Coaches);
        let second = classifier.classify(html, BASE, LinkCategory::Coaches);
        assert_eq!(first, second);
        assert_eq!(first.url(), Some("https://goexample.com/football/coaches"));
    }

    #[test]
    fn test_bad_base_url_is_not_found() {
        let html = r#"<a href="/football">Football</a>"#;
        assert_eq!(
            classifier().classify(html, "not a url", LinkCategory::FootballProgram),
            Classification::NotFound
        );
    }

    #[test]
    fn test_anchors_without_href_ignored_and_malformed_markup_tolerated() {
        let html = r#"<div class="nav"><a>Coaches</a><a href="/coaches">Coaches<div></a>"#;
        let result = classifier().classify(html, BASE, LinkCategory::Coaches);
        assert_eq!(result.url(), Some("https://goexample.com/coaches"));
    }
}
