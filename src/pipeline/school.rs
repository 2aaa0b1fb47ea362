// src/pipeline/school.rs

//! Single-school pipeline.
//!
//! athletics home → football program page → coaches/roster page → coach
//! records → profile enrichment. Every failure is recorded on the returned
//! `SchoolRun`; nothing escapes the school boundary.

use std::sync::Arc;

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{
    Classification, CoachRecord, Config, FailureReason, LinkCategory, Page, SchoolContext,
    SchoolRun, Stage,
};
use crate::services::{
    AiFallback, BioEnricher, CoachExtractor, LinkClassifier, PageFetcher, PatternProbe,
};
use crate::utils::log::{step, sub_item};
use crate::utils::{parse_selector, resolve};

/// Discover, extract, enrich.
const STAGES: usize = 3;

/// Sport stamped on every collected record.
const SPORT: &str = "Football";

const FIND_FOOTBALL_INSTRUCTION: &str =
    "Find the URL for the football team page from this athletics website. \
     Return just the URL as a string.";
const FIND_STAFF_INSTRUCTION: &str =
    "Find the URL for the football coaching staff page, or the football roster page \
     if there is none. Return just the URL as a string.";

type Stepped<T> = std::result::Result<T, FailureReason>;

/// Compiled heuristics for running schools; shareable across concurrent runs.
pub struct SchoolPipeline {
    max_skip_hops: usize,
    classifier: LinkClassifier,
    probe: PatternProbe,
    extractor: CoachExtractor,
    enricher: BioEnricher,
    ai: Option<Arc<dyn AiFallback>>,
}

impl SchoolPipeline {
    /// Compile the `[rules]` tables. Fails on an invalid regex or selector.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            max_skip_hops: config.crawler.max_skip_hops,
            classifier: LinkClassifier::new(&config.rules.classifier)?,
            probe: PatternProbe::new(&config.rules.probe),
            extractor: CoachExtractor::new(&config.rules.extractor)?,
            enricher: BioEnricher::new(&config.rules.bio)?,
            ai: None,
        })
    }

    /// Consult `ai` when the heuristics come up empty.
    pub fn with_ai(mut self, ai: Arc<dyn AiFallback>) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Run one school through every stage using `fetcher`.
    pub async fn run(&self, fetcher: &dyn PageFetcher, school: &SchoolContext) -> SchoolRun {
        log::info!(
            "Processing {} ({})",
            school.school_name,
            school.school_id
        );
        let mut run = SchoolRun::start(school);

        step(1, STAGES, "Locating coaches page");
        let coaches_url = match school.preset_coaches_url() {
            Some(url) => {
                log::info!("Using pre-supplied coaches URL {}", url);
                url
            }
            None => match self.discover(fetcher, school, &mut run).await {
                Ok(url) => url,
                Err(reason) => return run.fail(reason),
            },
        };
        run.coaches_url = Some(coaches_url.clone());

        match self.collect_coaches(fetcher, school, &coaches_url).await {
            Ok(coaches) => {
                log::info!(
                    "Collected {} coaches for {}",
                    coaches.len(),
                    school.school_name
                );
                run.complete(coaches)
            }
            Err(reason) => run.fail(reason),
        }
    }

    /// Skip discovery and extract straight from a known coaches or roster page.
    pub async fn run_from_url(
        &self,
        fetcher: &dyn PageFetcher,
        school: &SchoolContext,
        coaches_url: &str,
    ) -> SchoolRun {
        let school = SchoolContext {
            coaching_staff_url: Some(coaches_url.to_string()),
            ..school.clone()
        };
        self.run(fetcher, &school).await
    }

    async fn discover(
        &self,
        fetcher: &dyn PageFetcher,
        school: &SchoolContext,
        run: &mut SchoolRun,
    ) -> Stepped<String> {
        let athletics_url = school
            .athletics_url()
            .ok_or(FailureReason::NotFound(Stage::AthleticsUrl))?;

        let football_url = self.find_football_link(fetcher, &athletics_url).await?;
        run.football_url = Some(football_url.clone());

        self.find_staff_link(fetcher, &football_url).await
    }

    /// Football program page linked from the athletics home page.
    pub async fn find_football_link(
        &self,
        fetcher: &dyn PageFetcher,
        athletics_url: &str,
    ) -> Stepped<String> {
        let page = self.fetch_past_splash(fetcher, athletics_url).await?;
        let base = page.final_url.as_str();

        let found = self
            .classifier
            .classify(&page.html, base, LinkCategory::FootballProgram);
        let found = match found {
            Classification::NotFound => {
                self.probe
                    .probe(fetcher, base, LinkCategory::FootballProgram)
                    .await
            }
            found => found,
        };

        match found.url() {
            Some(url) => Ok(url.to_string()),
            None => self
                .ask_ai_for_url(&page, FIND_FOOTBALL_INSTRUCTION)
                .await
                .ok_or(FailureReason::NotFound(Stage::FootballProgram)),
        }
    }

    /// Coaches page, or the roster page as a fallback, linked from the program page.
    pub async fn find_staff_link(
        &self,
        fetcher: &dyn PageFetcher,
        football_url: &str,
    ) -> Stepped<String> {
        let page = fetcher.fetch(football_url).await.map_err(fetch_failure)?;
        let base = page.final_url.as_str();

        let found = self
            .classifier
            .classify(&page.html, base, LinkCategory::CoachesOrRoster);
        let found = match found {
            Classification::NotFound => {
                self.probe
                    .probe(fetcher, base, LinkCategory::CoachesOrRoster)
                    .await
            }
            found => found,
        };

        match found.url() {
            Some(url) => Ok(url.to_string()),
            None => self
                .ask_ai_for_url(&page, FIND_STAFF_INSTRUCTION)
                .await
                .ok_or(FailureReason::NotFound(Stage::CoachesPage)),
        }
    }

    async fn collect_coaches(
        &self,
        fetcher: &dyn PageFetcher,
        school: &SchoolContext,
        coaches_url: &str,
    ) -> Stepped<Vec<CoachRecord>> {
        step(2, STAGES, "Extracting coach records");
        let page = fetcher.fetch(coaches_url).await.map_err(fetch_failure)?;

        let mut coaches = self.extractor.extract(&page.html, &page.final_url);
        if coaches.is_empty() {
            coaches = self.ask_ai_for_coaches(&page, &school.school_name).await;
        }
        if coaches.is_empty() {
            return Err(FailureReason::ExtractionEmpty);
        }

        step(3, STAGES, &format!("Enriching {} profiles", coaches.len()));
        let mut enriched = Vec::with_capacity(coaches.len());
        for mut coach in coaches {
            sub_item(&coach.name);
            coach.stamp(school, SPORT);
            let coach = self
                .enricher
                .enrich(fetcher, self.ai.as_deref(), coach, &school.school_name)
                .await;
            enriched.push(coach);
        }
        Ok(enriched)
    }

    /// Fetch `url`, following splash-page `skip=true` links a bounded number of times.
    async fn fetch_past_splash(&self, fetcher: &dyn PageFetcher, url: &str) -> Stepped<Page> {
        let mut page = fetcher.fetch(url).await.map_err(fetch_failure)?;

        for _ in 0..self.max_skip_hops {
            let Some(skip_url) = find_skip_link(&page.html, &page.final_url) else {
                break;
            };
            if skip_url == page.final_url {
                break;
            }
            log::info!("Found skip link, following: {}", skip_url);
            page = fetcher.fetch(&skip_url).await.map_err(fetch_failure)?;
        }
        Ok(page)
    }

    async fn ask_ai_for_url(&self, page: &Page, instruction: &str) -> Option<String> {
        let ai = self.ai.as_deref()?;
        log::info!("Heuristics found nothing on {}, trying AI", page.final_url);
        match ai.find_url(&page.html, instruction).await {
            Ok(Some(url)) => {
                let url = resolve(&page.final_url, &url)?;
                log::info!("AI found {}", url);
                Some(url)
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("AI URL lookup failed on {}: {}", page.final_url, e);
                None
            }
        }
    }

    async fn ask_ai_for_coaches(&self, page: &Page, school_name: &str) -> Vec<CoachRecord> {
        let Some(ai) = self.ai.as_deref() else {
            return Vec::new();
        };
        log::info!("No coaches extracted from {}, trying AI", page.final_url);
        match ai.extract_coaches(&page.html, school_name).await {
            Ok(coaches) => coaches
                .into_iter()
                .filter_map(|mut coach| {
                    coach.name = CoachRecord::named(&coach.name)?.name;
                    coach.profile_url = coach
                        .profile_url
                        .as_deref()
                        .and_then(|href| resolve(&page.final_url, href));
                    Some(coach)
                })
                .collect(),
            Err(e) => {
                log::warn!("AI coach extraction failed on {}: {}", page.final_url, e);
                Vec::new()
            }
        }
    }
}

fn fetch_failure(error: AppError) -> FailureReason {
    FailureReason::FetchFailure(error.to_string())
}

/// Absolute URL of the first `skip=true` link on a splash page.
fn find_skip_link(html: &str, base_url: &str) -> Option<String> {
    let selector = parse_selector("a[href*='skip=true']").ok()?;
    let document = Html::parse_document(html);
    let href = document.select(&selector).next()?.value().attr("href")?;
    resolve(base_url, href)
}
