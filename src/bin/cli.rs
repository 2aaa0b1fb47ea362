//! Coach Crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use coach_crawler::{
    error::{AppError, Result},
    models::{Classification, Config, LinkCategory, SchoolContext},
    pipeline::{self, SchoolPipeline},
    services::{AiFallback, HttpAiParser, HttpFetcher, LinkClassifier, PageFetcher, PatternProbe},
    storage::{CoachStorage, LocalStorage},
};

/// Coach Crawler - NCAA football coaching staff collector
#[derive(Parser, Debug)]
#[command(
    name = "coach-crawler",
    version,
    about = "Collects football coaching staff from athletics websites"
)]
struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every school in a JSON list
    Scrape {
        /// Path to the schools file (default: {storage_dir}/schools.json)
        #[arg(long)]
        schools: Option<PathBuf>,
    },

    /// Crawl a single school given on the command line
    School {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// Athletics home page
        #[arg(long)]
        url: String,

        #[arg(long)]
        division: Option<String>,

        #[arg(long)]
        conference: Option<String>,

        /// Known coaches or roster page; skips link discovery
        #[arg(long)]
        coaches_url: Option<String>,
    },

    /// Show which link a page classifies to, falling back to probing
    Classify {
        #[arg(long)]
        url: String,

        #[arg(long, value_enum, default_value_t = CategoryArg::Football)]
        category: CategoryArg,
    },

    /// Print the latest stored document for a school
    Latest {
        #[arg(long)]
        id: String,
    },

    /// Validate configuration files
    Validate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    Football,
    Coaches,
    Roster,
    Staff,
}

impl From<CategoryArg> for LinkCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Football => LinkCategory::FootballProgram,
            CategoryArg::Coaches => LinkCategory::Coaches,
            CategoryArg::Roster => LinkCategory::Roster,
            CategoryArg::Staff => LinkCategory::CoachesOrRoster,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Coach Crawler starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let config = Arc::new(config);
    let storage = LocalStorage::from_config(&config.storage);

    match cli.command {
        Command::Scrape { schools } => {
            let schools_path = schools.unwrap_or_else(|| cli.storage_dir.join("schools.json"));
            if !schools_path.exists() {
                log::error!("Schools file not found at {}", schools_path.display());
                return Err(AppError::config("Schools file not found"));
            }

            let schools = SchoolContext::load_all(&schools_path)?;
            log::info!("Loaded {} schools", schools.len());

            let summary = pipeline::run_batch(Arc::clone(&config), &schools, &storage).await?;
            log::info!(
                "Scrape complete: {}/{} schools succeeded",
                summary.succeeded,
                summary.total
            );
        }

        Command::School {
            id,
            name,
            url,
            division,
            conference,
            coaches_url,
        } => {
            let school = SchoolContext {
                school_id: id,
                school_name: name,
                athletics_url: url,
                division,
                conference,
                coaching_staff_url: coaches_url,
            };

            let mut school_pipeline = SchoolPipeline::new(&config)?;
            if let Some(ai) = HttpAiParser::from_config(&config.ai)? {
                let ai: Arc<dyn AiFallback> = Arc::new(ai);
                school_pipeline = school_pipeline.with_ai(ai);
            }
            let fetcher = HttpFetcher::new(&config.crawler)?;
            let run = school_pipeline.run(&fetcher, &school).await;

            if run.success {
                let meta = storage.write_run(&run).await?;
                log::info!(
                    "Stored {} coaches at {}",
                    meta.coach_count,
                    meta.snapshot_key
                );
            }
            println!("{}", serde_json::to_string_pretty(&run)?);
        }

        Command::Classify { url, category } => {
            let category = LinkCategory::from(category);
            let fetcher = HttpFetcher::new(&config.crawler)?;
            let page = fetcher.fetch(&url).await?;

            let classifier = LinkClassifier::new(&config.rules.classifier)?;
            let probe = PatternProbe::new(&config.rules.probe);
            let result = match classifier.classify(&page.html, &page.final_url, category) {
                Classification::NotFound => {
                    log::info!("No {} link classified, probing...", category);
                    probe.probe(&fetcher, &page.final_url, category).await
                }
                found => found,
            };

            match result {
                Classification::Found { url, category } => println!("{category}: {url}"),
                Classification::NotFound => println!("{category}: not found"),
            }
        }

        Command::Latest { id } => match storage.load_latest(&id).await? {
            Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
            None => log::warn!("No stored document for school {}", id),
        },

        Command::Validate => {
            log::info!("Validating configuration...");

            // Parse errors must surface here rather than fall back to defaults.
            let config = Config::load(&config_path).inspect_err(|e| {
                log::error!("Config load failed from {}: {}", config_path.display(), e);
            })?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            // Compiling the tables catches bad regexes and selectors too.
            SchoolPipeline::new(&config)?;
            log::info!("✓ Config OK (includes keyword, selector and probe tables)");

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
