//! Lecture-Harvester main entry point
//!
//! This is the command-line interface for the Lecture-Harvester catalogue importer.

use anyhow::Context;
use clap::Parser;
use lecture_harvester::config::{load_config_with_hash, validate, Config, Overrides};
use lecture_harvester::crawler::crawl;
use lecture_harvester::output::{load_statistics, print_outcomes, print_statistics};
use lecture_harvester::storage::{open_storage, RunStatus};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Lecture-Harvester: an incremental lecture catalogue importer
///
/// Lecture-Harvester walks a paginated listing of lecture pages, extracts
/// one record per lecture and stores it, respecting robots.txt. Records
/// already in the catalogue are skipped, overwritten or end the run
/// depending on the flags below.
#[derive(Parser, Debug)]
#[command(name = "lecture-harvester")]
#[command(version = "1.0.0")]
#[command(about = "An incremental lecture catalogue importer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Project identifier recorded with each run
    #[arg(long, value_name = "ID")]
    project_id: Option<String>,

    /// User-Agent sent with every request and matched against robots.txt
    #[arg(long, value_name = "AGENT")]
    user_agent: Option<String>,

    /// Listing URL to start from
    #[arg(long, value_name = "URL")]
    root_url: Option<String>,

    /// Path to the SQLite database
    #[arg(long = "database", value_name = "PATH")]
    database_path: Option<PathBuf>,

    /// Decide and count every page but write nothing
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Overwrite stored records that are not yet converted
    #[arg(long, conflicts_with = "stats")]
    overwrite: bool,

    /// Stop at the first lecture already in the catalogue
    #[arg(long, conflicts_with = "stats")]
    stop_when_present: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            project_id: self.project_id.clone(),
            user_agent: self.user_agent.clone(),
            root_url: self.root_url.clone(),
            database_path: self
                .database_path
                .as_ref()
                .map(|p| p.display().to_string()),
            dry_run: self.dry_run,
            overwrite: self.overwrite,
            stop_when_present: self.stop_when_present,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    config.apply_overrides(cli.overrides());
    validate(&config).context("invalid configuration")?;

    if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, config_hash.as_deref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lecture_harvester=info,warn"),
            1 => EnvFilter::new("lecture_harvester=debug,info"),
            2 => EnvFilter::new("lecture_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
///
/// Real runs are recorded in the `runs` table; dry runs only read the
/// catalogue.
async fn handle_crawl(config: &Config, config_hash: Option<&str>) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    if config.crawler.dry_run {
        tracing::info!("Dry run: nothing will be written");
        let outcomes = crawl(config, &mut storage).await?;
        println!("Dry run outcomes:");
        print_outcomes(&outcomes);
        return Ok(());
    }

    let run_id = storage.create_run(&config.output.project_id, config_hash)?;
    tracing::info!(
        "Starting run {} for project {}",
        run_id,
        config.output.project_id
    );

    match crawl(config, &mut storage).await {
        Ok(outcomes) => {
            storage.finish_run(run_id, RunStatus::Completed, &outcomes)?;
            tracing::info!("Run {} completed", run_id);
            println!("Run {} outcomes:", run_id);
            print_outcomes(&outcomes);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            storage.finish_run(run_id, RunStatus::Failed, &Default::default())?;
            Err(e.into())
        }
    }
}
