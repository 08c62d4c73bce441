//! Crawl runner - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pieces together:
//! - Drawing target URLs from the `PageEnumerator`
//! - Checking each URL against the exclusion policy
//! - Fetching and building a record
//! - Applying the upsert decision to the store
//! - Folding per-page outcomes into run totals

use crate::config::Config;
use crate::crawler::{Fetcher, PageEnumerator};
use crate::extract::RecordBuilder;
use crate::output::{Outcome, OutcomeCounters};
use crate::robots::ExclusionPolicy;
use crate::state::{ExistingState, UpsertDecision, UpsertPolicy};
use crate::storage::{LectureRecord, RecordStore};
use crate::HarvestError;
use url::Url;

/// Run-level settings for a crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Full User-Agent value; robots.txt is matched on its product token
    pub user_agent: String,

    /// Origin that listing hrefs are resolved against
    pub site_base: Url,

    /// Raw href prefix of target page links
    pub link_prefix: String,

    /// Decide and count as usual, but never write
    pub dry_run: bool,

    pub overwrite: bool,
    pub stop_when_present: bool,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            user_agent: config.user_agent.agent.clone(),
            site_base: Url::parse(&config.crawler.site_base)?,
            link_prefix: config.crawler.link_prefix.clone(),
            dry_run: config.crawler.dry_run,
            overwrite: config.crawler.overwrite,
            stop_when_present: config.crawler.stop_when_present,
        })
    }

    pub fn upsert_policy(&self) -> UpsertPolicy {
        UpsertPolicy::new(self.overwrite, self.stop_when_present)
    }
}

/// Result of processing one target page
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub outcome: Outcome,

    /// The policy asked for the crawl to stop after this page
    pub terminate: bool,

    /// The record built from the page, if extraction succeeded
    pub record: Option<LectureRecord>,
}

impl PageOutcome {
    fn skipped(outcome: Outcome) -> Self {
        Self {
            outcome,
            terminate: false,
            record: None,
        }
    }
}

/// Main crawl driver
///
/// Collaborators are injected: `F` fetches pages, `P` answers exclusion
/// checks and `S` persists records. Pages are processed strictly one after
/// another.
pub struct CrawlRunner<F, P, S> {
    fetcher: F,
    policy: P,
    store: S,
    builder: RecordBuilder,
    settings: CrawlSettings,
}

impl<F, P, S> CrawlRunner<F, P, S>
where
    F: Fetcher,
    P: ExclusionPolicy,
    S: RecordStore,
{
    pub fn new(
        fetcher: F,
        policy: P,
        store: S,
        builder: RecordBuilder,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            fetcher,
            policy,
            store,
            builder,
            settings,
        }
    }

    /// Crawls every target page reachable from `root_url`
    ///
    /// Stops when the listing is exhausted or when the upsert policy signals
    /// termination. Returns the folded outcome counts; any fetch or storage
    /// failure aborts the run with whatever was already written kept.
    pub async fn run(&mut self, root_url: &str) -> Result<OutcomeCounters, HarvestError> {
        let root = Url::parse(root_url)?;
        let mut enumerator = PageEnumerator::new(
            root,
            self.settings.site_base.clone(),
            self.settings.link_prefix.clone(),
        );
        enumerator.check_root(&self.policy, &self.settings.user_agent);

        tracing::info!(
            "Starting crawl of {} (dry_run={}, overwrite={}, stop_when_present={})",
            root_url,
            self.settings.dry_run,
            self.settings.overwrite,
            self.settings.stop_when_present
        );

        let mut counters = OutcomeCounters::default();

        while let Some(url) = enumerator.next_url(&self.fetcher).await? {
            let page = self.process_page(url.as_str()).await?;
            counters = counters.tally(page.outcome);
            tracing::info!("Running totals: {}", counters);

            if page.terminate {
                tracing::info!("Stopping at {}: record already present", url);
                break;
            }
        }

        tracing::info!(
            "Crawl finished: {} pages processed, {} links discovered",
            counters.total(),
            enumerator.discovered()
        );
        Ok(counters)
    }

    /// Processes a single target page
    ///
    /// A disallowed URL is never fetched.
    pub async fn process_page(&mut self, url: &str) -> Result<PageOutcome, HarvestError> {
        if !self.policy.allowed(&self.settings.user_agent, url) {
            tracing::info!("{}: disallowed by robots.txt", url);
            return Ok(PageOutcome::skipped(Outcome::Disallowed));
        }

        tracing::debug!("Fetching {}", url);
        let body = self.fetcher.fetch(url).await?;

        let record = match self.builder.build(&body, url) {
            Ok(record) => record,
            Err(reason) => {
                tracing::info!("{}: skipped, {}", url, reason);
                return Ok(PageOutcome::skipped(Outcome::from(reason)));
            }
        };

        self.apply(record)
    }

    fn apply(&mut self, record: LectureRecord) -> Result<PageOutcome, HarvestError> {
        let existing = self.store.get(&record.key)?;
        let state = ExistingState::from_lookup(existing.as_ref());
        let decision = self.settings.upsert_policy().decide(state);

        let (outcome, terminate) = match decision {
            UpsertDecision::Write => (Outcome::Saved, false),
            UpsertDecision::Overwrite => (Outcome::Overwritten, false),
            UpsertDecision::Skip { terminate } => (Outcome::AlreadyPresent, terminate),
        };

        match decision {
            UpsertDecision::Write | UpsertDecision::Overwrite if self.settings.dry_run => {
                tracing::info!("{}: {} (dry run, not written)", record.key, outcome.as_str());
            }
            UpsertDecision::Write | UpsertDecision::Overwrite => {
                self.store.put(&record)?;
                tracing::info!("{}: {}", record.key, outcome.as_str());
            }
            UpsertDecision::Skip { .. } => {
                tracing::info!("{}: already present ({:?})", record.key, state);
            }
        }

        Ok(PageOutcome {
            outcome,
            terminate,
            record: Some(record),
        })
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
