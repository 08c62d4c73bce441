use serde::Deserialize;

/// Default listing endpoint: the audio search of the Collège de France
pub const DEFAULT_ROOT_URL: &str = "http://www.college-de-france.fr/components/search-audiovideo.jsp?fulltext=&siteid=1156951719600&lang=FR&type=audio";

/// Origin that site-relative target links are resolved against
pub const DEFAULT_SITE_BASE: &str = "http://www.college-de-france.fr";

/// Path prefix identifying target-page links on a listing page
pub const DEFAULT_LINK_PREFIX: &str = "/site/";

/// Main configuration structure for Lecture-Harvester
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawl behaviour configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing URL the pagination starts from
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Origin used to resolve site-relative target links
    #[serde(rename = "site-base")]
    pub site_base: String,

    /// Only listing links whose href starts with this prefix are followed
    #[serde(rename = "link-prefix")]
    pub link_prefix: String,

    /// Explicit robots.txt location (derived from `site_base` when unset)
    #[serde(rename = "robots-url")]
    pub robots_url: Option<String>,

    /// Run every decision but never write to the store
    #[serde(rename = "dry-run")]
    pub dry_run: bool,

    /// Allow rewriting records that exist but have not been converted
    pub overwrite: bool,

    /// Halt the crawl on the first record that is already stored
    #[serde(rename = "stop-when-present")]
    pub stop_when_present: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            robots_url: None,
            dry_run: false,
            overwrite: false,
            stop_when_present: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value; be nice and say why you are scraping
    pub agent: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agent: "lecture-harvester".to_string(),
        }
    }
}

/// Field extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Locale of the long-form day strings (e.g. "fr_FR", "en")
    pub locale: String,

    /// Language code used when the audio filename carries none
    #[serde(rename = "default-language")]
    pub default_language: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            locale: "fr_FR".to_string(),
            default_language: "fr".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Project identifier recorded on every run
    #[serde(rename = "project-id")]
    pub project_id: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            project_id: "default".to_string(),
            database_path: "./lectures.db".to_string(),
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub user_agent: Option<String>,
    pub root_url: Option<String>,
    pub database_path: Option<String>,
    pub dry_run: bool,
    pub overwrite: bool,
    pub stop_when_present: bool,
}

impl Config {
    /// Applies command-line overrides on top of this configuration
    ///
    /// Boolean flags can only switch a mode on; a flag absent from the
    /// command line keeps the file's value.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(project_id) = overrides.project_id {
            self.output.project_id = project_id;
        }
        if let Some(agent) = overrides.user_agent {
            self.user_agent.agent = agent;
        }
        if let Some(root_url) = overrides.root_url {
            self.crawler.root_url = root_url;
        }
        if let Some(path) = overrides.database_path {
            self.output.database_path = path;
        }
        self.crawler.dry_run |= overrides.dry_run;
        self.crawler.overwrite |= overrides.overwrite;
        self.crawler.stop_when_present |= overrides.stop_when_present;
    }
}
