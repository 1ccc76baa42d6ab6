use serde::Deserialize;

/// Main configuration structure for Ripple-Rank
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub rank: RankConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Tasks whose depth reaches this value are discarded instead of fetched
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent workers draining the frontier
    #[serde(rename = "pool-size")]
    pub pool_size: u32,

    /// Fetch permits granted per second across all workers
    #[serde(rename = "rate-limit")]
    pub rate_limit: f64,

    /// How long the drain loop waits on an empty frontier (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop dispatching once this many URLs have been visited
    #[serde(rename = "max-visited-urls", default)]
    pub max_visited_urls: Option<usize>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Rank computation parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(
        rename = "convergence-threshold",
        default = "default_convergence_threshold"
    )]
    pub convergence_threshold: f64,
}

fn default_max_iterations() -> u32 {
    20
}

fn default_convergence_threshold() -> f64 {
    1e-5
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            convergence_threshold: default_convergence_threshold(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite graph database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Where the JSON crawl report is written, if anywhere
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,

    /// Where the markdown summary is written, if anywhere
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// CSV file that receives one performance row per crawl, if any
    #[serde(rename = "metrics-path", default)]
    pub metrics_path: Option<String>,
}
