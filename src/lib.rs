//! Ripple-Rank: a priority crawler that ranks the link graph it discovers
//!
//! This crate crawls outward from a single seed URL, bounded by depth, through a
//! rate-limited worker pool fed by a priority frontier. Once the frontier drains it
//! ranks every visited page by iterative rank propagation over the link graph.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod output;
pub mod rank;
pub mod storage;

use thiserror::Error;

/// Main error type for Ripple-Rank operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Scheduler misuse: {0}")]
    SchedulerMisuse(String),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ripple-Rank operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{Priority, UrlClassifier};
pub use config::Config;
pub use crawler::{CrawlPhase, CrawlScheduler, CrawlTask};
pub use output::{CrawlReport, CrawlStatus, RankedUrl};
pub use rank::{compute_rank, RankEngine, RankTable};
