//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end: seed, drain, store, rank, report. Hosts that a
//! mock server cannot stand in for (blacklisted domains) are served by an
//! in-process fetcher instead.

use async_trait::async_trait;
use ripple_rank::config::{Config, CrawlerConfig, OutputConfig, RankConfig, UserAgentConfig};
use ripple_rank::crawler::{run_crawl, CrawlScheduler, FetchError, Fetcher};
use ripple_rank::output::{write_outputs, CrawlMetrics, CrawlStatus};
use ripple_rank::storage::{open_store, GraphStore, SqliteGraphStore};
use ripple_rank::{CrawlPhase, RippleError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing to `db_path`
fn create_test_config(db_path: &Path, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            pool_size: 4,
            rate_limit: 100.0,
            poll_interval_ms: 50,
            max_visited_urls: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
            request_timeout_secs: 5,
        },
        rank: RankConfig::default(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            report_path: None,
            summary_path: None,
            metrics_path: None,
        },
    }
}

/// Serves an HTML page at `page_path` linking to each of `links`
async fn mount_page(server: &MockServer, page_path: &str, links: &[String]) {
    let body: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();

    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html",
        ))
        .mount(server)
        .await;
}

/// In-process fetcher serving a fixed link map and recording fetch order
struct StubFetcher {
    pages: HashMap<String, Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &[&str])]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, links)| {
                    (
                        url.to_string(),
                        links.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<HashSet<String>, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(self
            .pages
            .get(url)
            .map(|links| links.iter().cloned().collect())
            .unwrap_or_default())
    }
}

fn in_memory_scheduler(
    config: &Config,
    fetcher: Arc<StubFetcher>,
) -> (CrawlScheduler, Arc<Mutex<SqliteGraphStore>>) {
    let store = Arc::new(Mutex::new(SqliteGraphStore::new_in_memory().unwrap()));
    let scheduler = CrawlScheduler::new(config, store.clone(), fetcher).unwrap();
    (scheduler, store)
}

#[tokio::test]
async fn test_two_page_cycle_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);
    let child = format!("{}/one", base);

    mount_page(&server, "/", &[child.clone()]).await;
    mount_page(&server, "/one", &[seed.clone()]).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.db");
    let config = create_test_config(&db_path, 2);

    let report = run_crawl(&config, &seed).await.expect("crawl failed");

    assert_eq!(report.status, CrawlStatus::Success);
    assert_eq!(report.total_urls_crawled, 2);
    assert!((report.total_rank() - 1.0).abs() < 1e-9);
    assert!((report.rank_of(&seed).unwrap() - 0.5).abs() < 1e-9);
    assert!((report.rank_of(&child).unwrap() - 0.5).abs() < 1e-9);
    assert!(report.data.iter().all(|entry| entry.in_degree == 1));

    let store = open_store(&db_path).unwrap();
    let mut nodes = store.list_nodes().unwrap();
    nodes.sort();
    assert_eq!(nodes, vec![seed.clone(), child.clone()]);
    assert_eq!(store.count_edges().unwrap(), 2);
    assert_eq!(store.top_ranked(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_failures_are_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);

    mount_page(
        &server,
        "/",
        &[
            format!("{}/ok", base),
            format!("{}/broken", base),
            format!("{}/missing", base),
        ],
    )
    .await;
    mount_page(&server, "/ok", &[]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("graph.db"), 2);

    let report = run_crawl(&config, &seed).await.expect("crawl failed");

    assert_eq!(report.status, CrawlStatus::Success);
    assert_eq!(report.total_urls_crawled, 2);
    assert!(report.rank_of(&format!("{}/ok", base)).is_some());
    assert!(report.rank_of(&format!("{}/broken", base)).is_none());
}

#[tokio::test]
async fn test_depth_limit_stops_chain() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);

    mount_page(&server, "/", &[format!("{}/a", base)]).await;
    mount_page(&server, "/a", &[format!("{}/b", base)]).await;
    mount_page(&server, "/b", &[format!("{}/c", base)]).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.db");
    let config = create_test_config(&db_path, 2);

    let report = run_crawl(&config, &seed).await.expect("crawl failed");

    assert_eq!(report.total_urls_crawled, 2);
    assert!(report.rank_of(&format!("{}/b", base)).is_none());

    // The edge into the page past the depth limit is still recorded
    let store = open_store(&db_path).unwrap();
    assert_eq!(store.count_edges().unwrap(), 2);
}

#[tokio::test]
async fn test_visited_cap_stops_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let seed = format!("{}/", base);

    let links: Vec<String> = (0..5).map(|i| format!("{}/p{}", base, i)).collect();
    mount_page(&server, "/", &links).await;
    for i in 0..5 {
        mount_page(&server, &format!("/p{}", i), &[]).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&dir.path().join("graph.db"), 3);
    config.crawler.max_visited_urls = Some(3);

    let report = run_crawl(&config, &seed).await.expect("crawl failed");

    assert_eq!(report.status, CrawlStatus::Capped);
    assert_eq!(report.total_urls_crawled, 3);
    assert!((report.total_rank() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_blacklisted_seed_is_still_crawled() {
    let seed = "https://www.facebook.com/page";
    let fetcher = Arc::new(StubFetcher::new(&[(
        seed,
        &["https://www.youtube.com/watch", "https://plain.example/"],
    )]));

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&dir.path().join("unused.db"), 2);
    config.crawler.pool_size = 1;
    let (scheduler, store) = in_memory_scheduler(&config, fetcher.clone());

    let report = scheduler.start_crawl(seed).await.expect("crawl failed");

    // The seed is fetched despite its priority and its blacklisted child is
    // still admitted, just scheduled last
    assert_eq!(report.total_urls_crawled, 3);
    assert_eq!(
        fetcher.fetched().last().map(String::as_str),
        Some("https://www.youtube.com/watch")
    );
    assert!(report.blacklisted_urls.contains(&seed.to_string()));
    assert!(report
        .blacklisted_urls
        .contains(&"https://www.youtube.com/watch".to_string()));
    assert!(store
        .lock()
        .unwrap()
        .list_nodes()
        .unwrap()
        .contains(&seed.to_string()));
}

#[tokio::test]
async fn test_children_fetched_in_priority_order() {
    let seed = "https://start.example/";
    let fetcher = Arc::new(StubFetcher::new(&[(
        seed,
        &[
            "https://plain.example/",
            "https://lab.example/research",
            "https://cdn.example/logo.png",
            "https://www.uni.edu",
        ],
    )]));

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&dir.path().join("unused.db"), 2);
    config.crawler.pool_size = 1;
    let (scheduler, _store) = in_memory_scheduler(&config, fetcher.clone());

    let report = scheduler.start_crawl(seed).await.expect("crawl failed");

    assert_eq!(
        fetcher.fetched(),
        vec![
            "https://start.example/",
            "https://www.uni.edu",
            "https://lab.example/research",
            "https://plain.example/",
            "https://cdn.example/logo.png",
        ]
    );
    assert_eq!(
        report.low_priority_urls,
        vec!["https://cdn.example/logo.png".to_string()]
    );
    assert_eq!(scheduler.phase(), CrawlPhase::Terminated);
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("graph.db"), 2);

    let result = run_crawl(&config, "mailto:someone@example.com").await;

    assert!(matches!(result, Err(RippleError::InvalidSeed { .. })));
}

#[tokio::test]
async fn test_report_and_summary_files_written() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());
    mount_page(&server, "/", &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("graph.db"), 2);
    let report_path = dir.path().join("report.json");
    let summary_path = dir.path().join("summary.md");

    let report = run_crawl(&config, &seed).await.expect("crawl failed");
    write_outputs(&report, Some(&report_path), Some(&summary_path)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["total_urls_crawled"], 1);
    assert_eq!(json["data"][0]["url"], seed.as_str());
    assert!((json["data"][0]["rank"].as_f64().unwrap() - 1.0).abs() < 1e-9);

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains(&seed));
}

#[tokio::test]
async fn test_metrics_rows_accumulate_across_crawls() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());
    mount_page(&server, "/", &[format!("{}/one", server.uri())]).await;
    mount_page(&server, "/one", &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("graph.db"), 2);
    let metrics_path = dir.path().join("metrics.csv");

    for _ in 0..2 {
        let report = run_crawl(&config, &seed).await.expect("crawl failed");
        CrawlMetrics::new(&report, &seed, &config.crawler)
            .append_to(&metrics_path)
            .unwrap();
    }

    let content = std::fs::read_to_string(&metrics_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("finished_at,seed_url"));
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[1], seed.as_str());
    assert_eq!(fields[2], "4");
    assert_eq!(fields[3], "2");
    assert_eq!(fields[4], "2");
}
