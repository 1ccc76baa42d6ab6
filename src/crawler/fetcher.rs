//! Page fetching
//!
//! The crawler only needs one thing from the network: given a URL, the set of
//! absolute links on that page. The [`Fetcher`] trait captures that, and
//! [`HttpFetcher`] implements it with reqwest and the HTML link extractor.

use crate::config::UserAgentConfig;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure to fetch or parse a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got '{content_type}'")]
    NotHtml { url: String, content_type: String },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Fetches a page and returns its absolute outbound HTTP(S) links
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<HashSet<String>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (reqwest default, up to 10 hops) and links are
/// resolved against the final URL.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<HashSet<String>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // A missing header is given the benefit of the doubt
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(extract_links(&body, &final_url))
    }
}

/// Parses a seed or link into a canonical absolute HTTP(S) URL string
pub fn canonicalize(url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&create_test_config()).is_ok());
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            canonicalize("https://Example.COM").unwrap(),
            "https://example.com/"
        );
        assert!(matches!(
            canonicalize("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_extracts_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    r#"<a href="/next">n</a><a href="mailto:x@y.z">m</a>"#,
                    "text/html; charset=utf-8",
                ),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let links = fetcher.fetch(&format!("{}/", server.uri())).await.unwrap();

        assert_eq!(links, HashSet::from([format!("{}/next", server.uri())]));
    }

    #[tokio::test]
    async fn test_fetch_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/api", server.uri())).await;

        assert!(matches!(result, Err(FetchError::NotHtml { .. })));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = HttpFetcher::new(&create_test_config()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/").await;

        assert!(matches!(result, Err(FetchError::Http { .. })));
    }
}
