//! HTTP page fetching

use crate::error::HkError;
use crate::platform::retry::{RetryConfig, RetryExecutor};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0) Gecko/20150101 Firefox/47.0 (Chrome)";

/// Source of page bodies for the extractor
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` with the given request headers and return the body text
    async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HkError>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retries for transient failures
    pub max_retries: u32,
    /// Default user agent
    pub user_agent: String,
    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_url: None,
        }
    }
}

/// [`PageFetcher`] backed by reqwest
pub struct HttpFetcher {
    client: Client,
    retry: RetryExecutor,
}

impl HttpFetcher {
    /// Create a fetcher with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, HkError> {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .user_agent(config.user_agent.as_str());

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let client = builder.build()?;
        let retry = RetryExecutor::with_config(RetryConfig::with_max_retries(config.max_retries));

        Ok(Self { client, retry })
    }

    async fn fetch_once(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HkError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HkError::HttpStatus(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HkError> {
        debug!("Fetching {}", url);
        let body = self.retry.execute(|| self.fetch_once(url, headers)).await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fetcher(max_retries: u32) -> HttpFetcher {
        HttpFetcher::with_config(HttpClientConfig {
            timeout: Duration::from_secs(5),
            max_retries,
            ..HttpClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fetcher_creation() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(HttpFetcher::with_config(config).is_ok());
    }

    #[test]
    fn test_invalid_proxy() {
        let result = HttpFetcher::with_config(HttpClientConfig {
            proxy_url: Some("::not a proxy::".to_string()),
            ..HttpClientConfig::default()
        });
        assert!(matches!(result, Err(HkError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/embed/abc/")
            .match_header("user-agent", "test-agent")
            .match_header("referer", "https://www.hkanime.com/")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let body = test_fetcher(0)
            .fetch(
                &format!("{}/embed/abc/", server.url()),
                &[
                    ("User-Agent", "test-agent"),
                    ("Referer", "https://www.hkanime.com/"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(body, "<html>ok</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let result = test_fetcher(3)
            .fetch(&format!("{}/missing", server.url()), &[])
            .await;

        assert!(matches!(result, Err(HkError::HttpStatus(404))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let result = test_fetcher(1)
            .fetch(&format!("{}/flaky", server.url()), &[])
            .await;

        assert!(matches!(result, Err(HkError::HttpStatus(503))));
        mock.assert_async().await;
    }
}
