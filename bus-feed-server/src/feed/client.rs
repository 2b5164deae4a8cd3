//! Upstream feed HTTP client.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use super::error::FeedError;

/// Default upstream endpoint (live ETAs for one route).
const DEFAULT_FEED_URL: &str = "https://data.etabus.gov.hk/v1/transport/kmb/route-eta/1A/1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest slice of an error body kept in `FeedError::Api`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Configuration for the upstream feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Upstream endpoint, fetched with a plain GET
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config for the given endpoint with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

/// Something that can produce the raw upstream payload.
///
/// The cache is generic over this so tests can substitute canned or
/// failing upstreams.
pub trait FeedSource: Send + Sync {
    /// Fetch the raw response body.
    fn fetch(&self) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// Fetches the feed over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    http: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// Create a new client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<String, FeedError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};

    /// Serve `app` on an ephemeral local port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn config_builder() {
        let config = FeedConfig::new("http://localhost:8080/eta").with_timeout(3);

        assert_eq!(config.url, "http://localhost:8080/eta");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn config_defaults() {
        let config = FeedConfig::default();

        assert_eq!(config.url, DEFAULT_FEED_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[tokio::test]
    async fn fetches_body() {
        let app = Router::new().route("/eta", get(|| async { r#"{"data": []}"# }));
        let base = serve(app).await;

        let source = HttpFeedSource::new(FeedConfig::new(format!("{base}/eta"))).unwrap();
        assert_eq!(source.fetch().await.unwrap(), r#"{"data": []}"#);
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let app = Router::new().route(
            "/eta",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(app).await;

        let source = HttpFeedSource::new(FeedConfig::new(format!("{base}/eta"))).unwrap();
        match source.fetch().await {
            Err(FeedError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        // Port 1 is reserved and nothing listens there
        let source = HttpFeedSource::new(FeedConfig::new("http://127.0.0.1:1/eta")).unwrap();
        assert!(matches!(source.fetch().await, Err(FeedError::Http(_))));
    }
}
