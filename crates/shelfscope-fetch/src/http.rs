use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use shelfscope_core::HttpConfig;
use tracing::debug;

use crate::error::{FetchError, Result};

// ─── PoliteClient ─────────────────────────────────────────────────────────────

/// Thin wrapper over `reqwest::Client` that sends browser-like headers, applies
/// a per-request timeout and maps response statuses onto [`FetchError`].
///
/// It never retries on its own: the batch updater owns the retry policy.
pub struct PoliteClient {
    client: reqwest::Client,
    origin: String,
}

impl PoliteClient {
    pub fn new(http: &HttpConfig, timeout: Duration, origin: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&http.accept) {
            headers.insert(ACCEPT, v);
        }
        if let Ok(v) = HeaderValue::from_str(&http.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }

        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.as_str())
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            origin: origin.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let resp = self.client.get(url).send().await?;
        self.read_body(url, resp).await
    }

    pub async fn get_text_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        debug!("GET {url} {query:?}");
        let resp = self.client.get(url).query(query).send().await?;
        self.read_body(url, resp).await
    }

    async fn read_body(&self, url: &str, resp: Response) -> Result<String> {
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(FetchError::RateLimited {
                origin: self.origin.clone(),
                retry_after,
            });
        }
        if !status.is_success() {
            return Err(FetchError::NotFound(format!(
                "{url} (HTTP {})",
                status.as_u16()
            )));
        }
        resp.text().await.map_err(FetchError::Http)
    }
}
