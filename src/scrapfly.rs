//! [`Fetcher`] backed by the Scrapfly web scraping API.
//!
//! Anti-bot bypass, proxy country selection and response caching are all
//! performed by the service; this client only forwards the flags.

use std::sync::{atomic::Ordering, Arc};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::error::{Result, ScrapeError};
use crate::fetcher::{Fetcher, DEFAULT_MAX_CONCURRENCY};
use crate::request::FetchRequest;
use crate::response::FetchResponse;
use crate::statistics::Statistics;

const BASE_URL: &str = "https://api.scrapfly.io";

#[derive(Debug, Deserialize)]
struct ScrapeEnvelope {
    result: ScrapeResult,
}

#[derive(Debug, Deserialize)]
struct ScrapeResult {
    #[serde(default)]
    content: String,
    status_code: u16,
    success: bool,
    #[serde(default)]
    reason: Option<String>,
}

pub struct ScrapflyClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
    max_concurrency: usize,
    permits: Arc<Semaphore>,
    statistics: Statistics,
}

impl ScrapflyClient {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            key: key.into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
            statistics: Statistics::default(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Caps in-flight requests across every caller of this client.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        self.max_concurrency = max_concurrency;
        self.permits = Arc::new(Semaphore::new(max_concurrency));
        self
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    fn query(&self, request: &FetchRequest) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.key.clone()),
            ("url", request.url().to_string()),
            ("country", request.country_code().to_string()),
            ("asp", request.anti_bot_bypass().to_string()),
            ("cache", request.allow_cached().to_string()),
        ]
    }

    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let resp = self
            .client
            .get(format!("{}/scrape", self.base_url))
            .query(&self.query(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ScrapeEnvelope = resp.json().await?;
        into_response(request, envelope)
    }
}

fn into_response(request: &FetchRequest, envelope: ScrapeEnvelope) -> Result<FetchResponse> {
    let ScrapeResult {
        content,
        status_code,
        success,
        reason,
    } = envelope.result;
    if !success {
        return Err(ScrapeError::Upstream {
            url: request.url().to_string(),
            status: status_code,
            reason: reason.unwrap_or_default(),
        });
    }
    Ok(FetchResponse::new(content, status_code, request.context()))
}

#[async_trait]
impl Fetcher for ScrapflyClient {
    fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|err| ScrapeError::Network(err.to_string()))?;

        tracing::debug!(url = request.url(), "scrapfly: fetching");
        self.statistics.num_fetches.fetch_add(1, Ordering::SeqCst);
        match self.send(&request).await {
            Ok(response) => {
                tracing::debug!(
                    url = request.url(),
                    status_code = response.status_code(),
                    "scrapfly: fetched"
                );
                Ok(response)
            }
            Err(err) => {
                self.statistics
                    .num_fetch_errors
                    .fetch_add(1, Ordering::SeqCst);
                if matches!(err, ScrapeError::Upstream { .. }) {
                    self.statistics
                        .num_upstream_errors
                        .fetch_add(1, Ordering::SeqCst);
                }
                tracing::error!(url = request.url(), "Fetch error: {:?}", err);
                Err(err)
            }
        }
    }
}
