use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};

use super::models::InsightsPage;

#[derive(Debug, Clone)]
pub struct AdsConfig {
    pub base_url: String,
    pub access_token: String,
    pub account_id: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl AdsConfig {
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("ADS_API_BASE").ok()?;
        let access_token = std::env::var("ADS_ACCESS_TOKEN").ok()?;
        let account_id = std::env::var("ADS_ACCOUNT_ID").ok()?;
        let max_retries = std::env::var("ADS_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("ADS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Some(Self {
            base_url,
            access_token,
            account_id,
            max_retries,
            timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdsClientError {
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[derive(Clone)]
pub struct AdsClient {
    http: Client,
    config: AdsConfig,
}

impl AdsClient {
    pub fn new(config: AdsConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// For testing: point the client at a wiremock server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// One page of daily campaign insights; the token rides as a query
    /// parameter, which is how this platform authenticates.
    pub async fn fetch_insights_page(
        &self,
        since: NaiveDate,
        until: NaiveDate,
        after: &str,
    ) -> Result<InsightsPage, AdsClientError> {
        let mut url = format!(
            "{}/v1/accounts/{}/insights?access_token={}&since={}&until={}&limit=100",
            self.config.base_url,
            self.config.account_id,
            urlencoding::encode(&self.config.access_token),
            since,
            until
        );
        if !after.is_empty() {
            url.push_str("&after=");
            url.push_str(&urlencoding::encode(after));
        }

        self.get_with_retry(&url).await
    }

    async fn get_with_retry(&self, url: &str) -> Result<InsightsPage, AdsClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self.http.get(url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(AdsClientError::Request(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<InsightsPage>()
                    .await
                    .map_err(AdsClientError::Request);
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(AdsClientError::Http { status, body });
        }

        Err(AdsClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
