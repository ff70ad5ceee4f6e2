use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::{MeetingsPage, ParticipantsPage, TokenResponse};

/// One polled Zoom license. Credentials are account-scoped; so are the
/// tokens minted from them.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoomAccount {
    pub name: String,
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// The licensed user whose meeting reports are polled.
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct ZoomConfig {
    pub api_base: String,
    pub oauth_base: String,
    pub accounts: Vec<ZoomAccount>,
    pub page_size: u32,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl ZoomConfig {
    /// Load Zoom config from environment.
    ///
    /// Returns `Ok(None)` if Zoom is not configured (`ZOOM_ACCOUNTS`
    /// missing). Returns `Err` if it is set but unusable (fail-fast on
    /// misconfiguration).
    pub fn from_env() -> Result<Option<Self>, String> {
        let raw = match std::env::var("ZOOM_ACCOUNTS").ok() {
            Some(v) => v,
            None => return Ok(None),
        };

        let accounts: Vec<ZoomAccount> = serde_json::from_str(&raw)
            .map_err(|e| format!("ZOOM_ACCOUNTS is not a valid JSON account list: {e}"))?;
        if accounts.is_empty() {
            return Err("ZOOM_ACCOUNTS is set but contains no accounts".to_string());
        }

        let api_base = std::env::var("ZOOM_API_BASE")
            .unwrap_or_else(|_| "https://api.zoom.us".to_string());
        let oauth_base =
            std::env::var("ZOOM_OAUTH_BASE").unwrap_or_else(|_| "https://zoom.us".to_string());
        let page_size = std::env::var("ZOOM_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let max_retries = std::env::var("ZOOM_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let timeout_secs = std::env::var("ZOOM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Some(Self {
            api_base,
            oauth_base,
            accounts,
            page_size,
            max_retries,
            timeout_secs,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ZoomClientError {
    #[error("auth failed for account {account}: {detail}")]
    Auth { account: String, detail: String },

    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Meeting UUIDs beginning with `/` or containing `//` must be double
/// URL-encoded before use in a path segment; everything else is
/// encoded once.
pub fn encode_meeting_uuid(uuid: &str) -> String {
    if uuid.starts_with('/') || uuid.contains("//") {
        urlencoding::encode(&urlencoding::encode(uuid)).into_owned()
    } else {
        urlencoding::encode(uuid).into_owned()
    }
}

#[derive(Clone)]
pub struct ZoomClient {
    http: Client,
    config: ZoomConfig,
}

impl ZoomClient {
    pub fn new(config: ZoomConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// For testing: point the client at a wiremock server.
    #[cfg(test)]
    pub fn with_base_urls(mut self, api_base: &str, oauth_base: &str) -> Self {
        self.config.api_base = api_base.to_string();
        self.config.oauth_base = oauth_base.to_string();
        self
    }

    /// Mint a short-lived account-scoped token. Not cached: every
    /// account sync starts with a fresh one.
    pub async fn fetch_token(&self, account: &ZoomAccount) -> Result<String, ZoomClientError> {
        let url = format!(
            "{}/oauth/token?grant_type=account_credentials&account_id={}",
            self.config.oauth_base, account.account_id
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&account.client_id, Some(&account.client_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ZoomClientError::Auth {
                account: account.name.clone(),
                detail: format!("{status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    pub async fn fetch_meetings_page(
        &self,
        token: &str,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        next_page_token: &str,
    ) -> Result<MeetingsPage, ZoomClientError> {
        let mut url = format!(
            "{}/v2/report/users/{}/meetings?from={}&to={}&page_size={}",
            self.config.api_base, user_id, from, to, self.config.page_size
        );
        if !next_page_token.is_empty() {
            url.push_str("&next_page_token=");
            url.push_str(&urlencoding::encode(next_page_token));
        }

        self.get_with_retry(token, &url).await
    }

    pub async fn fetch_participants_page(
        &self,
        token: &str,
        meeting_uuid: &str,
        next_page_token: &str,
    ) -> Result<ParticipantsPage, ZoomClientError> {
        let mut url = format!(
            "{}/v2/report/meetings/{}/participants?page_size={}",
            self.config.api_base,
            encode_meeting_uuid(meeting_uuid),
            self.config.page_size
        );
        if !next_page_token.is_empty() {
            url.push_str("&next_page_token=");
            url.push_str(&urlencoding::encode(next_page_token));
        }

        self.get_with_retry(token, &url).await
    }

    /// One GET with the shared retry ladder: transient network errors
    /// and 5xx retry with capped exponential backoff, 429 honors
    /// Retry-After, other 4xx fail fast.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<T, ZoomClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            let response = match self.http.get(url).bearer_auth(token).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(ZoomClientError::Request(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response.json::<T>().await.map_err(ZoomClientError::Request);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ZoomClientError::Http { status, body });
        }

        Err(ZoomClientError::MaxRetriesExceeded {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
