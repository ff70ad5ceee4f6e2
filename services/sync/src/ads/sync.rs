use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use campus_db::ads::models::AdInsight;
use campus_db::ads::repositories::AdsRepository;

use super::client::AdsClient;
use super::models::RawInsight;
use crate::connector::{Connector, SyncOutcome};
use crate::pacing::{FixedInterval, PAGE_DELAY};

const SOURCE_NAME: &str = "ads";

fn raw_to_insight(raw: &RawInsight) -> AdInsight {
    AdInsight {
        campaign_id: raw.campaign_id.clone(),
        campaign_name: raw.campaign_name.clone(),
        day: raw.date,
        spend: raw.spend,
        impressions: raw.impressions,
        clicks: raw.clicks,
        synced_at: Utc::now(),
    }
}

pub struct AdsSyncer<R> {
    client: AdsClient,
    repo: R,
    windows: Vec<(NaiveDate, NaiveDate)>,
}

impl<R> AdsSyncer<R>
where
    R: AdsRepository,
{
    pub fn new(client: AdsClient, repo: R, windows: Vec<(NaiveDate, NaiveDate)>) -> Self {
        Self {
            client,
            repo,
            windows,
        }
    }
}

#[async_trait]
impl<R> Connector for AdsSyncer<R>
where
    R: AdsRepository,
{
    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    async fn sync(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::new(SOURCE_NAME);
        let mut pages = FixedInterval::new(PAGE_DELAY);

        for (since, until) in &self.windows {
            let mut after = String::new();
            loop {
                pages.tick().await;
                let page = match self.client.fetch_insights_page(*since, *until, &after).await {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::error!(error = %e, "insights page fetch failed");
                        outcome.mark_fatal(e.to_string());
                        return outcome;
                    }
                };
                outcome.fetched += page.data.len() as u64;

                for raw in &page.data {
                    let insight = raw_to_insight(raw);
                    match self.repo.upsert_insight(&insight).await {
                        Ok(write) => outcome.record_write(write),
                        Err(e) => {
                            tracing::warn!(
                                campaign = %raw.campaign_id,
                                day = %raw.date,
                                error = %e,
                                "failed to upsert insight"
                            );
                            outcome
                                .record_failure(format!("insight {}/{}: {e}", raw.campaign_id, raw.date));
                        }
                    }
                }

                after = page.next_cursor;
                if after.is_empty() {
                    break;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::client::AdsConfig;
    use campus_common::error::{CampusError, CampusResult};
    use campus_db::WriteOutcome;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone, Default)]
    struct MockAdsRepo {
        insights: Arc<Mutex<Vec<AdInsight>>>,
        fail_campaign: Option<String>,
    }

    #[async_trait]
    impl AdsRepository for MockAdsRepo {
        async fn upsert_insight(&self, insight: &AdInsight) -> CampusResult<WriteOutcome> {
            if self.fail_campaign.as_deref() == Some(insight.campaign_id.as_str()) {
                return Err(CampusError::Database("boom".to_string()));
            }
            let mut insights = self.insights.lock().unwrap();
            let existed = insights
                .iter()
                .any(|i| i.campaign_id == insight.campaign_id && i.day == insight.day);
            insights.retain(|i| !(i.campaign_id == insight.campaign_id && i.day == insight.day));
            insights.push(insight.clone());
            Ok(if existed {
                WriteOutcome::Updated
            } else {
                WriteOutcome::Inserted
            })
        }
    }

    fn test_config() -> AdsConfig {
        AdsConfig {
            base_url: "http://localhost".to_string(),
            access_token: "tok".to_string(),
            account_id: "acct-1".to_string(),
            max_retries: 1,
            timeout_secs: 5,
        }
    }

    fn window() -> Vec<(NaiveDate, NaiveDate)> {
        vec![(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )]
    }

    fn insight_json(campaign: &str, date: &str) -> serde_json::Value {
        serde_json::json!({
            "campaign_id": campaign,
            "campaign_name": "Arteterapia Marzo",
            "date": date,
            "spend": 10.0,
            "impressions": 500,
            "clicks": 25
        })
    }

    #[tokio::test]
    async fn paginates_until_cursor_runs_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/accounts/acct-1/insights"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [insight_json("c1", "2025-03-01")],
                "next_cursor": "cur-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/accounts/acct-1/insights"))
            .and(query_param("after", "cur-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [insight_json("c1", "2025-03-02")],
                "next_cursor": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdsClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let repo = MockAdsRepo::default();
        let syncer = AdsSyncer::new(client, repo.clone(), window());

        let outcome = syncer.sync().await;

        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(repo.insights.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn one_bad_insight_does_not_lose_the_batch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    insight_json("c-bad", "2025-03-01"),
                    insight_json("c-good", "2025-03-01")
                ],
                "next_cursor": ""
            })))
            .mount(&server)
            .await;

        let client = AdsClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let repo = MockAdsRepo {
            fail_campaign: Some("c-bad".to_string()),
            ..Default::default()
        };
        let syncer = AdsSyncer::new(client, repo.clone(), window());

        let outcome = syncer.sync().await;

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.inserted, 1);
        assert!(!outcome.fatal);
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("expired token"))
            .mount(&server)
            .await;

        let client = AdsClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let syncer = AdsSyncer::new(client, MockAdsRepo::default(), window());

        let outcome = syncer.sync().await;

        assert!(outcome.fatal);
        assert_eq!(outcome.status(), "error");
    }
}
