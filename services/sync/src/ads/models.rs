use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InsightsPage {
    #[serde(default)]
    pub data: Vec<RawInsight>,
    #[serde(default)]
    pub next_cursor: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInsight {
    pub campaign_id: String,
    #[serde(default)]
    pub campaign_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub clicks: i64,
}
