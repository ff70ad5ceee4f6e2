use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily ad-platform spend per campaign, keyed (campaign, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdInsight {
    pub campaign_id: String,
    pub campaign_name: String,
    pub day: NaiveDate,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub synced_at: DateTime<Utc>,
}
