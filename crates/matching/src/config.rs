use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum token-containment score the best candidate must exceed.
    pub min_score: f64,
    /// Minimum lead over the runner-up; anything closer is ambiguous.
    pub min_margin: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        // Tuned against production topic names; do not re-derive.
        Self {
            min_score: 0.5,
            min_margin: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub thresholds: Thresholds,
}
