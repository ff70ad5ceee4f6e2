use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub cohort_id: Uuid,
    pub name: String,
    pub score: f64,
}

/// Everything the reconciler looked at for one external name, kept so
/// the audit log can explain a mapping or an ambiguous verdict.
#[derive(Debug, Clone, Serialize)]
pub struct MatchTrace {
    pub external_name: String,
    pub external_tokens: Vec<String>,
    pub candidates: Vec<CandidateScore>,
    pub outcome: String,
}
