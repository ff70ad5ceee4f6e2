use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::text::tokenize;
use crate::trace::{CandidateScore, MatchTrace};

/// One internal cohort eligible for mapping: same period, not yet
/// mapped for the source being reconciled.
#[derive(Debug, Clone)]
pub struct CohortCandidate {
    pub cohort_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one candidate in the period; mapped without scoring.
    Single { cohort_id: Uuid },
    /// Best of 2+ candidates cleared both thresholds.
    Scored {
        cohort_id: Uuid,
        score: f64,
        margin: f64,
    },
    /// No candidate cleared the score/margin thresholds.
    Ambiguous,
    NoCandidates,
}

#[derive(Debug, Clone)]
pub struct MatchDecision {
    pub resolution: Resolution,
    pub trace: MatchTrace,
}

/// Fraction of external tokens with a substring match (either
/// direction) against some candidate token. Containment, not edit
/// distance: source names truncate or extend words inconsistently.
pub fn containment_score(external: &[String], candidate: &[String]) -> f64 {
    if external.is_empty() {
        return 0.0;
    }
    let hits = external
        .iter()
        .filter(|ext| {
            candidate
                .iter()
                .any(|cand| cand.contains(ext.as_str()) || ext.contains(cand.as_str()))
        })
        .count();
    hits as f64 / external.len() as f64
}

/// Resolve one external base name against the period's candidates.
pub fn resolve(
    config: &MatchingConfig,
    external_name: &str,
    candidates: &[CohortCandidate],
) -> MatchDecision {
    let external_tokens = tokenize(external_name);

    if candidates.is_empty() {
        return MatchDecision {
            resolution: Resolution::NoCandidates,
            trace: MatchTrace {
                external_name: external_name.to_string(),
                external_tokens,
                candidates: Vec::new(),
                outcome: "no_candidates".to_string(),
            },
        };
    }

    if candidates.len() == 1 {
        let only = &candidates[0];
        return MatchDecision {
            resolution: Resolution::Single {
                cohort_id: only.cohort_id,
            },
            trace: MatchTrace {
                external_name: external_name.to_string(),
                external_tokens,
                candidates: vec![CandidateScore {
                    cohort_id: only.cohort_id,
                    name: only.name.clone(),
                    score: 1.0,
                }],
                outcome: "single_candidate".to_string(),
            },
        };
    }

    let mut scored: Vec<CandidateScore> = candidates
        .iter()
        .map(|c| CandidateScore {
            cohort_id: c.cohort_id,
            name: c.name.clone(),
            score: containment_score(&external_tokens, &tokenize(&c.name)),
        })
        .collect();

    // Name as tiebreaker keeps the ordering deterministic across runs.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let top = &scored[0];
    let runner_up = scored[1].score;
    let margin = top.score - runner_up;

    let resolution = if top.score > config.thresholds.min_score && margin > config.thresholds.min_margin
    {
        Resolution::Scored {
            cohort_id: top.cohort_id,
            score: top.score,
            margin,
        }
    } else {
        Resolution::Ambiguous
    };

    let outcome = match &resolution {
        Resolution::Scored { .. } => "matched".to_string(),
        _ => "ambiguous".to_string(),
    };

    MatchDecision {
        resolution,
        trace: MatchTrace {
            external_name: external_name.to_string(),
            external_tokens,
            candidates: scored,
            outcome,
        },
    }
}
