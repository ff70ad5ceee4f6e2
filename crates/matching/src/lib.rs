pub mod config;
pub mod engine;
pub mod period;
pub mod text;
pub mod trace;

pub use config::MatchingConfig;
pub use engine::{resolve, CohortCandidate, MatchDecision, Resolution};
pub use period::{parse_dated_name, DatedName};
pub use trace::MatchTrace;
