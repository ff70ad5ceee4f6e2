use async_trait::async_trait;

use campus_db::WriteOutcome;

/// Counters for one connector pass. `failed` counts isolated
/// per-record write errors; `fatal` marks an account-level abort
/// (auth failure, page fetch error) and is what flips the run status.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub source: String,
    pub fetched: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
    pub fatal: bool,
    pub errors: Vec<String>,
}

impl SyncOutcome {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    pub fn record_write(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted => self.inserted += 1,
            WriteOutcome::Updated => self.updated += 1,
        }
    }

    pub fn record_failure(&mut self, detail: impl Into<String>) {
        self.failed += 1;
        self.errors.push(detail.into());
    }

    pub fn mark_fatal(&mut self, detail: impl Into<String>) {
        self.fatal = true;
        self.errors.push(detail.into());
    }

    /// Fold another connector's counters into this run-level total.
    pub fn absorb(&mut self, other: &SyncOutcome) {
        self.fetched += other.fetched;
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.fatal |= other.fatal;
        self.errors.extend(other.errors.iter().cloned());
    }

    pub fn status(&self) -> &'static str {
        if self.fatal {
            "error"
        } else {
            "ok"
        }
    }

    /// Short summary for the audit row; per-record noise is capped.
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let mut summary = self.errors.iter().take(3).cloned().collect::<Vec<_>>().join("; ");
        if self.errors.len() > 3 {
            summary.push_str(&format!(" (+{} more)", self.errors.len() - 3));
        }
        Some(summary)
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    #[allow(dead_code)]
    fn source_name(&self) -> &str;
    async fn sync(&self) -> SyncOutcome;
}
