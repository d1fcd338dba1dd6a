use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::grading::Disposition;

/// Live counters for one batch run.
///
/// `processed == published + held + failed` holds at every point, and
/// `processed <= total`. Each run starts from a fresh record; counters
/// are never carried over between runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub run_id: String,
    /// Snapshot size the run started with.
    pub total: usize,
    pub processed: usize,
    pub published: usize,
    pub held: usize,
    pub failed: usize,
    /// Title of the item currently in flight, for progress display.
    pub current_item: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunStats {
    pub fn start(total: usize) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            total,
            processed: 0,
            published: 0,
            held: 0,
            failed: 0,
            current_item: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Count one finished item into its bucket.
    pub fn record(&mut self, disposition: Disposition) {
        self.processed += 1;
        match disposition {
            Disposition::Published => self.published += 1,
            Disposition::Held => self.held += 1,
            Disposition::Failed => self.failed += 1,
        }
    }

    pub fn finish(&mut self) {
        self.current_item = None;
        self.finished_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Check the counter identity. Exists for tests and debug assertions;
    /// the counters are only ever updated through `record`.
    pub fn is_consistent(&self) -> bool {
        self.processed == self.published + self.held + self.failed && self.processed <= self.total
    }
}

/// Handle that the runner updates and observers (progress bar, status
/// view) read. The record behind it is replaced wholesale when a new
/// run starts.
pub type SharedStats = Arc<Mutex<RunStats>>;

pub fn shared(stats: RunStats) -> SharedStats {
    Arc::new(Mutex::new(stats))
}
