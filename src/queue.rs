use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ContentApi, PendingItem};
use crate::error::CopydeskError;
use crate::grading::{Disposition, Grade};

/// Lifecycle of one work item inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting its turn.
    Pending,
    /// The process call for this item is in flight.
    Processing,
    /// Pipeline completed (published or held).
    Success,
    /// Pipeline did not complete for this item.
    Failed,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Success => "success",
            ItemStatus::Failed => "failed",
        };
        write!(f, "{word}")
    }
}

/// One article as the orchestrator tracks it through a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub region: Option<String>,
    pub status: ItemStatus,
    /// Grade attached once the item has been processed.
    pub grade: Option<Grade>,
    /// Failure detail attached when processing did not complete.
    pub error: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    pub fn from_pending(pending: PendingItem) -> Self {
        Self {
            id: pending.id,
            title: pending.title,
            region: pending.region,
            status: ItemStatus::Pending,
            grade: None,
            error: None,
            processed_at: None,
        }
    }

    /// Mark the item as the one currently being processed.
    pub fn begin(&mut self) {
        self.status = ItemStatus::Processing;
    }

    /// Record the final result for this item.
    pub fn resolve(&mut self, disposition: Disposition, grade: Grade, error: Option<String>) {
        self.status = match disposition {
            Disposition::Published | Disposition::Held => ItemStatus::Success,
            Disposition::Failed => ItemStatus::Failed,
        };
        self.grade = Some(grade);
        self.error = error;
        self.processed_at = Some(Utc::now());
    }
}

/// In-memory snapshot of the pending queue.
///
/// A batch run takes one snapshot up front and walks it in order; items
/// added server-side mid-run are picked up by the next reload, never by
/// the run in flight.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Vec<WorkItem>,
    loaded_at: Option<DateTime<Utc>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pending(pending: Vec<PendingItem>) -> Self {
        Self {
            items: pending.into_iter().map(WorkItem::from_pending).collect(),
            loaded_at: Some(Utc::now()),
        }
    }

    /// Replace the snapshot with the server's current pending list.
    pub async fn reload(&mut self, api: &impl ContentApi) -> Result<usize, CopydeskError> {
        let pending = api.list_pending().await.map_err(CopydeskError::QueueRead)?;
        *self = Self::from_pending(pending);
        Ok(self.items.len())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded_at = None;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [WorkItem] {
        &mut self.items
    }

    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: &str, title: &str) -> PendingItem {
        PendingItem {
            id: id.into(),
            title: title.into(),
            region: None,
        }
    }

    #[test]
    fn new_item_starts_pending_with_no_result_fields() {
        let item = WorkItem::from_pending(pending("art-1", "Morning briefing"));
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.grade.is_none());
        assert!(item.error.is_none());
        assert!(item.processed_at.is_none());
    }

    #[test]
    fn resolve_published_marks_success() {
        let mut item = WorkItem::from_pending(pending("art-1", "Morning briefing"));
        item.begin();
        assert_eq!(item.status, ItemStatus::Processing);

        item.resolve(Disposition::Published, Grade::A, None);
        assert_eq!(item.status, ItemStatus::Success);
        assert_eq!(item.grade, Some(Grade::A));
        assert!(item.processed_at.is_some());
    }

    #[test]
    fn resolve_held_also_marks_success() {
        let mut item = WorkItem::from_pending(pending("art-2", "Council vote recap"));
        item.resolve(Disposition::Held, Grade::C, None);
        assert_eq!(item.status, ItemStatus::Success);
    }

    #[test]
    fn resolve_failed_keeps_the_error() {
        let mut item = WorkItem::from_pending(pending("art-3", "Storm damage roundup"));
        item.resolve(Disposition::Failed, Grade::D, Some("model timeout".into()));
        assert_eq!(item.status, ItemStatus::Failed);
        assert_eq!(item.grade, Some(Grade::D));
        assert_eq!(item.error.as_deref(), Some("model timeout"));
    }

    #[test]
    fn snapshot_preserves_server_order() {
        let queue = WorkQueue::from_pending(vec![
            pending("art-1", "First"),
            pending("art-2", "Second"),
            pending("art-3", "Third"),
        ]);
        let ids: Vec<&str> = queue.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["art-1", "art-2", "art-3"]);
        assert!(queue.loaded_at().is_some());
    }

    #[test]
    fn clear_empties_the_snapshot() {
        let mut queue = WorkQueue::from_pending(vec![pending("art-1", "First")]);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.loaded_at().is_none());
    }
}
