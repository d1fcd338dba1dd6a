use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{ContentApi, ProcessOutcome};
use crate::error::CopydeskError;
use crate::gate::InferenceGate;
use crate::grading::{Disposition, GradingPolicy};
use crate::queue::{WorkItem, WorkQueue};
use crate::stats::{RunStats, SharedStats, shared};

/// Where the per-item work happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStrategy {
    /// This process walks the queue and calls the item endpoint itself.
    #[default]
    Local,
    /// The server walks the queue; we only receive the totals.
    Remote,
}

/// Everything a finished run reports back.
#[derive(Debug)]
pub struct BatchReport {
    pub stats: RunStats,
    pub items: Vec<WorkItem>,
}

/// Drives sequential batch passes over the pending queue.
pub struct BatchRunner<A> {
    api: Arc<A>,
    gate: Arc<InferenceGate<A>>,
    strategy: BatchStrategy,
    /// Pause between consecutive items.
    item_delay: Duration,
    stats: SharedStats,
}

impl<A: ContentApi> BatchRunner<A> {
    pub fn new(
        api: Arc<A>,
        gate: Arc<InferenceGate<A>>,
        strategy: BatchStrategy,
        item_delay: Duration,
    ) -> Self {
        Self {
            api,
            gate,
            strategy,
            item_delay,
            stats: shared(RunStats::start(0)),
        }
    }

    /// Handle for observers; the record behind it is replaced when a new
    /// run starts.
    pub fn stats(&self) -> SharedStats {
        Arc::clone(&self.stats)
    }

    /// Run one batch pass with the configured strategy.
    ///
    /// Aborts before touching any item when the engine cannot be brought
    /// up or the queue cannot be read. A failing item never aborts the
    /// pass; it is recorded and the pass moves on.
    pub async fn execute(&self) -> Result<BatchReport, CopydeskError> {
        if !self.gate.ensure_running().await {
            return Err(CopydeskError::EngineUnavailable);
        }
        match self.strategy {
            BatchStrategy::Local => self.run_local().await,
            BatchStrategy::Remote => self.run_remote().await,
        }
    }

    /// Snapshots the queue once and walks it in server order, pausing
    /// briefly between items to keep load off the inference engine.
    async fn run_local(&self) -> Result<BatchReport, CopydeskError> {
        let pending = self.api.list_pending().await.map_err(CopydeskError::QueueRead)?;
        let mut queue = WorkQueue::from_pending(pending);
        let total = queue.len();

        {
            *self.stats.lock().await = RunStats::start(total);
        }
        info!(total, "starting batch run");

        for (position, item) in queue.items_mut().iter_mut().enumerate() {
            item.begin();
            {
                let mut stats = self.stats.lock().await;
                stats.current_item = Some(item.title.clone());
            }
            debug!(id = %item.id, title = %item.title, "processing item");

            let outcome = match self.api.process_item(&item.id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The call itself failed, so no outcome ever reached
                    // us. Record the item as failed and keep going.
                    warn!(id = %item.id, error = %e, "process call failed");
                    ProcessOutcome::transport_failure(e.to_string())
                }
            };

            let disposition = GradingPolicy::classify(&outcome);
            item.resolve(disposition, outcome.grade, outcome.error);
            {
                self.stats.lock().await.record(disposition);
            }
            debug!(id = %item.id, %disposition, grade = %outcome.grade, "item done");

            if position + 1 < total {
                sleep(self.item_delay).await;
            }
        }

        let stats = {
            let mut stats = self.stats.lock().await;
            stats.finish();
            stats.clone()
        };
        info!(
            run_id = %stats.run_id,
            published = stats.published,
            held = stats.held,
            failed = stats.failed,
            "batch run finished"
        );
        Ok(BatchReport {
            stats,
            items: queue.into_items(),
        })
    }

    async fn run_remote(&self) -> Result<BatchReport, CopydeskError> {
        info!("delegating batch run to the server");
        let summary = self.api.run_batch_remote().await?;
        if !summary.success {
            return Err(CopydeskError::RemoteBatchFailed);
        }

        // The server only reports totals; synthesize a finished record
        // from them.
        let total = summary.published + summary.held;
        let mut stats = RunStats::start(total);
        for _ in 0..summary.published {
            stats.record(Disposition::Published);
        }
        for _ in 0..summary.held {
            stats.record(Disposition::Held);
        }
        stats.finish();
        {
            *self.stats.lock().await = stats.clone();
        }
        info!(
            run_id = %stats.run_id,
            published = stats.published,
            held = stats.held,
            "remote batch run finished"
        );
        Ok(BatchReport {
            stats,
            items: Vec::new(),
        })
    }
}
