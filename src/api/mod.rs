pub mod client;
pub mod error;
pub mod types;

pub use client::StudioClient;
pub use error::ApiError;
pub use types::{
    EngineStartResponse, EngineStatus, EngineStatusResponse, PendingCount, PendingItem,
    ProcessOutcome, RemoteBatchSummary,
};

use async_trait::async_trait;

/// The studio operations the orchestrator depends on. `StudioClient` is the
/// real implementation; tests substitute mocks.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch the items currently waiting in the pending queue.
    async fn list_pending(&self) -> Result<Vec<PendingItem>, ApiError>;

    /// Count the pending queue without fetching the items.
    async fn pending_count(&self) -> Result<usize, ApiError>;

    /// Ask the server whether the inference engine is reachable.
    async fn engine_status(&self) -> Result<EngineStatus, ApiError>;

    /// Ask the server to start the inference engine.
    async fn engine_start(&self) -> Result<EngineStartResponse, ApiError>;

    /// Run the full pipeline for one item and report how it went.
    async fn process_item(&self, id: &str) -> Result<ProcessOutcome, ApiError>;

    /// Let the server walk the whole queue itself; only totals come back.
    async fn run_batch_remote(&self) -> Result<RemoteBatchSummary, ApiError>;
}
