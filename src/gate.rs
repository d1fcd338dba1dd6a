//! Gatekeeper for the local inference engine.
//!
//! Every batch run goes through [`InferenceGate::ensure_running`] first:
//! if the engine is not known to be up, the gate asks the server to start
//! it and only lets the run proceed when that worked. Start failures are
//! reported through the return value, never as an error.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::{ContentApi, EngineStatus};

/// What the gate currently believes about the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Online,
    Offline,
    /// A status probe or start attempt is in flight.
    Checking,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            GateState::Online => "online",
            GateState::Offline => "offline",
            GateState::Checking => "checking",
        };
        write!(f, "{word}")
    }
}

pub struct InferenceGate<A> {
    api: Arc<A>,
    state: RwLock<GateState>,
}

impl<A: ContentApi> InferenceGate<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(GateState::Checking),
        }
    }

    pub async fn state(&self) -> GateState {
        *self.state.read().await
    }

    /// Probe the server for the engine's reachability and update the
    /// cached state. A transport failure counts as offline.
    pub async fn refresh(&self) -> GateState {
        *self.state.write().await = GateState::Checking;
        let next = match self.api.engine_status().await {
            Ok(EngineStatus::Online) => GateState::Online,
            Ok(EngineStatus::Offline) => GateState::Offline,
            Err(e) => {
                warn!(error = %e, "engine status probe failed");
                GateState::Offline
            }
        };
        *self.state.write().await = next;
        next
    }

    /// Make sure the engine is up, starting it if necessary. Returns
    /// whether processing may proceed.
    pub async fn ensure_running(&self) -> bool {
        if self.state().await == GateState::Online {
            return true;
        }

        *self.state.write().await = GateState::Checking;
        match self.api.engine_start().await {
            Ok(resp) if resp.engine_up() => {
                debug!(
                    already_running = resp.already_running,
                    "inference engine is up"
                );
                *self.state.write().await = GateState::Online;
                true
            }
            Ok(resp) => {
                warn!(
                    error = resp.error.as_deref().unwrap_or("no detail"),
                    "inference engine failed to start"
                );
                *self.state.write().await = GateState::Offline;
                false
            }
            Err(e) => {
                warn!(error = %e, "engine start request failed");
                *self.state.write().await = GateState::Offline;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ApiError, EngineStartResponse, PendingItem, ProcessOutcome, RemoteBatchSummary,
    };
    use async_trait::async_trait;

    struct MockApi {
        status: Result<EngineStatus, ()>,
        start: Result<EngineStartResponse, ()>,
    }

    impl MockApi {
        fn starts_ok() -> Self {
            Self {
                status: Ok(EngineStatus::Offline),
                start: Ok(EngineStartResponse {
                    success: true,
                    already_running: false,
                    error: None,
                }),
            }
        }

        fn start_fails() -> Self {
            Self {
                status: Ok(EngineStatus::Offline),
                start: Ok(EngineStartResponse {
                    success: false,
                    already_running: false,
                    error: Some("spawn failed".into()),
                }),
            }
        }

        fn unreachable_server() -> Self {
            Self {
                status: Err(()),
                start: Err(()),
            }
        }

        fn transport_error() -> ApiError {
            ApiError::Status {
                status: 502,
                message: "bad gateway".into(),
            }
        }
    }

    #[async_trait]
    impl ContentApi for MockApi {
        async fn list_pending(&self) -> Result<Vec<PendingItem>, ApiError> {
            Ok(vec![])
        }

        async fn pending_count(&self) -> Result<usize, ApiError> {
            Ok(0)
        }

        async fn engine_status(&self) -> Result<EngineStatus, ApiError> {
            self.status.clone().map_err(|_| Self::transport_error())
        }

        async fn engine_start(&self) -> Result<EngineStartResponse, ApiError> {
            self.start.clone().map_err(|_| Self::transport_error())
        }

        async fn process_item(&self, _id: &str) -> Result<ProcessOutcome, ApiError> {
            unimplemented!("not used by gate tests")
        }

        async fn run_batch_remote(&self) -> Result<RemoteBatchSummary, ApiError> {
            unimplemented!("not used by gate tests")
        }
    }

    #[tokio::test]
    async fn gate_starts_in_checking_state() {
        let gate = InferenceGate::new(Arc::new(MockApi::starts_ok()));
        assert_eq!(gate.state().await, GateState::Checking);
    }

    #[tokio::test]
    async fn ensure_running_starts_the_engine() {
        let gate = InferenceGate::new(Arc::new(MockApi::starts_ok()));
        assert!(gate.ensure_running().await);
        assert_eq!(gate.state().await, GateState::Online);
    }

    #[tokio::test]
    async fn ensure_running_reports_start_failure() {
        let gate = InferenceGate::new(Arc::new(MockApi::start_fails()));
        assert!(!gate.ensure_running().await);
        assert_eq!(gate.state().await, GateState::Offline);
    }

    #[tokio::test]
    async fn ensure_running_treats_transport_error_as_offline() {
        let gate = InferenceGate::new(Arc::new(MockApi::unreachable_server()));
        assert!(!gate.ensure_running().await);
        assert_eq!(gate.state().await, GateState::Offline);
    }

    #[tokio::test]
    async fn already_running_counts_as_up() {
        let gate = InferenceGate::new(Arc::new(MockApi {
            status: Ok(EngineStatus::Online),
            start: Ok(EngineStartResponse {
                success: false,
                already_running: true,
                error: None,
            }),
        }));
        assert!(gate.ensure_running().await);
        assert_eq!(gate.state().await, GateState::Online);
    }

    #[tokio::test]
    async fn refresh_maps_probe_failure_to_offline() {
        let gate = InferenceGate::new(Arc::new(MockApi::unreachable_server()));
        assert_eq!(gate.refresh().await, GateState::Offline);
    }

    #[tokio::test]
    async fn refresh_reflects_server_answer() {
        let gate = InferenceGate::new(Arc::new(MockApi {
            status: Ok(EngineStatus::Online),
            start: Ok(EngineStartResponse {
                success: true,
                already_running: false,
                error: None,
            }),
        }));
        assert_eq!(gate.refresh().await, GateState::Online);
        assert_eq!(gate.state().await, GateState::Online);
    }
}
