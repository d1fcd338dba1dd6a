//! Timer-driven automation around the batch runner.
//!
//! When automation is enabled the scheduler arms a ticker and runs one
//! batch pass per tick. Ticks never queue up: if a run is still in
//! flight when the next tick lands, that tick is skipped whole. The
//! schedule itself (enabled flag, interval, run timestamps) lives in an
//! [`AutomationConfig`] that is pushed through a [`StateStore`] on every
//! change, so an enabled schedule survives a restart.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::ContentApi;
use crate::error::CopydeskError;
use crate::gate::InferenceGate;
use crate::runner::{BatchReport, BatchRunner};
use crate::stats::SharedStats;
use crate::store::StateStore;

/// The intervals operators may pick from, in minutes.
pub const INTERVAL_MENU_MINUTES: [u32; 5] = [5, 10, 15, 30, 60];

/// Persistent schedule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    pub enabled: bool,
    pub interval_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: 30,
            last_run_at: None,
            next_run_at: None,
        }
    }
}

impl AutomationConfig {
    /// Intervals outside the fixed menu are rejected before anything
    /// else happens; the previous settings stay in force.
    pub fn validate_interval(minutes: u32) -> Result<(), CopydeskError> {
        if INTERVAL_MENU_MINUTES.contains(&minutes) {
            Ok(())
        } else {
            Err(CopydeskError::InvalidInterval(minutes))
        }
    }
}

/// What a single tick ended up doing. Details are logged where they
/// happen; callers only branch on the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Ran,
    /// A run was still in flight; the tick did nothing at all.
    SkippedBusy,
    /// The queue was empty; counted as a (trivial) run.
    SkippedEmpty,
    Failed,
}

/// The pieces a tick needs, shared between the scheduler handle and the
/// spawned timer task.
struct TickContext<A, S> {
    api: Arc<A>,
    runner: Arc<BatchRunner<A>>,
    guard: Mutex<()>,
    config: RwLock<AutomationConfig>,
    store: S,
}

impl<A, S> TickContext<A, S>
where
    A: ContentApi + 'static,
    S: StateStore + 'static,
{
    /// One scheduled pass: skip if a run is in flight, skip if the queue
    /// is empty, otherwise run the batch. The guard is held from the
    /// queue probe through the end of the run.
    async fn run_tick(&self) -> TickOutcome {
        let _permit = match self.guard.try_lock() {
            Ok(permit) => permit,
            Err(_) => {
                info!("previous run still in flight, skipping this tick");
                return TickOutcome::SkippedBusy;
            }
        };

        match self.api.pending_count().await {
            Ok(0) => {
                info!("pending queue is empty, nothing to process");
                self.mark_ran().await;
                return TickOutcome::SkippedEmpty;
            }
            Ok(count) => debug!(count, "queue has pending items"),
            Err(e) => {
                // Automation stays enabled; the next tick gets a fresh
                // attempt.
                error!(error = %e, "could not read the pending queue");
                return TickOutcome::Failed;
            }
        }

        match self.runner.execute().await {
            Ok(_) => {
                self.mark_ran().await;
                TickOutcome::Ran
            }
            Err(e) => {
                error!(error = %e, "scheduled batch run failed");
                TickOutcome::Failed
            }
        }
    }

    /// Stamp the run clock and push the config through the store.
    async fn mark_ran(&self) {
        let snapshot = {
            let mut cfg = self.config.write().await;
            cfg.last_run_at = Some(Utc::now());
            cfg.next_run_at = if cfg.enabled {
                cfg.last_run_at
                    .map(|t| t + chrono::Duration::minutes(i64::from(cfg.interval_minutes)))
            } else {
                None
            };
            cfg.clone()
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "failed to persist automation state");
        }
    }

    async fn tick_loop(
        self: Arc<Self>,
        cancel: CancellationToken,
        first_in: Duration,
        period: Duration,
    ) {
        let mut ticker = interval_at(Instant::now() + first_in, period);
        // A tick that lands during a long run is dropped, not queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(?first_in, ?period, "automation timer armed");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("automation timer stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_tick().await;
                }
            }
        }
    }
}

/// Owned handle on the spawned timer task.
struct TimerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Drives scheduled batch runs and owns the automation settings.
pub struct AutomationScheduler<A, S> {
    ctx: Arc<TickContext<A, S>>,
    gate: Arc<InferenceGate<A>>,
    timer: Option<TimerHandle>,
}

impl<A, S> AutomationScheduler<A, S>
where
    A: ContentApi + 'static,
    S: StateStore + 'static,
{
    /// Build a scheduler with its settings loaded from the store. No
    /// timer is armed yet; call [`enable`](Self::enable) or
    /// [`resume`](Self::resume) for that.
    pub fn new(
        api: Arc<A>,
        runner: Arc<BatchRunner<A>>,
        gate: Arc<InferenceGate<A>>,
        store: S,
    ) -> Result<Self, CopydeskError> {
        let initial = store.load()?;
        Ok(Self {
            ctx: Arc::new(TickContext {
                api,
                runner,
                guard: Mutex::new(()),
                config: RwLock::new(initial),
                store,
            }),
            gate,
            timer: None,
        })
    }

    /// Current schedule settings.
    pub async fn config(&self) -> AutomationConfig {
        self.ctx.config.read().await.clone()
    }

    /// Live counters of the current (or last) run.
    pub fn stats(&self) -> SharedStats {
        self.ctx.runner.stats()
    }

    /// Whether a timer task is currently armed.
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Turn automation on at the given interval. The engine must be up
    /// (it is started if necessary), one pass runs immediately, and
    /// after that a pass runs every `interval_minutes`.
    pub async fn enable(&mut self, interval_minutes: u32) -> Result<(), CopydeskError> {
        AutomationConfig::validate_interval(interval_minutes)?;
        if !self.gate.ensure_running().await {
            return Err(CopydeskError::EngineUnavailable);
        }
        self.cancel_timer().await;

        // The immediate pass observes the same guard and empty-queue
        // rules as a tick; its failure only logs.
        let outcome = self.ctx.run_tick().await;
        debug!(?outcome, "initial automation pass finished");

        let snapshot = {
            let mut cfg = self.ctx.config.write().await;
            cfg.enabled = true;
            cfg.interval_minutes = interval_minutes;
            cfg.last_run_at = Some(Utc::now());
            cfg.next_run_at = cfg
                .last_run_at
                .map(|t| t + chrono::Duration::minutes(i64::from(interval_minutes)));
            cfg.clone()
        };
        self.ctx.store.save(&snapshot)?;

        let period = Duration::from_secs(u64::from(interval_minutes) * 60);
        self.arm_timer(period, period);
        info!(interval_minutes, "automation enabled");
        Ok(())
    }

    /// Turn automation off. A run already in flight finishes; no new
    /// tick fires afterwards. Calling this while already disabled does
    /// nothing.
    pub async fn disable(&mut self) -> Result<(), CopydeskError> {
        let mut cfg = self.ctx.config.write().await;
        if !cfg.enabled && self.timer.is_none() {
            debug!("automation already disabled");
            return Ok(());
        }
        cfg.enabled = false;
        cfg.next_run_at = None;
        let snapshot = cfg.clone();
        drop(cfg);

        self.ctx.store.save(&snapshot)?;
        self.cancel_timer().await;
        info!("automation disabled");
        Ok(())
    }

    /// Change the interval. Takes effect immediately: when automation is
    /// on, the pending tick is re-aimed at `last_run_at + interval`
    /// without flipping the enabled flag.
    pub async fn set_interval(&mut self, interval_minutes: u32) -> Result<(), CopydeskError> {
        AutomationConfig::validate_interval(interval_minutes)?;
        let snapshot = {
            let mut cfg = self.ctx.config.write().await;
            cfg.interval_minutes = interval_minutes;
            if cfg.enabled {
                cfg.next_run_at = cfg
                    .last_run_at
                    .map(|t| t + chrono::Duration::minutes(i64::from(interval_minutes)));
            }
            cfg.clone()
        };
        self.ctx.store.save(&snapshot)?;

        if snapshot.enabled {
            self.cancel_timer().await;
            let period = Duration::from_secs(u64::from(interval_minutes) * 60);
            let first_in = snapshot
                .next_run_at
                .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
                .unwrap_or(period);
            self.arm_timer(first_in, period);
        }
        info!(interval_minutes, "automation interval updated");
        Ok(())
    }

    /// Re-arm the timer from settings loaded at construction. Returns
    /// false when the saved state has automation off.
    pub async fn resume(&mut self) -> Result<bool, CopydeskError> {
        let cfg = self.config().await;
        if !cfg.enabled {
            return Ok(false);
        }
        if !self.gate.ensure_running().await {
            return Err(CopydeskError::EngineUnavailable);
        }
        self.cancel_timer().await;

        let period = Duration::from_secs(u64::from(cfg.interval_minutes) * 60);
        // Honor the saved next-run time; if it already passed while we
        // were down, tick right away.
        let first_in = cfg
            .next_run_at
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(period);
        self.arm_timer(first_in, period);
        info!(
            interval_minutes = cfg.interval_minutes,
            "automation resumed from saved state"
        );
        Ok(true)
    }

    /// Run a batch pass right now, outside the schedule. Fails fast when
    /// another run (scheduled or manual) is in flight. Does not touch
    /// the automation clock.
    pub async fn run_now(&self) -> Result<BatchReport, CopydeskError> {
        let _permit = self
            .ctx
            .guard
            .try_lock()
            .map_err(|_| CopydeskError::RunInProgress)?;
        self.ctx.runner.execute().await
    }

    fn arm_timer(&mut self, first_in: Duration, period: Duration) {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Arc::clone(&self.ctx).tick_loop(cancel.clone(), first_in, period));
        self.timer = Some(TimerHandle { cancel, task });
    }

    async fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            // Wait the task out; if a run is in flight it completes
            // before the task notices the cancellation.
            if let Err(e) = timer.task.await {
                warn!(error = %e, "automation timer task ended abnormally");
            }
        }
    }
}
