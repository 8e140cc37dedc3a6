//! Engine lifecycle: the tick loop, the sweep loop, and clean shutdown.
//!
//! [`SimulationEngine`] owns the two periodic tasks. `start` and `stop`
//! are idempotent: a second `start` while running is a logged no-op, as
//! is `stop` when already stopped. Shutdown is cooperative -- an
//! in-flight tick or sweep runs to completion before its task exits, so
//! a stopped engine never leaves a half-persisted tick behind.

use std::sync::Arc;
use std::time::Duration;

use stockyard_db::AssetStore;
use stockyard_model::RandomDrift;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{EngineConfig, RetentionConfig, SimulationConfig};
use crate::hub::{BroadcastHub, Subscription};
use crate::sweeper::run_sweep;
use crate::tick::run_tick;

/// Join handles and the shutdown signal for a running engine.
#[derive(Debug)]
struct RunningTasks {
    tick_task: JoinHandle<()>,
    sweep_task: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

/// The simulation engine: periodic valuation ticks plus retention sweeps,
/// fanned out through a [`BroadcastHub`].
#[derive(Debug)]
pub struct SimulationEngine<S> {
    store: Arc<S>,
    hub: BroadcastHub,
    config: EngineConfig,
    running: Mutex<Option<RunningTasks>>,
}

impl<S: AssetStore + 'static> SimulationEngine<S> {
    /// Create a stopped engine over the given store and configuration.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let hub = BroadcastHub::new(config.broadcast.capacity);
        Self {
            store,
            hub,
            config,
            running: Mutex::new(None),
        }
    }

    /// Register a subscriber for per-tick batches.
    ///
    /// Subscribers receive only batches published after this call.
    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    /// Whether the periodic loops are currently running.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Start the tick and sweep loops.
    ///
    /// Calling `start` on an already-running engine is a logged no-op;
    /// no second set of loops is spawned.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::warn!("Engine already running, ignoring start");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tick_task = tokio::spawn(tick_loop(
            Arc::clone(&self.store),
            self.hub.clone(),
            self.config.simulation.clone(),
            shutdown_rx.clone(),
        ));
        let sweep_task = tokio::spawn(sweep_loop(
            Arc::clone(&self.store),
            self.config.retention.clone(),
            shutdown_rx,
        ));

        tracing::info!(
            tick_interval_ms = self.config.simulation.tick_interval_ms,
            sweep_interval_ms = self.config.retention.sweep_interval_ms,
            "Engine started"
        );

        *running = Some(RunningTasks {
            tick_task,
            sweep_task,
            shutdown_tx,
        });
    }

    /// Stop both loops and wait for them to drain.
    ///
    /// An in-flight tick or sweep completes before its task exits.
    /// Calling `stop` on a stopped engine is a logged no-op.
    pub async fn stop(&self) {
        let Some(tasks) = self.running.lock().await.take() else {
            tracing::warn!("Engine not running, ignoring stop");
            return;
        };

        // Receivers may already be gone if both tasks panicked; the join
        // below surfaces that.
        let _ = tasks.shutdown_tx.send(true);

        if let Err(error) = tasks.tick_task.await {
            tracing::error!(%error, "Tick task ended abnormally");
        }
        if let Err(error) = tasks.sweep_task.await {
            tracing::error!(%error, "Sweep task ended abnormally");
        }

        tracing::info!("Engine stopped");
    }
}

/// The periodic valuation loop. Exits when the shutdown signal fires.
async fn tick_loop<S: AssetStore>(
    store: Arc<S>,
    hub: BroadcastHub,
    config: SimulationConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = Duration::from_millis(config.tick_interval_ms.max(1));
    let slow_threshold = Duration::from_millis(config.slow_tick_warn_ms);
    // A tick that overruns its slot delays the next one instead of
    // bursting to catch up.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // A fresh interval completes immediately; consume that so the first
    // real tick lands one full period after start.
    interval.tick().await;

    let mut drift = RandomDrift::seeded(config.drift_seed);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tick = tick.saturating_add(1);
                match run_tick(store.as_ref(), tick, &mut drift, config.max_concurrent_assets).await {
                    Ok(summary) => {
                        if summary.elapsed >= slow_threshold {
                            tracing::warn!(tick, elapsed = ?summary.elapsed, "Slow tick");
                        }
                        hub.publish(summary.batch);
                    }
                    Err(error) => {
                        // The store snapshot failed; no partial state was
                        // written and no batch goes out. Next tick retries.
                        tracing::error!(tick, %error, "Tick aborted");
                    }
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    tracing::debug!(ticks_completed = tick, "Tick loop exited");
}

/// The periodic retention loop. Exits when the shutdown signal fires.
async fn sweep_loop<S: AssetStore>(
    store: Arc<S>,
    config: RetentionConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = Duration::from_millis(config.sweep_interval_ms.max(1));
    let horizon = chrono::Duration::days(config.retention_days);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(error) = run_sweep(store.as_ref(), horizon).await {
                    // History stays intact; the next pass retries.
                    tracing::error!(%error, "Retention sweep failed");
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    tracing::debug!("Sweep loop exited");
}
