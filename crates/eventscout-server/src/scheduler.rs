//! Periodic ingestion scheduler.
//!
//! Runs a pass immediately, then once per interval. A failed pass switches
//! to exponential backoff until a pass succeeds. Passes never overlap: the
//! loop awaits each one before scheduling the next.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between successful passes.
    pub interval: Duration,
    /// Delay after the first failure.
    pub initial_backoff: Duration,
    /// Upper bound on the backoff delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),   // 1 hour
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(1800), // 30 minutes
            backoff_multiplier: 2.0,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler config with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Builder: set backoff parameters.
    pub fn with_backoff(mut self, initial: Duration, max: Duration, multiplier: f64) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates backoff delay based on consecutive failures.
    pub fn backoff_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }

        let base = self.initial_backoff.as_secs_f64();
        let exponent = i32::try_from(consecutive_failures - 1).unwrap_or(i32::MAX);
        let delay = base * self.backoff_multiplier.powi(exponent);
        let max = self.max_backoff.as_secs_f64();

        Duration::from_secs_f64(delay.min(max))
    }

    /// Returns the delay before the next pass.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures > 0 {
            self.backoff_delay(consecutive_failures)
        } else {
            self.interval
        }
    }
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Stop the scheduler.
    Stop,
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Passes run so far.
    pub passes: u64,
    /// Number of consecutive failed passes.
    pub consecutive_failures: u32,
    /// Last successful pass.
    pub last_success: Option<DateTime<Utc>>,
    /// Last pass attempt.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl SchedulerState {
    /// Records a successful pass.
    pub fn record_success(&mut self) {
        self.passes += 1;
        self.consecutive_failures = 0;
        self.last_success = Some(Utc::now());
        self.last_attempt = self.last_success;
        self.last_error = None;
    }

    /// Records a failed pass.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.passes += 1;
        self.consecutive_failures += 1;
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Runs a pass function periodically.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Creates a new scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            config,
            state: Arc::new(RwLock::new(SchedulerState::default())),
            command_tx,
            command_rx,
        }
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Runs passes until [`SchedulerCommand::Stop`] arrives.
    ///
    /// `pass` returns an error message on failure. Once every handle is
    /// dropped the loop keeps running on its timer alone; the caller stops
    /// it by dropping the future.
    pub async fn run<F, Fut>(self, pass: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), String>>,
    {
        let Self {
            config,
            state,
            command_tx,
            mut command_rx,
        } = self;
        drop(command_tx);
        let mut commands_open = true;

        info!(interval_secs = config.interval.as_secs(), "scheduler started");
        run_pass(&state, &pass).await;

        loop {
            let failures = state.read().await.consecutive_failures;
            let delay = config.next_delay(failures);
            debug!(delay_secs = delay.as_secs(), failures, "next pass scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => run_pass(&state, &pass).await,
                cmd = command_rx.recv(), if commands_open => match cmd {
                    Some(SchedulerCommand::Stop) => {
                        info!("scheduler stopping");
                        break;
                    }
                    None => commands_open = false,
                },
            }
        }
    }
}

async fn run_pass<F, Fut>(state: &SharedSchedulerState, pass: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match pass().await {
        Ok(()) => {
            debug!("pass completed");
            state.write().await.record_success();
        }
        Err(e) => {
            warn!(error = %e, "pass failed");
            state.write().await.record_failure(e);
        }
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    /// Stops the scheduler.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<SchedulerCommand>> {
        self.command_tx.send(SchedulerCommand::Stop).await
    }

    /// Returns the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }
}
