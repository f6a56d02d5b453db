/// Repeating materializer schedule
///
/// Runs [`Materializer::tick`] on a fixed interval with the date taken from
/// an injected [`Clock`], until the shutdown token is cancelled.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tally_shared::store::MemoryStore;
/// use tally_worker::clock::SystemClock;
/// use tally_worker::scheduler::Scheduler;
///
/// # async fn example() -> anyhow::Result<()> {
/// let scheduler = Scheduler::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock));
///
/// let shutdown = scheduler.shutdown_token();
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     shutdown.cancel();
/// });
///
/// scheduler.run().await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tally_shared::store::{Store, StoreError};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::materializer::{Materializer, TickReport};

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between ticks
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_interval_secs: 60,
        }
    }
}

/// Drives the materializer on a timer
pub struct Scheduler<S: Store + ?Sized> {
    materializer: Materializer<S>,

    clock: Arc<dyn Clock>,

    config: SchedulerConfig,

    shutdown_token: CancellationToken,
}

impl<S: Store + ?Sized> Scheduler<S> {
    /// Creates a scheduler with the default one-minute interval
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, SchedulerConfig::default())
    }

    pub fn with_config(store: Arc<S>, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        Scheduler {
            materializer: Materializer::new(store),
            clock,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets shutdown token
    ///
    /// Cancelling it stops [`Scheduler::run`] after the current tick.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs a single tick for the clock's current day
    pub async fn run_once(&self) -> Result<TickReport, StoreError> {
        self.materializer.tick(self.clock.today()).await
    }

    /// Ticks immediately, then every interval, until shutdown
    ///
    /// A tick that cannot list due obligations is logged and retried on the
    /// next interval. A tick is never interrupted halfway.
    pub async fn run(&self) -> anyhow::Result<()> {
        let period = Duration::from_secs(self.config.tick_interval_secs.max(1));
        tracing::info!(tick_interval_secs = period.as_secs(), "Scheduler starting");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Shutdown requested, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Tick failed, retrying next interval");
                    }
                }
            }
        }

        tracing::info!("Scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_interval_secs, 60);
    }
}
