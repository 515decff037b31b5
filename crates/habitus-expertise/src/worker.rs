//! Background worker for scheduled decay sweeps

use crate::{DecaySweeper, ExpertiseConfig, ExpertiseError, SweepMetrics};
use chrono::Utc;
use habitus_domain::ProgressionStore;
use std::fmt::Display;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

/// Background worker that runs the decay sweep on a schedule
///
/// # Examples
///
/// ```no_run
/// use habitus_domain::ProgressionStore;
/// use habitus_expertise::{DecayWorker, ExpertiseConfig, ExpertiseError};
///
/// async fn serve<S>(store: S) -> Result<(), ExpertiseError>
/// where
///     S: ProgressionStore,
///     S::Error: std::fmt::Display,
/// {
///     let mut worker = DecayWorker::new(ExpertiseConfig::default());
///
///     // Run until Ctrl+C
///     worker.run(store).await
/// }
/// ```
pub struct DecayWorker {
    sweeper: DecaySweeper,
    interval: Duration,
}

impl DecayWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: ExpertiseConfig) -> Self {
        let interval = config.sweep_interval();
        Self {
            sweeper: DecaySweeper::new(config),
            interval,
        }
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Self {
        Self::new(ExpertiseConfig::default())
    }

    /// Wrap an already configured sweeper
    pub fn with_sweeper(sweeper: DecaySweeper) -> Self {
        let interval = sweeper.config().sweep_interval();
        Self { sweeper, interval }
    }

    fn ticker(&self) -> Result<tokio::time::Interval, ExpertiseError> {
        if self.interval.is_zero() {
            return Err(ExpertiseError::Worker("sweep interval must be positive".to_string()));
        }
        Ok(interval(self.interval))
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed sweep is logged and retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interval is zero.
    pub async fn run<S>(&mut self, mut store: S) -> Result<(), ExpertiseError>
    where
        S: ProgressionStore,
        S::Error: Display,
    {
        let mut ticker = self.ticker()?;

        info!("Decay worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Starting decay sweep");

                    match self.sweeper.sweep(&mut store, Utc::now()) {
                        Ok(metrics) => {
                            info!(
                                "Sweep completed: {} domain(s) decayed, {} level(s) removed",
                                metrics.total_decayed(),
                                metrics.total_levels_removed()
                            );
                        }
                        Err(e) => {
                            error!("Sweep failed: {}", e);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping decay worker");
                    break;
                }
            }
        }

        info!("Decay worker stopped. Final metrics:\n{}", self.sweeper.metrics().summary());

        Ok(())
    }

    /// Run for a specific number of cycles
    ///
    /// Unlike [`run`](Self::run), a failed sweep stops the worker.
    pub async fn run_cycles<S>(&mut self, mut store: S, cycles: usize) -> Result<S, ExpertiseError>
    where
        S: ProgressionStore,
        S::Error: Display,
    {
        let mut ticker = self.ticker()?;

        info!(
            "Decay worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;

            debug!("Starting decay sweep {}/{}", cycle + 1, cycles);

            match self.sweeper.sweep(&mut store, Utc::now()) {
                Ok(metrics) => {
                    info!(
                        "Sweep {}/{} completed: {} domain(s) decayed",
                        cycle + 1,
                        cycles,
                        metrics.total_decayed()
                    );
                }
                Err(e) => {
                    error!("Sweep {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        info!(
            "Decay worker finished {} cycles. Final metrics:\n{}",
            cycles,
            self.sweeper.metrics().summary()
        );

        Ok(store)
    }

    /// Get a reference to the sweeper's current metrics
    pub fn metrics(&self) -> &SweepMetrics {
        self.sweeper.metrics()
    }

    /// Reset the sweeper's metrics counters
    pub fn reset_metrics(&mut self) {
        self.sweeper.reset_metrics();
    }
}
