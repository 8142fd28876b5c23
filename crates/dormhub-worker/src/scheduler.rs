//! Cron scheduler for periodic reconciliation sweeps.
//!
//! The change feed covers every inventory mutation made through this
//! process; the periodic sweep picks up anything it missed.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, info};

use dormhub_core::error::AppError;

use crate::queue::{SweepQueue, SweepReason};

/// Cron-based scheduler that feeds the sweep queue.
pub struct CronScheduler {
    scheduler: JobScheduler,
    queue: SweepQueue,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a scheduler that enqueues into `queue`.
    pub async fn new(queue: SweepQueue) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, queue })
    }

    /// Request a sweep on every tick of the six-field cron `schedule`.
    pub async fn register_periodic_sweep(&self, schedule: &str) -> Result<(), AppError> {
        let queue = self.queue.clone();
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let queue = queue.clone();
            Box::pin(async move {
                debug!("Periodic sweep tick");
                queue.request(SweepReason::Schedule);
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid sweep schedule '{schedule}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        info!(schedule, "Registered periodic sweep");
        Ok(())
    }

    /// Start firing registered jobs.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}
