//! Single-slot job runner.
//!
//! The runner accepts validated jobs, keeps at most one in flight and drives
//! each job's progress subscription under the tier's processing timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fis_core::limits::get_limits;
//! use fis_core::models::{BatchJobRequest, Tier};
//! use fis_core::progress::SimulatedProgress;
//! use fis_core::runner::JobRunner;
//! use fis_core::validation::validate;
//!
//! # async fn demo() -> Result<(), fis_core::runner::RunnerError> {
//! let limits = get_limits(Tier::Free);
//! let job = validate(&BatchJobRequest::new(3, 24, Tier::Free), &limits).unwrap();
//! let runner = JobRunner::new(Arc::new(SimulatedProgress::default()));
//! let running = runner.start(job, &limits)?;
//! let result = running.run(|p| println!("{:.0}%", p.percent_complete)).await;
//! println!("{:?}", result);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use crate::limits::TierLimits;
use crate::logging::JobLogger;
use crate::models::{AcceptedJob, JobProgress};
use crate::progress::{CancelHandle, ProgressSource, ProgressSubscription};

/// Errors from starting a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// Another job already holds the slot.
    #[error("job {job_id} is still running")]
    Busy { job_id: String },
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobResult {
    /// The source reported 100%.
    Completed { artifact_url: Option<String> },
    /// The subscription was cancelled before completion.
    Cancelled,
    /// The tier's processing timeout elapsed first.
    TimedOut,
    /// The source stopped without a terminal update.
    SourceClosed,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Completed { .. })
    }

    /// Short reason suitable for a failure notice.
    pub fn reason(&self) -> &'static str {
        match self {
            JobResult::Completed { .. } => "Completed",
            JobResult::Cancelled => "Processing was cancelled",
            JobResult::TimedOut => "Processing timed out",
            JobResult::SourceClosed => "Progress updates stopped before completion",
        }
    }
}

/// Executor that keeps at most one job in flight.
pub struct JobRunner {
    source: Arc<dyn ProgressSource>,
    slot: Arc<Mutex<Option<String>>>,
}

impl JobRunner {
    pub fn new(source: Arc<dyn ProgressSource>) -> Self {
        Self {
            source,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Claim the slot and subscribe to the job's progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, job: AcceptedJob, limits: &TierLimits) -> Result<RunningJob, RunnerError> {
        let mut slot = self.slot.lock();
        if let Some(active) = slot.as_ref() {
            tracing::warn!(active = %active, refused = %job.id(), "Runner busy, job refused");
            return Err(RunnerError::Busy {
                job_id: active.clone(),
            });
        }
        *slot = Some(job.id().to_string());
        drop(slot);

        tracing::info!(
            job = %job.id(),
            kind = %job.kind(),
            tier = %job.tier(),
            timeout_ms = limits.processing_timeout_ms,
            "Job started"
        );

        let subscription = self.source.subscribe(&job);
        Ok(RunningJob {
            job,
            subscription,
            timeout: limits.processing_timeout(),
            logger: None,
            _slot: SlotGuard {
                slot: Arc::clone(&self.slot),
            },
        })
    }

    pub fn is_busy(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn active_job_id(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

/// Releases the runner slot when the running job goes away.
struct SlotGuard {
    slot: Arc<Mutex<Option<String>>>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

/// A job that holds the runner slot.
pub struct RunningJob {
    job: AcceptedJob,
    subscription: ProgressSubscription,
    timeout: Duration,
    logger: Option<JobLogger>,
    _slot: SlotGuard,
}

impl RunningJob {
    pub fn job(&self) -> &AcceptedJob {
        &self.job
    }

    pub fn job_id(&self) -> &str {
        self.job.id()
    }

    /// Attach a per-job logger that records phases and progress.
    pub fn with_logger(mut self, logger: JobLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Handle for cancelling this job from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.subscription.cancel_handle()
    }

    /// Drive the job to its end, calling `on_progress` for every update.
    ///
    /// The slot is released when this returns.
    pub async fn run<F>(mut self, mut on_progress: F) -> JobResult
    where
        F: FnMut(&JobProgress),
    {
        if let Some(logger) = &self.logger {
            logger.phase(&format!("{} job {}", self.job.kind(), self.job.id()));
            logger.info(&format!(
                "{} image(s), {} frame(s) each, {} fps, {:.1}s sequence",
                self.job.image_count(),
                self.job.frames_per_image(),
                self.job.frame_rate(),
                self.job.sequence_seconds()
            ));
        }

        let subscription = &mut self.subscription;
        let logger = self.logger.as_ref();
        let drive = async {
            while let Some(progress) = subscription.recv().await {
                if let Some(logger) = logger {
                    logger.progress(progress.percent_complete);
                }
                on_progress(&progress);
                if progress.is_complete {
                    return JobResult::Completed {
                        artifact_url: progress.artifact_url,
                    };
                }
            }
            if subscription.is_cancelled() {
                JobResult::Cancelled
            } else {
                JobResult::SourceClosed
            }
        };

        let result = match tokio::time::timeout(self.timeout, drive).await {
            Ok(result) => result,
            Err(_) => {
                self.subscription.cancel();
                JobResult::TimedOut
            }
        };

        self.report(&result);
        result
    }

    fn report(&self, result: &JobResult) {
        match result {
            JobResult::Completed { artifact_url } => {
                tracing::info!(job = %self.job.id(), artifact = ?artifact_url, "Job completed");
            }
            JobResult::Cancelled => {
                tracing::info!(job = %self.job.id(), "Job cancelled");
            }
            JobResult::TimedOut | JobResult::SourceClosed => {
                tracing::warn!(job = %self.job.id(), reason = result.reason(), "Job failed");
            }
        }

        let Some(logger) = &self.logger else {
            return;
        };
        match result {
            JobResult::Completed { artifact_url } => {
                logger.success(&format!(
                    "Completed: {}",
                    artifact_url.as_deref().unwrap_or("no artifact")
                ));
            }
            JobResult::Cancelled => logger.warn(result.reason()),
            JobResult::TimedOut | JobResult::SourceClosed => {
                logger.error(result.reason());
                logger.show_tail("progress");
            }
        }
        logger.flush();
    }
}

impl std::fmt::Debug for RunningJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningJob")
            .field("job", &self.job)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationSettings;
    use crate::limits::get_limits;
    use crate::logging::LogConfig;
    use crate::models::{BatchJobRequest, Tier};
    use crate::progress::{progress_channel, SimulatedProgress};
    use crate::validation::validate;
    use tempfile::tempdir;

    fn job_for(tier: Tier, images: u32, frames: u32) -> AcceptedJob {
        validate(&BatchJobRequest::new(images, frames, tier), &get_limits(tier)).unwrap()
    }

    fn job(images: u32, frames: u32) -> AcceptedJob {
        job_for(Tier::Free, images, frames)
    }

    fn fast_runner() -> JobRunner {
        JobRunner::new(Arc::new(SimulatedProgress::new(SimulationSettings {
            tick_interval_ms: 10,
            frames_per_tick: 10.0,
            finish_delay_ms: 20,
            ..SimulationSettings::default()
        })))
    }

    /// Source whose producer stops after one update without completing.
    struct Stalling;

    impl ProgressSource for Stalling {
        fn subscribe(&self, job: &AcceptedJob) -> ProgressSubscription {
            let (mut sender, subscription) = progress_channel(job.id());
            tokio::spawn(async move {
                let _ = sender.report(10.0).await;
            });
            subscription
        }
    }

    /// Source that reports once and then never finishes.
    struct Hanging;

    impl ProgressSource for Hanging {
        fn subscribe(&self, job: &AcceptedJob) -> ProgressSubscription {
            let (mut sender, subscription) = progress_channel(job.id());
            tokio::spawn(async move {
                let _ = sender.report(10.0).await;
                sender.cancelled().await;
            });
            subscription
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_job_to_completion() {
        let runner = fast_runner();
        let running = runner.start(job(4, 12), &get_limits(Tier::Free)).unwrap();
        assert!(runner.is_busy());

        let mut seen = Vec::new();
        let result = running.run(|p| seen.push(p.percent_complete)).await;

        assert!(result.is_success());
        assert_eq!(seen.last().copied(), Some(100.0));
        assert!(!runner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn largest_jobs_complete_within_tier_timeout() {
        let runner = JobRunner::new(Arc::new(SimulatedProgress::default()));
        for (tier, images, frames) in [(Tier::Free, 200, 24), (Tier::Premium, 1000, 60)] {
            let limits = get_limits(tier);
            let started = tokio::time::Instant::now();
            let result = runner
                .start(job_for(tier, images, frames), &limits)
                .unwrap()
                .run(|_| {})
                .await;

            assert!(result.is_success(), "{tier}: {result:?}");
            assert!(started.elapsed() < limits.processing_timeout());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_busy_is_refused() {
        let runner = fast_runner();
        let first = job(1, 10);
        let first_id = first.id().to_string();
        let running = runner.start(first, &get_limits(Tier::Free)).unwrap();

        let err = runner.start(job(2, 10), &get_limits(Tier::Free)).unwrap_err();
        assert_eq!(err, RunnerError::Busy { job_id: first_id.clone() });
        assert_eq!(runner.active_job_id(), Some(first_id));

        drop(running);
        assert!(!runner.is_busy());
        assert!(runner.start(job(2, 10), &get_limits(Tier::Free)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_handle_cancels_run() {
        let runner = fast_runner();
        let running = runner.start(job(200, 24), &get_limits(Tier::Free)).unwrap();
        let handle = running.cancel_handle();

        let result = running
            .run(|p| {
                if p.percent_complete > 1.0 {
                    handle.cancel();
                }
            })
            .await;

        assert_eq!(result, JobResult::Cancelled);
        assert!(!runner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_reports_closed() {
        let runner = JobRunner::new(Arc::new(Stalling));
        let result = runner
            .start(job(1, 1), &get_limits(Tier::Free))
            .unwrap()
            .run(|_| {})
            .await;
        assert_eq!(result, JobResult::SourceClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_reports_timed_out() {
        let runner = JobRunner::new(Arc::new(Hanging));
        let limits = TierLimits {
            processing_timeout_ms: 1_000,
            ..get_limits(Tier::Free)
        };
        let result = runner.start(job(1, 1), &limits).unwrap().run(|_| {}).await;

        assert_eq!(result, JobResult::TimedOut);
        assert!(!runner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn logger_records_run() {
        let dir = tempdir().unwrap();
        let runner = fast_runner();
        let job = job(2, 10);
        let logger = JobLogger::new(
            &job,
            Some(dir.path()),
            LogConfig {
                show_timestamps: false,
                ..LogConfig::default()
            },
            None,
        )
        .unwrap();
        let path = logger.log_path().unwrap().to_path_buf();

        let result = runner
            .start(job, &get_limits(Tier::Free))
            .unwrap()
            .with_logger(logger)
            .run(|_| {})
            .await;
        assert!(result.is_success());

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("2 image(s), 10 frame(s) each, 30 fps, 0.7s sequence"));
        assert!(content.contains("Progress: 100%"));
        assert!(content.contains("Completed:"));
    }
}
