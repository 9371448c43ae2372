//! Timer-driven stand-in for a real job-status feed.
//!
//! Advances deterministically on a fixed tick. Interpolation jobs advance by
//! a number of frames per tick, raised for large jobs so that no job needs
//! more than `max_ticks` ticks. Sketch jobs advance by a fixed percentage.
//! Both hold below a ceiling until the work is done, then emit the terminal
//! update carrying the placeholder artifact.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::subscription::{progress_channel, ProgressSender, ProgressSubscription};
use super::ProgressSource;
use crate::config::SimulationSettings;
use crate::models::{AcceptedJob, JobKind};

/// Simulated progress source.
#[derive(Debug, Clone)]
pub struct SimulatedProgress {
    settings: SimulationSettings,
}

impl SimulatedProgress {
    pub fn new(mut settings: SimulationSettings) -> Self {
        settings.sanitize();
        Self { settings }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}

impl SimulatedProgress {
    fn spawn(&self, job: &AcceptedJob) -> (ProgressSubscription, JoinHandle<()>) {
        let (sender, subscription) = progress_channel(job.id());
        let plan = SimulationPlan::for_job(job, &self.settings);
        let tick = Duration::from_millis(self.settings.tick_interval_ms);
        let finish_delay = Duration::from_millis(self.settings.finish_delay_ms);
        let artifact = self.settings.placeholder_url.clone();

        tracing::debug!(
            job = %job.id(),
            kind = %job.kind(),
            tick_ms = self.settings.tick_interval_ms,
            "Starting simulated progress"
        );
        let producer = tokio::spawn(run(plan, sender, tick, finish_delay, artifact));
        (subscription, producer)
    }
}

impl ProgressSource for SimulatedProgress {
    fn subscribe(&self, job: &AcceptedJob) -> ProgressSubscription {
        self.spawn(job).0
    }
}

async fn run(
    mut plan: SimulationPlan,
    mut sender: ProgressSender,
    tick: Duration,
    finish_delay: Duration,
    artifact: String,
) {
    let mut interval = time::interval_at(time::Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = sender.cancelled() => {
                tracing::debug!(job = %sender.job_id(), "Simulation cancelled");
                return;
            }
            _ = interval.tick() => {}
        }

        match plan.advance() {
            Some(percent) => {
                if sender.report(percent).await.is_err() {
                    return;
                }
            }
            None => break,
        }
    }

    if !finish_delay.is_zero() {
        tokio::select! {
            _ = sender.cancelled() => return,
            _ = time::sleep(finish_delay) => {}
        }
    }

    if sender.complete(Some(artifact)).await.is_ok() {
        tracing::debug!(job = %sender.job_id(), "Simulation complete");
    }
}

/// Pure progress arithmetic, separated from the timer so it can be tested.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimulationPlan {
    Frames {
        done: f64,
        total: f64,
        per_tick: f64,
        ceiling: f64,
    },
    Percent {
        percent: f64,
        per_tick: f64,
        ceiling: f64,
        held: bool,
    },
}

impl SimulationPlan {
    pub(crate) fn for_job(job: &AcceptedJob, settings: &SimulationSettings) -> Self {
        match job.kind() {
            JobKind::Interpolation => {
                let total = job.total_frames().max(1) as f64;
                let floor = total / f64::from(settings.max_ticks.max(1));
                Self::Frames {
                    done: 0.0,
                    total,
                    per_tick: settings.frames_per_tick.max(floor),
                    ceiling: settings.hold_ceiling,
                }
            }
            JobKind::SketchToImage => Self::Percent {
                percent: 0.0,
                per_tick: settings.sketch_percent_per_tick,
                ceiling: settings.hold_ceiling,
                held: false,
            },
        }
    }

    /// Next intermediate value, or `None` once the terminal update is due.
    pub(crate) fn advance(&mut self) -> Option<f64> {
        match self {
            Self::Frames {
                done,
                total,
                per_tick,
                ceiling,
            } => {
                *done += *per_tick;
                if *done >= *total {
                    None
                } else {
                    Some((*done / *total * 100.0).min(*ceiling))
                }
            }
            Self::Percent {
                percent,
                per_tick,
                ceiling,
                held,
            } => {
                if *held {
                    return None;
                }
                *percent += *per_tick;
                if *percent >= *ceiling {
                    *held = true;
                    Some(*ceiling)
                } else {
                    Some(*percent)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::get_limits;
    use crate::models::{BatchJobRequest, JobProgress, SketchJobRequest, Tier};
    use crate::validation::{validate, validate_sketch};
    use futures_util::StreamExt;

    fn interpolation(images: u32, frames: u32) -> AcceptedJob {
        let limits = get_limits(Tier::Premium);
        validate(&BatchJobRequest::new(images, frames, Tier::Premium), &limits).unwrap()
    }

    fn sketch() -> AcceptedJob {
        validate_sketch(&SketchJobRequest::new(true, "a lighthouse", Tier::Free)).unwrap()
    }

    fn fast() -> SimulationSettings {
        SimulationSettings {
            tick_interval_ms: 10,
            frames_per_tick: 4.0,
            sketch_percent_per_tick: 20.0,
            finish_delay_ms: 50,
            ..SimulationSettings::default()
        }
    }

    fn assert_contract(updates: &[JobProgress]) {
        assert!(!updates.is_empty());
        assert!(updates[0].percent_complete > 0.0);
        for pair in updates.windows(2) {
            assert!(pair[1].percent_complete >= pair[0].percent_complete);
        }
        let last = updates.last().unwrap();
        assert_eq!(last.percent_complete, 100.0);
        assert!(last.is_complete);
        assert!(updates[..updates.len() - 1].iter().all(|p| !p.is_complete));
    }

    #[test]
    fn frame_plan_holds_below_ceiling() {
        let mut plan = SimulationPlan::Frames {
            done: 0.0,
            total: 10.0,
            per_tick: 1.0,
            ceiling: 95.0,
        };
        let values: Vec<f64> = std::iter::from_fn(|| plan.advance()).collect();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], 10.0);
        assert!(values.iter().all(|v| *v <= 95.0));
    }

    #[test]
    fn percent_plan_emits_ceiling_once() {
        let mut plan = SimulationPlan::Percent {
            percent: 0.0,
            per_tick: 40.0,
            ceiling: 95.0,
            held: false,
        };
        let values: Vec<f64> = std::iter::from_fn(|| plan.advance()).collect();
        assert_eq!(values, vec![40.0, 80.0, 95.0]);
    }

    #[test]
    fn tiny_job_completes_on_first_tick() {
        let settings = SimulationSettings::default();
        let mut plan = SimulationPlan::for_job(&interpolation(1, 1), &settings);
        assert_eq!(plan.advance(), None);
    }

    #[test]
    fn large_jobs_finish_within_max_ticks() {
        let settings = SimulationSettings::default();
        for (images, frames) in [(1000, 60), (200, 24), (7, 3)] {
            let mut plan = SimulationPlan::for_job(&interpolation(images, frames), &settings);
            let ticks = std::iter::from_fn(|| plan.advance()).count() + 1;
            assert!(ticks <= settings.max_ticks as usize, "{images}x{frames}: {ticks} ticks");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interpolation_honours_contract() {
        let source = SimulatedProgress::new(fast());
        let updates: Vec<JobProgress> = source.subscribe(&interpolation(5, 12)).collect().await;

        assert_contract(&updates);
        // 60 frames at 4 per tick: 14 intermediate updates, then completion
        assert_eq!(updates.len(), 15);
        assert_eq!(
            updates.last().unwrap().artifact_url.as_deref(),
            Some(source.settings().placeholder_url.as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sketch_honours_contract() {
        let source = SimulatedProgress::new(fast());
        let updates: Vec<JobProgress> = source.subscribe(&sketch()).collect().await;

        assert_contract(&updates);
        let values: Vec<f64> = updates.iter().map(|p| p.percent_complete).collect();
        assert_eq!(values, vec![20.0, 40.0, 60.0, 80.0, 95.0, 100.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_subscription_stops_producer() {
        let source = SimulatedProgress::new(fast());
        let (mut subscription, producer) = source.spawn(&interpolation(100, 60));

        let first = subscription.recv().await.unwrap();
        assert!(first.percent_complete > 0.0);
        let handle = subscription.cancel_handle();
        drop(subscription);
        assert!(handle.is_cancelled());

        // The producer exits long before the job would have completed.
        time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer still running after cancellation")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_subscription_yields_nothing_more() {
        let source = SimulatedProgress::new(fast());
        let mut subscription = source.subscribe(&interpolation(100, 60));

        subscription.recv().await.unwrap();
        subscription.cancel();
        assert!(subscription.recv().await.is_none());
        assert!(subscription.next().await.is_none());
    }
}
