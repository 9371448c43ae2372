//! Session state machine.
//!
//! All UI-facing state lives in an immutable [`SessionState`]. Front ends feed
//! [`SessionMsg`]s to [`update`], render the returned state and carry out the
//! returned [`Effect`]s (start or cancel a job on the runner, show a notice).
//! The reducer performs no I/O.

mod logic;
mod messages;
mod model;

pub use messages::{Effect, Notice, NoticeLevel, SessionMsg};
pub use model::{JobPhase, SessionState};

use crate::config::Settings;
use crate::models::{BatchJobRequest, JobKind, SketchJobRequest, Tier};
use crate::runner::JobResult;
use crate::validation::{validate, validate_file, validate_files, validate_sketch};

/// Source of the session's tier.
///
/// The tier must come from a trusted place (settings, an account service),
/// never from unchecked client input.
pub trait TierResolver: Send + Sync {
    fn resolve_tier(&self) -> Tier;
}

/// Tier taken from installation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfiguredTier(Tier);

impl ConfiguredTier {
    pub fn new(tier: Tier) -> Self {
        Self(tier)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self(settings.session.tier)
    }
}

impl TierResolver for ConfiguredTier {
    fn resolve_tier(&self) -> Tier {
        self.0
    }
}

fn busy_notice() -> Notice {
    Notice::error("Job in progress", "Please wait for the current job to finish")
}

/// Apply one message, returning the next state and the effects to perform.
pub fn update(state: &SessionState, msg: SessionMsg) -> (SessionState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match msg {
        SessionMsg::TierResolved(tier) => {
            if state.is_running() {
                effects.push(Effect::Notify(busy_notice()));
            } else {
                tracing::debug!(tier = %tier, "Session tier resolved");
                next.tier = tier;
            }
        }

        SessionMsg::SwitchView(kind) => {
            if state.is_running() && kind != state.kind {
                effects.push(Effect::Notify(busy_notice()));
            } else {
                next.kind = kind;
            }
        }

        SessionMsg::FilesSelected(files) => {
            match validate_files(&files, &state.tier.limits(), state.tier) {
                Ok(()) => {
                    effects.push(Effect::Notify(Notice::info(
                        "Images selected",
                        format!("{} image(s) ready for interpolation", files.len()),
                    )));
                    next.files = files;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Selection rejected");
                    effects.push(Effect::Notify(Notice::from(&err)));
                }
            }
        }

        SessionMsg::SketchSelected(file) => match validate_file(&file) {
            Ok(()) => next.sketch = Some(file),
            Err(err) => {
                tracing::debug!(error = %err, "Sketch rejected");
                effects.push(Effect::Notify(Notice::error(err.title(), err.description())));
            }
        },

        SessionMsg::FramesPerImageChanged(frames) => next.frames_per_image = frames,

        SessionMsg::FrameRateChanged(fps) => next.frame_rate = fps,

        SessionMsg::PromptChanged(prompt) => next.prompt = prompt,

        SessionMsg::Submit => {
            if state.is_running() {
                effects.push(Effect::Notify(busy_notice()));
                return (next, effects);
            }

            let accepted = match state.kind {
                JobKind::Interpolation => {
                    let image_count = u32::try_from(state.files.len()).unwrap_or(u32::MAX);
                    let request =
                        BatchJobRequest::new(image_count, state.frames_per_image, state.tier)
                            .with_frame_rate(state.frame_rate);
                    validate(&request, &state.tier.limits())
                }
                JobKind::SketchToImage => validate_sketch(&SketchJobRequest::new(
                    state.sketch.is_some(),
                    state.prompt.clone(),
                    state.tier,
                )),
            };

            match accepted {
                Ok(job) => {
                    next.start_job(job.id().to_string(), job.total_frames());
                    effects.push(Effect::StartJob(job));
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Submit rejected");
                    effects.push(Effect::Notify(Notice::from(&err)));
                }
            }
        }

        SessionMsg::JobProgressed { job_id, progress } => {
            if state.running_job_id() == Some(job_id.as_str()) {
                next.advance_progress(progress.percent_complete);
            }
        }

        SessionMsg::JobFinished { job_id, result } => {
            if state.running_job_id() != Some(job_id.as_str()) {
                tracing::debug!(job = %job_id, "Ignoring result for stale job");
                return (next, effects);
            }
            finish_job(&mut next, result, &mut effects);
        }

        SessionMsg::JobNotStarted { job_id, reason } => {
            if state.running_job_id() != Some(job_id.as_str()) {
                return (next, effects);
            }
            tracing::warn!(job = %job_id, reason = %reason, "Job was not started");
            next.clear_result();
            next.status = "Ready".to_string();
            effects.push(Effect::Notify(Notice::error("Job not started", reason)));
        }

        SessionMsg::CancelRequested => {
            if let Some(job_id) = state.running_job_id() {
                next.status = "Cancelling...".to_string();
                effects.push(Effect::CancelJob {
                    job_id: job_id.to_string(),
                });
            }
        }

        SessionMsg::Reset => {
            if state.is_running() {
                effects.push(Effect::Notify(busy_notice()));
            } else {
                next.sketch = None;
                next.prompt.clear();
                next.clear_result();
                next.status = "Ready".to_string();
            }
        }

        SessionMsg::Teardown => {
            if let Some(job_id) = state.running_job_id() {
                effects.push(Effect::CancelJob {
                    job_id: job_id.to_string(),
                });
                next.clear_result();
            }
            next.status = "Closed".to_string();
        }
    }

    (next, effects)
}

fn finish_job(next: &mut SessionState, result: JobResult, effects: &mut Vec<Effect>) {
    match result {
        JobResult::Completed { artifact_url } => {
            let notice = match next.kind {
                JobKind::Interpolation => Notice::info(
                    "Processing complete!",
                    format!("Generated {} interpolated frames", next.job_frames),
                ),
                JobKind::SketchToImage => Notice::info(
                    "Image generated successfully!",
                    "Your sketch has been transformed into an AI-generated image",
                ),
            };
            next.phase = JobPhase::Finished { artifact_url };
            next.progress = 100.0;
            next.status = "Complete".to_string();
            effects.push(Effect::Notify(notice));
        }
        JobResult::Cancelled => {
            next.clear_result();
            next.status = "Cancelled".to_string();
            effects.push(Effect::Notify(Notice::info(
                "Processing cancelled",
                "The job was stopped before it finished",
            )));
        }
        failure @ (JobResult::TimedOut | JobResult::SourceClosed) => {
            let reason = failure.reason().to_string();
            next.phase = JobPhase::Failed {
                reason: reason.clone(),
            };
            next.status = "Failed".to_string();
            effects.push(Effect::Notify(Notice::error("Processing failed", reason)));
        }
    }
}
