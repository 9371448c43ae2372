//! Session messages (events) and the effects the reducer asks for.

use serde::Serialize;

use crate::models::{AcceptedJob, ImageFile, JobKind, JobProgress, Tier};
use crate::runner::JobResult;
use crate::validation::{SelectionError, ValidationError};

/// Messages for the session reducer.
#[derive(Debug, Clone)]
pub enum SessionMsg {
    // === Environment ===
    /// Tier resolved by a `TierResolver`
    TierResolved(Tier),

    // === User actions ===
    /// Interpolation / sketch view selected
    SwitchView(JobKind),

    /// Images picked for interpolation
    FilesSelected(Vec<ImageFile>),

    /// Sketch picked for sketch-to-image
    SketchSelected(ImageFile),

    /// Frames-per-image slider moved
    FramesPerImageChanged(u32),

    /// Frame rate changed
    FrameRateChanged(u32),

    /// Prompt text edited
    PromptChanged(String),

    /// Generate button pressed
    Submit,

    /// Cancel button pressed
    CancelRequested,

    /// Clear sketch, prompt and result
    Reset,

    /// Session is going away
    Teardown,

    // === Runner responses ===
    /// Progress update for a job
    JobProgressed { job_id: String, progress: JobProgress },

    /// A job ended
    JobFinished { job_id: String, result: JobResult },

    /// The runner refused a job the session had started
    JobNotStarted { job_id: String, reason: String },
}

/// Side effects requested by the reducer; the caller performs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Hand the accepted job to the runner.
    StartJob(AcceptedJob),
    /// Cancel the running job.
    CancelJob { job_id: String },
    /// Show a notice to the user.
    Notify(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&ValidationError> for Notice {
    fn from(err: &ValidationError) -> Self {
        Notice::error(err.title(), err.description())
    }
}

impl From<&SelectionError> for Notice {
    fn from(err: &SelectionError) -> Self {
        Notice::error(err.title(), err.description())
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
