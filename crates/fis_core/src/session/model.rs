//! Session state

use serde::Serialize;

use crate::config::SessionSettings;
use crate::models::{ImageFile, JobKind, Tier};

/// Where the session's job is.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum JobPhase {
    #[default]
    Idle,
    Running { job_id: String },
    Finished { artifact_url: Option<String> },
    Failed { reason: String },
}

/// Everything the front end renders.
///
/// Fields are private: a new state is only produced by [`super::update`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub(super) tier: Tier,
    pub(super) kind: JobKind,
    pub(super) files: Vec<ImageFile>,
    pub(super) frames_per_image: u32,
    pub(super) frame_rate: u32,
    pub(super) sketch: Option<ImageFile>,
    pub(super) prompt: String,
    pub(super) phase: JobPhase,
    pub(super) progress: f64,
    pub(super) status: String,
    /// Frames of the job last started, for the completion notice.
    pub(super) job_frames: u64,
}

impl SessionState {
    /// Fresh session using configured defaults. The tier stays free until a
    /// resolver reports otherwise.
    pub fn new(defaults: &SessionSettings) -> Self {
        Self {
            tier: Tier::Free,
            kind: JobKind::Interpolation,
            files: Vec::new(),
            frames_per_image: defaults.frames_per_image,
            frame_rate: defaults.frame_rate,
            sketch: None,
            prompt: String::new(),
            phase: JobPhase::Idle,
            progress: 0.0,
            status: String::from("Ready"),
            job_frames: 0,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn frames_per_image(&self) -> u32 {
        self.frames_per_image
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn sketch(&self) -> Option<&ImageFile> {
        self.sketch.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    /// Displayed progress, 0.0 to 100.0.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&SessionSettings::default())
    }
}
