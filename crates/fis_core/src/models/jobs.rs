//! Job-related data structures (requests, accepted jobs, progress).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{JobKind, Tier};
use crate::limits::DEFAULT_FRAME_RATE;

/// A frame interpolation job as submitted by the user.
///
/// Built at submission time from the current selection; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJobRequest {
    /// Number of selected images.
    pub image_count: u32,
    /// Interpolated frames to generate per image.
    pub frames_per_image: u32,
    /// Playback rate of the resulting sequence.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Tier the job is submitted under.
    pub tier: Tier,
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl BatchJobRequest {
    /// Create a request at the default frame rate.
    pub fn new(image_count: u32, frames_per_image: u32, tier: Tier) -> Self {
        Self {
            image_count,
            frames_per_image,
            frame_rate: DEFAULT_FRAME_RATE,
            tier,
        }
    }

    /// Override the frame rate (builder pattern).
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Total frames the job would produce.
    ///
    /// Computed in 64 bits so oversized requests cannot overflow before
    /// they are rejected.
    pub fn total_frames(&self) -> u64 {
        u64::from(self.image_count) * u64::from(self.frames_per_image)
    }
}

/// A sketch-to-image job as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchJobRequest {
    /// Whether a sketch image has been selected.
    pub has_sketch: bool,
    /// Text description guiding the generation.
    pub prompt: String,
    /// Tier the job is submitted under.
    pub tier: Tier,
}

impl SketchJobRequest {
    pub fn new(has_sketch: bool, prompt: impl Into<String>, tier: Tier) -> Self {
        Self {
            has_sketch,
            prompt: prompt.into(),
            tier,
        }
    }
}

/// A job that passed validation and may be started.
///
/// Only the validators construct this, so holding one proves the limits held
/// at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedJob {
    id: String,
    kind: JobKind,
    tier: Tier,
    image_count: u32,
    frames_per_image: u32,
    frame_rate: u32,
    total_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl AcceptedJob {
    pub(crate) fn interpolation(request: &BatchJobRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: JobKind::Interpolation,
            tier: request.tier,
            image_count: request.image_count,
            frames_per_image: request.frames_per_image,
            frame_rate: request.frame_rate,
            total_frames: request.total_frames(),
            prompt: None,
        }
    }

    pub(crate) fn sketch(tier: Tier, prompt: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: JobKind::SketchToImage,
            tier,
            image_count: 1,
            frames_per_image: 1,
            frame_rate: DEFAULT_FRAME_RATE,
            total_frames: 1,
            prompt: Some(prompt),
        }
    }

    /// Unique job identifier (UUID v4).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    pub fn frames_per_image(&self) -> u32 {
        self.frames_per_image
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Total frames to generate (1 for a sketch job).
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Trimmed prompt for sketch jobs.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Length of the produced sequence in seconds, for interpolation jobs.
    pub fn sequence_seconds(&self) -> f64 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        self.total_frames as f64 / f64::from(self.frame_rate)
    }
}

/// Progress of a running job as reported by a progress source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Completion percentage in `[0, 100]`.
    pub percent_complete: f64,
    /// Set only on the final update, which is always exactly 100.
    pub is_complete: bool,
    /// Location of the produced artifact, present on the final update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
}

impl JobProgress {
    /// An intermediate update; the value is clamped into `[0, 100]`.
    pub fn running(percent: f64) -> Self {
        Self {
            percent_complete: percent.clamp(0.0, 100.0),
            is_complete: false,
            artifact_url: None,
        }
    }

    /// The terminal update.
    pub fn complete(artifact_url: Option<String>) -> Self {
        Self {
            percent_complete: 100.0,
            is_complete: true,
            artifact_url,
        }
    }
}
