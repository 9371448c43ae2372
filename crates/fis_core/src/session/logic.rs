//! Session logic helpers

use super::model::{JobPhase, SessionState};
use crate::models::JobKind;

impl SessionState {
    pub fn is_running(&self) -> bool {
        matches!(self.phase, JobPhase::Running { .. })
    }

    pub fn running_job_id(&self) -> Option<&str> {
        match &self.phase {
            JobPhase::Running { job_id } => Some(job_id),
            _ => None,
        }
    }

    pub fn artifact_url(&self) -> Option<&str> {
        match &self.phase {
            JobPhase::Finished { artifact_url } => artifact_url.as_deref(),
            _ => None,
        }
    }

    /// Check if the generate button should be enabled.
    pub fn can_submit(&self) -> bool {
        if self.is_running() {
            return false;
        }
        match self.kind {
            JobKind::Interpolation => !self.files.is_empty() && self.frames_per_image > 0,
            JobKind::SketchToImage => self.sketch.is_some() && !self.prompt.trim().is_empty(),
        }
    }

    /// Frames the current selection would produce.
    pub fn total_frames(&self) -> u64 {
        self.files.len() as u64 * u64::from(self.frames_per_image)
    }

    /// Format progress for display.
    pub fn format_progress(&self) -> String {
        format!("{}%", self.progress.floor() as u32)
    }

    /// Raise displayed progress; it never goes backwards while a job runs.
    pub(super) fn advance_progress(&mut self, percent: f64) {
        if percent.is_finite() {
            self.progress = self.progress.max(percent.clamp(0.0, 100.0));
        }
        self.status = format!("Processing... {}", self.format_progress());
    }

    pub(super) fn start_job(&mut self, job_id: String, total_frames: u64) {
        self.phase = JobPhase::Running { job_id };
        self.job_frames = total_frames;
        self.progress = 0.0;
        self.status = "Processing...".to_string();
    }

    pub(super) fn clear_result(&mut self) {
        self.phase = JobPhase::Idle;
        self.progress = 0.0;
    }
}
