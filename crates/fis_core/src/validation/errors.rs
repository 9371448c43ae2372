//! Error types for job and file validation.
//!
//! Every variant is user-correctable. Each one carries enough context to
//! build the notice shown to the user.

use thiserror::Error;

use crate::models::Tier;

/// Why a job request was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// More images than the tier allows.
    #[error("{count} images selected, {tier} tier allows at most {max}")]
    TooManyImages { count: u32, max: u32, tier: Tier },

    /// Nothing to process.
    #[error("No images selected")]
    NoImagesSelected,

    /// More frames per image than the tier allows.
    #[error("{requested} frames per image requested, {tier} tier allows at most {max}")]
    TooManyFramesPerImage { requested: u32, max: u32, tier: Tier },

    /// Zero frames per image.
    #[error("At least one frame per image is required")]
    NoFramesRequested,

    /// The whole job exceeds the tier's frame budget.
    #[error("{total} total frames requested, {tier} tier allows at most {max}")]
    TooManyTotalFrames { total: u64, max: u32, tier: Tier },

    /// Frame rate outside the supported range.
    #[error("Frame rate {fps} fps is outside {min}-{max} fps")]
    FrameRateOutOfRange { fps: u32, min: u32, max: u32 },

    /// Sketch job submitted without a sketch.
    #[error("No sketch selected")]
    NoSketchSelected,

    /// Sketch prompt is empty or whitespace only.
    #[error("Prompt is empty")]
    EmptyPrompt,
}

impl ValidationError {
    /// Short title for a user notice.
    pub fn title(&self) -> &'static str {
        match self {
            Self::TooManyImages { .. } => "Too many images",
            Self::NoImagesSelected => "No images selected",
            Self::TooManyFramesPerImage { .. } => "Too many frames",
            Self::NoFramesRequested => "Too few frames",
            Self::TooManyTotalFrames { .. } => "Too many frames",
            Self::FrameRateOutOfRange { .. } => "Invalid frame rate",
            Self::NoSketchSelected => "No sketch selected",
            Self::EmptyPrompt => "No prompt provided",
        }
    }

    /// Longer explanation for a user notice.
    pub fn description(&self) -> String {
        match self {
            Self::TooManyImages { max, tier, .. } => {
                format!("Maximum {} images allowed in {} mode", max, tier)
            }
            Self::NoImagesSelected => "Please select images to process".to_string(),
            Self::TooManyFramesPerImage { max, tier, .. } => {
                format!("Maximum {} frames per image in {} mode", max, tier)
            }
            Self::NoFramesRequested => "Please request at least 1 frame per image".to_string(),
            Self::TooManyTotalFrames { max, tier, .. } => {
                format!("Maximum {} total frames in {} mode", max, tier)
            }
            Self::FrameRateOutOfRange { min, max, .. } => {
                format!("Frame rate must be between {} and {} fps", min, max)
            }
            Self::NoSketchSelected => "Please upload a sketch to generate an image".to_string(),
            Self::EmptyPrompt => {
                "Please enter a description for your image generation".to_string()
            }
        }
    }
}

/// Why an uploaded file was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileError {
    /// MIME type not on the allow-list.
    #[error("{name}: unsupported file type '{mime_type}'")]
    UnsupportedFileType { name: String, mime_type: String },

    /// File larger than the per-file ceiling.
    #[error("{name}: {size_bytes} bytes exceeds the {max_bytes} byte limit")]
    FileTooLarge {
        name: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    /// File could not be inspected at all.
    #[error("{name}: {message}")]
    Unreadable { name: String, message: String },
}

impl FileError {
    pub fn unsupported(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::UnsupportedFileType {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn unreadable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreadable {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "Invalid file type",
            Self::FileTooLarge { .. } => "File too large",
            Self::Unreadable { .. } => "Unreadable file",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::UnsupportedFileType { .. } => {
                "Please upload an image file (PNG, JPG, JPEG, WebP)".to_string()
            }
            Self::FileTooLarge { name, max_bytes, .. } => format!(
                "{} is larger than the {} MB per-image limit",
                name,
                max_bytes / (1024 * 1024)
            ),
            Self::Unreadable { name, message } => format!("{}: {}", name, message),
        }
    }
}

/// Error from validating a whole file selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    File(#[from] FileError),
}

impl SelectionError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.title(),
            Self::File(e) => e.title(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Validation(e) => e.description(),
            Self::File(e) => e.description(),
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
