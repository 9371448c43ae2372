//! Submission-time checks against the active tier's limits.

use crate::limits::{is_supported_format, TierLimits, MAX_FILE_SIZE, MAX_FRAME_RATE, MIN_FRAME_RATE};
use crate::models::{AcceptedJob, BatchJobRequest, ImageFile, SketchJobRequest, Tier};

use super::errors::{FileError, SelectionError, ValidationError, ValidationResult};

/// Validate a frame interpolation request.
///
/// Checks run in a fixed order and the first failure is returned, so a
/// request violating several limits always reports the same reason:
/// 1. too many images
/// 2. no images
/// 3. too many frames per image
/// 4. zero frames per image
/// 5. total frame budget
/// 6. frame rate range
pub fn validate(request: &BatchJobRequest, limits: &TierLimits) -> ValidationResult<AcceptedJob> {
    if request.image_count > limits.max_images {
        return Err(ValidationError::TooManyImages {
            count: request.image_count,
            max: limits.max_images,
            tier: request.tier,
        });
    }

    if request.image_count == 0 {
        return Err(ValidationError::NoImagesSelected);
    }

    if request.frames_per_image > limits.max_frames_per_image {
        return Err(ValidationError::TooManyFramesPerImage {
            requested: request.frames_per_image,
            max: limits.max_frames_per_image,
            tier: request.tier,
        });
    }

    if request.frames_per_image == 0 {
        return Err(ValidationError::NoFramesRequested);
    }

    let total = request.total_frames();
    if total > u64::from(limits.max_total_frames) {
        return Err(ValidationError::TooManyTotalFrames {
            total,
            max: limits.max_total_frames,
            tier: request.tier,
        });
    }

    if !(MIN_FRAME_RATE..=MAX_FRAME_RATE).contains(&request.frame_rate) {
        return Err(ValidationError::FrameRateOutOfRange {
            fps: request.frame_rate,
            min: MIN_FRAME_RATE,
            max: MAX_FRAME_RATE,
        });
    }

    tracing::debug!(
        images = request.image_count,
        frames_per_image = request.frames_per_image,
        total_frames = total,
        tier = %request.tier,
        "Interpolation request accepted"
    );

    Ok(AcceptedJob::interpolation(request))
}

/// Validate a sketch-to-image request.
pub fn validate_sketch(request: &SketchJobRequest) -> ValidationResult<AcceptedJob> {
    if !request.has_sketch {
        return Err(ValidationError::NoSketchSelected);
    }

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }

    tracing::debug!(tier = %request.tier, prompt_len = prompt.len(), "Sketch request accepted");
    Ok(AcceptedJob::sketch(request.tier, prompt.to_string()))
}

/// Check a single uploaded file against the type allow-list and size ceiling.
pub fn validate_file(file: &ImageFile) -> Result<(), FileError> {
    if !is_supported_format(&file.mime_type) {
        return Err(FileError::unsupported(&file.name, &file.mime_type));
    }

    if file.size_bytes > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge {
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            max_bytes: MAX_FILE_SIZE,
        });
    }

    Ok(())
}

/// Check a whole selection at pick time.
///
/// The count is checked before the individual files, matching what the user
/// sees when picking too many files at once.
pub fn validate_files(
    files: &[ImageFile],
    limits: &TierLimits,
    tier: Tier,
) -> Result<(), SelectionError> {
    let count = u32::try_from(files.len()).unwrap_or(u32::MAX);
    if count > limits.max_images {
        return Err(ValidationError::TooManyImages {
            count,
            max: limits.max_images,
            tier,
        }
        .into());
    }

    for file in files {
        validate_file(file)?;
    }

    Ok(())
}
