//! Per-tier resource ceilings and static upload constraints.
//!
//! The two limit sets are compile-time constants and never change while the
//! process runs. Lookups are total: every [`Tier`] has limits.

use std::time::Duration;

use serde::Serialize;

use crate::models::Tier;

/// Numeric ceilings for one account tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    /// Maximum number of images per job.
    pub max_images: u32,
    /// Maximum interpolated frames generated per image.
    pub max_frames_per_image: u32,
    /// Maximum frames across the whole job (`max_images * max_frames_per_image`).
    pub max_total_frames: u32,
    /// How long a job may run before it is abandoned.
    pub processing_timeout_ms: u64,
}

impl TierLimits {
    /// Processing timeout as a `Duration`.
    pub fn processing_timeout(&self) -> Duration {
        Duration::from_millis(self.processing_timeout_ms)
    }
}

pub const FREE_LIMITS: TierLimits = TierLimits {
    max_images: 200,
    max_frames_per_image: 24,
    max_total_frames: 200 * 24,
    processing_timeout_ms: 5 * 60 * 1000,
};

pub const PREMIUM_LIMITS: TierLimits = TierLimits {
    max_images: 1000,
    max_frames_per_image: 60,
    max_total_frames: 1000 * 60,
    processing_timeout_ms: 10 * 60 * 1000,
};

/// MIME types accepted for uploaded images.
pub const SUPPORTED_IMAGE_FORMATS: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Per-file upload ceiling (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Frames per second used when the user does not pick a rate.
pub const DEFAULT_FRAME_RATE: u32 = 30;
pub const MIN_FRAME_RATE: u32 = 1;
pub const MAX_FRAME_RATE: u32 = 60;

/// Resolve the ceilings for a tier.
pub fn get_limits(tier: Tier) -> TierLimits {
    match tier {
        Tier::Free => FREE_LIMITS,
        Tier::Premium => PREMIUM_LIMITS,
    }
}

impl Tier {
    /// Shorthand for [`get_limits`].
    pub fn limits(&self) -> TierLimits {
        get_limits(*self)
    }
}

/// Whether a MIME type is on the upload allow-list.
pub fn is_supported_format(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_FORMATS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(mime_type.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_frames_is_product_of_ceilings() {
        for tier in Tier::ALL {
            let limits = get_limits(tier);
            assert_eq!(
                limits.max_total_frames,
                limits.max_images * limits.max_frames_per_image,
                "tier {}",
                tier
            );
        }
    }

    #[test]
    fn premium_exceeds_free() {
        let free = get_limits(Tier::Free);
        let premium = get_limits(Tier::Premium);
        assert!(premium.max_images > free.max_images);
        assert!(premium.max_frames_per_image > free.max_frames_per_image);
        assert!(premium.processing_timeout() > free.processing_timeout());
    }

    #[test]
    fn timeouts_match_minutes() {
        assert_eq!(FREE_LIMITS.processing_timeout(), Duration::from_secs(300));
        assert_eq!(PREMIUM_LIMITS.processing_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn supported_formats_are_case_insensitive() {
        assert!(is_supported_format("image/PNG"));
        assert!(is_supported_format("image/jpg"));
        assert!(!is_supported_format("image/gif"));
        assert!(!is_supported_format("application/pdf"));
    }
}
