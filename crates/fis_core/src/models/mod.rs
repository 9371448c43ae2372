//! Data models for Frame Interpolation Studio.
//!
//! This module contains the core data structures used throughout the application:
//! - Enums for account tiers and job kinds
//! - Uploaded image descriptors
//! - Job structures (requests, accepted jobs, progress)

mod enums;
mod jobs;
mod media;

// Re-export all public types
pub use enums::{JobKind, Tier};
pub use jobs::{AcceptedJob, BatchJobRequest, JobProgress, SketchJobRequest};
pub use media::{mime_from_extension, ImageFile};
