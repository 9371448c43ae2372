//! Frame Interpolation Studio core.
//!
//! Tier limits, job validation, progress reporting, the single-slot job
//! runner and the session state machine. No UI dependencies; the CLI and any
//! other front end drive it through [`session::update`] and
//! [`runner::JobRunner`].

pub mod config;
pub mod limits;
pub mod logging;
pub mod models;
pub mod progress;
pub mod runner;
pub mod session;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
