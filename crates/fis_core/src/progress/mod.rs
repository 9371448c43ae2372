//! Job progress reporting.
//!
//! A [`ProgressSource`] turns an accepted job into a [`ProgressSubscription`]:
//! a stream of updates that never decreases, starts above zero and ends with
//! exactly one terminal update at 100%. Dropping or cancelling the
//! subscription stops the producer.
//!
//! [`SimulatedProgress`] is the only source shipped; a deployment with a real
//! inference backend implements [`ProgressSource`] by polling job status and
//! feeding a [`ProgressSender`].
//!
//! # Example
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use fis_core::limits::get_limits;
//! use fis_core::models::{BatchJobRequest, Tier};
//! use fis_core::progress::{ProgressSource, SimulatedProgress};
//! use fis_core::validation::validate;
//!
//! # async fn demo() {
//! let job = validate(&BatchJobRequest::new(3, 24, Tier::Free), &get_limits(Tier::Free)).unwrap();
//! let mut updates = SimulatedProgress::default().subscribe(&job);
//! while let Some(progress) = updates.next().await {
//!     println!("{:.0}%", progress.percent_complete);
//! }
//! # }
//! ```

mod simulated;
mod subscription;

pub use simulated::SimulatedProgress;
pub use subscription::{
    progress_channel, CancelHandle, Closed, ProgressSender, ProgressSubscription,
    CHANNEL_CAPACITY,
};

use crate::models::AcceptedJob;

/// Something that can report progress for an accepted job.
///
/// `subscribe` must be called from within a tokio runtime; implementations
/// spawn their producer task there.
pub trait ProgressSource: Send + Sync + 'static {
    fn subscribe(&self, job: &AcceptedJob) -> ProgressSubscription;
}
