//! Cancellable progress channel between a source and its subscriber.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::JobProgress;

/// Updates buffered between producer and subscriber.
pub const CHANNEL_CAPACITY: usize = 32;

/// Create a connected sender/subscription pair for one job.
pub fn progress_channel(job_id: impl Into<String>) -> (ProgressSender, ProgressSubscription) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let job_id = job_id.into();

    let sender = ProgressSender {
        job_id: job_id.clone(),
        tx,
        cancel: cancel.clone(),
        last_percent: 0.0,
        completed: false,
    };
    let subscription = ProgressSubscription {
        job_id,
        rx,
        cancel,
        finished: false,
    };
    (sender, subscription)
}

/// The channel has no listener any more (cancelled, dropped, or completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Closed;

/// Producer half, held by a progress source.
///
/// Enforces the emission contract whatever the source does: values never
/// decrease, the terminal update is exactly 100, and nothing is sent after
/// completion or cancellation.
pub struct ProgressSender {
    job_id: String,
    tx: mpsc::Sender<JobProgress>,
    cancel: CancellationToken,
    last_percent: f64,
    completed: bool,
}

impl ProgressSender {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Report an intermediate percentage.
    ///
    /// Values below the last reported one are raised to it.
    pub async fn report(&mut self, percent: f64) -> Result<(), Closed> {
        if self.completed {
            return Err(Closed);
        }
        let percent = if percent.is_finite() { percent } else { self.last_percent };
        let percent = percent.clamp(self.last_percent, 100.0);
        self.last_percent = percent;
        self.send(JobProgress::running(percent)).await
    }

    /// Send the terminal update and close the sender.
    pub async fn complete(&mut self, artifact_url: Option<String>) -> Result<(), Closed> {
        if self.completed {
            return Err(Closed);
        }
        self.completed = true;
        self.last_percent = 100.0;
        self.send(JobProgress::complete(artifact_url)).await
    }

    /// Whether the subscriber has gone away.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves once the subscriber cancels or is dropped.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = self.tx.closed() => {}
        }
    }

    async fn send(&self, progress: JobProgress) -> Result<(), Closed> {
        if self.is_cancelled() {
            return Err(Closed);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Closed),
            sent = self.tx.send(progress) => sent.map_err(|_| Closed),
        }
    }
}

/// Subscriber half: a stream of progress updates for one job.
///
/// Dropping the subscription cancels the producer.
pub struct ProgressSubscription {
    job_id: String,
    rx: mpsc::Receiver<JobProgress>,
    cancel: CancellationToken,
    finished: bool,
}

impl ProgressSubscription {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Wait for the next update.
    ///
    /// Returns `None` after the terminal update, after cancellation, or when
    /// the producer stops without completing.
    pub async fn recv(&mut self) -> Option<JobProgress> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.finish();
                None
            }
            update = self.rx.recv() => self.accept(update),
        }
    }

    /// Stop the producer; no further updates are delivered.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.finish();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handle that can cancel this subscription from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    fn accept(&mut self, update: Option<JobProgress>) -> Option<JobProgress> {
        match update {
            Some(progress) => {
                if progress.is_complete {
                    self.finish();
                }
                Some(progress)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.rx.close();
    }
}

impl Stream for ProgressSubscription {
    type Item = JobProgress;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        if this.cancel.is_cancelled() {
            this.finish();
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(update) => Poll::Ready(this.accept(update)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Handle for cancelling a subscription from another task.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Cancel the subscription; the producer stops at its next await point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
