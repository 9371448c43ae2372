//! Drives one session from the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fis_core::config::Settings;
use fis_core::logging::{JobLogger, LogCallback, LogConfig};
use fis_core::models::{AcceptedJob, ImageFile, JobProgress};
use fis_core::progress::{CancelHandle, SimulatedProgress};
use fis_core::runner::{JobResult, JobRunner};
use fis_core::session::{
    update, Effect, JobPhase, Notice, NoticeLevel, SessionMsg, SessionState, TierResolver,
};
use fis_core::validation::FileError;
use tokio::sync::mpsc;

enum RunEvent {
    Progress(JobProgress),
    Finished(JobResult),
}

struct PendingJob {
    job_id: String,
    events: mpsc::UnboundedReceiver<RunEvent>,
}

pub struct App {
    state: SessionState,
    runner: JobRunner,
    settings: Settings,
    log_dir: Option<PathBuf>,
    cancel: Option<CancelHandle>,
    pending: Option<PendingJob>,
}

impl App {
    pub fn new(settings: Settings, log_dir: Option<PathBuf>, resolver: &dyn TierResolver) -> Self {
        let source = SimulatedProgress::new(settings.simulation.clone());
        let mut app = Self {
            state: SessionState::new(&settings.session),
            runner: JobRunner::new(Arc::new(source)),
            settings,
            log_dir,
            cancel: None,
            pending: None,
        };
        app.dispatch(SessionMsg::TierResolved(resolver.resolve_tier()));
        app
    }

    /// Feed messages in order, then wait for any job they started.
    pub async fn run(&mut self, msgs: Vec<SessionMsg>) -> &SessionState {
        for msg in msgs {
            self.dispatch(msg);
        }
        if let Some(pending) = self.pending.take() {
            self.wait(pending).await;
        }
        self.dispatch(SessionMsg::Teardown);
        &self.state
    }

    fn dispatch(&mut self, msg: SessionMsg) {
        let (next, effects) = update(&self.state, msg);
        self.state = next;
        for effect in effects {
            match effect {
                Effect::Notify(notice) => print_notice(&notice),
                Effect::StartJob(job) => self.start(job),
                Effect::CancelJob { job_id } => {
                    tracing::info!(job = %job_id, "Cancelling job");
                    if let Some(handle) = self.cancel.take() {
                        handle.cancel();
                    }
                }
            }
        }
    }

    fn start(&mut self, job: AcceptedJob) {
        let job_id = job.id().to_string();
        let limits = job.tier().limits();
        let logger = match self.job_logger(&job) {
            Ok(logger) => logger,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not create job log file, logging to terminal only"
                );
                None
            }
        };

        let running = match self.runner.start(job, &limits) {
            Ok(running) => running,
            Err(e) => {
                self.dispatch(SessionMsg::JobNotStarted {
                    job_id,
                    reason: e.to_string(),
                });
                return;
            }
        };
        let running = match logger {
            Some(logger) => running.with_logger(logger),
            None => running,
        };

        self.cancel = Some(running.cancel_handle());
        let (tx, events) = mpsc::unbounded_channel();
        let progress_tx = tx.clone();
        tokio::spawn(async move {
            let result = running
                .run(|p| {
                    let _ = progress_tx.send(RunEvent::Progress(p.clone()));
                })
                .await;
            let _ = tx.send(RunEvent::Finished(result));
        });
        self.pending = Some(PendingJob { job_id, events });
    }

    async fn wait(&mut self, pending: PendingJob) {
        let PendingJob { job_id, mut events } = pending;
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(RunEvent::Progress(progress)) => self.dispatch(SessionMsg::JobProgressed {
                        job_id: job_id.clone(),
                        progress,
                    }),
                    Some(RunEvent::Finished(result)) => {
                        self.cancel = None;
                        self.dispatch(SessionMsg::JobFinished { job_id, result });
                        return;
                    }
                    None => return,
                },
                _ = tokio::signal::ctrl_c() => self.dispatch(SessionMsg::CancelRequested),
            }
        }
    }

    fn job_logger(&self, job: &AcceptedJob) -> std::io::Result<Option<JobLogger>> {
        let config = LogConfig::from(&self.settings.logging);
        let callback: LogCallback = Box::new(|line: &str| eprintln!("{}", line));
        let dir = if self.settings.logging.job_log_files {
            self.log_dir.as_deref()
        } else {
            None
        };
        JobLogger::new(job, dir, config, Some(callback)).map(Some)
    }
}

/// Whether the session ended with a finished job.
pub fn succeeded(state: &SessionState) -> bool {
    matches!(state.phase(), JobPhase::Finished { .. })
}

/// Describe files on disk, turning unreadable ones into file errors.
pub fn describe_files(paths: &[PathBuf]) -> Result<Vec<ImageFile>, FileError> {
    paths.iter().map(|p| describe_file(p)).collect()
}

pub fn describe_file(path: &Path) -> Result<ImageFile, FileError> {
    ImageFile::from_path(path)
        .map_err(|e| FileError::unreadable(path.display().to_string(), e.to_string()))
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => eprintln!("{}", notice),
        NoticeLevel::Error => eprintln!("error: {}", notice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fis_core::config::SimulationSettings;
    use fis_core::models::{BatchJobRequest, Tier};
    use fis_core::session::ConfiguredTier;
    use fis_core::validation::validate;
    use tempfile::tempdir;

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.simulation = SimulationSettings {
            tick_interval_ms: 5,
            frames_per_tick: 10.0,
            sketch_percent_per_tick: 30.0,
            finish_delay_ms: 5,
            ..SimulationSettings::default()
        };
        settings.logging.job_log_files = false;
        settings
    }

    #[tokio::test]
    async fn interpolation_session_finishes() {
        let mut app = App::new(fast_settings(), None, &ConfiguredTier::new(Tier::Free));
        let files = vec![ImageFile::new("a.png", "image/png", 100); 2];
        let state = app
            .run(vec![
                SessionMsg::FilesSelected(files),
                SessionMsg::FramesPerImageChanged(10),
                SessionMsg::Submit,
            ])
            .await;
        assert!(succeeded(state));
        assert_eq!(state.progress(), 100.0);
    }

    #[tokio::test]
    async fn rejected_submit_does_not_start() {
        let mut app = App::new(fast_settings(), None, &ConfiguredTier::new(Tier::Free));
        let state = app.run(vec![SessionMsg::Submit]).await;
        assert!(!succeeded(state));
    }

    #[tokio::test]
    async fn refused_start_leaves_session_usable() {
        let mut app = App::new(fast_settings(), None, &ConfiguredTier::new(Tier::Free));
        let limits = Tier::Free.limits();
        let blocker = validate(&BatchJobRequest::new(1, 1, Tier::Free), &limits).unwrap();
        let held = app.runner.start(blocker, &limits).unwrap();

        let files = vec![ImageFile::new("a.png", "image/png", 100); 2];
        app.dispatch(SessionMsg::FilesSelected(files));
        app.dispatch(SessionMsg::Submit);
        assert!(!app.state.is_running());
        assert!(app.pending.is_none());
        assert!(app.state.can_submit());

        drop(held);
        let state = app.run(vec![SessionMsg::Submit]).await;
        assert!(succeeded(state));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = describe_file(&dir.path().join("missing.png")).unwrap_err();
        assert_eq!(err.title(), "Unreadable file");
    }
}
