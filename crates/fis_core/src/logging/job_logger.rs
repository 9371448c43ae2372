//! Per-job logger with optional file output and a line callback.
//!
//! Each job gets its own logger that:
//! - Mirrors every line into `tracing` with the job id attached
//! - Optionally writes to a dedicated log file
//! - Forwards formatted lines to a callback (terminal or UI)
//! - Filters progress to step intervals in compact mode
//! - Keeps a tail of raw progress updates for failure diagnosis

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};
use crate::models::{AcceptedJob, JobKind};

/// Per-job logger.
pub struct JobLogger {
    /// Job identifier attached to every tracing event.
    job_id: String,
    /// Path to the log file, when file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Line callback.
    callback: Option<LogCallback>,
    /// Logging configuration.
    config: LogConfig,
    /// Recent raw updates, newest last.
    tail_buffer: Mutex<VecDeque<String>>,
    /// Last progress percentage that was logged.
    last_progress: Mutex<Option<u32>>,
}

impl JobLogger {
    /// Create a logger for a job.
    ///
    /// When `log_dir` is given, the directory is created and the log file is
    /// named after the job kind and the first 8 characters of its id.
    pub fn new(
        job: &AcceptedJob,
        log_dir: Option<&Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let (log_path, writer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(log_file_name(job));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            job_id: job.id().to_string(),
            log_path,
            file_writer: Mutex::new(writer),
            callback,
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            last_progress: Mutex::new(None),
            config,
        })
    }

    /// Get the job id.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Get the log file path, if file output is enabled.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        match level {
            LogLevel::Trace => tracing::trace!(job = %self.job_id, "{}", message),
            LogLevel::Debug => tracing::debug!(job = %self.job_id, "{}", message),
            LogLevel::Info => tracing::info!(job = %self.job_id, "{}", message),
            LogLevel::Warn => tracing::warn!(job = %self.job_id, "{}", message),
            LogLevel::Error => tracing::error!(job = %self.job_id, "{}", message),
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Record a progress update, logging it unless filtered.
    ///
    /// Every update lands in the tail buffer. In compact mode only updates
    /// that cross a `progress_step` boundary are logged; otherwise each new
    /// whole percentage is. 100% is always logged.
    ///
    /// Returns true if the update was logged.
    pub fn progress(&self, percent: f64) -> bool {
        self.push_tail(format!("progress {:.2}%", percent));

        let whole = percent.clamp(0.0, 100.0).floor() as u32;
        let mut last = self.last_progress.lock();

        let should_log = match *last {
            None => true,
            Some(prev) if whole >= 100 => prev < 100,
            Some(prev) if self.config.compact => {
                let step = self.config.progress_step.max(1);
                whole / step > prev / step
            }
            Some(prev) => whole > prev,
        };

        if !should_log {
            return false;
        }
        *last = Some(whole);
        drop(last);

        self.log(LogLevel::Info, &format!("Progress: {}%", whole));
        true
    }

    /// Write the tail buffer out (typically after a failure).
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(line));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the log file; later lines only reach tracing and the callback.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn push_tail(&self, line: String) {
        if self.config.error_tail == 0 {
            return;
        }
        let mut buffer = self.tail_buffer.lock();
        if buffer.len() >= self.config.error_tail {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = self.callback {
            callback(formatted);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

fn log_file_name(job: &AcceptedJob) -> String {
    let kind = match job.kind() {
        JobKind::Interpolation => "interpolation",
        JobKind::SketchToImage => "sketch",
    };
    let short_id: String = job.id().chars().take(8).collect();
    format!("{}_{}.log", kind, short_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::get_limits;
    use crate::models::{BatchJobRequest, Tier};
    use crate::validation::validate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn job() -> AcceptedJob {
        validate(&BatchJobRequest::new(2, 12, Tier::Free), &get_limits(Tier::Free)).unwrap()
    }

    fn quiet() -> LogConfig {
        LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn creates_log_file_named_after_job() {
        let dir = tempdir().unwrap();
        let job = job();
        let logger = JobLogger::new(&job, Some(dir.path()), quiet(), None).unwrap();

        let path = logger.log_path().unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("interpolation_"));
        assert!(name.contains(&job.id()[..8]));
    }

    #[test]
    fn no_file_without_log_dir() {
        let logger = JobLogger::new(&job(), None, quiet(), None).unwrap();
        assert!(logger.log_path().is_none());
        logger.info("only to tracing");
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new(&job(), Some(dir.path()), quiet(), None).unwrap();

        logger.phase("Interpolation");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("=== Interpolation ==="));
    }

    #[test]
    fn forwards_to_callback_respecting_level() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: LogCallback = Box::new(move |_line| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let logger = JobLogger::new(&job(), None, quiet(), Some(callback)).unwrap();
        logger.info("one");
        logger.debug("filtered");
        logger.error("two");

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn compact_mode_filters_progress() {
        let config = LogConfig {
            compact: true,
            progress_step: 20,
            ..quiet()
        };
        let logger = JobLogger::new(&job(), None, config, None).unwrap();

        assert!(logger.progress(3.0));
        assert!(!logger.progress(10.5));
        assert!(!logger.progress(19.9));
        assert!(logger.progress(20.0));
        assert!(!logger.progress(25.0));
        assert!(logger.progress(41.0));
        assert!(logger.progress(100.0));
        assert!(!logger.progress(100.0));
    }

    #[test]
    fn verbose_mode_logs_each_whole_percent() {
        let logger = JobLogger::new(&job(), None, LogConfig::verbose(), None).unwrap();
        assert!(logger.progress(1.2));
        assert!(!logger.progress(1.8));
        assert!(logger.progress(2.0));
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let config = LogConfig {
            error_tail: 3,
            ..quiet()
        };
        let logger = JobLogger::new(&job(), None, config, None).unwrap();

        for i in 1..=5 {
            logger.progress(f64::from(i));
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0], "progress 3.00%");
        assert_eq!(tail[2], "progress 5.00%");
    }
}
