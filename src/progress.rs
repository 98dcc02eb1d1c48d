//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Spinner-per-stage progress for the comparison pipeline
#[derive(Debug)]
pub struct ProgressReporter {
    current: Option<ProgressBar>,
    show_progress: bool,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            current: None,
            show_progress,
            start_time: Instant::now(),
        }
    }

    /// Start a new stage, clearing the spinner of the previous one
    pub fn stage(&mut self, message: &str) {
        log::debug!("{}", message);
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
        if self.show_progress {
            self.current = Some(create_spinner(message));
        }
    }

    /// Finish the current stage, leaving `message` on screen
    pub fn finish_stage(&mut self, message: &str) {
        if let Some(pb) = self.current.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Finish the current stage and report total elapsed time
    pub fn finish(&mut self, message: &str) {
        let elapsed = self.start_time.elapsed();
        self.finish_stage(&format!("{} ({:.2}s)", message, elapsed.as_secs_f64()));
        log::debug!("{} in {:?}", message, elapsed);
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
