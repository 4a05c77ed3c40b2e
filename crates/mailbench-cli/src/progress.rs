use indicatif::{ProgressBar, ProgressStyle};
use mailbench_core::analysis::FileAnalysis;
use mailbench_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Classify phase: spinner (the classifier reports nothing until it exits)
/// - Analysis phase: progress bar over result files
#[derive(Default)]
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_classify_start(&self, source_path: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message(format!("Running classifier on {}...", source_path));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_classify_complete(&self, processed_emails: u64, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Classifier complete: {} emails processed in {:.2}s",
            processed_emails, duration_secs
        );
    }

    fn on_analysis_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Analyzing [{bar:30.cyan/dim}] {pos}/{len} files",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_analyzed(&self, index: usize, _total_files: usize, _analysis: &FileAnalysis) {
        self.with_bar(|pb| pb.set_position(index as u64));
    }

    fn on_analysis_complete(&self, analyses: &[FileAnalysis], duration_secs: f64) {
        self.finish_bar();
        let failed = analyses.iter().filter(|a| !a.is_success()).count();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Analysis complete: {} file(s), {} failed in {:.2}s",
            analyses.len(),
            failed,
            duration_secs
        );
    }
}
