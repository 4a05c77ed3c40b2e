use crate::analysis::FileAnalysis;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif; library callers use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, _run_id: &str) {}
    fn on_classify_start(&self, _source_path: &str) {}
    fn on_classify_complete(&self, _processed_emails: u64, _duration_secs: f64) {}
    fn on_analysis_start(&self, _total_files: usize) {}
    fn on_file_analyzed(&self, _index: usize, _total_files: usize, _analysis: &FileAnalysis) {}
    fn on_analysis_complete(&self, _analyses: &[FileAnalysis], _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
