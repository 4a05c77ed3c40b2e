//! Per-file scoring of classifier result tables.
//!
//! A batch run locates result files under an output path, scores each file
//! independently and optionally merges the classifier's pre-filter counts
//! into the matching report. Per-file errors become `FileAnalysis::Failed`
//! entries; only path-level errors abort the batch.

pub mod category;
pub mod confusion;
pub mod opening;
pub mod report;
pub mod rows;

pub use category::CategoryAnalysis;
pub use confusion::ConfusionMatrix;
pub use opening::SrAnalysis;
pub use report::{
    AnalysisWarning, BasicStats, BatchSummary, FileAnalysis, FileFailure, FileReport,
    OriginalStats, PreFilterStat,
};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::progress::{ProgressReporter, SilentReporter};
use crate::scanner;
use crate::table::{self, ResultTable};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Round to 4 decimals from the exact binary value, ties to even.
pub(crate) fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

pub struct ResultsAnalyzer {
    config: AnalysisConfig,
}

impl ResultsAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze every result file under `out_path`, in discovery order.
    pub fn analyze_results(
        &self,
        out_path: &Path,
        prefilter_stats: Option<&[PreFilterStat]>,
    ) -> Result<Vec<FileAnalysis>> {
        self.analyze_results_with(out_path, prefilter_stats, &SilentReporter)
    }

    pub fn analyze_results_with(
        &self,
        out_path: &Path,
        prefilter_stats: Option<&[PreFilterStat]>,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<FileAnalysis>> {
        let files = scanner::locate_result_files(out_path, &self.config)?;
        let lookup = prefilter_lookup(prefilter_stats);

        info!("Analyzing {} result file(s) in {}", files.len(), out_path.display());
        reporter.on_analysis_start(files.len());
        let start = Instant::now();

        let analyses: Vec<FileAnalysis> = files
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let analysis = self.analyze_entry(path, &lookup);
                reporter.on_file_analyzed(index + 1, files.len(), &analysis);
                analysis
            })
            .collect();

        reporter.on_analysis_complete(&analyses, start.elapsed().as_secs_f64());
        Ok(analyses)
    }

    /// Same output as `analyze_results`, with files scored on the rayon pool.
    pub fn analyze_results_parallel(
        &self,
        out_path: &Path,
        prefilter_stats: Option<&[PreFilterStat]>,
    ) -> Result<Vec<FileAnalysis>> {
        let files = scanner::locate_result_files(out_path, &self.config)?;
        let lookup = prefilter_lookup(prefilter_stats);

        info!(
            "Analyzing {} result file(s) in {} (parallel)",
            files.len(),
            out_path.display()
        );

        // indexed collect keeps discovery order
        Ok(files
            .par_iter()
            .map(|path| self.analyze_entry(path, &lookup))
            .collect())
    }

    /// Score one result file. Errors are returned to the caller, not recorded.
    pub fn analyze_single_file(&self, path: &Path) -> Result<FileReport> {
        let table = table::load_table(path)?;
        let file_name = file_name_of(path);
        self.analyze_table(&file_name, &table)
    }

    pub fn analyze_table(&self, file_name: &str, table: &ResultTable) -> Result<FileReport> {
        let rows = rows::classify_rows(table, &self.config)?;

        let gt_sr_creation_count = rows.iter().filter(|r| r.gt_creation).count();
        let basic_stats = BasicStats {
            total_emails: rows.len(),
            gt_sr_creation_count,
            gt_sr_archive_count: rows.len() - gt_sr_creation_count,
        };

        let (sr_analysis, warnings) = opening::analyze_opening(&rows, &self.config.labels);
        for warning in &warnings {
            warn!("{}: {}", file_name, warning);
        }
        let category_analysis = category::analyze_categories(&rows, &self.config);

        Ok(FileReport {
            file_name: file_name.to_string(),
            basic_stats,
            sr_analysis,
            category_analysis,
            original_stats: None,
            filtered_total: None,
            warnings,
        })
    }

    fn analyze_entry(&self, path: &Path, lookup: &HashMap<String, PreFilterStat>) -> FileAnalysis {
        let file_name = file_name_of(path);
        match self.analyze_single_file(path) {
            Ok(mut report) => {
                let source_name = scanner::source_name_for(&file_name, &self.config.result_marker);
                if let Some(stat) = lookup.get(&source_name) {
                    debug!("Merging pre-filter stats for {} from {}", file_name, source_name);
                    report.original_stats = Some(stat.original_stats());
                    report.filtered_total = Some(stat.filtered_total);
                }
                FileAnalysis::Success(report)
            }
            Err(err) => {
                error!("Failed to analyze {}: {}", path.display(), err);
                FileAnalysis::Failed(FileFailure {
                    file_name,
                    error_message: err.to_string(),
                })
            }
        }
    }
}

/// Later entries for the same source file replace earlier ones.
fn prefilter_lookup(stats: Option<&[PreFilterStat]>) -> HashMap<String, PreFilterStat> {
    let mut lookup = HashMap::new();
    for stat in stats.unwrap_or_default() {
        if !stat.is_consistent() {
            warn!(
                "Pre-filter stats for {} are inconsistent: {} SR + {} archive != {} total",
                stat.source_file,
                stat.original_sr_count,
                stat.original_archive_count,
                stat.original_total
            );
        }
        lookup.insert(stat.source_file.clone(), stat.clone());
    }
    lookup
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(2.0 / 3.0), 0.6667);
        assert_eq!(round4(8.0 / 9.0), 0.8889);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.03125), 0.0312);
        assert_eq!(round4(0.09375), 0.0938);
    }

    #[test]
    fn test_prefilter_lookup_last_entry_wins() {
        let stat = |total| PreFilterStat {
            source_file: "a.csv".to_string(),
            original_total: total,
            original_sr_count: 0,
            original_archive_count: total,
            filtered_total: 0,
        };
        let stats = vec![stat(1), stat(2)];
        let lookup = prefilter_lookup(Some(stats.as_slice()));
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup["a.csv"].original_total, 2);
        assert!(prefilter_lookup(None).is_empty());
    }
}
