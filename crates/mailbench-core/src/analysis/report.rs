use super::category::CategoryAnalysis;
use super::opening::SrAnalysis;
use serde::{Deserialize, Serialize};

/// Outcome of analyzing one result file. Exactly one variant per discovered file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileAnalysis {
    Success(FileReport),
    Failed(FileFailure),
}

impl FileAnalysis {
    pub fn file_name(&self) -> &str {
        match self {
            FileAnalysis::Success(report) => &report.file_name,
            FileAnalysis::Failed(failure) => &failure.file_name,
        }
    }

    pub fn as_success(&self) -> Option<&FileReport> {
        match self {
            FileAnalysis::Success(report) => Some(report),
            FileAnalysis::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileAnalysis::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub basic_stats: BasicStats,
    pub sr_analysis: SrAnalysis,
    pub category_analysis: CategoryAnalysis,
    #[serde(default)]
    pub original_stats: Option<OriginalStats>,
    #[serde(default)]
    pub filtered_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AnalysisWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error_message: String,
}

/// Counts over the full row set of a result file (after any pre-filtering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicStats {
    pub total_emails: usize,
    pub gt_sr_creation_count: usize,
    pub gt_sr_archive_count: usize,
}

/// Source-file counts from before the classifier's filters ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalStats {
    pub total_emails: u64,
    pub sr_count: u64,
    pub archive_count: u64,
}

/// Per-source counts reported by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreFilterStat {
    pub source_file: String,
    pub original_total: u64,
    pub original_sr_count: u64,
    pub original_archive_count: u64,
    pub filtered_total: u64,
}

impl PreFilterStat {
    pub fn is_consistent(&self) -> bool {
        self.original_sr_count + self.original_archive_count == self.original_total
    }

    pub fn original_stats(&self) -> OriginalStats {
        OriginalStats {
            total_emails: self.original_total,
            sr_count: self.original_sr_count,
            archive_count: self.original_archive_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Predicted opening values outside the creation/archive/review labels.
    UnknownOpeningLabel { label: String, rows: usize },
    /// Rows with no predicted opening at all.
    MissingOpeningPrediction { rows: usize },
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisWarning::UnknownOpeningLabel { label, rows } => {
                write!(f, "{} row(s) with unknown predicted opening '{}'", rows, label)
            }
            AnalysisWarning::MissingOpeningPrediction { rows } => {
                write!(f, "{} row(s) with no predicted opening", rows)
            }
        }
    }
}

/// Totals across the successful entries of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files_total: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub total_emails: usize,
    pub gt_sr_creation_count: usize,
    pub gt_sr_archive_count: usize,
    pub predicted_sr_count: usize,
    pub predicted_archive_count: usize,
    pub predicted_review_count: usize,
}

impl BatchSummary {
    pub fn from_analyses(analyses: &[FileAnalysis]) -> Self {
        let mut summary = Self {
            files_total: analyses.len(),
            ..Self::default()
        };

        for analysis in analyses {
            match analysis {
                FileAnalysis::Success(report) => {
                    summary.files_succeeded += 1;
                    summary.total_emails += report.basic_stats.total_emails;
                    summary.gt_sr_creation_count += report.basic_stats.gt_sr_creation_count;
                    summary.gt_sr_archive_count += report.basic_stats.gt_sr_archive_count;
                    summary.predicted_sr_count += report.sr_analysis.predicted_sr_count;
                    summary.predicted_archive_count += report.sr_analysis.predicted_archive_count;
                    summary.predicted_review_count += report.sr_analysis.predicted_review_count;
                }
                FileAnalysis::Failed(_) => summary.files_failed += 1,
            }
        }

        summary
    }
}
