use super::report::AnalysisWarning;
use super::rows::ClassifiedRow;
use super::round4;
use crate::config::OpeningLabels;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores of the predicted opening (SR creation / archive / review).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SrAnalysis {
    pub predicted_sr_count: usize,
    pub predicted_archive_count: usize,
    pub predicted_review_count: usize,
    pub sr_creation_precision: Option<f64>,
    pub archive_precision: Option<f64>,
    pub overall_accuracy: Option<f64>,
}

/// Precision uses predictions as the denominator. Accuracy skips review rows,
/// which have no comparable ground truth.
pub fn analyze_opening(
    rows: &[ClassifiedRow],
    labels: &OpeningLabels,
) -> (SrAnalysis, Vec<AnalysisWarning>) {
    let mut analysis = SrAnalysis::default();
    let mut correct_sr = 0usize;
    let mut correct_archive = 0usize;
    let mut eligible = 0usize;
    let mut matched = 0usize;
    let mut unknown: BTreeMap<&str, usize> = BTreeMap::new();
    let mut missing = 0usize;

    for row in rows {
        let opening = row.opening.as_deref();
        if opening == Some(labels.creation.as_str()) {
            analysis.predicted_sr_count += 1;
            if row.gt_creation {
                correct_sr += 1;
            }
        } else if opening == Some(labels.archive.as_str()) {
            analysis.predicted_archive_count += 1;
            if !row.gt_creation {
                correct_archive += 1;
            }
        } else if opening == Some(labels.review.as_str()) {
            analysis.predicted_review_count += 1;
            continue;
        } else {
            match opening {
                Some(label) => *unknown.entry(label).or_default() += 1,
                None => missing += 1,
            }
        }

        eligible += 1;
        let truth = if row.gt_creation {
            labels.creation.as_str()
        } else {
            labels.archive.as_str()
        };
        if opening == Some(truth) {
            matched += 1;
        }
    }

    analysis.sr_creation_precision = ratio(correct_sr, analysis.predicted_sr_count);
    analysis.archive_precision = ratio(correct_archive, analysis.predicted_archive_count);
    analysis.overall_accuracy = ratio(matched, eligible);

    let mut warnings: Vec<AnalysisWarning> = unknown
        .into_iter()
        .map(|(label, rows)| AnalysisWarning::UnknownOpeningLabel {
            label: label.to_string(),
            rows,
        })
        .collect();
    if missing > 0 {
        warnings.push(AnalysisWarning::MissingOpeningPrediction { rows: missing });
    }

    (analysis, warnings)
}

pub(crate) fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(round4(numerator as f64 / denominator as f64))
    }
}
