use super::confusion::ConfusionMatrix;
use super::opening::ratio;
use super::rows::ClassifiedRow;
use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores of the category (quickfill) prediction, over rows predicted as SR creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub total_categories_predicted: usize,
    #[serde(default)]
    pub uncategorized_count: usize,
    pub distribution: BTreeMap<String, usize>,
    pub special_category_counts: BTreeMap<String, usize>,
    pub confusion_matrix: Option<ConfusionMatrix>,
    pub accuracy: Option<f64>,
}

pub fn analyze_categories(rows: &[ClassifiedRow], config: &AnalysisConfig) -> CategoryAnalysis {
    let creation = config.labels.creation.as_str();
    let predicted: Vec<&ClassifiedRow> = rows.iter().filter(|r| r.predicted(creation)).collect();

    if predicted.is_empty() {
        return CategoryAnalysis::default();
    }

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut uncategorized_count = 0;
    for row in &predicted {
        match &row.pred_category {
            Some(category) => *distribution.entry(category.clone()).or_default() += 1,
            None => uncategorized_count += 1,
        }
    }

    let special_category_counts = config
        .special_categories
        .iter()
        .map(|label| (label.clone(), distribution.get(label).copied().unwrap_or(0)))
        .collect();

    // Only true SR creations carry a ground-truth category to compare against.
    let scored: Vec<(&str, &str)> = predicted
        .iter()
        .filter(|row| row.gt_creation)
        .filter_map(|row| match (&row.gt_category, &row.pred_category) {
            (Some(truth), Some(pred)) => Some((truth.as_str(), pred.as_str())),
            _ => None,
        })
        .collect();

    let (confusion_matrix, accuracy) = if scored.is_empty() {
        (None, None)
    } else {
        let matrix = ConfusionMatrix::from_pairs(scored.iter().copied());
        let accuracy = ratio(matrix.correct(), matrix.total());
        (Some(matrix), accuracy)
    };

    CategoryAnalysis {
        total_categories_predicted: predicted.len() - uncategorized_count,
        uncategorized_count,
        distribution,
        special_category_counts,
        confusion_matrix,
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gt: bool, opening: &str, gt_cat: Option<&str>, pred_cat: Option<&str>) -> ClassifiedRow {
        ClassifiedRow {
            gt_creation: gt,
            opening: Some(opening.to_string()),
            gt_category: gt_cat.map(str::to_string),
            pred_category: pred_cat.map(str::to_string),
        }
    }

    fn config_with_watch_list(labels: &[&str]) -> AnalysisConfig {
        AnalysisConfig {
            special_categories: labels.iter().map(|s| s.to_string()).collect(),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_no_creation_predictions_is_an_empty_analysis() {
        let rows = vec![row(true, "Archive", Some("Billing"), Some("Billing"))];
        let analysis = analyze_categories(&rows, &config_with_watch_list(&["Billing"]));
        assert_eq!(analysis, CategoryAnalysis::default());
        assert!(analysis.special_category_counts.is_empty());
    }

    #[test]
    fn test_distribution_covers_every_creation_prediction() {
        let rows = vec![
            row(true, "SR Creation", Some("Billing"), Some("Billing")),
            row(false, "SR Creation", None, Some("Tech")),
            row(true, "SR Creation", Some("Tech"), None),
            row(true, "Archive", Some("Tech"), Some("Tech")),
        ];
        let analysis = analyze_categories(&rows, &config_with_watch_list(&["Tech", "Refund"]));

        let distributed: usize = analysis.distribution.values().sum();
        assert_eq!(distributed + analysis.uncategorized_count, 3);
        assert_eq!(analysis.total_categories_predicted, 2);
        assert_eq!(analysis.special_category_counts["Tech"], 1);
        assert_eq!(analysis.special_category_counts["Refund"], 0);
    }

    #[test]
    fn test_accuracy_scope_excludes_incomplete_rows() {
        let rows = vec![
            row(true, "SR Creation", Some("Billing"), Some("Billing")),
            row(true, "SR Creation", Some("Billing"), Some("Tech")),
            row(false, "SR Creation", Some("Tech"), Some("Refund")),
            row(true, "SR Creation", None, Some("Tech")),
            row(true, "SR Creation", Some("Tech"), None),
        ];
        let analysis = analyze_categories(&rows, &AnalysisConfig::default());

        assert_eq!(analysis.accuracy, Some(0.5));
        let cm = analysis.confusion_matrix.unwrap();
        assert_eq!(cm.labels, vec!["Billing", "Tech"]);
        assert_eq!(cm.total(), 2);
        assert_eq!(cm.get("Billing", "Tech"), 1);
        assert_eq!(cm.get("Tech", "Billing"), 0);
    }

    #[test]
    fn test_no_comparable_rows_gives_null_matrix() {
        let rows = vec![row(false, "SR Creation", None, Some("Billing"))];
        let analysis = analyze_categories(&rows, &AnalysisConfig::default());
        assert_eq!(analysis.total_categories_predicted, 1);
        assert_eq!(analysis.confusion_matrix, None);
        assert_eq!(analysis.accuracy, None);
    }
}
