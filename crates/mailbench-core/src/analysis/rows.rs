use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::table::{Cell, ResultTable};

/// The fields of one result row that scoring reads, resolved to labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    /// Ground truth: an SR was actually created for this email.
    pub gt_creation: bool,
    pub opening: Option<String>,
    pub gt_category: Option<String>,
    pub pred_category: Option<String>,
}

impl ClassifiedRow {
    pub fn predicted(&self, label: &str) -> bool {
        self.opening.as_deref() == Some(label)
    }
}

/// Present and not numeric zero.
pub fn is_sr_creation(sr_id: &Cell) -> bool {
    !sr_id.is_null() && !sr_id.is_zero()
}

/// Resolve a loaded table into rows. The predicted category column is only
/// required when some row is predicted as creation, and the ground-truth category
/// column only when such a row is also a true SR creation.
pub fn classify_rows(table: &ResultTable, config: &AnalysisConfig) -> Result<Vec<ClassifiedRow>> {
    let required = table.require_columns(&[
        config.sr_id_column.as_str(),
        config.predicted_opening_column.as_str(),
    ])?;
    let (sr_idx, opening_idx) = (required[0], required[1]);

    let mut rows: Vec<ClassifiedRow> = table
        .rows()
        .iter()
        .map(|row| ClassifiedRow {
            gt_creation: is_sr_creation(&row[sr_idx]),
            opening: row[opening_idx].label(),
            gt_category: None,
            pred_category: None,
        })
        .collect();

    let creation = config.labels.creation.as_str();
    let any_predicted = rows.iter().any(|row| row.predicted(creation));
    let any_scored = rows
        .iter()
        .any(|row| row.gt_creation && row.predicted(creation));

    let mut needed = Vec::new();
    if any_scored {
        needed.push(config.ground_truth_category_column.as_str());
    }
    if any_predicted {
        needed.push(config.predicted_category_column.as_str());
    }
    let category_cols = table.require_columns(&needed)?;
    let (gt_idx, pred_idx) = match category_cols.as_slice() {
        [gt, pred] => (Some(*gt), Some(*pred)),
        [pred] => (None, Some(*pred)),
        _ => (None, None),
    };

    for (row, cells) in rows.iter_mut().zip(table.rows()) {
        row.gt_category = gt_idx.and_then(|idx| cells[idx].label());
        row.pred_category = pred_idx.and_then(|idx| cells[idx].label());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ground_truth_depends_only_on_identifier() {
        assert!(is_sr_creation(&Cell::Int(12)));
        assert!(is_sr_creation(&Cell::Text("SR-0042".to_string())));
        assert!(!is_sr_creation(&Cell::Int(0)));
        assert!(!is_sr_creation(&Cell::Float(0.0)));
        assert!(!is_sr_creation(&Cell::Empty));
        assert!(!is_sr_creation(&Cell::Float(f64::NAN)));
    }

    #[test]
    fn test_sr_only_table_does_not_need_category_columns() {
        let table = ResultTable::new(
            cols(&["sr_id", "predicted_opening"]),
            vec![
                vec![Cell::Int(1), Cell::Text("Archive".to_string())],
                vec![Cell::Empty, Cell::Text("Review".to_string())],
            ],
        );
        let rows = classify_rows(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].gt_creation);
        assert_eq!(rows[1].opening.as_deref(), Some("Review"));
    }

    #[test]
    fn test_creation_predictions_require_category_columns() {
        let table = ResultTable::new(
            cols(&["sr_id", "predicted_opening"]),
            vec![vec![Cell::Int(1), Cell::Text("SR Creation".to_string())]],
        );
        match classify_rows(&table, &AnalysisConfig::default()) {
            Err(Error::MalformedTable(missing)) => {
                assert_eq!(missing, vec!["quickfill", "predicted_quickfill"])
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_ground_truth_category_only_needed_for_true_creations() {
        let table = ResultTable::new(
            cols(&["sr_id", "predicted_opening", "predicted_quickfill"]),
            vec![
                vec![
                    Cell::Int(0),
                    Cell::Text("SR Creation".to_string()),
                    Cell::Text("Tech".to_string()),
                ],
                vec![Cell::Int(7), Cell::Text("Archive".to_string()), Cell::Empty],
            ],
        );
        let rows = classify_rows(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(rows[0].pred_category.as_deref(), Some("Tech"));
        assert_eq!(rows[0].gt_category, None);
        assert_eq!(rows[1].pred_category, None);
    }

    #[test]
    fn test_missing_identifier_column_is_malformed() {
        let table = ResultTable::new(cols(&["predicted_opening"]), vec![]);
        assert!(matches!(
            classify_rows(&table, &AnalysisConfig::default()),
            Err(Error::MalformedTable(_))
        ));
    }
}
