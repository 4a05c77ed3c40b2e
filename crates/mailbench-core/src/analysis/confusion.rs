use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Dense true-label × predicted-label counts over a sorted label set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub matrix: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ConfusionMatrix {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        let labels: BTreeSet<&str> = pairs
            .clone()
            .into_iter()
            .flat_map(|(truth, pred)| [truth, pred])
            .collect();

        let mut matrix: BTreeMap<String, BTreeMap<String, usize>> = labels
            .iter()
            .map(|truth| {
                let row = labels.iter().map(|pred| (pred.to_string(), 0)).collect();
                (truth.to_string(), row)
            })
            .collect();

        for (truth, pred) in pairs {
            if let Some(count) = matrix.get_mut(truth).and_then(|row| row.get_mut(pred)) {
                *count += 1;
            }
        }

        Self {
            labels: labels.into_iter().map(str::to_string).collect(),
            matrix,
        }
    }

    pub fn get(&self, truth: &str, pred: &str) -> usize {
        self.matrix
            .get(truth)
            .and_then(|row| row.get(pred))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.matrix.values().flat_map(|row| row.values()).sum()
    }

    pub fn correct(&self) -> usize {
        self.labels.iter().map(|label| self.get(label, label)).sum()
    }
}
