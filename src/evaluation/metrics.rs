//! Cell-level and structural accuracy for one predicted/ground-truth pair.
//!
//! Both functions take normalized tables (see [`super::normalize_table`]).
//! Comparison is positional: row `i`, column `j` of the prediction is only
//! ever compared with row `i`, column `j` of the ground truth.

use crate::config::RaggedRowPolicy;
use serde::{Deserialize, Serialize};

/// Dimension agreement between a prediction and its ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureMetrics {
    /// Rows in the prediction
    pub predicted_rows: usize,
    /// Rows in the ground truth
    pub ground_truth_rows: usize,
    /// Columns in the prediction (longest row)
    pub predicted_cols: usize,
    /// Columns in the ground truth (longest row)
    pub ground_truth_cols: usize,
    /// Row counts are equal
    pub row_match: bool,
    /// Column counts are equal
    pub col_match: bool,
    /// Both counts are equal
    pub structure_match: bool,
}

fn column_count<S>(table: &[Vec<S>]) -> usize {
    table.iter().map(Vec::len).max().unwrap_or(0)
}

fn cell_text<S: AsRef<str>>(row: &[S], col: usize) -> &str {
    row.get(col).map_or("", |c| c.as_ref())
}

fn is_rectangular<S>(table: &[Vec<S>]) -> bool {
    table.windows(2).all(|pair| pair[0].len() == pair[1].len())
}

/// Percentage of ground-truth cells reproduced exactly by the prediction.
///
/// The denominator is the full ground-truth grid (`rows × longest row`).
/// Only the overlapping window is compared, so extra predicted rows or
/// columns are neither rewarded nor penalized. Cells missing from a ragged
/// row compare as empty strings. Returns 0.0 when either table is empty.
pub fn cell_accuracy<S: AsRef<str>>(predicted: &[Vec<S>], ground_truth: &[Vec<S>]) -> f64 {
    if predicted.is_empty() || ground_truth.is_empty() {
        return 0.0;
    }

    let pred_cols = column_count(predicted);
    let gt_cols = column_count(ground_truth);

    let total_cells = ground_truth.len() * gt_cols;
    if total_cells == 0 {
        return 0.0;
    }

    let mut correct_cells = 0usize;
    for (pred_row, gt_row) in predicted.iter().zip(ground_truth) {
        for col in 0..pred_cols.min(gt_cols) {
            if cell_text(pred_row, col) == cell_text(gt_row, col) {
                correct_cells += 1;
            }
        }
    }

    let accuracy = correct_cells as f64 / total_cells as f64 * 100.0;
    debug_assert!((0.0..=100.0).contains(&accuracy), "cell accuracy out of range: {}", accuracy);
    accuracy
}

/// Compare row and column counts.
///
/// Two empty tables match vacuously. Under [`RaggedRowPolicy::Mismatch`]
/// the column counts only match when both grids are rectangular.
pub fn structure_accuracy<S>(
    predicted: &[Vec<S>],
    ground_truth: &[Vec<S>],
    policy: RaggedRowPolicy,
) -> StructureMetrics {
    let predicted_rows = predicted.len();
    let ground_truth_rows = ground_truth.len();
    let predicted_cols = column_count(predicted);
    let ground_truth_cols = column_count(ground_truth);

    let row_match = predicted_rows == ground_truth_rows;
    let col_match = predicted_cols == ground_truth_cols
        && match policy {
            RaggedRowPolicy::PadWithEmpty => true,
            RaggedRowPolicy::Mismatch => is_rectangular(predicted) && is_rectangular(ground_truth),
        };

    StructureMetrics {
        predicted_rows,
        ground_truth_rows,
        predicted_cols,
        ground_truth_cols,
        row_match,
        col_match,
        structure_match: row_match && col_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_identical_tables() {
        let table = t(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&table, &table), 100.0);
    }

    #[test]
    fn test_swapped_columns_score_zero() {
        let predicted = t(&[&["B", "A"], &["2", "1"]]);
        let truth = t(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        let table = t(&[&["A"]]);
        let empty: Vec<Vec<String>> = Vec::new();
        assert_eq!(cell_accuracy(&empty, &table), 0.0);
        assert_eq!(cell_accuracy(&table, &empty), 0.0);
    }

    #[test]
    fn test_ground_truth_of_empty_rows() {
        let predicted = t(&[&["A"]]);
        let truth: Vec<Vec<String>> = vec![Vec::new(), Vec::new()];
        assert_eq!(cell_accuracy(&predicted, &truth), 0.0);
    }

    #[test]
    fn test_missing_rows_are_penalized() {
        let predicted = t(&[&["A", "B"]]);
        let truth = t(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 50.0);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let predicted = t(&[&["A", "B", "extra"], &["1", "2", "extra"]]);
        let truth = t(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 100.0);
    }

    #[test]
    fn test_ragged_cells_compare_as_empty() {
        // Short predicted row matches an empty ground-truth cell.
        let predicted = t(&[&["A", "B"], &["1"]]);
        let truth = t(&[&["A", "B"], &["1", ""]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 100.0);
    }

    #[test]
    fn test_structure_match() {
        let predicted = t(&[&["a", "b"], &["c", "d"], &["e", "f"]]);
        let truth = t(&[&["1", "2"], &["3", "4"], &["5", "6"]]);
        let metrics = structure_accuracy(&predicted, &truth, RaggedRowPolicy::PadWithEmpty);
        assert!(metrics.structure_match);
        assert_eq!(metrics.predicted_cols, 2);
    }

    #[test]
    fn test_structure_row_mismatch() {
        let predicted = t(&[&["a", "b"], &["c", "d"]]);
        let truth = t(&[&["1", "2"], &["3", "4"], &["5", "6"]]);
        let metrics = structure_accuracy(&predicted, &truth, RaggedRowPolicy::PadWithEmpty);
        assert!(!metrics.row_match);
        assert!(metrics.col_match);
        assert!(!metrics.structure_match);
    }

    #[test]
    fn test_both_empty_match_vacuously() {
        let empty: Vec<Vec<String>> = Vec::new();
        let metrics = structure_accuracy(&empty, &empty, RaggedRowPolicy::PadWithEmpty);
        assert_eq!(metrics.predicted_rows, 0);
        assert_eq!(metrics.ground_truth_cols, 0);
        assert!(metrics.structure_match);
    }

    #[test]
    fn test_ragged_policy() {
        let predicted = t(&[&["a", "b"], &["c"]]);
        let truth = t(&[&["1", "2"], &["3", "4"]]);

        let padded = structure_accuracy(&predicted, &truth, RaggedRowPolicy::PadWithEmpty);
        assert!(padded.structure_match);

        let strict = structure_accuracy(&predicted, &truth, RaggedRowPolicy::Mismatch);
        assert!(strict.row_match);
        assert!(!strict.col_match);
        assert!(!strict.structure_match);
    }
}
