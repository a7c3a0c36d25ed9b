//! Document-level evaluation of predicted tables against ground truth.

use super::metrics::{cell_accuracy, structure_accuracy, StructureMetrics};
use super::normalize::normalize_table;
use crate::config::EvaluationConfig;
use crate::table::{CellValue, Table};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Anything that exposes a cell grid.
pub trait CellGrid {
    /// Rows of cells.
    fn cells(&self) -> &[Vec<CellValue>];
}

impl CellGrid for Table {
    fn cells(&self) -> &[Vec<CellValue>] {
        self.data()
    }
}

impl CellGrid for Vec<Vec<CellValue>> {
    fn cells(&self) -> &[Vec<CellValue>] {
        self
    }
}

impl<T: CellGrid + ?Sized> CellGrid for &T {
    fn cells(&self) -> &[Vec<CellValue>] {
        (**self).cells()
    }
}

/// Scores for one positional pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetrics {
    /// Position of the pair in both lists
    pub table_index: usize,
    /// Exact-match cell percentage
    pub cell_accuracy: f64,
    /// Dimension agreement
    pub structure_accuracy: StructureMetrics,
}

/// Evaluation of one method's tables for a document (or a whole run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Method label
    pub method: String,
    /// Tables the method produced
    pub num_predicted_tables: usize,
    /// Tables in the ground truth
    pub num_ground_truth_tables: usize,
    /// Predicted / ground-truth table count, as a percentage
    pub table_detection_recall: f64,
    /// Per-pair scores
    pub per_table_metrics: Vec<TableMetrics>,
    /// Mean cell accuracy over compared pairs
    pub avg_cell_accuracy: f64,
    /// Percentage of compared pairs with matching dimensions
    pub structure_match_rate: f64,
    /// Wall-clock evaluation time in seconds
    pub evaluation_time: f64,
}

impl EvaluationResult {
    /// Number of pairs that were compared.
    pub fn num_compared(&self) -> usize {
        self.per_table_metrics.len()
    }
}

/// Scores predicted tables against ground truth.
///
/// Pairing is strictly positional. Nothing here fails: empty or ragged input
/// degrades to zero-valued metrics so a broken extractor shows up as a 0%
/// score instead of aborting a batch.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate one method's tables.
    pub fn evaluate<P: CellGrid, G: CellGrid>(
        &self,
        predicted_tables: &[P],
        ground_truth_tables: &[G],
        method_name: &str,
    ) -> EvaluationResult {
        let start = Instant::now();

        let num_predicted = predicted_tables.len();
        let num_ground_truth = ground_truth_tables.len();
        let table_detection_recall = percentage(num_predicted as f64, num_ground_truth);

        let per_table_metrics: Vec<TableMetrics> = predicted_tables
            .iter()
            .zip(ground_truth_tables)
            .enumerate()
            .map(|(table_index, (pred, gt))| {
                let pred_norm = normalize_table(pred.cells());
                let gt_norm = normalize_table(gt.cells());
                TableMetrics {
                    table_index,
                    cell_accuracy: cell_accuracy(&pred_norm, &gt_norm),
                    structure_accuracy: structure_accuracy(
                        &pred_norm,
                        &gt_norm,
                        self.config.ragged_rows,
                    ),
                }
            })
            .collect();

        let num_compared = per_table_metrics.len();
        let total_cell_accuracy: f64 = per_table_metrics.iter().map(|m| m.cell_accuracy).sum();
        let structure_matches = per_table_metrics
            .iter()
            .filter(|m| m.structure_accuracy.structure_match)
            .count();

        let avg_cell_accuracy = if num_compared > 0 {
            total_cell_accuracy / num_compared as f64
        } else {
            0.0
        };
        let structure_match_rate = percentage(structure_matches as f64, num_compared);

        log::debug!(
            "{}: compared {} of {} predicted / {} ground-truth tables",
            method_name,
            num_compared,
            num_predicted,
            num_ground_truth
        );

        EvaluationResult {
            method: method_name.to_string(),
            num_predicted_tables: num_predicted,
            num_ground_truth_tables: num_ground_truth,
            table_detection_recall,
            per_table_metrics,
            avg_cell_accuracy,
            structure_match_rate,
            evaluation_time: start.elapsed().as_secs_f64(),
        }
    }
}

fn percentage(numerator: f64, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator / denominator as f64 * 100.0
    } else {
        0.0
    }
}

/// Evaluate with the default configuration.
pub fn evaluate_extraction<P: CellGrid, G: CellGrid>(
    predicted_tables: &[P],
    ground_truth_tables: &[G],
    method_name: &str,
) -> EvaluationResult {
    Evaluator::default().evaluate(predicted_tables, ground_truth_tables, method_name)
}
