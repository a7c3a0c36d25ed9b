//! Evaluation engine: scores predicted tables against ground truth.
//!
//! # Metrics
//!
//! - **Cell accuracy**: percentage of ground-truth cells reproduced exactly,
//!   compared position by position after [normalization](normalize_table)
//! - **Structural accuracy**: whether row and column counts agree
//! - **Detection recall**: predicted table count over ground-truth count
//!
//! # Example
//!
//! ```
//! use pdf_table_bench::evaluation::evaluate_extraction;
//! use pdf_table_bench::table::grid;
//!
//! let predicted = vec![grid([vec!["Q1", "100"], vec!["Q2", "200"]])];
//! let truth = vec![grid([vec!["Q1", "100"], vec!["Q2", "200"]])];
//!
//! let result = evaluate_extraction(&predicted, &truth, "pdfplumber");
//! assert_eq!(result.avg_cell_accuracy, 100.0);
//! assert_eq!(result.structure_match_rate, 100.0);
//! ```

mod evaluator;
mod metrics;
mod normalize;
pub mod report;

pub use evaluator::{evaluate_extraction, CellGrid, EvaluationResult, Evaluator, TableMetrics};
pub use metrics::{cell_accuracy, structure_accuracy, StructureMetrics};
pub use normalize::{normalize_rows, normalize_table};
pub use report::{format_results, load_results, print_results, save_results};
