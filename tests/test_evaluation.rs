//! Integration tests for the evaluation engine.
//!
//! Covers normalization, cell and structural accuracy, and the
//! document-level evaluator including its edge cases.

use pdf_table_bench::config::{EvaluationConfig, RaggedRowPolicy};
use pdf_table_bench::evaluation::{
    cell_accuracy, evaluate_extraction, format_results, normalize_rows, normalize_table,
    structure_accuracy, Evaluator,
};
use pdf_table_bench::table::{grid, CellValue, ExtractionOutput, Table};
use proptest::prelude::*;

fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

// =============================================================================
// NORMALIZATION TESTS
// =============================================================================

mod normalize_tests {
    use super::*;

    #[test]
    fn test_trims_and_blanks_nulls() {
        let table = vec![vec![
            CellValue::from("  Revenue\n"),
            CellValue::Null,
            CellValue::from(1204),
        ]];
        assert_eq!(normalize_table(&table), strings(&[&["Revenue", "", "1204"]]));
    }

    #[test]
    fn test_keeps_ragged_shape() {
        let table = grid([vec!["a", "b", "c"], vec!["d"]]);
        let normalized = normalize_table(&table);
        assert_eq!(normalized[0].len(), 3);
        assert_eq!(normalized[1].len(), 1);
    }

    #[test]
    fn test_interior_whitespace_preserved() {
        let table = grid([vec!["  Net  income  "]]);
        assert_eq!(normalize_table(&table), strings(&[&["Net  income"]]));
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(
            rows in prop::collection::vec(
                prop::collection::vec(prop::option::of("[ \\ta-zA-Z0-9,.$%()-]{0,12}"), 0..6),
                0..6,
            )
        ) {
            let table: Vec<Vec<CellValue>> = rows
                .into_iter()
                .map(|row| row.into_iter().map(CellValue::from).collect())
                .collect();
            let once = normalize_table(&table);
            let twice = normalize_rows(&once);
            prop_assert_eq!(twice, once);
        }
    }
}

// =============================================================================
// CELL ACCURACY TESTS
// =============================================================================

mod cell_accuracy_tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        let table = strings(&[&["A", "B"]]);
        let empty: Vec<Vec<String>> = Vec::new();
        assert_eq!(cell_accuracy(&empty, &table), 0.0);
        assert_eq!(cell_accuracy(&table, &empty), 0.0);
        assert_eq!(cell_accuracy(&empty, &empty), 0.0);
    }

    #[test]
    fn test_identical_tables() {
        let table = strings(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&table, &table), 100.0);
    }

    #[test]
    fn test_identical_after_normalization() {
        let predicted = normalize_table(&grid([vec![" A ", "B"], vec!["1", "2\n"]]));
        let truth = normalize_table(&grid([vec!["A", "B"], vec!["1", "2"]]));
        assert_eq!(cell_accuracy(&predicted, &truth), 100.0);
    }

    #[test]
    fn test_position_sensitive() {
        let predicted = strings(&[&["B", "A"], &["2", "1"]]);
        let truth = strings(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 0.0);
    }

    #[test]
    fn test_missing_row_counts_against_prediction() {
        let predicted = strings(&[&["A", "B"]]);
        let truth = strings(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 50.0);
    }

    #[test]
    fn test_extra_columns_not_penalized() {
        let predicted = strings(&[&["A", "B", "extra"], &["1", "2", "extra"]]);
        let truth = strings(&[&["A", "B"], &["1", "2"]]);
        assert_eq!(cell_accuracy(&predicted, &truth), 100.0);
    }

    #[test]
    fn test_bounded() {
        let predicted = strings(&[&["A"], &["1"], &["x"], &["y"]]);
        let truth = strings(&[&["A", "B", "C"]]);
        let score = cell_accuracy(&predicted, &truth);
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 100.0 / 3.0).abs() < 1e-9);
    }
}

// =============================================================================
// STRUCTURAL ACCURACY TESTS
// =============================================================================

mod structure_tests {
    use super::*;

    #[test]
    fn test_matching_dimensions() {
        let table = strings(&[&["a", "b"], &["c", "d"], &["e", "f"]]);
        let metrics = structure_accuracy(&table, &table, RaggedRowPolicy::PadWithEmpty);
        assert!(metrics.row_match);
        assert!(metrics.col_match);
        assert!(metrics.structure_match);
    }

    #[test]
    fn test_missing_row() {
        let predicted = strings(&[&["a", "b"], &["c", "d"]]);
        let truth = strings(&[&["a", "b"], &["c", "d"], &["e", "f"]]);
        let metrics = structure_accuracy(&predicted, &truth, RaggedRowPolicy::PadWithEmpty);
        assert_eq!(metrics.predicted_rows, 2);
        assert_eq!(metrics.ground_truth_rows, 3);
        assert!(!metrics.row_match);
        assert!(metrics.col_match);
        assert!(!metrics.structure_match);
    }

    #[test]
    fn test_columns_from_longest_row() {
        let predicted = strings(&[&["a", "b", "c"], &["d"]]);
        let truth = strings(&[&["a", "b", "c"], &["d", "e", "f"]]);
        let metrics = structure_accuracy(&predicted, &truth, RaggedRowPolicy::PadWithEmpty);
        assert_eq!(metrics.predicted_cols, 3);
        assert!(metrics.structure_match);
    }

    #[test]
    fn test_ragged_rows_mismatch_policy() {
        let predicted = strings(&[&["a", "b", "c"], &["d"]]);
        let truth = strings(&[&["a", "b", "c"], &["d", "e", "f"]]);
        let metrics = structure_accuracy(&predicted, &truth, RaggedRowPolicy::Mismatch);
        assert!(metrics.row_match);
        assert!(!metrics.col_match);
        assert!(!metrics.structure_match);
    }

    #[test]
    fn test_structure_match_iff_both() {
        let shapes: [&[&[&str]]; 4] = [
            &[&["a"]],
            &[&["a", "b"]],
            &[&["a"], &["b"]],
            &[&["a", "b"], &["c", "d"]],
        ];
        for p in shapes {
            for g in shapes {
                let m = structure_accuracy(&strings(p), &strings(g), RaggedRowPolicy::PadWithEmpty);
                assert_eq!(m.structure_match, m.row_match && m.col_match);
            }
        }
    }
}

// =============================================================================
// DOCUMENT EVALUATOR TESTS
// =============================================================================

mod evaluator_tests {
    use super::*;

    #[test]
    fn test_perfect_single_table() {
        let predicted = vec![grid([vec!["Q1", "100"], vec!["Q2", "200"]])];
        let truth = vec![grid([vec!["Q1", "100"], vec!["Q2", "200"]])];
        let result = evaluate_extraction(&predicted, &truth, "pdfplumber");

        assert_eq!(result.avg_cell_accuracy, 100.0);
        assert_eq!(result.structure_match_rate, 100.0);
        assert_eq!(result.num_predicted_tables, 1);
        assert_eq!(result.num_ground_truth_tables, 1);
        assert_eq!(result.table_detection_recall, 100.0);
    }

    #[test]
    fn test_partial_detection_recall() {
        let table = grid([vec!["a"]]);
        let result = evaluate_extraction(
            &[table.clone(), table.clone()],
            &[table.clone(), table.clone(), table],
            "camelot",
        );
        assert!((result.table_detection_recall - 66.67).abs() < 0.01);
        assert_eq!(result.per_table_metrics.len(), 2);
    }

    #[test]
    fn test_empty_ground_truth() {
        let predicted = vec![grid([vec!["a"]])];
        let truth: Vec<Vec<Vec<CellValue>>> = Vec::new();
        let result = evaluate_extraction(&predicted, &truth, "tabula");

        assert_eq!(result.table_detection_recall, 0.0);
        assert_eq!(result.avg_cell_accuracy, 0.0);
        assert_eq!(result.structure_match_rate, 0.0);
        assert!(result.per_table_metrics.is_empty());
    }

    #[test]
    fn test_over_detection_not_clamped() {
        let table = grid([vec!["a"]]);
        let result = evaluate_extraction(&[table.clone(), table.clone()], &[table], "docling");
        assert_eq!(result.table_detection_recall, 200.0);
        assert_eq!(result.per_table_metrics.len(), 1);
    }

    #[test]
    fn test_pairs_by_position() {
        let predicted = vec![grid([vec!["b"]]), grid([vec!["a"]])];
        let truth = vec![grid([vec!["a"]]), grid([vec!["b"]])];
        let result = evaluate_extraction(&predicted, &truth, "gpt4_vision");
        assert_eq!(result.avg_cell_accuracy, 0.0);
        assert_eq!(result.structure_match_rate, 100.0);
        assert_eq!(result.per_table_metrics[1].table_index, 1);
    }

    #[test]
    fn test_evaluates_table_records() {
        let predicted = vec![Table::new(Some(3), 0, grid([vec!["x", "y"]]))];
        let truth = ExtractionOutput::from_json(r#"{"tables": [[["x", "y"]]]}"#).unwrap();
        let result = Evaluator::default().evaluate(&predicted, &truth.tables, "claude_vision");
        assert_eq!(result.avg_cell_accuracy, 100.0);
    }

    #[test]
    fn test_ragged_policy_changes_match_rate() {
        let predicted = vec![grid([vec!["a", "b"], vec!["c"]])];
        let truth = vec![grid([vec!["a", "b"], vec!["c", ""]])];

        let padded = Evaluator::default().evaluate(&predicted, &truth, "pdfplumber");
        assert_eq!(padded.structure_match_rate, 100.0);
        assert_eq!(padded.avg_cell_accuracy, 100.0);

        let strict = Evaluator::new(EvaluationConfig::new().with_ragged_rows(RaggedRowPolicy::Mismatch))
            .evaluate(&predicted, &truth, "pdfplumber");
        assert_eq!(strict.structure_match_rate, 0.0);
        assert_eq!(strict.avg_cell_accuracy, 100.0);
    }

    #[test]
    fn test_result_json_fields() {
        let table = grid([vec!["a"]]);
        let result = evaluate_extraction(&[table.clone()], &[table], "pdfplumber");
        let value = serde_json::to_value(&result).unwrap();

        for key in [
            "method",
            "num_predicted_tables",
            "num_ground_truth_tables",
            "table_detection_recall",
            "per_table_metrics",
            "avg_cell_accuracy",
            "structure_match_rate",
            "evaluation_time",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        let metrics = &value["per_table_metrics"][0];
        assert_eq!(metrics["table_index"], 0);
        assert_eq!(metrics["structure_accuracy"]["structure_match"], true);
    }

    #[test]
    fn test_report_text() {
        let table = grid([vec!["a"]]);
        let result = evaluate_extraction(&[table.clone()], &[table.clone(), table], "camelot");
        let text = format_results(&result);
        assert!(text.contains("Evaluation Results: camelot"));
        assert!(text.contains("Tables Detected: 1 / 2"));
        assert!(text.contains("Detection Recall: 50.00%"));
    }
}
