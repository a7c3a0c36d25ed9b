//! Cell normalization applied before any comparison.

use crate::table::CellValue;

/// Normalize a table to rows of trimmed strings.
///
/// Null cells become empty strings; everything else is converted to its
/// string form with surrounding whitespace stripped. Ragged rows keep their
/// length.
pub fn normalize_table(table: &[Vec<CellValue>]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_text().map(|text| text.trim().to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Normalize rows that are already textual.
///
/// Same trimming as [`normalize_table`]; applying it to normalized output
/// changes nothing.
pub fn normalize_rows<S: AsRef<str>>(table: &[Vec<S>]) -> Vec<Vec<String>> {
    table
        .iter()
        .map(|row| row.iter().map(|cell| cell.as_ref().trim().to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid;

    #[test]
    fn test_null_becomes_empty() {
        let table = grid([vec![Some(" A "), None]]);
        assert_eq!(normalize_table(&table), vec![vec!["A".to_string(), String::new()]]);
    }

    #[test]
    fn test_numbers_are_stringified() {
        let table = vec![vec![CellValue::from(100), CellValue::from(2.5)]];
        assert_eq!(normalize_table(&table), vec![vec!["100", "2.5"]]);
    }

    #[test]
    fn test_empty_table() {
        assert!(normalize_table(&[]).is_empty());
    }

    #[test]
    fn test_ragged_rows_keep_length() {
        let table = grid([vec!["a", "b", "c"], vec!["d"]]);
        let normalized = normalize_table(&table);
        assert_eq!(normalized[0].len(), 3);
        assert_eq!(normalized[1].len(), 1);
    }

    #[test]
    fn test_normalize_rows_is_idempotent() {
        let once = normalize_table(&grid([vec!["\tx\n", " y"]]));
        assert_eq!(normalize_rows(&once), once);
    }
}
