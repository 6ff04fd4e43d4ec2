// Spreadsheet cell values. Rows arrive ragged and may be shorter than the header.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell as returned by the spreadsheet accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    #[default]
    Empty,
}

/// One sheet row
pub type Row = Vec<CellValue>;

impl CellValue {
    /// True when the cell holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// Coerce the cell to text. Numbers render in plain decimal notation.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            // f64's Display never switches to exponent notation
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Fetch a cell by column index, treating missing trailing cells as empty
#[inline]
pub fn cell_at(row: &[CellValue], index: usize) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    row.get(index).unwrap_or(EMPTY)
}

/// A row whose every cell is blank is never a match candidate
pub fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_blank)
}

/// Join a row's cells with single spaces, as text
pub fn join_row(row: &[CellValue]) -> String {
    row.iter()
        .map(CellValue::as_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a row from string literals (test and bench helper)
pub fn text_row(cells: &[&str]) -> Row {
    cells.iter().map(|&c| CellValue::from(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_mixed_cells() {
        let row: Row = serde_json::from_value(json!(["Maria", 709809060029098.0, true, null])).unwrap();
        assert_eq!(row[0], CellValue::Text("Maria".into()));
        assert_eq!(row[1], CellValue::Number(709809060029098.0));
        assert_eq!(row[2], CellValue::Bool(true));
        assert_eq!(row[3], CellValue::Empty);
    }

    #[test]
    fn test_number_renders_plain_decimal() {
        assert_eq!(CellValue::Number(7.09809060029098e14).as_text(), "709809060029098");
        assert_eq!(CellValue::Number(12.5).as_text(), "12.5");
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank_row(&text_row(&["", "   ", "\t"])));
        assert!(is_blank_row(&[]));
        assert!(!is_blank_row(&[CellValue::Empty, CellValue::Number(0.0)]));
    }

    #[test]
    fn test_cell_at_past_end_is_empty() {
        let row = text_row(&["a"]);
        assert_eq!(cell_at(&row, 0), &CellValue::Text("a".into()));
        assert_eq!(cell_at(&row, 5), &CellValue::Empty);
    }

    #[test]
    fn test_join_row() {
        let row = vec![CellValue::from("Ana"), CellValue::Empty, CellValue::from(3.0)];
        assert_eq!(join_row(&row), "Ana  3");
    }
}
