//! Optional scan trace, returned next to the results on request.

use crate::query::SearchPhase;
use serde::{Deserialize, Serialize};

/// How much trace a caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsLevel {
    #[default]
    None,
    /// Per-sheet counters and detected columns
    Counts,
    /// Counters plus header layout and raw identifier samples
    FullTrace,
}

impl DiagnosticsLevel {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => DiagnosticsLevel::None,
            1 => DiagnosticsLevel::Counts,
            _ => DiagnosticsLevel::FullTrace,
        }
    }

    pub fn enabled(self) -> bool {
        self > DiagnosticsLevel::None
    }

    pub fn full(self) -> bool {
        self >= DiagnosticsLevel::FullTrace
    }
}

/// Trace entry for one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SheetTrace {
    pub title: String,
    pub rows_read: usize,
    pub match_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_column: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subject_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<SearchPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capped: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_samples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SheetTrace {
    pub fn failed(title: &str, error: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Whole-scan trace
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ScanTrace {
    pub level: DiagnosticsLevel,
    /// Digits extracted from the primary query
    pub query_digits: String,
    pub query_is_numeric: bool,
    pub sheets: Vec<SheetTrace>,
}

impl ScanTrace {
    pub fn errors(&self) -> impl Iterator<Item = &SheetTrace> {
        self.sheets.iter().filter(|s| s.is_error())
    }
}
