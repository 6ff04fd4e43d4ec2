//! # sheetscan Core
//!
//! Fuzzy record matching over spreadsheet tabs.
//!
//! This crate provides the matching engine behind sheetscan:
//!
//! - [`normalize()`] / [`digits_only`] - text and identifier canonicalization
//! - [`SearchQuery`] - identifier-vs-name query classification
//! - [`SheetLayout`] - header detection and column roles
//! - [`RowMatcher`] - the per-row hit predicate
//! - [`Scanner`] - sequential scan of every sheet behind a [`SheetSource`]
//!
//! ## Example
//!
//! ```rust
//! use sheetscan_core::{scan, text_row, ScanConfig, SearchOptions, SearchQuery, Sheet};
//!
//! let sheet = Sheet::new("Cadastro", vec![
//!     text_row(&["Nome", "CPF"]),
//!     text_row(&["Maria Silva", "123.456.789-09"]),
//!     text_row(&["João Souza", "987.654.321-00"]),
//! ]);
//!
//! let query = SearchQuery::single("joao souza").unwrap();
//! let result = scan("sheet-id", &[sheet], &query, &ScanConfig::default(), &SearchOptions::default());
//! assert_eq!(result.total_matches, 1);
//! ```

pub mod cell;
pub mod columns;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod query;
pub mod scan;
pub mod source;

pub use cell::{text_row, CellValue, Row};
pub use columns::{ColumnRoles, HeaderLayout, HeaderMap, SheetLayout};
pub use config::{
    KeywordSets, MatchPolicy, ScanConfig, DEFAULT_MATCH_CAP, DEFAULT_MAX_MATCH_CAP, DEFAULT_RANGE,
    IDENTIFIER_KEYWORDS, SUBJECT_KEYWORDS,
};
pub use diagnostics::{DiagnosticsLevel, ScanTrace, SheetTrace};
pub use error::{Error, ErrorKind, Result};
pub use matcher::{identifiers_match, MatchReason, RowFilter, RowMatcher};
pub use normalize::{digits_only, normalize};
pub use query::{ClassifiedQuery, QueryMaterial, SearchPhase, SearchQuery};
pub use scan::{scan, scan_sheet, MatchedRow, ScanResult, Scanner, SearchOptions, Sheet, SheetResult};
pub use source::{MemorySource, SheetSource};
