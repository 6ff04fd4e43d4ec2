//! # sheetscan
//!
//! Fuzzy record search across every sheet of a Google spreadsheet.
//!
//! A search takes a free-text query, or an explicit CPF/CNS with an optional
//! name, and returns the matching rows of every sheet together with their
//! headers. Identifier queries match on digits only and tolerate formatting,
//! lost leading zeros and scientific notation. Name queries are case and
//! accent insensitive.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! GOOGLE_API_KEY=... sheetscan --port 3000
//! curl 'http://localhost:3000/sheets/fullscan?id=<spreadsheet>&query=maria'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use sheetscan::prelude::*;
//!
//! # async fn run() -> sheetscan::Result<()> {
//! let source = GoogleSheetsSource::new(GoogleSheetsConfig::new("api-key"))?;
//! let config = ScanConfig::default();
//! let scanner = Scanner::new(&source, &config);
//!
//! let material = QueryMaterial::identifier("123.456.789-09", Some("Maria".into()));
//! let result = scanner.search("spreadsheet-id", &material, &SearchOptions::default()).await?;
//! for sheet in &result.sheets {
//!     println!("{}: {} matches", sheet.title, sheet.matches.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `sheetscan-core` - normalization, query classification, column roles, matching and the scan
//! - `sheetscan-sheets` - Google Sheets v4 accessor
//! - `sheetscan-api` - REST API

// Re-export core types
pub use sheetscan_core::{
    digits_only, normalize, scan, text_row, CellValue, DiagnosticsLevel, Error, ErrorKind, KeywordSets,
    MatchPolicy, MatchReason, MatchedRow, MemorySource, QueryMaterial, Result, Row, ScanConfig,
    ScanResult, ScanTrace, Scanner, SearchOptions, SearchQuery, Sheet, SheetResult, SheetSource,
    DEFAULT_MATCH_CAP, DEFAULT_MAX_MATCH_CAP, DEFAULT_RANGE, IDENTIFIER_KEYWORDS, SUBJECT_KEYWORDS,
};

// Re-export the Google accessor
pub use sheetscan_sheets::{GoogleSheetsConfig, GoogleSheetsSource};

// Re-export API
pub use sheetscan_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppState, DiagnosticsLevel, Error, GoogleSheetsConfig, GoogleSheetsSource, KeywordSets,
        MatchPolicy, QueryMaterial, RestApi, Result, ScanConfig, ScanResult, Scanner, SearchOptions,
        SheetSource, DEFAULT_MATCH_CAP, DEFAULT_MAX_MATCH_CAP, DEFAULT_RANGE, IDENTIFIER_KEYWORDS,
        SUBJECT_KEYWORDS,
    };
}
