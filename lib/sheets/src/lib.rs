//! Google Sheets accessor for sheetscan.
//!
//! Implements [`sheetscan_core::SheetSource`] over the Sheets v4 REST API
//! with an API key.

pub mod google;

pub use google::{a1_range, GoogleSheetsConfig, GoogleSheetsSource, DEFAULT_BASE_URL};
