//! Spreadsheet accessor
//!
//! The scan reads spreadsheets through [`SheetSource`]. The network client
//! lives in `sheetscan-sheets`; [`MemorySource`] serves grids held in memory.

use crate::cell::Row;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Ordered sheet titles. Fails with [`Error::NotFound`] when the
    /// spreadsheet has no accessible sheets.
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>>;

    /// Cell values of one sheet within an A1 range (without the title).
    /// Fails with [`Error::Fetch`] on transport or format problems.
    async fn sheet_values(&self, spreadsheet_id: &str, title: &str, range: &str) -> Result<Vec<Row>>;
}

#[derive(Debug, Clone)]
enum MemorySheet {
    Ready(Vec<Row>),
    Broken(String),
    Slow(Vec<Row>, Duration),
}

/// In-memory spreadsheets, keyed by spreadsheet id
#[derive(Debug, Default)]
pub struct MemorySource {
    spreadsheets: RwLock<HashMap<String, Vec<(String, MemorySheet)>>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, spreadsheet_id: &str, title: &str, sheet: MemorySheet) {
        self.spreadsheets
            .write()
            .entry(spreadsheet_id.to_string())
            .or_default()
            .push((title.to_string(), sheet));
    }

    pub fn with_sheet(self, spreadsheet_id: &str, title: &str, values: Vec<Row>) -> Self {
        self.add_sheet(spreadsheet_id, title, values);
        self
    }

    pub fn add_sheet(&self, spreadsheet_id: &str, title: &str, values: Vec<Row>) {
        self.push(spreadsheet_id, title, MemorySheet::Ready(values));
    }

    /// A sheet whose values can never be fetched
    pub fn with_broken_sheet(self, spreadsheet_id: &str, title: &str, message: &str) -> Self {
        self.push(spreadsheet_id, title, MemorySheet::Broken(message.to_string()));
        self
    }

    /// A sheet whose fetch takes `delay`
    pub fn with_slow_sheet(self, spreadsheet_id: &str, title: &str, values: Vec<Row>, delay: Duration) -> Self {
        self.push(spreadsheet_id, title, MemorySheet::Slow(values, delay));
        self
    }

    /// Total calls made against this source
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for MemorySource {
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.spreadsheets
            .read()
            .get(spreadsheet_id)
            .map(|sheets| sheets.iter().map(|(title, _)| title.clone()).collect())
            .ok_or_else(|| Error::NotFound(spreadsheet_id.to_string()))
    }

    async fn sheet_values(&self, spreadsheet_id: &str, title: &str, _range: &str) -> Result<Vec<Row>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let sheet = self
            .spreadsheets
            .read()
            .get(spreadsheet_id)
            .and_then(|sheets| sheets.iter().find(|(t, _)| t == title).map(|(_, s)| s.clone()))
            .ok_or_else(|| Error::Fetch(format!("unknown sheet '{}'", title)))?;

        match sheet {
            MemorySheet::Ready(values) => Ok(values),
            MemorySheet::Broken(message) => Err(Error::Fetch(message)),
            MemorySheet::Slow(values, delay) => {
                tokio::time::sleep(delay).await;
                Ok(values)
            }
        }
    }
}
