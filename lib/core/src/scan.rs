//! Scan orchestration
//!
//! Drives a search across every sheet of a spreadsheet: detect the header,
//! run the row matcher over the data rows, stop at the match cap, and gather
//! results plus an optional trace. One sheet failing never aborts the scan.

use crate::cell::{cell_at, CellValue, Row};
use crate::columns::{HeaderMap, SheetLayout};
use crate::config::ScanConfig;
use crate::diagnostics::{DiagnosticsLevel, ScanTrace, SheetTrace};
use crate::error::{Error, Result};
use crate::matcher::{MatchReason, RowFilter, RowMatcher};
use crate::query::{ClassifiedQuery, QueryMaterial, SearchPhase, SearchQuery};
use crate::source::SheetSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Per-request options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchOptions {
    /// Override of the per-sheet match cap, bounded by the configured maximum
    #[serde(default)]
    pub match_cap: Option<usize>,
    #[serde(default)]
    pub diagnostics: DiagnosticsLevel,
    /// Also return every match as a header -> value mapping
    #[serde(default)]
    pub records: bool,
}

impl SearchOptions {
    pub fn with_diagnostics(mut self, level: DiagnosticsLevel) -> Self {
        self.diagnostics = level;
        self
    }

    pub fn with_match_cap(mut self, cap: usize) -> Self {
        self.match_cap = Some(cap);
        self
    }

    pub fn with_records(mut self) -> Self {
        self.records = true;
        self
    }
}

/// A sheet to scan
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub title: String,
    pub values: Vec<Row>,
}

impl Sheet {
    pub fn new(title: impl Into<String>, values: Vec<Row>) -> Self {
        Self {
            title: title.into(),
            values,
        }
    }
}

/// One matching data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    /// 1-based row number within the fetched range
    pub row_number: usize,
    pub reason: MatchReason,
    pub values: Row,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Map<String, Value>>,
}

/// Results for one sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetResult {
    pub title: String,
    /// Rows read, header included
    pub rows: usize,
    pub headers: Vec<String>,
    pub matches: Vec<MatchedRow>,
}

/// Aggregate result of a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub request_id: Uuid,
    pub spreadsheet_id: String,
    pub total_sheets: usize,
    pub total_matches: usize,
    pub sheets: Vec<SheetResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ScanTrace>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn sheet(&self, title: &str) -> Option<&SheetResult> {
        self.sheets.iter().find(|s| s.title == title)
    }
}

/// Reshape a row into a header -> value mapping
pub fn row_record(header: &HeaderMap, row: &[CellValue]) -> Map<String, Value> {
    let width = header.len().max(row.len());
    let mut record = Map::new();

    for index in 0..width {
        let name = match header.name(index) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("column_{}", index + 1),
        };
        let key = if record.contains_key(&name) {
            format!("{}_{}", name, index + 1)
        } else {
            name
        };
        let value = serde_json::to_value(cell_at(row, index)).unwrap_or(Value::Null);
        record.insert(key, value);
    }

    record
}

fn run_pass(
    sheet: &SheetLayout,
    data: &[Row],
    query: &ClassifiedQuery,
    config: &ScanConfig,
    cap: usize,
    records: bool,
) -> Vec<MatchedRow> {
    let matcher = RowMatcher::new(query, &sheet.roles, config.policy);
    let mut matches = Vec::new();

    for (offset, row) in data.iter().enumerate() {
        if matches.len() >= cap {
            break;
        }
        let Some(reason) = matcher.check(row) else {
            continue;
        };

        matches.push(MatchedRow {
            row_number: sheet.layout.data_start + offset + 1,
            reason,
            values: row.clone(),
            record: records.then(|| row_record(&sheet.header, row)),
        });
    }

    matches
}

/// Scan one sheet. Always returns the trace; callers decide whether to keep it.
pub fn scan_sheet(
    sheet: &Sheet,
    query: &SearchQuery,
    config: &ScanConfig,
    options: &SearchOptions,
) -> (SheetResult, SheetTrace) {
    let cap = config.effective_cap(options.match_cap);
    let grid = &sheet.values;
    let layout = SheetLayout::analyze(grid, &config.keywords);
    let data = layout.layout.data(grid);

    let mut phase = SearchPhase::Primary;
    let mut matches = run_pass(&layout, data, &query.primary, config, cap, options.records);

    if matches.is_empty() {
        if let Some(secondary) = &query.secondary {
            debug!(sheet = %sheet.title, "primary pass empty, trying secondary query");
            phase = SearchPhase::Secondary;
            matches = run_pass(&layout, data, secondary, config, cap, options.records);
        }
    }

    debug!(
        sheet = %sheet.title,
        rows = grid.len(),
        matches = matches.len(),
        identifier = ?layout.identifier_name(),
        "sheet scanned"
    );

    let mut trace = SheetTrace {
        title: sheet.title.clone(),
        rows_read: grid.len(),
        match_count: matches.len(),
        identifier_column: layout.identifier_name().map(str::to_string),
        subject_columns: layout.subject_names(),
        phase: query.has_fallback().then_some(phase),
        capped: Some(matches.len() >= cap),
        ..Default::default()
    };

    if options.diagnostics.full() {
        trace.header_row = Some(layout.layout.header_row + 1);
        trace.header = Some(layout.header.names());
        trace.identifier_samples = layout.roles.identifier.map(|col| {
            data.iter()
                .map(|row| cell_at(row, col))
                .filter(|cell| !cell.is_blank())
                .take(config.sample_size)
                .map(CellValue::as_text)
                .collect()
        });
    }

    let result = SheetResult {
        title: sheet.title.clone(),
        rows: grid.len(),
        headers: layout.header.names(),
        matches,
    };

    (result, trace)
}

/// Accumulates per-sheet outcomes into a [`ScanResult`]
struct ScanBuilder {
    request_id: Uuid,
    spreadsheet_id: String,
    total_sheets: usize,
    sheets: Vec<SheetResult>,
    trace: Option<ScanTrace>,
}

impl ScanBuilder {
    fn new(request_id: Uuid, spreadsheet_id: &str, query: &SearchQuery, level: DiagnosticsLevel) -> Self {
        let trace = level.enabled().then(|| ScanTrace {
            level,
            query_digits: query.primary.digits.clone(),
            query_is_numeric: query.primary.is_numeric,
            sheets: Vec::new(),
        });
        Self {
            request_id,
            spreadsheet_id: spreadsheet_id.to_string(),
            total_sheets: 0,
            sheets: Vec::new(),
            trace,
        }
    }

    fn record(&mut self, sheet: &Sheet, query: &SearchQuery, config: &ScanConfig, options: &SearchOptions) {
        if sheet.values.is_empty() {
            // Nothing to scan: traced, not reported
            self.trace(SheetTrace {
                title: sheet.title.clone(),
                ..Default::default()
            });
            return;
        }

        let (result, trace) = scan_sheet(sheet, query, config, options);
        self.sheets.push(result);
        self.trace(trace);
    }

    fn fail(&mut self, title: &str, error: &Error) {
        self.trace(SheetTrace::failed(title, error.to_string()));
    }

    fn trace(&mut self, entry: SheetTrace) {
        if let Some(trace) = self.trace.as_mut() {
            trace.sheets.push(entry);
        }
    }

    fn finish(self) -> ScanResult {
        let total_matches = self.sheets.iter().map(|s| s.matches.len()).sum();
        ScanResult {
            request_id: self.request_id,
            spreadsheet_id: self.spreadsheet_id,
            total_sheets: self.total_sheets,
            total_matches,
            sheets: self.sheets,
            debug: self.trace,
            scanned_at: Utc::now(),
        }
    }
}

/// Scan sheets already held in memory
pub fn scan(
    spreadsheet_id: &str,
    sheets: &[Sheet],
    query: &SearchQuery,
    config: &ScanConfig,
    options: &SearchOptions,
) -> ScanResult {
    let mut builder = ScanBuilder::new(Uuid::new_v4(), spreadsheet_id, query, options.diagnostics);
    builder.total_sheets = sheets.len();
    for sheet in sheets {
        builder.record(sheet, query, config, options);
    }
    builder.finish()
}

/// Runs searches against a [`SheetSource`]
pub struct Scanner<'a, S: SheetSource + ?Sized> {
    source: &'a S,
    config: &'a ScanConfig,
}

impl<'a, S: SheetSource + ?Sized> Scanner<'a, S> {
    pub fn new(source: &'a S, config: &'a ScanConfig) -> Self {
        Self { source, config }
    }

    /// Search every sheet of a spreadsheet.
    ///
    /// Configuration and query material are validated before the source is
    /// touched. Sheets are
    /// fetched one at a time; a fetch failure or timeout is recorded in the
    /// trace and the scan moves on.
    pub async fn search(
        &self,
        spreadsheet_id: &str,
        material: &QueryMaterial,
        options: &SearchOptions,
    ) -> Result<ScanResult> {
        self.config.validate()?;
        if spreadsheet_id.trim().is_empty() {
            return Err(Error::Validation("spreadsheet id is required".into()));
        }
        let query = SearchQuery::from_material(material)?;

        let request_id = Uuid::new_v4();
        let span = info_span!("search", %request_id, spreadsheet = %spreadsheet_id);
        self.run(request_id, spreadsheet_id, &query, options)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        request_id: Uuid,
        spreadsheet_id: &str,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> Result<ScanResult> {
        let titles = self.source.sheet_titles(spreadsheet_id).await?;
        let mut builder = ScanBuilder::new(request_id, spreadsheet_id, query, options.diagnostics);
        builder.total_sheets = titles.len();

        for (i, title) in titles.iter().enumerate() {
            if i > 0 && !self.config.fetch_pause.is_zero() {
                tokio::time::sleep(self.config.fetch_pause).await;
            }

            match self.fetch(spreadsheet_id, title).await {
                Ok(values) => builder.record(&Sheet::new(title.as_str(), values), query, self.config, options),
                Err(e) => {
                    warn!(sheet = %title, error = %e, "sheet skipped");
                    builder.fail(title, &e);
                }
            }
        }

        let result = builder.finish();
        info!(
            sheets = result.total_sheets,
            matches = result.total_matches,
            numeric = query.primary.is_numeric,
            "search finished"
        );
        Ok(result)
    }

    async fn fetch(&self, spreadsheet_id: &str, title: &str) -> Result<Vec<Row>> {
        let fetch = self.source.sheet_values(spreadsheet_id, title, &self.config.range);
        match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(values) => values.map_err(|e| e.for_sheet(title)),
            Err(_) => Err(Error::Timeout(format!(
                "sheet '{}' took longer than {:?}",
                title, self.config.fetch_timeout
            ))
            .for_sheet(title)),
        }
    }
}
