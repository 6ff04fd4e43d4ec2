//! Sheets v4 REST client
//!
//! Two calls are needed per search: spreadsheet metadata (sheet titles) once,
//! then the values of each sheet's range.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use sheetscan_core::{Error, Result, Row, SheetSource};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub api_key: String,
    /// Spreadsheets collection URL, overridable for local testing
    pub base_url: String,
    /// Ask for raw numbers instead of display strings
    pub unformatted_values: bool,
    /// Transport-level bound on any single HTTP request
    pub request_timeout: Duration,
}

impl GoogleSheetsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            unformatted_values: false,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    sheets: Option<Vec<SheetEntry>>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Row>>,
}

/// Build an A1 reference for a sheet: `'Sheet Name'!A1:Z1000`.
/// Single quotes inside the title are doubled.
pub fn a1_range(title: &str, range: &str) -> String {
    format!("'{}'!{}", title.replace('\'', "''"), range)
}

pub struct GoogleSheetsSource {
    client: Client,
    config: GoogleSheetsConfig,
}

impl GoogleSheetsSource {
    pub fn new(config: GoogleSheetsConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("Google API key is empty".into()));
        }
        Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidConfig(format!("invalid base url '{}': {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Internal(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Internal("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            // the URL carries the API key
            .map_err(|e| Error::Fetch(e.without_url().to_string()))
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let mut url = self.url(&[spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let response = self.get(url).await?;
        let status = response.status();
        debug!(spreadsheet = spreadsheet_id, %status, "metadata fetched");

        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
                return Err(Error::NotFound(spreadsheet_id.to_string()));
            }
            s => return Err(Error::Fetch(format!("metadata request failed: HTTP {}", s))),
        }

        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("malformed metadata: {}", e.without_url())))?;

        meta.sheets
            .map(|sheets| sheets.into_iter().map(|s| s.properties.title).collect())
            .ok_or_else(|| Error::NotFound(spreadsheet_id.to_string()))
    }

    async fn sheet_values(&self, spreadsheet_id: &str, title: &str, range: &str) -> Result<Vec<Row>> {
        let a1 = a1_range(title, range);
        let mut url = self.url(&[spreadsheet_id, "values", &a1])?;
        if self.config.unformatted_values {
            url.query_pairs_mut().append_pair("valueRenderOption", "UNFORMATTED_VALUE");
        }

        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("values request failed: HTTP {}", status)));
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("malformed values: {}", e.without_url())))?;

        let values = body.values.unwrap_or_default();
        debug!(sheet = title, rows = values.len(), "values fetched");
        Ok(values)
    }
}
