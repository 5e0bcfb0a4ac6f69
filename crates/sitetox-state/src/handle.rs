//! Google Sheets Handle - Connection and Worksheet Operations
//!
//! Manages the HTTP client for the Sheets v4 values API and hands out
//! [`SheetsWorksheet`]s implementing [`Worksheet`]:
//! - read_all / row_values: `GET values/{range}`
//! - update_cells: `POST values:batchUpdate`
//! - clear: `POST values/{range}:clear`
//! - write_rows: `PUT values/{range}`
//!
//! Writes use `valueInputOption=USER_ENTERED` so numbers land as numbers.
//! The OAuth bearer token is supplied by the caller; minting it is not this
//! crate's concern.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::storage_traits::{column_letters, CellUpdate, StoreResult, Worksheet};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_BIDS_WORKSHEET: &str = "Site Toxicity Assessment Bid Form Responses";
const DEFAULT_LEADERBOARD_WORKSHEET: &str = "Leaderboard";

/// Configuration for the Google Sheets connection
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// API root (default: "https://sheets.googleapis.com")
    pub base_url: String,
    /// Spreadsheet key from the sheet URL
    pub spreadsheet_id: String,
    /// OAuth bearer token with the spreadsheets scope
    pub access_token: String,
    /// Title of the bid responses worksheet
    pub bids_worksheet: String,
    /// Title of the leaderboard worksheet
    pub leaderboard_worksheet: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Create a configuration with default worksheet titles
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            bids_worksheet: DEFAULT_BIDS_WORKSHEET.to_string(),
            leaderboard_worksheet: DEFAULT_LEADERBOARD_WORKSHEET.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Point at a different API root (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the bid worksheet title
    pub fn with_bids_worksheet(mut self, title: impl Into<String>) -> Self {
        self.bids_worksheet = title.into();
        self
    }

    /// Set the leaderboard worksheet title
    pub fn with_leaderboard_worksheet(mut self, title: impl Into<String>) -> Self {
        self.leaderboard_worksheet = title.into();
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - GOOGLE_SHEET_ID (required)
    /// - GOOGLE_SHEETS_TOKEN (required)
    /// - SHEETS_BASE_URL (optional)
    /// - BIDS_WORKSHEET (optional, default: "Site Toxicity Assessment Bid Form Responses")
    /// - LEADERBOARD_WORKSHEET (optional, default: "Leaderboard")
    pub fn from_env() -> StoreResult<Self> {
        let spreadsheet_id = std::env::var("GOOGLE_SHEET_ID")
            .map_err(|_| StoreError::Config("GOOGLE_SHEET_ID not set".to_string()))?;
        let access_token = std::env::var("GOOGLE_SHEETS_TOKEN")
            .map_err(|_| StoreError::Config("GOOGLE_SHEETS_TOKEN not set".to_string()))?;

        let mut config = Self::new(spreadsheet_id, access_token);
        if let Ok(base_url) = std::env::var("SHEETS_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(title) = std::env::var("BIDS_WORKSHEET") {
            config = config.with_bids_worksheet(title);
        }
        if let Ok(title) = std::env::var("LEADERBOARD_WORKSHEET") {
            config = config.with_leaderboard_worksheet(title);
        }
        Ok(config)
    }
}

/// Google Sheets connection handle
#[derive(Debug, Clone)]
pub struct SheetsHandle {
    client: reqwest::Client,
    config: SheetsConfig,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsHandle {
    /// Build the HTTP client. No request is made.
    pub fn new(config: SheetsConfig) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| StoreError::Config("invalid access token format".to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(concat!("sitetox/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Connect and confirm both configured worksheets exist.
    #[instrument(skip(config), fields(spreadsheet = %config.spreadsheet_id))]
    pub async fn connect(config: SheetsConfig) -> StoreResult<Self> {
        let handle = Self::new(config)?;
        handle.verify_worksheets().await?;
        info!("Connected to spreadsheet");
        Ok(handle)
    }

    /// Connect using [`SheetsConfig::from_env`].
    pub async fn setup_from_env() -> StoreResult<Self> {
        Self::connect(SheetsConfig::from_env()?).await
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// Worksheet holding the bid responses
    pub fn bids(&self) -> SheetsWorksheet {
        self.worksheet(&self.config.bids_worksheet)
    }

    /// Worksheet holding the leaderboard
    pub fn leaderboard(&self) -> SheetsWorksheet {
        self.worksheet(&self.config.leaderboard_worksheet)
    }

    /// Any worksheet of the spreadsheet by title
    pub fn worksheet(&self, title: &str) -> SheetsWorksheet {
        SheetsWorksheet {
            client: self.client.clone(),
            base_url: self.config.base_url.clone(),
            spreadsheet_id: self.config.spreadsheet_id.clone(),
            title: title.to_string(),
        }
    }

    async fn verify_worksheets(&self) -> StoreResult<()> {
        let mut url = spreadsheet_url(&self.config.base_url, &self.config.spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self.client.get(url).send().await?;
        let meta: SpreadsheetMeta = decode(response).await?;
        let titles: Vec<String> = meta.sheets.into_iter().map(|s| s.properties.title).collect();

        for wanted in [&self.config.bids_worksheet, &self.config.leaderboard_worksheet] {
            if !titles.iter().any(|t| t == wanted) {
                return Err(StoreError::Config(format!(
                    "worksheet '{wanted}' not found (worksheets: {titles:?})"
                )));
            }
        }
        Ok(())
    }
}

/// One worksheet of a Google spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsWorksheet {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    title: String,
}

impl SheetsWorksheet {
    /// `'Title'`, with embedded quotes doubled.
    fn quoted_title(&self) -> String {
        format!("'{}'", self.title.replace('\'', "''"))
    }

    fn range(&self, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{}!{}", self.quoted_title(), suffix),
            None => self.quoted_title(),
        }
    }

    fn values_url(&self, range: &str) -> StoreResult<Url> {
        spreadsheet_url(&self.base_url, &self.spreadsheet_id, &["values", range])
    }

    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        let response = self.client.get(self.values_url(range)?).send().await?;
        let body: ValueRange = decode(response).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl Worksheet for SheetsWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn read_all(&self) -> StoreResult<Vec<Vec<String>>> {
        self.get_values(&self.range(None)).await
    }

    async fn row_values(&self, row: usize) -> StoreResult<Vec<String>> {
        if row == 0 {
            return Err(StoreError::InvalidCell { row, column: 1 });
        }
        let rows = self.get_values(&self.range(Some(&format!("{row}:{row}")))).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn update_cells(&self, cells: &[CellUpdate]) -> StoreResult<()> {
        let mut data = Vec::with_capacity(cells.len());
        for cell in cells {
            data.push(json!({
                "range": self.range(Some(&cell.a1()?)),
                "values": [[cell.value]],
            }));
        }
        let url = spreadsheet_url(&self.base_url, &self.spreadsheet_id, &["values:batchUpdate"])?;
        let body = json!({
            "valueInputOption": "USER_ENTERED",
            "data": data,
        });

        debug!(worksheet = %self.title, cells = cells.len(), "Updating cells");
        let response = self.client.post(url).json(&body).send().await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn clear(&self) -> StoreResult<()> {
        let range = format!("{}:clear", self.range(None));
        let url = self.values_url(&range)?;
        let response = self.client.post(url).json(&json!({})).send().await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn write_rows(&self, first_row: usize, rows: &[Vec<String>]) -> StoreResult<()> {
        if first_row == 0 {
            return Err(StoreError::InvalidCell {
                row: first_row,
                column: 1,
            });
        }
        let range = self.range(Some(&format!("{}{}", column_letters(1), first_row)));
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let response = self.client.put(url).json(&body).send().await?;
        decode::<Value>(response).await.map(|_| ())
    }
}

fn spreadsheet_url(base_url: &str, spreadsheet_id: &str, tail: &[&str]) -> StoreResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| StoreError::Config(format!("invalid base URL '{base_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Config(format!("base URL '{base_url}' cannot hold a path")))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id])
        .extend(tail);
    Ok(url)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
