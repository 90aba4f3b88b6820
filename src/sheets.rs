use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::StudioError;
use crate::extract::RawSheet;
use crate::ids::SpreadsheetId;

pub trait SheetSource: Send + Sync {
    fn fetch_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        sheet_name: &str,
    ) -> Result<RawSheet, StudioError>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct SheetsHttpClient {
    client: Client,
    token: Arc<dyn TokenProvider>,
    base_url: String,
}

impl SheetsHttpClient {
    pub fn new(token: Arc<dyn TokenProvider>) -> Result<Self, StudioError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("studio-docs/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| StudioError::SheetsHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| StudioError::SheetsHttp(err.to_string()))?;
        Ok(Self {
            client,
            token,
            base_url: "https://sheets.googleapis.com".to_string(),
        })
    }

    pub fn values_url(
        &self,
        spreadsheet: &SpreadsheetId,
        sheet_name: &str,
    ) -> Result<Url, StudioError> {
        let range = a1_range(sheet_name);
        let mut url =
            Url::parse(&self.base_url).map_err(|err| StudioError::SheetsHttp(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StudioError::SheetsHttp(format!("invalid base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet.as_str(), "values", range.as_str()]);
        Ok(url)
    }

    fn handle_status(
        response: reqwest::blocking::Response,
        sheet_name: &str,
    ) -> Result<reqwest::blocking::Response, StudioError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Google Sheets request failed".to_string());
        if status == 400 && message.contains("Unable to parse range") {
            return Err(StudioError::SheetNotFound(sheet_name.to_string()));
        }
        Err(StudioError::SheetsStatus { status, message })
    }
}

// A bare sheet name like `A1` or `Q1!B2` would be read as a cell range.
fn a1_range(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

impl SheetSource for SheetsHttpClient {
    fn fetch_sheet(
        &self,
        spreadsheet: &SpreadsheetId,
        sheet_name: &str,
    ) -> Result<RawSheet, StudioError> {
        let url = self.values_url(spreadsheet, sheet_name)?;
        let token = self.token.access_token()?;
        debug!(%url, "sheets.request");
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(|err| StudioError::SheetsHttp(err.to_string()))?;
        let response = Self::handle_status(response, sheet_name)?;
        let range: ValueRange = response
            .json()
            .map_err(|err| StudioError::SheetsHttp(err.to_string()))?;
        Ok(range.values)
    }
}

#[derive(Debug, Clone)]
pub struct CsvSheetSource {
    dir: Utf8PathBuf,
}

impl CsvSheetSource {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, sheet_name: &str) -> Utf8PathBuf {
        self.dir.join(format!("{sheet_name}.csv"))
    }

    pub fn read_csv(path: &Utf8Path) -> Result<RawSheet, StudioError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path.as_std_path())
            .map_err(|err| StudioError::Csv(format!("{path}: {err}")))?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| StudioError::Csv(format!("{path}: {err}")))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

impl SheetSource for CsvSheetSource {
    fn fetch_sheet(
        &self,
        _spreadsheet: &SpreadsheetId,
        sheet_name: &str,
    ) -> Result<RawSheet, StudioError> {
        let path = self.sheet_path(sheet_name);
        if !path.as_std_path().exists() {
            return Err(StudioError::SheetNotFound(path.to_string()));
        }
        Self::read_csv(&path)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::auth::StaticToken;

    #[test]
    fn values_url_encodes_sheet_name() {
        let client = SheetsHttpClient::new(Arc::new(StaticToken::new("t"))).unwrap();
        let id: SpreadsheetId = "https://docs.google.com/spreadsheets/d/1Studio/edit"
            .parse()
            .unwrap();
        let url = client.values_url(&id, "SIG Info").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/1Studio/values/'SIG%20Info'"
        );
    }

    #[test]
    fn sheet_names_are_quoted_as_ranges() {
        assert_eq!(a1_range("A1"), "'A1'");
        assert_eq!(a1_range("Q1!Projects"), "'Q1!Projects'");
        assert_eq!(a1_range("Bob's SIGs"), "'Bob''s SIGs'");
    }

    #[test]
    fn csv_source_tolerates_short_rows() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        std::fs::write(
            dir.join("Projects.csv").as_std_path(),
            "SIG Name,Students,Project Name\nRobotics,\"Carl, Dana\"\nLearning\n",
        )
        .unwrap();
        let source = CsvSheetSource::new(dir);
        let id: SpreadsheetId = "/d/local".parse().unwrap();
        let rows = source.fetch_sheet(&id, "Projects").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Robotics".to_string(), "Carl, Dana".to_string()]);
        assert_eq!(rows[2], vec!["Learning".to_string()]);

        let err = source.fetch_sheet(&id, "Missing").unwrap_err();
        assert_matches!(err, StudioError::SheetNotFound(_));
    }
}
