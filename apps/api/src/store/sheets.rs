//! Google Sheets v4 values API: the production backing store.
//!
//! Auth is a pre-minted OAuth bearer token; minting and refreshing it happens
//! outside this service.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{Dataset, RawTable, StoreError, TabularStore};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct SheetsStore {
    client: Client,
    spreadsheet_id: String,
    access_token: String,
    profile_sheet: String,
    interview_sheet: String,
}

impl SheetsStore {
    pub fn new(
        spreadsheet_id: String,
        access_token: String,
        profile_sheet: String,
        interview_sheet: String,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            spreadsheet_id,
            access_token,
            profile_sheet,
            interview_sheet,
        })
    }

    fn sheet_name(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Profiles => &self.profile_sheet,
            Dataset::Interviews => &self.interview_sheet,
        }
    }

    /// `…/spreadsheets/{id}/values/{range}{suffix}` with each segment escaped.
    fn values_url(&self, dataset: Dataset, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_API_URL)
            .map_err(|e| StoreError::Malformed(format!("bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Malformed("base url cannot take a path".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{suffix}", a1_sheet_range(self.sheet_name(dataset))));
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Quotes a sheet name for A1 notation so names with spaces resolve.
fn a1_sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn read_table(&self, dataset: Dataset) -> Result<RawTable, StoreError> {
        let mut url = self.values_url(dataset, "")?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "FORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let range: ValueRange = Self::check(response).await?.json().await?;

        debug!(
            "Read {} rows (incl. header) from sheet '{}'",
            range.values.len(),
            self.sheet_name(dataset)
        );
        Ok(RawTable::from_grid(range.values))
    }

    async fn append_row(&self, dataset: Dataset, row: Vec<String>) -> Result<(), StoreError> {
        if dataset != Dataset::Interviews {
            return Err(StoreError::ReadOnly(dataset));
        }
        let mut url = self.values_url(dataset, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&AppendBody { values: [&row] })
            .send()
            .await?;
        Self::check(response).await?;

        info!("Appended 1 row to sheet '{}'", self.sheet_name(dataset));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SheetsStore {
        SheetsStore::new(
            "sheet-123".to_string(),
            "token".to_string(),
            "면담 데이터".to_string(),
            "직원면담".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_a1_range_quotes_and_escapes() {
        assert_eq!(a1_sheet_range("면담 데이터"), "'면담 데이터'");
        assert_eq!(a1_sheet_range("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_values_url_escapes_sheet_name() {
        let url = store().values_url(Dataset::Profiles, "").unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/"));
        assert!(!s.contains(' '), "spaces must be percent-encoded: {s}");
    }

    #[test]
    fn test_append_url_targets_interview_sheet() {
        let url = store().values_url(Dataset::Interviews, ":append").unwrap();
        assert!(url.path().ends_with(":append"));
    }

    #[test]
    fn test_value_range_without_values_is_empty() {
        let range: ValueRange = serde_json::from_str(r#"{"range": "A1:Z1000"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_append_body_wraps_single_row() {
        let row = vec!["E1".to_string(), "2024-01-10".to_string()];
        let body = serde_json::to_value(AppendBody { values: [&row] }).unwrap();
        assert_eq!(body, serde_json::json!({"values": [["E1", "2024-01-10"]]}));
    }
}
