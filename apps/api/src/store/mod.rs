//! Backing store: the external tabular system holding profiles and interviews.
//!
//! ARCHITECTURAL RULE: the interview log is append-only. `TabularStore` exposes
//! exactly one write, `append_row`; there is no update or delete.
//!
//! `AppState` holds an `Arc<dyn TabularStore>`, picked at startup via
//! `STORE_BACKEND`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::config::StoreBackend;
use crate::db::create_pool;

pub mod memory;
pub mod postgres;
pub mod sheets;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sheets::SheetsStore;

/// The two logical tables this service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Profiles,
    Interviews,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Profiles => f.write_str("profiles"),
            Dataset::Interviews => f.write_str("interviews"),
        }
    }
}

/// A table as the store hands it over: one header row plus data rows.
///
/// Cells are untyped. Rows may be shorter than `headers` (the Sheets API drops
/// trailing empty cells); the normalizer pads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    /// Splits a values grid whose first row is the header row.
    pub fn from_grid(mut grid: Vec<Vec<Value>>) -> Self {
        if grid.is_empty() {
            return Self::default();
        }
        let headers = grid
            .remove(0)
            .into_iter()
            .map(|cell| match cell {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Self {
            headers,
            rows: grid,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unexpected response shape: {0}")]
    Malformed(String),

    #[error("{0} is not writable")]
    ReadOnly(Dataset),
}

#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Reads a whole table, header row first.
    async fn read_table(&self, dataset: Dataset) -> Result<RawTable, StoreError>;

    /// Appends one row. The only mutation this system performs.
    async fn append_row(&self, dataset: Dataset, row: Vec<String>) -> Result<(), StoreError>;

    /// Short name for logs.
    fn backend(&self) -> &'static str;
}

/// Opens the store selected by configuration.
pub async fn open_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn TabularStore>> {
    let store: Arc<dyn TabularStore> = match backend {
        StoreBackend::Sheets {
            spreadsheet_id,
            access_token,
            profile_sheet,
            interview_sheet,
        } => Arc::new(SheetsStore::new(
            spreadsheet_id.clone(),
            access_token.clone(),
            profile_sheet.clone(),
            interview_sheet.clone(),
        )?),
        StoreBackend::Postgres { database_url } => {
            Arc::new(PgStore::new(create_pool(database_url).await?))
        }
        StoreBackend::Memory { seed_path: Some(path) } => {
            Arc::new(MemoryStore::from_seed_file(path).await?)
        }
        StoreBackend::Memory { seed_path: None } => Arc::new(MemoryStore::empty()),
    };
    info!("Using {} store", store.backend());
    Ok(store)
}
