//! In-process store for local runs and tests. Optionally seeded from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use super::{Dataset, RawTable, StoreError, TabularStore};
use crate::roster::schema::{
    COL_EMP_ID, COL_INTERVIEW_DATE, COL_INTERVIEW_TYPE, COL_MANAGER_ID, COL_SUMMARY_TEXT,
};

/// Seed file layout: `{"profiles": {"headers": [...], "rows": [[...]]}, "interviews": {...}}`.
#[derive(Debug, Deserialize)]
struct Seed {
    profiles: RawTable,
    #[serde(default = "empty_interview_table")]
    interviews: RawTable,
}

fn empty_interview_table() -> RawTable {
    RawTable::new(
        [
            COL_EMP_ID,
            COL_INTERVIEW_DATE,
            COL_INTERVIEW_TYPE,
            COL_MANAGER_ID,
            COL_SUMMARY_TEXT,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        vec![],
    )
}

pub struct MemoryStore {
    profiles: RawTable,
    interviews: RwLock<RawTable>,
}

impl MemoryStore {
    pub fn new(profiles: RawTable, interviews: RawTable) -> Self {
        Self {
            profiles,
            interviews: RwLock::new(interviews),
        }
    }

    pub async fn from_seed_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed: Seed = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        info!(
            "Seeded memory store: {} profile rows, {} interview rows",
            seed.profiles.rows.len(),
            seed.interviews.rows.len()
        );
        Ok(Self::new(seed.profiles, seed.interviews))
    }

    /// A store with no profiles and an empty interview log.
    pub fn empty() -> Self {
        Self::new(
            RawTable::new(vec![COL_EMP_ID.to_string(), COL_MANAGER_ID.to_string()], vec![]),
            empty_interview_table(),
        )
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn read_table(&self, dataset: Dataset) -> Result<RawTable, StoreError> {
        Ok(match dataset {
            Dataset::Profiles => self.profiles.clone(),
            Dataset::Interviews => self.interviews.read().await.clone(),
        })
    }

    async fn append_row(&self, dataset: Dataset, row: Vec<String>) -> Result<(), StoreError> {
        if dataset != Dataset::Interviews {
            return Err(StoreError::ReadOnly(dataset));
        }
        self.interviews
            .write()
            .await
            .rows
            .push(row.into_iter().map(Value::String).collect());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_keeps_existing_rows() {
        let mut interviews = empty_interview_table();
        interviews.rows.push(vec![
            json!("E1"),
            json!("2024-01-10"),
            json!("수시면담"),
            json!("1"),
            json!("ok"),
        ]);
        let store = MemoryStore::new(RawTable::default(), interviews.clone());

        store
            .append_row(
                Dataset::Interviews,
                vec!["E2".into(), "2024-02-01".into(), "고과면담".into(), "1".into(), "x".into()],
            )
            .await
            .unwrap();

        let after = store.read_table(Dataset::Interviews).await.unwrap();
        assert_eq!(after.rows.len(), 2);
        assert_eq!(after.rows[0], interviews.rows[0]);
    }

    #[tokio::test]
    async fn test_profiles_are_not_writable() {
        let store = MemoryStore::empty();
        let err = store
            .append_row(Dataset::Profiles, vec!["E1".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly(Dataset::Profiles)));
    }

    #[tokio::test]
    async fn test_seed_file_without_interviews_gets_empty_log() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"profiles": {{"headers": ["EMPID", "관리자", "직급"], "rows": [["E1", 1, "대리"]]}}}}"#
        )
        .unwrap();

        let store = MemoryStore::from_seed_file(file.path()).await.unwrap();
        let profiles = store.read_table(Dataset::Profiles).await.unwrap();
        let interviews = store.read_table(Dataset::Interviews).await.unwrap();

        assert_eq!(profiles.rows.len(), 1);
        assert_eq!(interviews.headers.len(), 5);
        assert!(interviews.rows.is_empty());
    }
}
