//! PostgreSQL-backed store. Presents the two tables under the same headers the
//! interview spreadsheet uses so the normalizer treats both backends alike.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE employee_profiles (
//!     row_id     BIGSERIAL PRIMARY KEY,
//!     emp_id     TEXT NOT NULL,
//!     manager_id TEXT NOT NULL,
//!     attributes JSONB NOT NULL DEFAULT '{}'
//! );
//! CREATE TABLE interview_records (
//!     row_id         BIGSERIAL PRIMARY KEY,
//!     emp_id         TEXT NOT NULL,
//!     interview_date TEXT,
//!     interview_type TEXT NOT NULL,
//!     manager_id     TEXT NOT NULL,
//!     summary_text   TEXT NOT NULL,
//!     recorded_at    TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use super::{Dataset, RawTable, StoreError, TabularStore};
use crate::roster::schema::{
    COL_EMP_ID, COL_INTERVIEW_DATE, COL_INTERVIEW_TYPE, COL_MANAGER_ID, COL_SUMMARY_TEXT,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn read_profiles(&self) -> Result<RawTable, StoreError> {
        let rows: Vec<(String, String, Value)> = sqlx::query_as(
            "SELECT emp_id, manager_id, attributes FROM employee_profiles ORDER BY row_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles_to_table(rows))
    }

    async fn read_interviews(&self) -> Result<RawTable, StoreError> {
        let rows: Vec<(String, Option<String>, String, String, String)> = sqlx::query_as(
            r#"
            SELECT emp_id, interview_date, interview_type, manager_id, summary_text
            FROM interview_records
            ORDER BY row_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let headers = [
            COL_EMP_ID,
            COL_INTERVIEW_DATE,
            COL_INTERVIEW_TYPE,
            COL_MANAGER_ID,
            COL_SUMMARY_TEXT,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let rows = rows
            .into_iter()
            .map(|(emp_id, date, kind, manager_id, summary)| {
                vec![
                    Value::String(emp_id),
                    date.map(Value::String).unwrap_or(Value::Null),
                    Value::String(kind),
                    Value::String(manager_id),
                    Value::String(summary),
                ]
            })
            .collect();

        Ok(RawTable::new(headers, rows))
    }
}

/// Flattens `attributes` objects into columns.
///
/// JSONB does not keep object key order, so attribute columns are the union of
/// keys across rows sorted by name. Use the sheets backend where the source
/// column order matters.
fn profiles_to_table(rows: Vec<(String, String, Value)>) -> RawTable {
    let keys: BTreeSet<&String> = rows
        .iter()
        .filter_map(|(_, _, attributes)| attributes.as_object())
        .flat_map(|map| map.keys())
        .collect();
    let mut headers = vec![COL_EMP_ID.to_string(), COL_MANAGER_ID.to_string()];
    headers.extend(keys.into_iter().cloned());

    let table_rows = rows
        .into_iter()
        .map(|(emp_id, manager_id, attributes)| {
            let mut cells = vec![Value::String(emp_id), Value::String(manager_id)];
            for header in &headers[2..] {
                cells.push(attributes.get(header).cloned().unwrap_or(Value::Null));
            }
            cells
        })
        .collect();

    RawTable::new(headers, table_rows)
}

#[async_trait]
impl TabularStore for PgStore {
    async fn read_table(&self, dataset: Dataset) -> Result<RawTable, StoreError> {
        match dataset {
            Dataset::Profiles => self.read_profiles().await,
            Dataset::Interviews => self.read_interviews().await,
        }
    }

    async fn append_row(&self, dataset: Dataset, row: Vec<String>) -> Result<(), StoreError> {
        if dataset != Dataset::Interviews {
            return Err(StoreError::ReadOnly(dataset));
        }
        let [emp_id, date, kind, manager_id, summary]: [String; 5] = row
            .try_into()
            .map_err(|r: Vec<String>| {
                StoreError::Malformed(format!("interview row needs 5 cells, got {}", r.len()))
            })?;

        // Append-only: INSERT, never UPDATE
        sqlx::query(
            r#"
            INSERT INTO interview_records
                (emp_id, interview_date, interview_type, manager_id, summary_text)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&emp_id)
        .bind(&date)
        .bind(&kind)
        .bind(&manager_id)
        .bind(&summary)
        .execute(&self.pool)
        .await?;

        info!("Inserted interview record for employee {emp_id} (manager {manager_id})");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profiles_to_table_flattens_attributes() {
        let table = profiles_to_table(vec![
            ("E1".into(), "1".into(), json!({"직급": "대리"})),
            ("E2".into(), "1".into(), json!({"직급": "과장", "부서": "영업"})),
        ]);
        assert_eq!(table.headers, vec!["EMPID", "관리자", "부서", "직급"]);
        assert_eq!(table.rows[0], vec![json!("E1"), json!("1"), Value::Null, json!("대리")]);
        assert_eq!(table.rows[1][2], json!("영업"));
    }

    #[test]
    fn test_attribute_columns_do_not_depend_on_row_key_order() {
        let forward = profiles_to_table(vec![
            ("E1".into(), "1".into(), json!({"TEAM": "A", "LEVEL": "3"})),
        ]);
        let reversed = profiles_to_table(vec![
            ("E2".into(), "1".into(), json!({"LEVEL": "4"})),
            ("E1".into(), "1".into(), json!({"TEAM": "A", "LEVEL": "3"})),
        ]);
        assert_eq!(forward.headers, vec!["EMPID", "관리자", "LEVEL", "TEAM"]);
        assert_eq!(forward.headers, reversed.headers);
    }

    #[test]
    fn test_profiles_to_table_ignores_non_object_attributes() {
        let table = profiles_to_table(vec![("E1".into(), "1".into(), Value::Null)]);
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.rows[0].len(), 2);
    }
}
