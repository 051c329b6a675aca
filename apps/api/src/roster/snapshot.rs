//! Roster snapshot: the immutable, loaded view of both tables.
//!
//! Handlers clone the current `Arc<RosterSnapshot>` and read from it; nothing
//! mutates a snapshot after `load`. `RosterCell::reload` swaps in a fresh one.
//! Writes by this or any other session are not reflected until then.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::models::interview::InterviewRecord;
use crate::models::profile::EmployeeProfile;
use crate::roster::history::HistoryView;
use crate::roster::index::{LookupError, RelationshipIndex};
use crate::roster::schema::{
    normalize_interviews, normalize_profiles, InterviewLog, ProfileTable, SchemaError,
};
use crate::store::{Dataset, StoreError, TabularStore};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read {dataset} table: {source}")]
    Store {
        dataset: Dataset,
        #[source]
        source: StoreError,
    },
}

pub struct RosterSnapshot {
    pub profiles: ProfileTable,
    pub interviews: InterviewLog,
    pub loaded_at: DateTime<Utc>,
    index: RelationshipIndex,
}

/// One employee as seen by one manager: profile plus the interviews that
/// manager conducted.
pub struct EmployeeView<'a> {
    pub profile: &'a EmployeeProfile,
    pub history: HistoryView<'a>,
}

impl RosterSnapshot {
    pub fn build(profiles: ProfileTable, interviews: InterviewLog) -> Self {
        let index = RelationshipIndex::build(&profiles, &interviews);
        Self {
            profiles,
            interviews,
            loaded_at: Utc::now(),
            index,
        }
    }

    /// Reads both tables from the store and normalizes them.
    pub async fn load(store: &dyn TabularStore) -> Result<Self, LoadError> {
        let raw_profiles = store
            .read_table(Dataset::Profiles)
            .await
            .map_err(|source| LoadError::Store {
                dataset: Dataset::Profiles,
                source,
            })?;
        let raw_interviews = store
            .read_table(Dataset::Interviews)
            .await
            .map_err(|source| LoadError::Store {
                dataset: Dataset::Interviews,
                source,
            })?;

        let profiles = normalize_profiles(&raw_profiles)?;
        let interviews = normalize_interviews(&raw_interviews)?;

        info!(
            "Loaded roster from {} store: {} profiles, {} interview records",
            store.backend(),
            profiles.profiles.len(),
            interviews.records.len()
        );

        Ok(Self::build(profiles, interviews))
    }

    /// Current team of `manager_id`. Empty is a valid answer.
    pub fn team(&self, manager_id: &str) -> Vec<&EmployeeProfile> {
        self.index.team(&self.profiles, manager_id)
    }

    pub fn employee(&self, manager_id: &str, emp_id: &str) -> Result<EmployeeView<'_>, LookupError> {
        let profile = self.index.team_member(&self.profiles, manager_id, emp_id)?;
        Ok(EmployeeView {
            profile,
            history: HistoryView::new(self.interviews_for(emp_id, manager_id)),
        })
    }

    pub fn interviews_for(&self, emp_id: &str, manager_id: &str) -> Vec<&InterviewRecord> {
        self.index.interviews(&self.interviews, emp_id, manager_id)
    }
}

/// Holder for the session's snapshot. A schema failure on reload replaces the
/// snapshot with the error: the session is unusable until a reload succeeds.
pub struct RosterCell {
    current: RwLock<Result<Arc<RosterSnapshot>, SchemaError>>,
}

impl RosterCell {
    pub fn new(snapshot: RosterSnapshot) -> Self {
        Self {
            current: RwLock::new(Ok(Arc::new(snapshot))),
        }
    }

    pub async fn current(&self) -> Result<Arc<RosterSnapshot>, SchemaError> {
        self.current.read().await.clone()
    }

    /// Re-reads the store. A transport failure leaves the previous snapshot in
    /// place; a schema failure poisons the session.
    pub async fn reload(&self, store: &dyn TabularStore) -> Result<Arc<RosterSnapshot>, LoadError> {
        match RosterSnapshot::load(store).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write().await = Ok(snapshot.clone());
                Ok(snapshot)
            }
            Err(LoadError::Schema(e)) => {
                error!("Roster reload failed schema validation: {e}");
                *self.current.write().await = Err(e.clone());
                Err(LoadError::Schema(e))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RawTable};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn interview_headers() -> Vec<String> {
        ["EMPID", "INTERVIEWDATE", "INTERVIEWTYPE", "관리자", "SUMMARY_TEXT"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::new(
            RawTable::new(
                vec!["EMPID".into(), "관리자".into(), "직급".into()],
                vec![
                    vec![json!("E1"), json!(1), json!("대리")],
                    vec![json!("E2"), json!(2), json!("과장")],
                ],
            ),
            RawTable::new(
                interview_headers(),
                vec![
                    vec![json!("E1"), json!("2024-01-10"), json!("수시면담"), json!("1"), json!("ok")],
                    vec![json!("E1"), json!("2024-03-05"), json!("고과면담"), json!("1"), json!("good")],
                ],
            ),
        )
    }

    /// Serves a broken profile table once `broken` is set.
    struct FlakySchemaStore {
        inner: MemoryStore,
        broken: AtomicBool,
    }

    #[async_trait]
    impl TabularStore for FlakySchemaStore {
        async fn read_table(&self, dataset: Dataset) -> Result<RawTable, StoreError> {
            if dataset == Dataset::Profiles && self.broken.load(Ordering::SeqCst) {
                return Ok(RawTable::new(vec!["NAME".into()], vec![]));
            }
            self.inner.read_table(dataset).await
        }

        async fn append_row(&self, dataset: Dataset, row: Vec<String>) -> Result<(), StoreError> {
            self.inner.append_row(dataset, row).await
        }

        fn backend(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_load_builds_employee_view() {
        let snapshot = RosterSnapshot::load(&seeded_store()).await.unwrap();

        let team: Vec<&str> = snapshot.team("1").iter().map(|p| p.emp_id.as_str()).collect();
        assert_eq!(team, vec!["E1"]);

        let view = snapshot.employee("1", "E1").unwrap();
        let dates: Vec<String> = view
            .history
            .recent()
            .iter()
            .map(|r| r.interview_date.unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-01-10"]);
    }

    #[tokio::test]
    async fn test_employee_outside_team_is_lookup_error() {
        let snapshot = RosterSnapshot::load(&seeded_store()).await.unwrap();
        assert!(matches!(
            snapshot.employee("1", "E2"),
            Err(LookupError::EmployeeNotInTeam { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_is_stale_until_reload() {
        let store = seeded_store();
        let cell = RosterCell::new(RosterSnapshot::load(&store).await.unwrap());

        store
            .append_row(
                Dataset::Interviews,
                vec!["E1".into(), "2024-04-01".into(), "수시면담".into(), "1".into(), "new".into()],
            )
            .await
            .unwrap();

        let before = cell.current().await.unwrap();
        assert_eq!(before.interviews_for("E1", "1").len(), 2);

        cell.reload(&store).await.unwrap();
        let after = cell.current().await.unwrap();
        assert_eq!(after.interviews_for("E1", "1").len(), 3);
    }

    #[tokio::test]
    async fn test_schema_failure_on_reload_poisons_session() {
        let store = FlakySchemaStore {
            inner: seeded_store(),
            broken: AtomicBool::new(false),
        };
        let cell = RosterCell::new(RosterSnapshot::load(&store).await.unwrap());

        store.broken.store(true, Ordering::SeqCst);
        assert!(matches!(
            cell.reload(&store).await,
            Err(LoadError::Schema(SchemaError::MissingColumn { .. }))
        ));
        assert!(cell.current().await.is_err());

        store.broken.store(false, Ordering::SeqCst);
        cell.reload(&store).await.unwrap();
        assert!(cell.current().await.is_ok());
    }
}
