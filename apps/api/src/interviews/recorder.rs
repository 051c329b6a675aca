//! Interview Recorder: validates a new interview and appends it to the log.
//!
//! CRITICAL: This is append-only. One validated record becomes one appended
//! row; nothing is updated or deleted, and nothing is written when validation
//! fails. No read-after-write check and no automatic retry: a failed append is
//! reported and retrying is the caller's decision.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::models::interview::{InterviewRecord, InterviewType, RecordedType};
use crate::store::{Dataset, StoreError, TabularStore};

/// Spreadsheet cell limit; longer summaries would be rejected by the store.
pub const MAX_SUMMARY_CHARS: usize = 50_000;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),

    #[error("Interview record was not saved: {0}")]
    Write(#[source] StoreError),
}

/// A not-yet-persisted interview as entered by the manager.
#[derive(Debug, Clone)]
pub struct InterviewDraft {
    pub emp_id: String,
    pub manager_id: String,
    pub interview_type: InterviewType,
    pub summary_text: String,
}

/// Validates `draft`, stamps it with `today`, and appends it as one row.
pub async fn record_interview(
    store: &dyn TabularStore,
    draft: InterviewDraft,
    today: NaiveDate,
) -> Result<InterviewRecord, RecordError> {
    validate(&draft)?;

    let record = InterviewRecord {
        emp_id: draft.emp_id.trim().to_string(),
        manager_id: draft.manager_id.trim().to_string(),
        interview_date: Some(today),
        interview_type: RecordedType::Known(draft.interview_type),
        summary_text: draft.summary_text,
        // Position is only known after a reload.
        row_index: usize::MAX,
    };

    store
        .append_row(Dataset::Interviews, record.to_row())
        .await
        .map_err(RecordError::Write)?;

    info!(
        "Recorded {} interview for employee {} (manager {})",
        record.interview_type, record.emp_id, record.manager_id
    );
    Ok(record)
}

fn validate(draft: &InterviewDraft) -> Result<(), RecordError> {
    if draft.emp_id.trim().is_empty() {
        return Err(RecordError::Validation("emp_id cannot be empty".to_string()));
    }
    if draft.manager_id.trim().is_empty() {
        return Err(RecordError::Validation(
            "manager_id cannot be empty".to_string(),
        ));
    }
    if draft.summary_text.trim().is_empty() {
        return Err(RecordError::Validation(
            "summary_text cannot be empty".to_string(),
        ));
    }
    let len = draft.summary_text.chars().count();
    if len > MAX_SUMMARY_CHARS {
        return Err(RecordError::Validation(format!(
            "summary_text is {len} characters; the limit is {MAX_SUMMARY_CHARS}"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RawTable};
    use async_trait::async_trait;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn draft(summary: &str) -> InterviewDraft {
        InterviewDraft {
            emp_id: "E1".to_string(),
            manager_id: "1".to_string(),
            interview_type: InterviewType::Routine,
            summary_text: summary.to_string(),
        }
    }

    async fn rows(store: &MemoryStore) -> Vec<Vec<serde_json::Value>> {
        store.read_table(Dataset::Interviews).await.unwrap().rows
    }

    struct FailingStore;

    #[async_trait]
    impl TabularStore for FailingStore {
        async fn read_table(&self, _dataset: Dataset) -> Result<RawTable, StoreError> {
            Ok(RawTable::default())
        }

        async fn append_row(&self, _dataset: Dataset, _row: Vec<String>) -> Result<(), StoreError> {
            Err(StoreError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_save_appends_exactly_one_row_in_column_order() {
        let store = MemoryStore::empty();
        let record = record_interview(&store, draft("discussed goals"), today())
            .await
            .unwrap();

        assert_eq!(record.interview_date, Some(today()));
        assert_eq!(
            rows(&store).await,
            vec![vec![
                json!("E1"),
                json!("2026-10-19"),
                json!("수시면담"),
                json!("1"),
                json!("discussed goals"),
            ]]
        );
    }

    #[tokio::test]
    async fn test_empty_or_blank_summary_is_rejected_without_write() {
        let store = MemoryStore::empty();
        for summary in ["", "   ", "\n\t"] {
            let err = record_interview(&store, draft(summary), today())
                .await
                .unwrap_err();
            assert!(matches!(err, RecordError::Validation(_)));
        }
        assert!(rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_ids_are_rejected() {
        let store = MemoryStore::empty();
        let mut d = draft("ok");
        d.emp_id = " ".to_string();
        assert!(matches!(
            record_interview(&store, d, today()).await,
            Err(RecordError::Validation(_))
        ));

        let mut d = draft("ok");
        d.manager_id = String::new();
        assert!(matches!(
            record_interview(&store, d, today()).await,
            Err(RecordError::Validation(_))
        ));
        assert!(rows(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_summary_is_rejected() {
        let store = MemoryStore::empty();
        let err = record_interview(&store, draft(&"a".repeat(MAX_SUMMARY_CHARS + 1)), today())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
    }

    #[tokio::test]
    async fn test_saves_never_touch_earlier_rows() {
        let store = MemoryStore::empty();
        record_interview(&store, draft("first"), today()).await.unwrap();
        let before = rows(&store).await;

        let mut second = draft("second");
        second.interview_type = InterviewType::ReturnToWork;
        record_interview(&store, second, today()).await.unwrap();
        let after = rows(&store).await;

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after[1][2], json!("복귀면담"));
    }

    #[tokio::test]
    async fn test_summary_is_written_as_entered() {
        let store = MemoryStore::empty();
        record_interview(&store, draft("  목표 논의\n다음 액션: 1주 후 확인  "), today())
            .await
            .unwrap();
        assert_eq!(rows(&store).await[0][4], json!("  목표 논의\n다음 액션: 1주 후 확인  "));
    }

    #[tokio::test]
    async fn test_store_failure_is_write_error() {
        let err = record_interview(&FailingStore, draft("ok"), today())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::Write(StoreError::Api { status: 503, .. })));
    }
}
