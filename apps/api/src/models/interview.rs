use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used when writing the interview date cell.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed set of interview types a manager may record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Routine,
    Performance,
    ReturnToWork,
}

impl InterviewType {
    pub const ALL: [InterviewType; 3] = [
        InterviewType::Routine,
        InterviewType::Performance,
        InterviewType::ReturnToWork,
    ];

    /// Label stored in the interview sheet's type column.
    pub fn label(&self) -> &'static str {
        match self {
            InterviewType::Routine => "수시면담",
            InterviewType::Performance => "고과면담",
            InterviewType::ReturnToWork => "복귀면담",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Routine => "routine",
            InterviewType::Performance => "performance",
            InterviewType::ReturnToWork => "return_to_work",
        }
    }

    /// Recognizes both the sheet labels and the API identifiers.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|t| {
            raw == t.label()
                || raw.eq_ignore_ascii_case(t.as_str())
                || raw.eq_ignore_ascii_case(&t.as_str().replace('_', "-"))
        })
    }
}

/// Interview type as read back from the store.
///
/// Rows typed by hand in the sheet may carry a label outside the closed set;
/// those are kept verbatim instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordedType {
    Known(InterviewType),
    Unrecognized(String),
}

impl RecordedType {
    pub fn from_cell(raw: &str) -> Self {
        match InterviewType::parse(raw) {
            Some(t) => RecordedType::Known(t),
            None => RecordedType::Unrecognized(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for RecordedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedType::Known(t) => f.write_str(t.label()),
            RecordedType::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// One row of the interview log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewRecord {
    pub emp_id: String,
    pub manager_id: String,
    /// `None` when the cell was empty or not a recognizable date.
    pub interview_date: Option<NaiveDate>,
    pub interview_type: RecordedType,
    pub summary_text: String,
    /// Zero-based position in the loaded table. Tie-break for ordering.
    #[serde(skip)]
    pub row_index: usize,
}

impl InterviewRecord {
    /// Cells in the interview sheet's column order:
    /// employee id, date, type, manager id, summary.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.emp_id.clone(),
            self.interview_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            self.interview_type.to_string(),
            self.manager_id.clone(),
            self.summary_text.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_labels_and_identifiers() {
        assert_eq!(InterviewType::parse("수시면담"), Some(InterviewType::Routine));
        assert_eq!(InterviewType::parse(" PERFORMANCE "), Some(InterviewType::Performance));
        assert_eq!(
            InterviewType::parse("return-to-work"),
            Some(InterviewType::ReturnToWork)
        );
        assert_eq!(
            InterviewType::parse("return_to_work"),
            Some(InterviewType::ReturnToWork)
        );
        assert_eq!(InterviewType::parse("coffee chat"), None);
    }

    #[test]
    fn test_unrecognized_type_is_kept_verbatim() {
        let recorded = RecordedType::from_cell(" 면담 ");
        assert_eq!(recorded, RecordedType::Unrecognized("면담".to_string()));
        assert_eq!(recorded.to_string(), "면담");
    }

    #[test]
    fn test_to_row_uses_sheet_column_order() {
        let record = InterviewRecord {
            emp_id: "E1".to_string(),
            manager_id: "1".to_string(),
            interview_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            interview_type: RecordedType::Known(InterviewType::Performance),
            summary_text: "good".to_string(),
            row_index: 0,
        };
        assert_eq!(
            record.to_row(),
            vec!["E1", "2024-03-05", "고과면담", "1", "good"]
        );
    }

    #[test]
    fn test_interview_type_deserializes_from_snake_case() {
        let t: InterviewType = serde_json::from_str("\"return_to_work\"").unwrap();
        assert_eq!(t, InterviewType::ReturnToWork);
        assert!(serde_json::from_str::<InterviewType>("\"coffee\"").is_err());
    }
}
