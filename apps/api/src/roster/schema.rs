//! Schema Normalizer: turns raw store tables into typed, validated records.
//!
//! Everything downstream of this module works on `EmployeeProfile` and
//! `InterviewRecord`; no other module looks columns up by name.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::interview::{InterviewRecord, RecordedType};
use crate::models::profile::{EmployeeProfile, ProfileAttribute};
use crate::store::{Dataset, RawTable};

pub const COL_EMP_ID: &str = "EMPID";
pub const COL_MANAGER_ID: &str = "관리자";
pub const COL_INTERVIEW_DATE: &str = "INTERVIEWDATE";
pub const COL_INTERVIEW_TYPE: &str = "INTERVIEWTYPE";
pub const COL_SUMMARY_TEXT: &str = "SUMMARY_TEXT";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{dataset} table is missing required column '{column}'")]
    MissingColumn { dataset: Dataset, column: String },

    #[error("{dataset} table has more than one column normalizing to '{column}'")]
    DuplicateColumn { dataset: Dataset, column: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized tables
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProfileTable {
    /// Normalized attribute column names, in sheet order.
    pub attribute_columns: Vec<String>,
    pub profiles: Vec<EmployeeProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewLog {
    pub records: Vec<InterviewRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Header and cell normalization
// ────────────────────────────────────────────────────────────────────────────

/// Trims and upper-cases a column name. Idempotent.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalized headers plus positional lookup, rejecting collisions.
struct Columns {
    dataset: Dataset,
    names: Vec<String>,
}

impl Columns {
    fn new(dataset: Dataset, headers: &[String]) -> Result<Self, SchemaError> {
        let names: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        {
            let mut seen = HashSet::new();
            for name in &names {
                // Blank header cells (unused sheet columns) can repeat harmlessly.
                if !name.is_empty() && !seen.insert(name.as_str()) {
                    return Err(SchemaError::DuplicateColumn {
                        dataset,
                        column: name.clone(),
                    });
                }
            }
        }
        Ok(Self { dataset, names })
    }

    fn require(&self, column: &str) -> Result<usize, SchemaError> {
        self.names
            .iter()
            .position(|n| n == column)
            .ok_or_else(|| SchemaError::MissingColumn {
                dataset: self.dataset,
                column: column.to_string(),
            })
    }
}

static EMPTY_CELL: Value = Value::Null;

fn cell(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

/// Coerces a cell to text. Identifier columns go through here so that a
/// numeric-looking id (`1`, `1.0`) compares equal to the typed string `"1"`.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        other => other.to_string(),
    }
}

/// Parses an interview date cell. Unrecognized input yields `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    // Sheets' Korean locale renders dates as "2024. 1. 10" (optionally with a
    // trailing dot).
    let dotted: Vec<&str> = raw
        .trim_end_matches('.')
        .split('.')
        .map(str::trim)
        .collect();
    if let [y, m, d] = dotted.as_slice() {
        if let (Ok(y), Ok(m), Ok(d)) = (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    None
}

// ────────────────────────────────────────────────────────────────────────────
// Table normalization
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes the profile table.
///
/// Rows with an empty `EMPID` are skipped; a repeated `EMPID` keeps its first
/// row so there is exactly one profile per employee.
pub fn normalize_profiles(raw: &RawTable) -> Result<ProfileTable, SchemaError> {
    let columns = Columns::new(Dataset::Profiles, &raw.headers)?;
    let emp_idx = columns.require(COL_EMP_ID)?;
    let mgr_idx = columns.require(COL_MANAGER_ID)?;

    let attribute_idx: Vec<usize> = (0..columns.names.len())
        .filter(|&i| i != emp_idx && i != mgr_idx && !columns.names[i].is_empty())
        .collect();
    let attribute_columns = attribute_idx
        .iter()
        .map(|&i| columns.names[i].clone())
        .collect();

    let mut seen = HashSet::new();
    let mut profiles = Vec::with_capacity(raw.rows.len());

    for (row_no, row) in raw.rows.iter().enumerate() {
        let emp_id = cell_to_string(cell(row, emp_idx));
        if emp_id.is_empty() {
            warn!("Skipping profile row {row_no}: empty {COL_EMP_ID}");
            continue;
        }
        if !seen.insert(emp_id.clone()) {
            warn!("Skipping profile row {row_no}: duplicate {COL_EMP_ID} '{emp_id}'");
            continue;
        }

        let attributes = attribute_idx
            .iter()
            .map(|&i| ProfileAttribute {
                name: columns.names[i].clone(),
                value: cell_to_string(cell(row, i)),
            })
            .collect();

        profiles.push(EmployeeProfile {
            emp_id,
            manager_id: cell_to_string(cell(row, mgr_idx)),
            attributes,
        });
    }

    Ok(ProfileTable {
        attribute_columns,
        profiles,
    })
}

/// Normalizes the interview log. Never fails on cell contents, only on shape.
pub fn normalize_interviews(raw: &RawTable) -> Result<InterviewLog, SchemaError> {
    let columns = Columns::new(Dataset::Interviews, &raw.headers)?;
    let emp_idx = columns.require(COL_EMP_ID)?;
    let mgr_idx = columns.require(COL_MANAGER_ID)?;
    let date_idx = columns.require(COL_INTERVIEW_DATE)?;
    let type_idx = columns.require(COL_INTERVIEW_TYPE)?;
    let summary_idx = columns.require(COL_SUMMARY_TEXT)?;

    let records = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| InterviewRecord {
            emp_id: cell_to_string(cell(row, emp_idx)),
            manager_id: cell_to_string(cell(row, mgr_idx)),
            interview_date: parse_date(&cell_to_string(cell(row, date_idx))),
            interview_type: RecordedType::from_cell(&cell_to_string(cell(row, type_idx))),
            summary_text: match cell(row, summary_idx) {
                Value::String(s) => s.clone(),
                other => cell_to_string(other),
            },
            row_index,
        })
        .collect();

    Ok(InterviewLog { records })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
