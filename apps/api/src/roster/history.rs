//! History Selector: recency ordering of one employee's interview records.

use std::cmp::Ordering;

use crate::models::interview::InterviewRecord;

/// Interviews fed into a coaching prompt.
pub const RECENT_WINDOW: usize = 3;

/// One employee/manager pair's interviews, newest first.
///
/// Undated records sort after every dated one. Ties (equal dates, or both
/// undated) keep load order.
#[derive(Debug, Clone)]
pub struct HistoryView<'a> {
    ordered: Vec<&'a InterviewRecord>,
}

impl<'a> HistoryView<'a> {
    pub fn new(mut records: Vec<&'a InterviewRecord>) -> Self {
        // Stable sort; input is in load order.
        records.sort_by(|a, b| recency(a, b).then(a.row_index.cmp(&b.row_index)));
        Self { ordered: records }
    }

    /// The full ordered sequence, for display.
    pub fn all(&self) -> &[&'a InterviewRecord] {
        &self.ordered
    }

    /// At most `RECENT_WINDOW` newest records, for prompt synthesis.
    pub fn recent(&self) -> &[&'a InterviewRecord] {
        &self.ordered[..self.ordered.len().min(RECENT_WINDOW)]
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }
}

fn recency(a: &InterviewRecord, b: &InterviewRecord) -> Ordering {
    match (a.interview_date, b.interview_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
