//! Prompt Synthesizer: renders a profile and its recent history into the
//! fixed-structure coaching request.
//!
//! No LLM calls. Output size is bounded so a wide profile sheet or a long
//! summary cannot blow up the request payload.

use serde::Serialize;

use crate::coaching::prompts::{
    render_coaching_prompt, COACHING_SYSTEM, HISTORY_FIELD_SEPARATOR, TRUNCATION_MARK,
    UNKNOWN_DATE,
};
use crate::models::interview::{InterviewRecord, DATE_FORMAT};
use crate::models::profile::EmployeeProfile;
use crate::roster::history::HistoryView;

/// Profile attributes rendered at most, in column order.
pub const MAX_PROFILE_ATTRIBUTES: usize = 30;
/// Characters kept per attribute value.
pub const MAX_ATTRIBUTE_CHARS: usize = 200;
/// Characters kept per interview summary.
pub const MAX_SUMMARY_CHARS: usize = 1_000;

/// The synthesized, bounded payload for one coaching call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachingRequest {
    pub profile_block: String,
    pub history_block: String,
}

impl CoachingRequest {
    pub fn system(&self) -> &'static str {
        COACHING_SYSTEM
    }

    /// Final user-role text sent to the model.
    pub fn render(&self) -> String {
        render_coaching_prompt(&self.profile_block, &self.history_block)
    }
}

/// Builds the coaching request for one employee from the recent-history window.
/// An empty history is fine: the history section is rendered empty.
pub fn synthesize(profile: &EmployeeProfile, history: &HistoryView<'_>) -> CoachingRequest {
    CoachingRequest {
        profile_block: render_profile(profile),
        history_block: render_history(history.recent()),
    }
}

fn render_profile(profile: &EmployeeProfile) -> String {
    // Identifier columns never reach `attributes`; see roster::schema.
    profile
        .attributes
        .iter()
        .filter(|a| !a.value.trim().is_empty())
        .take(MAX_PROFILE_ATTRIBUTES)
        .map(|a| format!("{}: {}", a.name, truncate(a.value.trim(), MAX_ATTRIBUTE_CHARS)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_history(records: &[&InterviewRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let date = r
                .interview_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| UNKNOWN_DATE.to_string());
            format!(
                "- {date}{sep}{kind}{sep}{summary}",
                sep = HISTORY_FIELD_SEPARATOR,
                kind = r.interview_type,
                summary = truncate(r.summary_text.trim(), MAX_SUMMARY_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `text` to at most `max_chars` characters (not bytes), marking the cut.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let keep = max_chars.saturating_sub(TRUNCATION_MARK.chars().count());
            let cut = text
                .char_indices()
                .nth(keep)
                .map(|(i, _)| i)
                .unwrap_or(byte_idx);
            format!("{}{}", &text[..cut], TRUNCATION_MARK)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
