//! Reminder eligibility rules
//!
//! Per-issue state is derived, never stored: `days_until_due` relative to
//! the sweep date picks the reminder kind, and the dispatch history gates
//! repeats within a calendar day.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::storage::models::ReminderType;
use crate::storage::queries;

/// Pre-due lookahead in days.
///
/// This single constant bounds both the sweep's candidate query and the
/// pre-due classification below. Keeping them one value is what guarantees
/// an issue due exactly at the window edge is selected *and* sent.
pub const PRE_DUE_WINDOW_DAYS: i64 = 5;

/// Which reminder, if any, an issue owes on a given day.
///
/// Mutually exclusive by the sign of `days_until_due`: due in the window
/// (including today) means pre-due, past due means overdue, further out
/// means nothing.
pub fn classify(days_until_due: i64) -> Option<ReminderType> {
    if days_until_due < 0 {
        Some(ReminderType::Overdue)
    } else if days_until_due <= PRE_DUE_WINDOW_DAYS {
        Some(ReminderType::PreDue)
    } else {
        None
    }
}

/// Whether this issue still owes a reminder of the given type today.
///
/// True when no history row exists for (issue, type, date); overdue
/// reminders therefore repeat every day until the book comes back.
pub async fn owes_reminder(
    pool: &SqlitePool,
    issue_id: i64,
    reminder_type: ReminderType,
    today: NaiveDate,
) -> Result<bool> {
    let sent = queries::reminder_sent_on(pool, issue_id, reminder_type, today).await?;
    Ok(!sent)
}
