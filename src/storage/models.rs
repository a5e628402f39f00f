//! Database models for shelfwise
//!
//! Entities for the four tables plus the `New*` insert models, patch and
//! filter types used by the repository functions.
//!
//! # SQLite Adaptations
//! - Dates stored as TEXT in ISO 8601 format (`NaiveDate`/`NaiveDateTime`)
//! - `ReminderType` stored as TEXT, constrained by a CHECK in the schema

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// Kind of reminder owed for an open issue.
///
/// The two kinds are mutually exclusive for a given day: the sign of
/// `days_until_due` picks exactly one (or neither).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    PreDue,
    Overdue,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::PreDue => "pre_due",
            ReminderType::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BOOKS
// ============================================================================

/// Book entity - a catalog record with a mutable copy count
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub isbn: String,
    /// Copies currently available to lend; never negative
    pub number_of_copies: i64,
    pub author: String,
    pub category: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields required to insert a book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub number_of_copies: i64,
    pub author: String,
    pub category: String,
}

/// Partial update for a book; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub number_of_copies: Option<i64>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.isbn.is_none()
            && self.number_of_copies.is_none()
            && self.author.is_none()
            && self.category.is_none()
    }
}

/// Optional filters for book search; all provided filters must match
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Substring match on title
    pub title: Option<String>,
    /// Substring match on author
    pub author: Option<String>,
    /// Exact match on category
    pub category: Option<String>,
    /// Exact match on ISBN
    pub isbn: Option<String>,
}

// ============================================================================
// STUDENTS
// ============================================================================

/// Student entity - a registered borrower
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub roll_number: String,
    pub department: String,
    pub semester: i64,
    pub phone: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields required to insert a student
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub department: String,
    pub semester: i64,
    pub phone: String,
    pub email: String,
}

/// Partial update for a student; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.roll_number.is_none()
            && self.department.is_none()
            && self.semester.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }
}

/// Optional filters for student search; all provided filters must match
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Substring match on name
    pub name: Option<String>,
    /// Substring match on roll number
    pub roll_number: Option<String>,
    /// Exact match on department
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub phone: Option<String>,
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Limit/offset window for search results
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 50;

    /// Build from 1-based page number and per-page limit
    pub fn new(page: i64, limit: i64) -> Self {
        let limit = limit.clamp(1, 500);
        let page = page.max(1);
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

// ============================================================================
// BOOK ISSUES
// ============================================================================

/// Book issue entity - one loan of one book to one student.
///
/// Open while `return_date` is NULL; mutated exactly once, on return.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookIssue {
    pub issue_id: i64,
    pub book_id: i64,
    pub student_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BookIssue {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Signed whole days until due; negative once overdue
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    /// Overdue iff still open and past due
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}

/// Candidate row for the reminder sweep: an open issue joined with the
/// student contact fields and the book title needed to render the message.
#[derive(Debug, Clone, FromRow)]
pub struct DueIssue {
    pub issue_id: i64,
    pub book_id: i64,
    pub student_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub student_name: String,
    pub student_email: String,
    pub book_title: String,
}

impl DueIssue {
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

// ============================================================================
// REMINDER HISTORY
// ============================================================================

/// Reminder history entity - one row per dispatched reminder, insert-only
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReminderHistory {
    pub reminder_id: i64,
    pub student_id: i64,
    pub book_issue_id: i64,
    pub reminder_type: ReminderType,
    pub sent_date: NaiveDate,
    /// Snapshot of `days_until_due` at send time; negative when overdue
    pub days_before_due: i64,
    pub created_at: NaiveDateTime,
}

/// Fields required to record a dispatched reminder
#[derive(Debug, Clone)]
pub struct NewReminderHistory {
    pub student_id: i64,
    pub book_issue_id: i64,
    pub reminder_type: ReminderType,
    pub sent_date: NaiveDate,
    pub days_before_due: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(due: NaiveDate, returned: Option<NaiveDate>) -> BookIssue {
        BookIssue {
            issue_id: 1,
            book_id: 1,
            student_id: 1,
            issue_date: due - chrono::Duration::days(30),
            due_date: due,
            return_date: returned,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn overdue_requires_open_and_past_due() {
        let today = date(2024, 3, 10);

        let open_past_due = issue(date(2024, 3, 9), None);
        assert!(open_past_due.is_overdue(today));

        let open_due_today = issue(today, None);
        assert!(!open_due_today.is_overdue(today));

        let returned_past_due = issue(date(2024, 3, 9), Some(today));
        assert!(!returned_past_due.is_overdue(today));
    }

    #[test]
    fn days_until_due_is_signed() {
        let today = date(2024, 3, 10);
        assert_eq!(issue(date(2024, 3, 15), None).days_until_due(today), 5);
        assert_eq!(issue(today, None).days_until_due(today), 0);
        assert_eq!(issue(date(2024, 3, 7), None).days_until_due(today), -3);
    }

    #[test]
    fn page_is_one_based() {
        let page = Page::new(3, 20);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 40);

        let clamped = Page::new(0, 0);
        assert_eq!(clamped.limit, 1);
        assert_eq!(clamped.offset, 0);
    }

    #[test]
    fn reminder_type_round_trips_as_text() {
        assert_eq!(ReminderType::PreDue.as_str(), "pre_due");
        assert_eq!(ReminderType::Overdue.as_str(), "overdue");
    }
}
