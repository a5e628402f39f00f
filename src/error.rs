//! Error types for shelfwise
//!
//! This module defines error types using thiserror for ergonomic error
//! handling. Errors are grouped by the taxonomy the routing layer cares
//! about: not-found, invariant violations, transport failures and
//! persistence failures. Category predicates (`is_not_found`, …) and
//! `http_status_hint` let callers map errors without matching every
//! variant.

use thiserror::Error;

/// Result type alias using our LibraryError type
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Main error type for shelfwise
#[derive(Error, Debug)]
pub enum LibraryError {
    // ===== Not found =====

    /// Book does not exist
    #[error("book not found: {0}")]
    BookNotFound(i64),

    /// Student does not exist
    #[error("student not found: {0}")]
    StudentNotFound(i64),

    /// No open issue matches the given id (absent or already returned)
    #[error("book issue not found or already returned: {0}")]
    IssueNotFound(i64),

    // ===== Invariant violations =====

    /// Book has no copies left to lend
    #[error("no available copies for book {book_id}")]
    NoCopiesAvailable { book_id: i64 },

    /// Student already holds an open issue for this book
    #[error("student {student_id} already has book {book_id} issued")]
    DuplicateOpenIssue { book_id: i64, student_id: i64 },

    /// Due date must be strictly after issue date
    #[error("due date {due_date} is not after issue date {issue_date}")]
    InvalidDueDate {
        issue_date: chrono::NaiveDate,
        due_date: chrono::NaiveDate,
    },

    /// A unique column (isbn, roll number, email) already holds this value
    #[error("duplicate {field}: {value}")]
    DuplicateRecord { field: &'static str, value: String },

    // ===== Transport failures =====

    /// Mail relay rejected or failed to deliver a message
    #[error("failed to send email to {recipient}: {message}")]
    MailDelivery { recipient: String, message: String },

    /// Text-generation service failed to produce a query
    #[error("query generation failed: {0}")]
    GenerationFailed(String),

    // ===== Validation =====

    /// Generated SQL is not a read-only statement and was refused
    #[error("refusing to execute non-read-only SQL: {0}")]
    UnsafeQuery(String),

    /// Configuration is invalid or incomplete
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ===== Persistence failures =====

    /// Database schema migration failed
    #[error("database migration failed: {0}")]
    MigrationFailed(String),

    /// Database driver error from sqlx
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    // ===== External library errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LibraryError {
    /// Check whether this is a missing-entity error (404-equivalent)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::BookNotFound(_)
                | LibraryError::StudentNotFound(_)
                | LibraryError::IssueNotFound(_)
        )
    }

    /// Check whether this is a domain-rule violation (400-equivalent)
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            LibraryError::NoCopiesAvailable { .. }
                | LibraryError::DuplicateOpenIssue { .. }
                | LibraryError::InvalidDueDate { .. }
                | LibraryError::DuplicateRecord { .. }
                | LibraryError::UnsafeQuery(_)
        )
    }

    /// Check whether this came from an external delivery/generation service.
    ///
    /// Transport failures are retried implicitly: the sweep leaves no
    /// history row behind, so the next eligibility check fires again.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            LibraryError::MailDelivery { .. }
                | LibraryError::GenerationFailed(_)
                | LibraryError::Reqwest(_)
        )
    }

    /// HTTP status the routing layer should surface for this error
    pub fn http_status_hint(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_invariant_violation() {
            400
        } else if self.is_transport_failure() {
            502
        } else {
            500
        }
    }

    /// Map a sqlx error to `DuplicateRecord` when it is a unique-constraint
    /// violation on the given field, keeping the raw error otherwise.
    pub fn from_unique_violation(err: sqlx::Error, field: &'static str, value: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                LibraryError::DuplicateRecord {
                    field,
                    value: value.to_string(),
                }
            }
            _ => LibraryError::Sqlx(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_disjoint() {
        let not_found = LibraryError::BookNotFound(7);
        assert!(not_found.is_not_found());
        assert!(!not_found.is_invariant_violation());
        assert_eq!(not_found.http_status_hint(), 404);

        let violation = LibraryError::NoCopiesAvailable { book_id: 7 };
        assert!(violation.is_invariant_violation());
        assert!(!violation.is_not_found());
        assert_eq!(violation.http_status_hint(), 400);

        let transport = LibraryError::MailDelivery {
            recipient: "a@b.c".into(),
            message: "relay down".into(),
        };
        assert!(transport.is_transport_failure());
        assert_eq!(transport.http_status_hint(), 502);
    }
}
