// Shelfwise - Library Management Backend
// Copyright (C) 2026 Shelfwise contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Issue/return engine
//!
//! Lending and returning books, with the availability and double-issue
//! invariants enforced inside one transaction per operation:
//!
//! - a book can only be issued while copies remain, and the copy count
//!   never goes negative;
//! - a student holds at most one open issue per book;
//! - the due date is strictly after the issue date (default: issue date
//!   plus [`DEFAULT_LOAN_DAYS`]).

use chrono::{Duration, Local, NaiveDate};
use sqlx::SqlitePool;

use crate::error::{LibraryError, Result};
use crate::storage::models::BookIssue;
use crate::storage::queries;

/// Loan length applied when no due date is given
pub const DEFAULT_LOAN_DAYS: i64 = 30;

/// Parameters for lending a book
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub book_id: i64,
    pub student_id: i64,
    /// Defaults to today
    pub issue_date: Option<NaiveDate>,
    /// Defaults to issue date + [`DEFAULT_LOAN_DAYS`]
    pub due_date: Option<NaiveDate>,
}

impl IssueRequest {
    pub fn new(book_id: i64, student_id: i64) -> Self {
        Self {
            book_id,
            student_id,
            issue_date: None,
            due_date: None,
        }
    }
}

/// Parameters for returning a book
#[derive(Debug, Clone)]
pub struct ReturnRequest {
    pub issue_id: i64,
    /// Defaults to today
    pub return_date: Option<NaiveDate>,
}

/// Lend a book to a student.
///
/// Checks, copy decrement and the issue insert all run in one transaction;
/// any failure before commit rolls the whole operation back.
///
/// # Errors
/// - [`LibraryError::BookNotFound`] / [`LibraryError::StudentNotFound`]
/// - [`LibraryError::NoCopiesAvailable`] when no copies remain
/// - [`LibraryError::DuplicateOpenIssue`] when the student already holds
///   this book
/// - [`LibraryError::InvalidDueDate`] when `due_date <= issue_date`
pub async fn issue_book(pool: &SqlitePool, request: &IssueRequest) -> Result<BookIssue> {
    let issue_date = request
        .issue_date
        .unwrap_or_else(|| Local::now().date_naive());
    let due_date = request
        .due_date
        .unwrap_or(issue_date + Duration::days(DEFAULT_LOAN_DAYS));

    if due_date <= issue_date {
        return Err(LibraryError::InvalidDueDate {
            issue_date,
            due_date,
        });
    }

    let mut tx = pool.begin().await?;

    let book = queries::find_book_for_update(&mut tx, request.book_id)
        .await?
        .ok_or(LibraryError::BookNotFound(request.book_id))?;

    if !queries::student_exists(&mut tx, request.student_id).await? {
        return Err(LibraryError::StudentNotFound(request.student_id));
    }

    if book.number_of_copies <= 0 {
        return Err(LibraryError::NoCopiesAvailable {
            book_id: request.book_id,
        });
    }

    if queries::find_open_issue_for_pair(&mut tx, request.book_id, request.student_id)
        .await?
        .is_some()
    {
        return Err(LibraryError::DuplicateOpenIssue {
            book_id: request.book_id,
            student_id: request.student_id,
        });
    }

    queries::adjust_book_copies(&mut tx, request.book_id, -1).await?;
    let issue_id = queries::insert_issue(
        &mut tx,
        request.book_id,
        request.student_id,
        issue_date,
        due_date,
    )
    .await?;

    tx.commit().await?;

    log::info!(
        "issued book {} to student {} (issue {issue_id}, due {due_date})",
        request.book_id,
        request.student_id
    );

    queries::find_issue_by_id(pool, issue_id)
        .await?
        .ok_or(LibraryError::IssueNotFound(issue_id))
}

/// Return a previously issued book.
///
/// Sets the return date and restores the copy count in one transaction.
///
/// # Errors
/// [`LibraryError::IssueNotFound`] when no open issue matches `issue_id`.
pub async fn return_book(pool: &SqlitePool, request: &ReturnRequest) -> Result<BookIssue> {
    let return_date = request
        .return_date
        .unwrap_or_else(|| Local::now().date_naive());

    let mut tx = pool.begin().await?;

    let issue = queries::find_open_issue_by_id(&mut tx, request.issue_id)
        .await?
        .ok_or(LibraryError::IssueNotFound(request.issue_id))?;

    let updated = queries::mark_returned(&mut tx, request.issue_id, return_date).await?;
    if updated == 0 {
        return Err(LibraryError::IssueNotFound(request.issue_id));
    }
    queries::adjust_book_copies(&mut tx, issue.book_id, 1).await?;

    tx.commit().await?;

    log::info!(
        "returned issue {} (book {}, student {})",
        request.issue_id,
        issue.book_id,
        issue.student_id
    );

    queries::find_issue_by_id(pool, request.issue_id)
        .await?
        .ok_or(LibraryError::IssueNotFound(request.issue_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{NewBook, NewStudent};
    use crate::storage::Database;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup(copies: i64) -> (Database, i64, i64) {
        let db = Database::new_in_memory().await.expect("database");
        let book = queries::insert_book(
            db.pool(),
            &NewBook {
                title: "Dune".to_string(),
                isbn: "9780441172719".to_string(),
                number_of_copies: copies,
                author: "Frank Herbert".to_string(),
                category: "SF".to_string(),
            },
        )
        .await
        .expect("book");
        let student = queries::insert_student(
            db.pool(),
            &NewStudent {
                name: "Mina Park".to_string(),
                roll_number: "EE-2022-007".to_string(),
                department: "EE".to_string(),
                semester: 3,
                phone: "5550100300".to_string(),
                email: "mina@example.edu".to_string(),
            },
        )
        .await
        .expect("student");
        (db, book.book_id, student.student_id)
    }

    #[tokio::test]
    async fn issue_decrements_and_return_increments_copies() {
        let (db, book_id, student_id) = setup(2).await;

        let issue = issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .expect("issue");
        assert!(issue.is_open());

        let book = queries::find_book_by_id(db.pool(), book_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(book.number_of_copies, 1);

        let returned = return_book(
            db.pool(),
            &ReturnRequest {
                issue_id: issue.issue_id,
                return_date: None,
            },
        )
        .await
        .expect("return");
        assert!(!returned.is_open());

        let book = queries::find_book_by_id(db.pool(), book_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(book.number_of_copies, 2);
    }

    #[tokio::test]
    async fn default_due_date_is_thirty_days_out() {
        let (db, book_id, student_id) = setup(1).await;

        let request = IssueRequest {
            book_id,
            student_id,
            issue_date: Some(date(2024, 1, 1)),
            due_date: None,
        };
        let issue = issue_book(db.pool(), &request).await.expect("issue");

        assert_eq!(issue.issue_date, date(2024, 1, 1));
        assert_eq!(issue.due_date, date(2024, 1, 31));
    }

    #[tokio::test]
    async fn due_date_must_follow_issue_date() {
        let (db, book_id, student_id) = setup(1).await;

        let request = IssueRequest {
            book_id,
            student_id,
            issue_date: Some(date(2024, 1, 10)),
            due_date: Some(date(2024, 1, 10)),
        };
        let err = issue_book(db.pool(), &request).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidDueDate { .. }));
    }

    #[tokio::test]
    async fn zero_copies_rejects_issue() {
        let (db, book_id, student_id) = setup(0).await;

        let err = issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NoCopiesAvailable { .. }));
        assert!(err.is_invariant_violation());

        // rolled back: count untouched, no issue row created
        let book = queries::find_book_by_id(db.pool(), book_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(book.number_of_copies, 0);
        assert!(queries::issues_for_student(db.pool(), student_id)
            .await
            .expect("issues")
            .is_empty());
    }

    #[tokio::test]
    async fn duplicate_open_issue_is_rejected_until_returned() {
        let (db, book_id, student_id) = setup(5).await;

        let first = issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .expect("first issue");

        let err = issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateOpenIssue { .. }));

        return_book(
            db.pool(),
            &ReturnRequest {
                issue_id: first.issue_id,
                return_date: None,
            },
        )
        .await
        .expect("return");

        // once returned, the same pair can borrow again
        issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .expect("second issue");
    }

    #[tokio::test]
    async fn missing_book_student_or_issue_are_not_found() {
        let (db, book_id, student_id) = setup(1).await;

        let err = issue_book(db.pool(), &IssueRequest::new(999, student_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::BookNotFound(999)));

        let err = issue_book(db.pool(), &IssueRequest::new(book_id, 999))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::StudentNotFound(999)));

        let err = return_book(
            db.pool(),
            &ReturnRequest {
                issue_id: 999,
                return_date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LibraryError::IssueNotFound(999)));
    }

    #[tokio::test]
    async fn double_return_is_rejected() {
        let (db, book_id, student_id) = setup(1).await;

        let issue = issue_book(db.pool(), &IssueRequest::new(book_id, student_id))
            .await
            .expect("issue");
        let request = ReturnRequest {
            issue_id: issue.issue_id,
            return_date: None,
        };
        return_book(db.pool(), &request).await.expect("first return");

        let err = return_book(db.pool(), &request).await.unwrap_err();
        assert!(matches!(err, LibraryError::IssueNotFound(_)));

        // copy count restored exactly once
        let book = queries::find_book_by_id(db.pool(), book_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(book.number_of_copies, 1);
    }
}
