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

//! Database query functions
//!
//! Repository functions per entity. Reads and standalone writes take the
//! pool; the write helpers used by the issue/return engine take a
//! `&mut SqliteConnection` so they can run inside one transaction.

use crate::error::{LibraryError, Result};
use crate::storage::models::*;
use chrono::{Duration, NaiveDate};
use sqlx::{sqlite::SqliteConnection, SqlitePool};

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book and return the stored row
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<Book> {
    let result = sqlx::query(
        r#"
        INSERT INTO Books (title, isbn, number_of_copies, author, category)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.isbn)
    .bind(book.number_of_copies)
    .bind(&book.author)
    .bind(&book.category)
    .execute(pool)
    .await
    .map_err(|e| LibraryError::from_unique_violation(e, "isbn", &book.isbn))?;

    let inserted = find_book_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or(LibraryError::BookNotFound(result.last_insert_rowid()))?;
    Ok(inserted)
}

pub async fn find_book_by_id(pool: &SqlitePool, book_id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

pub async fn find_book_by_isbn(pool: &SqlitePool, isbn: &str) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE isbn = ?")
        .bind(isbn)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// Apply a partial update; fields left `None` keep their stored value
pub async fn update_book(pool: &SqlitePool, book_id: i64, patch: &BookPatch) -> Result<Book> {
    if patch.is_empty() {
        return find_book_by_id(pool, book_id)
            .await?
            .ok_or(LibraryError::BookNotFound(book_id));
    }

    let result = sqlx::query(
        r#"
        UPDATE Books SET
            title = COALESCE(?, title),
            isbn = COALESCE(?, isbn),
            number_of_copies = COALESCE(?, number_of_copies),
            author = COALESCE(?, author),
            category = COALESCE(?, category),
            updated_at = CURRENT_TIMESTAMP
        WHERE book_id = ?
        "#,
    )
    .bind(&patch.title)
    .bind(&patch.isbn)
    .bind(patch.number_of_copies)
    .bind(&patch.author)
    .bind(&patch.category)
    .bind(book_id)
    .execute(pool)
    .await
    .map_err(|e| {
        LibraryError::from_unique_violation(e, "isbn", patch.isbn.as_deref().unwrap_or(""))
    })?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::BookNotFound(book_id));
    }

    find_book_by_id(pool, book_id)
        .await?
        .ok_or(LibraryError::BookNotFound(book_id))
}

pub async fn delete_book(pool: &SqlitePool, book_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM Books WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::BookNotFound(book_id));
    }
    Ok(())
}

/// Search books with optional filters and limit/offset pagination
pub async fn search_books(pool: &SqlitePool, filter: &BookFilter, page: Page) -> Result<Vec<Book>> {
    let title = filter.title.as_ref().map(|t| format!("%{t}%"));
    let author = filter.author.as_ref().map(|a| format!("%{a}%"));

    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT * FROM Books
        WHERE (?1 IS NULL OR title LIKE ?1)
          AND (?2 IS NULL OR author LIKE ?2)
          AND (?3 IS NULL OR category = ?3)
          AND (?4 IS NULL OR isbn = ?4)
        ORDER BY title
        LIMIT ?5 OFFSET ?6
        "#,
    )
    .bind(title)
    .bind(author)
    .bind(&filter.category)
    .bind(&filter.isbn)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(books)
}

pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Books")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

// ============================================================================
// STUDENT QUERIES
// ============================================================================

/// Insert a new student and return the stored row
pub async fn insert_student(pool: &SqlitePool, student: &NewStudent) -> Result<Student> {
    let result = sqlx::query(
        r#"
        INSERT INTO Students (name, roll_number, department, semester, phone, email)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&student.name)
    .bind(&student.roll_number)
    .bind(&student.department)
    .bind(student.semester)
    .bind(&student.phone)
    .bind(&student.email)
    .execute(pool)
    .await
    .map_err(|e| student_unique_violation(e, student))?;

    let inserted = find_student_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or(LibraryError::StudentNotFound(result.last_insert_rowid()))?;
    Ok(inserted)
}

/// Pick the offending unique column out of a constraint failure
fn student_unique_violation(err: sqlx::Error, student: &NewStudent) -> LibraryError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = db.message().to_string();
            return if message.contains("roll_number") {
                LibraryError::DuplicateRecord {
                    field: "roll_number",
                    value: student.roll_number.clone(),
                }
            } else {
                LibraryError::DuplicateRecord {
                    field: "email",
                    value: student.email.clone(),
                }
            };
        }
    }
    LibraryError::Sqlx(err)
}

pub async fn find_student_by_id(pool: &SqlitePool, student_id: i64) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>("SELECT * FROM Students WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

    Ok(student)
}

/// Apply a partial update; fields left `None` keep their stored value
pub async fn update_student(
    pool: &SqlitePool,
    student_id: i64,
    patch: &StudentPatch,
) -> Result<Student> {
    if patch.is_empty() {
        return find_student_by_id(pool, student_id)
            .await?
            .ok_or(LibraryError::StudentNotFound(student_id));
    }

    let result = sqlx::query(
        r#"
        UPDATE Students SET
            name = COALESCE(?, name),
            roll_number = COALESCE(?, roll_number),
            department = COALESCE(?, department),
            semester = COALESCE(?, semester),
            phone = COALESCE(?, phone),
            email = COALESCE(?, email),
            updated_at = CURRENT_TIMESTAMP
        WHERE student_id = ?
        "#,
    )
    .bind(&patch.name)
    .bind(&patch.roll_number)
    .bind(&patch.department)
    .bind(patch.semester)
    .bind(&patch.phone)
    .bind(&patch.email)
    .bind(student_id)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let message = db.message().to_string();
            if message.contains("roll_number") {
                LibraryError::DuplicateRecord {
                    field: "roll_number",
                    value: patch.roll_number.clone().unwrap_or_default(),
                }
            } else {
                LibraryError::DuplicateRecord {
                    field: "email",
                    value: patch.email.clone().unwrap_or_default(),
                }
            }
        }
        _ => LibraryError::Sqlx(e),
    })?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::StudentNotFound(student_id));
    }

    find_student_by_id(pool, student_id)
        .await?
        .ok_or(LibraryError::StudentNotFound(student_id))
}

pub async fn delete_student(pool: &SqlitePool, student_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM Students WHERE student_id = ?")
        .bind(student_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(LibraryError::StudentNotFound(student_id));
    }
    Ok(())
}

/// Search students with optional filters and limit/offset pagination
pub async fn search_students(
    pool: &SqlitePool,
    filter: &StudentFilter,
    page: Page,
) -> Result<Vec<Student>> {
    let name = filter.name.as_ref().map(|n| format!("%{n}%"));
    let roll = filter.roll_number.as_ref().map(|r| format!("%{r}%"));

    let students = sqlx::query_as::<_, Student>(
        r#"
        SELECT * FROM Students
        WHERE (?1 IS NULL OR name LIKE ?1)
          AND (?2 IS NULL OR roll_number LIKE ?2)
          AND (?3 IS NULL OR department = ?3)
          AND (?4 IS NULL OR semester = ?4)
          AND (?5 IS NULL OR phone = ?5)
        ORDER BY name
        LIMIT ?6 OFFSET ?7
        "#,
    )
    .bind(name)
    .bind(roll)
    .bind(&filter.department)
    .bind(filter.semester)
    .bind(&filter.phone)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    Ok(students)
}

// ============================================================================
// BOOK ISSUE QUERIES
// ============================================================================

/// Book lookup on the transaction connection, for check-then-write flows
pub async fn find_book_for_update(
    conn: &mut SqliteConnection,
    book_id: i64,
) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM Books WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(book)
}

/// Student existence check on the transaction connection
pub async fn student_exists(conn: &mut SqliteConnection, student_id: i64) -> Result<bool> {
    let id: Option<i64> = sqlx::query_scalar("SELECT student_id FROM Students WHERE student_id = ?")
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(id.is_some())
}

pub async fn find_issue_by_id(pool: &SqlitePool, issue_id: i64) -> Result<Option<BookIssue>> {
    let issue = sqlx::query_as::<_, BookIssue>("SELECT * FROM BookIssues WHERE issue_id = ?")
        .bind(issue_id)
        .fetch_optional(pool)
        .await?;

    Ok(issue)
}

/// Find the open issue for a (book, student) pair, if any.
///
/// Runs on the transaction connection so the duplicate-issue check and the
/// insert that follows observe the same snapshot.
pub async fn find_open_issue_for_pair(
    conn: &mut SqliteConnection,
    book_id: i64,
    student_id: i64,
) -> Result<Option<BookIssue>> {
    let issue = sqlx::query_as::<_, BookIssue>(
        r#"
        SELECT * FROM BookIssues
        WHERE book_id = ? AND student_id = ? AND return_date IS NULL
        "#,
    )
    .bind(book_id)
    .bind(student_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(issue)
}

pub async fn find_open_issue_by_id(
    conn: &mut SqliteConnection,
    issue_id: i64,
) -> Result<Option<BookIssue>> {
    let issue = sqlx::query_as::<_, BookIssue>(
        "SELECT * FROM BookIssues WHERE issue_id = ? AND return_date IS NULL",
    )
    .bind(issue_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(issue)
}

/// Insert an open issue row, returning its id
pub async fn insert_issue(
    conn: &mut SqliteConnection,
    book_id: i64,
    student_id: i64,
    issue_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO BookIssues (book_id, student_id, issue_date, due_date)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(book_id)
    .bind(student_id)
    .bind(issue_date)
    .bind(due_date)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Close an open issue by setting its return date; returns rows affected
pub async fn mark_returned(
    conn: &mut SqliteConnection,
    issue_id: i64,
    return_date: NaiveDate,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE BookIssues
        SET return_date = ?, updated_at = CURRENT_TIMESTAMP
        WHERE issue_id = ? AND return_date IS NULL
        "#,
    )
    .bind(return_date)
    .bind(issue_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Adjust a book's copy count by `delta` (±1 from the issue/return engine)
pub async fn adjust_book_copies(
    conn: &mut SqliteConnection,
    book_id: i64,
    delta: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE Books
        SET number_of_copies = number_of_copies + ?, updated_at = CURRENT_TIMESTAMP
        WHERE book_id = ?
        "#,
    )
    .bind(delta)
    .bind(book_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// All issues (open and closed) for a student, newest first
pub async fn issues_for_student(pool: &SqlitePool, student_id: i64) -> Result<Vec<BookIssue>> {
    let issues = sqlx::query_as::<_, BookIssue>(
        "SELECT * FROM BookIssues WHERE student_id = ? ORDER BY issue_date DESC, issue_id DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(issues)
}

/// Books a student currently holds (open issues only)
pub async fn books_issued_to_student(pool: &SqlitePool, student_id: i64) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT b.* FROM Books b
        INNER JOIN BookIssues bi ON bi.book_id = b.book_id
        WHERE bi.student_id = ? AND bi.return_date IS NULL
        ORDER BY bi.due_date
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(books)
}

/// All open issues joined with student and book detail, soonest due first
pub async fn list_open_issues(pool: &SqlitePool) -> Result<Vec<DueIssue>> {
    let issues = sqlx::query_as::<_, DueIssue>(
        r#"
        SELECT bi.issue_id, bi.book_id, bi.student_id, bi.issue_date, bi.due_date,
               s.name AS student_name, s.email AS student_email, b.title AS book_title
        FROM BookIssues bi
        INNER JOIN Students s ON s.student_id = bi.student_id
        INNER JOIN Books b ON b.book_id = bi.book_id
        WHERE bi.return_date IS NULL
        ORDER BY bi.due_date, bi.issue_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(issues)
}

/// Open issues due within `window_days` of `today` (inclusive), plus every
/// already-overdue issue. This is the single query bounding a sweep's
/// candidate set.
pub async fn issues_due_within(
    pool: &SqlitePool,
    today: NaiveDate,
    window_days: i64,
) -> Result<Vec<DueIssue>> {
    let horizon = today + Duration::days(window_days);

    let issues = sqlx::query_as::<_, DueIssue>(
        r#"
        SELECT bi.issue_id, bi.book_id, bi.student_id, bi.issue_date, bi.due_date,
               s.name AS student_name, s.email AS student_email, b.title AS book_title
        FROM BookIssues bi
        INNER JOIN Students s ON s.student_id = bi.student_id
        INNER JOIN Books b ON b.book_id = bi.book_id
        WHERE bi.return_date IS NULL AND bi.due_date <= ?
        ORDER BY bi.due_date, bi.issue_id
        "#,
    )
    .bind(horizon)
    .fetch_all(pool)
    .await?;

    Ok(issues)
}

// ============================================================================
// REMINDER HISTORY QUERIES
// ============================================================================

/// Whether a reminder of this type already went out for this issue today
pub async fn reminder_sent_on(
    pool: &SqlitePool,
    issue_id: i64,
    reminder_type: ReminderType,
    date: NaiveDate,
) -> Result<bool> {
    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT reminder_id FROM ReminderHistory
        WHERE book_issue_id = ? AND reminder_type = ? AND sent_date = ?
        "#,
    )
    .bind(issue_id)
    .bind(reminder_type)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// Outcome of recording a reminder dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderInsert {
    Recorded,
    /// Another sweep recorded the same (issue, type, date) first
    AlreadyRecorded,
}

/// Record a dispatched reminder.
///
/// The UNIQUE(book_issue_id, reminder_type, sent_date) constraint turns a
/// lost race between concurrent sweeps into `AlreadyRecorded` instead of a
/// duplicate row.
pub async fn insert_reminder(
    pool: &SqlitePool,
    reminder: &NewReminderHistory,
) -> Result<ReminderInsert> {
    let result = sqlx::query(
        r#"
        INSERT INTO ReminderHistory
            (student_id, book_issue_id, reminder_type, sent_date, days_before_due)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(reminder.student_id)
    .bind(reminder.book_issue_id)
    .bind(reminder.reminder_type)
    .bind(reminder.sent_date)
    .bind(reminder.days_before_due)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(ReminderInsert::Recorded),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Ok(ReminderInsert::AlreadyRecorded)
        }
        Err(e) => Err(e.into()),
    }
}

/// Full dispatch history for one issue, oldest first
pub async fn reminders_for_issue(pool: &SqlitePool, issue_id: i64) -> Result<Vec<ReminderHistory>> {
    let reminders = sqlx::query_as::<_, ReminderHistory>(
        "SELECT * FROM ReminderHistory WHERE book_issue_id = ? ORDER BY sent_date, reminder_id",
    )
    .bind(issue_id)
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    fn sample_book() -> NewBook {
        NewBook {
            title: "A Study in Scarlet".to_string(),
            isbn: "9780140439083".to_string(),
            number_of_copies: 3,
            author: "Arthur Conan Doyle".to_string(),
            category: "Fiction".to_string(),
        }
    }

    fn sample_student() -> NewStudent {
        NewStudent {
            name: "Asha Rao".to_string(),
            roll_number: "CS-2021-042".to_string(),
            department: "CS".to_string(),
            semester: 5,
            phone: "5550100200".to_string(),
            email: "asha@example.edu".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn insert_and_find_book() {
        let db = Database::new_in_memory().await.expect("database");

        let book = insert_book(db.pool(), &sample_book()).await.expect("insert");
        assert!(book.book_id > 0);
        assert_eq!(book.number_of_copies, 3);

        let found = find_book_by_isbn(db.pool(), "9780140439083")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.title, "A Study in Scarlet");
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let db = Database::new_in_memory().await.expect("database");
        insert_book(db.pool(), &sample_book()).await.expect("insert");

        let err = insert_book(db.pool(), &sample_book()).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::DuplicateRecord { field: "isbn", .. }
        ));
    }

    #[tokio::test]
    async fn patch_updates_only_provided_fields() {
        let db = Database::new_in_memory().await.expect("database");
        let book = insert_book(db.pool(), &sample_book()).await.expect("insert");

        let patch = BookPatch {
            number_of_copies: Some(7),
            ..Default::default()
        };
        let updated = update_book(db.pool(), book.book_id, &patch)
            .await
            .expect("update");

        assert_eq!(updated.number_of_copies, 7);
        assert_eq!(updated.title, book.title);
        assert_eq!(updated.isbn, book.isbn);
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let db = Database::new_in_memory().await.expect("database");
        let patch = BookPatch {
            title: Some("ghost".to_string()),
            ..Default::default()
        };
        let err = update_book(db.pool(), 99, &patch).await.unwrap_err();
        assert!(matches!(err, LibraryError::BookNotFound(99)));
    }

    #[tokio::test]
    async fn search_books_filters_and_paginates() {
        let db = Database::new_in_memory().await.expect("database");
        for i in 0..4 {
            let mut book = sample_book();
            book.isbn = format!("isbn-{i}");
            book.title = format!("Rust Volume {i}");
            book.category = if i % 2 == 0 { "Systems" } else { "Fiction" }.to_string();
            insert_book(db.pool(), &book).await.expect("insert");
        }

        let filter = BookFilter {
            title: Some("Rust".to_string()),
            category: Some("Systems".to_string()),
            ..Default::default()
        };
        let hits = search_books(db.pool(), &filter, Page::default())
            .await
            .expect("search");
        assert_eq!(hits.len(), 2);

        let first_page = search_books(db.pool(), &BookFilter::default(), Page::new(1, 3))
            .await
            .expect("page 1");
        let second_page = search_books(db.pool(), &BookFilter::default(), Page::new(2, 3))
            .await
            .expect("page 2");
        assert_eq!(first_page.len(), 3);
        assert_eq!(second_page.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_roll_number_and_email_are_distinguished() {
        let db = Database::new_in_memory().await.expect("database");
        insert_student(db.pool(), &sample_student())
            .await
            .expect("insert");

        let mut same_roll = sample_student();
        same_roll.email = "other@example.edu".to_string();
        let err = insert_student(db.pool(), &same_roll).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::DuplicateRecord {
                field: "roll_number",
                ..
            }
        ));

        let mut same_email = sample_student();
        same_email.roll_number = "CS-2021-043".to_string();
        let err = insert_student(db.pool(), &same_email).await.unwrap_err();
        assert!(matches!(
            err,
            LibraryError::DuplicateRecord { field: "email", .. }
        ));
    }

    #[tokio::test]
    async fn due_window_selects_boundary_and_overdue() {
        let db = Database::new_in_memory().await.expect("database");
        let book = insert_book(db.pool(), &sample_book()).await.expect("book");
        let student = insert_student(db.pool(), &sample_student())
            .await
            .expect("student");

        let today = date(2024, 3, 10);
        let mut conn = db.pool().acquire().await.expect("conn");
        // due exactly at the window edge, one outside, one overdue
        for due in [date(2024, 3, 15), date(2024, 3, 16), date(2024, 3, 1)] {
            insert_issue(
                &mut conn,
                book.book_id,
                student.student_id,
                date(2024, 2, 10),
                due,
            )
            .await
            .expect("issue");
        }
        drop(conn);

        let candidates = issues_due_within(db.pool(), today, 5).await.expect("query");
        let due_dates: Vec<NaiveDate> = candidates.iter().map(|c| c.due_date).collect();
        assert_eq!(due_dates, vec![date(2024, 3, 1), date(2024, 3, 15)]);
    }

    #[tokio::test]
    async fn reminder_unique_constraint_reports_already_recorded() {
        let db = Database::new_in_memory().await.expect("database");
        let book = insert_book(db.pool(), &sample_book()).await.expect("book");
        let student = insert_student(db.pool(), &sample_student())
            .await
            .expect("student");

        let mut conn = db.pool().acquire().await.expect("conn");
        let issue_id = insert_issue(
            &mut conn,
            book.book_id,
            student.student_id,
            date(2024, 3, 1),
            date(2024, 3, 8),
        )
        .await
        .expect("issue");
        drop(conn);

        let record = NewReminderHistory {
            student_id: student.student_id,
            book_issue_id: issue_id,
            reminder_type: ReminderType::Overdue,
            sent_date: date(2024, 3, 10),
            days_before_due: -2,
        };

        assert_eq!(
            insert_reminder(db.pool(), &record).await.expect("first"),
            ReminderInsert::Recorded
        );
        assert_eq!(
            insert_reminder(db.pool(), &record).await.expect("second"),
            ReminderInsert::AlreadyRecorded
        );
        assert!(
            reminder_sent_on(db.pool(), issue_id, ReminderType::Overdue, date(2024, 3, 10))
                .await
                .expect("lookup")
        );
        assert_eq!(
            reminders_for_issue(db.pool(), issue_id)
                .await
                .expect("history")
                .len(),
            1
        );
    }
}
