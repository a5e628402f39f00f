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

//! Database storage and models
//!
//! All persistence goes through SQLite via sqlx: a pooled [`Database`]
//! handle, runtime migrations, entity models and repository functions.
//!
//! # Tables
//! - Books: catalog entries with a mutable copy count
//! - Students: registered borrowers (unique roll number and email)
//! - BookIssues: loans; open while `return_date` is NULL
//! - ReminderHistory: insert-only reminder dispatch log, unique per
//!   (issue, type, date)
//!
//! # Usage Example
//! ```no_run
//! use shelfwise::storage::{queries, models::NewBook, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./library.db").await?;
//!
//! let book = queries::insert_book(
//!     db.pool(),
//!     &NewBook {
//!         title: "The Hobbit".to_string(),
//!         isbn: "9780261103344".to_string(),
//!         number_of_copies: 2,
//!         author: "J. R. R. Tolkien".to_string(),
//!         category: "Fantasy".to_string(),
//!     },
//! )
//! .await?;
//! println!("inserted book {}", book.book_id);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

// Re-export commonly used types
pub use database::Database;
pub use models::{
    Book, BookFilter, BookIssue, BookPatch, DueIssue, NewBook, NewReminderHistory, NewStudent,
    Page, ReminderHistory, ReminderType, Student, StudentFilter, StudentPatch,
};
