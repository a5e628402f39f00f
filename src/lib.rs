//! Shelfwise: a library management backend.
//!
//! Cataloguing (books and students), circulation (issue and return with
//! copy accounting), due-date email reminders on a daily schedule, and a
//! natural-language query assistant, all over a SQLite store.
//!
//! ```no_run
//! use shelfwise::storage::Database;
//! use shelfwise::circulation::{self, IssueRequest};
//!
//! # async fn run() -> shelfwise::Result<()> {
//! let db = Database::new("library.db").await?;
//! let issue = circulation::issue_book(db.pool(), &IssueRequest::new(1, 1)).await?;
//! println!("due back {}", issue.due_date);
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod circulation;
pub mod config;
pub mod error;
pub mod mail;
pub mod reminders;
pub mod storage;

pub use config::AppConfig;
pub use error::{LibraryError, Result};
pub use storage::Database;
