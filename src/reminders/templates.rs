//! Reminder message rendering
//!
//! Two fixed templates: a friendly heads-up while the due date is still
//! ahead, and an urgent notice once the book is late. Both carry the
//! student name, book title, due date and day count.

use chrono::NaiveDate;

use crate::storage::models::ReminderType;

/// A rendered message ready for the mail transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReminder {
    pub subject: String,
    pub html_body: String,
}

/// Render the reminder for one issue.
///
/// `days_until_due` is the signed value from the eligibility engine; the
/// overdue template shows its magnitude as days late.
pub fn render(
    kind: ReminderType,
    student_name: &str,
    book_title: &str,
    due_date: NaiveDate,
    days_until_due: i64,
) -> RenderedReminder {
    match kind {
        ReminderType::PreDue => pre_due(student_name, book_title, due_date, days_until_due),
        ReminderType::Overdue => overdue(student_name, book_title, due_date, -days_until_due),
    }
}

fn format_due_date(due_date: NaiveDate) -> String {
    due_date.format("%B %d, %Y").to_string()
}

fn pre_due(
    student_name: &str,
    book_title: &str,
    due_date: NaiveDate,
    days_remaining: i64,
) -> RenderedReminder {
    let subject = format!("Library Reminder: Book Due in {days_remaining} Days");

    let html_body = format!(
        r#"<html>
<body>
  <h2>Library Book Reminder</h2>
  <p>Dear {student_name},</p>
  <p>This is a friendly reminder that you have a book due soon:</p>
  <div style="background-color: #f0f8ff; padding: 15px; border-left: 4px solid #007bff;">
    <strong>Book:</strong> {book_title}<br>
    <strong>Due Date:</strong> {due}<br>
    <strong>Days Remaining:</strong> {days_remaining}
  </div>
  <p>Please return the book on or before the due date to avoid late fees.</p>
  <p>Thank you,<br>University Library Team</p>
</body>
</html>"#,
        due = format_due_date(due_date),
    );

    RenderedReminder { subject, html_body }
}

fn overdue(
    student_name: &str,
    book_title: &str,
    due_date: NaiveDate,
    days_overdue: i64,
) -> RenderedReminder {
    let subject = format!("URGENT: Overdue Book - {days_overdue} Days Late");

    let html_body = format!(
        r#"<html>
<body>
  <h2 style="color: #dc3545;">Overdue Book Notice</h2>
  <p>Dear {student_name},</p>
  <p><strong>Your book is now overdue. Please return it immediately.</strong></p>
  <div style="background-color: #fff3cd; padding: 15px; border-left: 4px solid #ffc107;">
    <strong>Book:</strong> {book_title}<br>
    <strong>Due Date:</strong> {due}<br>
    <strong>Days Overdue:</strong> {days_overdue}
  </div>
  <p>Please return the book to the library circulation desk as soon as possible.</p>
  <p>University Library Team</p>
</body>
</html>"#,
        due = format_due_date(due_date),
    );

    RenderedReminder { subject, html_body }
}
