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

//! Reminder sweep orchestration
//!
//! One sweep loads the day's candidate set (open issues due within the
//! pre-due window, plus everything already overdue) and processes it
//! sequentially: classify, check history, render, send, record. A failed
//! send is logged and skipped so the next sweep retries it; a database
//! failure aborts the sweep. A `try_lock` guard keeps a manual trigger
//! from racing the scheduled one.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::mail::MailTransport;
use crate::reminders::{eligibility, templates};
use crate::storage::models::{DueIssue, NewReminderHistory};
use crate::storage::queries::{self, ReminderInsert};
use crate::storage::Database;

/// Counters from one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Candidate issues loaded by the window query
    pub candidates: usize,
    /// Emails delivered and recorded
    pub sent: usize,
    /// Candidates owing nothing today (outside window handled by the query;
    /// here: already reminded today)
    pub skipped: usize,
    /// Transport failures left for the next sweep to retry
    pub failed: usize,
    /// True when another sweep held the guard and this run did nothing
    pub already_running: bool,
}

/// Runs reminder sweeps over the open-issue set
pub struct ReminderSweep {
    db: Database,
    mailer: Arc<dyn MailTransport>,
    guard: Mutex<()>,
}

impl ReminderSweep {
    pub fn new(db: Database, mailer: Arc<dyn MailTransport>) -> Self {
        Self {
            db,
            mailer,
            guard: Mutex::new(()),
        }
    }

    /// Run one sweep dated today
    pub async fn run(&self) -> Result<SweepReport> {
        self.run_for_date(Local::now().date_naive()).await
    }

    /// Run one sweep as of `today` (injectable for tests and backfills)
    pub async fn run_for_date(&self, today: NaiveDate) -> Result<SweepReport> {
        // Single-flight: a concurrent manual/scheduled trigger skips instead
        // of double-scanning; the history unique constraint backstops any
        // race that slips through anyway.
        let Ok(_held) = self.guard.try_lock() else {
            log::info!("reminder sweep already running, skipping this trigger");
            return Ok(SweepReport {
                already_running: true,
                ..SweepReport::default()
            });
        };

        let candidates =
            queries::issues_due_within(self.db.pool(), today, eligibility::PRE_DUE_WINDOW_DAYS)
                .await?;

        let mut report = SweepReport {
            candidates: candidates.len(),
            ..SweepReport::default()
        };

        log::info!(
            "reminder sweep for {today}: {} candidate issue(s)",
            candidates.len()
        );

        for issue in &candidates {
            match self.process_issue(issue, today).await {
                Ok(IssueOutcome::Sent) => report.sent += 1,
                Ok(IssueOutcome::NothingOwed) => report.skipped += 1,
                Err(e) if e.is_transport_failure() => {
                    // No history row was written; tomorrow's (or the next
                    // manual) sweep retries this recipient.
                    log::warn!(
                        "reminder for issue {} not delivered: {e}",
                        issue.issue_id
                    );
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "reminder sweep done: {} sent, {} skipped, {} failed",
            report.sent,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    async fn process_issue(&self, issue: &DueIssue, today: NaiveDate) -> Result<IssueOutcome> {
        let days_until_due = issue.days_until_due(today);

        let Some(kind) = eligibility::classify(days_until_due) else {
            return Ok(IssueOutcome::NothingOwed);
        };

        if !eligibility::owes_reminder(self.db.pool(), issue.issue_id, kind, today).await? {
            return Ok(IssueOutcome::NothingOwed);
        }

        let message = templates::render(
            kind,
            &issue.student_name,
            &issue.book_title,
            issue.due_date,
            days_until_due,
        );

        self.mailer
            .send(&issue.student_email, &message.subject, &message.html_body)
            .await?;

        let record = NewReminderHistory {
            student_id: issue.student_id,
            book_issue_id: issue.issue_id,
            reminder_type: kind,
            sent_date: today,
            days_before_due: days_until_due,
        };
        match queries::insert_reminder(self.db.pool(), &record).await? {
            ReminderInsert::Recorded => {
                log::debug!(
                    "recorded {kind} reminder for issue {} ({days_until_due} days to due)",
                    issue.issue_id
                );
            }
            ReminderInsert::AlreadyRecorded => {
                log::warn!(
                    "issue {} already had a {kind} reminder for {today}; concurrent sweep?",
                    issue.issue_id
                );
            }
        }

        Ok(IssueOutcome::Sent)
    }
}

enum IssueOutcome {
    Sent,
    NothingOwed,
}
