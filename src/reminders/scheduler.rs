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

//! Daily reminder scheduler
//!
//! An owned service: callers construct it, call [`ReminderScheduler::start`]
//! to spawn the background loop, and [`ReminderScheduler::stop`] to drain it.
//! The loop sleeps until the next configured wall-clock hour, runs one sweep,
//! and repeats. [`ReminderScheduler::trigger_now`] runs an out-of-band sweep
//! on the shared [`ReminderSweep`], whose single-flight guard keeps it from
//! overlapping the scheduled run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::reminders::sweep::{ReminderSweep, SweepReport};

pub struct ReminderScheduler {
    sweep: Arc<ReminderSweep>,
    run_hour: u32,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    /// `run_hour` is the local wall-clock hour (0-23) each daily sweep fires at.
    pub fn new(sweep: Arc<ReminderSweep>, run_hour: u32) -> Self {
        Self {
            sweep,
            run_hour: run_hour.min(23),
            shutdown_tx: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the daily loop. Calling `start` on a running scheduler is a no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let sweep = Arc::clone(&self.sweep);
        let run_hour = self.run_hour;

        let handle = tokio::spawn(async move {
            log::info!("reminder scheduler started, daily run at {run_hour:02}:00 local time");
            loop {
                let wait = until_next_run(run_hour);
                log::debug!("next reminder sweep in {}s", wait.as_secs());

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = rx.changed() => {
                        log::info!("reminder scheduler stopping");
                        return;
                    }
                }

                match sweep.run().await {
                    Ok(report) => {
                        log::info!(
                            "scheduled sweep: {} sent, {} skipped, {} failed",
                            report.sent,
                            report.skipped,
                            report.failed
                        );
                    }
                    Err(e) => {
                        // Keep the loop alive; a bad day should not kill the
                        // service for every day after it.
                        log::error!("scheduled reminder sweep failed: {e}");
                    }
                }
            }
        });

        self.shutdown_tx = Some(tx);
        self.handle = Some(handle);
    }

    /// Signal the loop and wait for it to exit.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::warn!("reminder scheduler task ended abnormally: {e}");
            }
        }
    }

    /// Run one sweep immediately, outside the daily cadence.
    pub async fn trigger_now(&self) -> Result<SweepReport> {
        log::info!("manual reminder sweep triggered");
        self.sweep.run().await
    }
}

/// Time left until the next occurrence of `run_hour:00` local time.
fn until_next_run(run_hour: u32) -> Duration {
    let now = Local::now();
    let target_time = NaiveTime::from_hms_opt(run_hour, 0, 0)
        .unwrap_or(NaiveTime::MIN);
    let today_run = now.date_naive().and_time(target_time);
    let next = if now.naive_local() < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };
    (next - now.naive_local())
        .to_std()
        .unwrap_or(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailTransport;
    use crate::storage::Database;
    use async_trait::async_trait;

    struct NullMailer;

    #[async_trait]
    impl MailTransport for NullMailer {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn until_next_run_is_at_most_a_day() {
        for hour in [0, 9, 23] {
            let wait = until_next_run(hour);
            assert!(wait <= Duration::from_secs(24 * 60 * 60));
            assert!(wait > Duration::ZERO);
        }
    }

    #[tokio::test]
    async fn start_and_stop_round_trip() {
        let db = Database::new_in_memory().await.expect("database");
        let sweep = Arc::new(ReminderSweep::new(db, Arc::new(NullMailer)));
        let mut scheduler = ReminderScheduler::new(sweep, 2);

        assert!(!scheduler.is_running());
        scheduler.start();
        assert!(scheduler.is_running());
        // idempotent
        scheduler.start();

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn trigger_now_runs_without_starting_the_loop() {
        let db = Database::new_in_memory().await.expect("database");
        let sweep = Arc::new(ReminderSweep::new(db, Arc::new(NullMailer)));
        let scheduler = ReminderScheduler::new(sweep, 2);

        let report = scheduler.trigger_now().await.expect("sweep");
        assert_eq!(report.candidates, 0);
        assert!(!report.already_running);
    }
}
