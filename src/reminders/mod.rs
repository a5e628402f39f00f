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

//! Due-date reminders
//!
//! Three layers: [`eligibility`] decides which reminder (if any) an open
//! issue owes on a given day, [`sweep`] walks the candidate set and sends
//! through a [`crate::mail::MailTransport`], and [`scheduler`] runs the
//! sweep once a day at a configured hour. Reminder history rows make the
//! process idempotent per issue, type, and day.

pub mod eligibility;
pub mod scheduler;
pub mod sweep;
pub mod templates;

pub use eligibility::PRE_DUE_WINDOW_DAYS;
pub use scheduler::ReminderScheduler;
pub use sweep::{ReminderSweep, SweepReport};
pub use templates::RenderedReminder;
