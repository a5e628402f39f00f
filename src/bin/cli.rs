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

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use shelfwise::assistant::{QueryAssistant, TextGenClient};
use shelfwise::circulation::{self, IssueRequest, ReturnRequest};
use shelfwise::mail::MailRelayClient;
use shelfwise::reminders::{ReminderScheduler, ReminderSweep};
use shelfwise::storage::models::{BookFilter, NewBook, NewStudent, Page};
use shelfwise::storage::{queries, Database};
use shelfwise::AppConfig;

#[derive(Parser)]
#[command(name = "shelfwise")]
#[command(about = "Shelfwise library management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the catalogue
    AddBook {
        title: String,
        isbn: String,
        #[arg(short, long, default_value_t = 1)]
        copies: i64,
        #[arg(short, long, default_value = "Unknown")]
        author: String,
        #[arg(long, default_value = "General")]
        category: String,
    },
    /// Register a student
    AddStudent {
        name: String,
        roll_number: String,
        email: String,
        #[arg(short, long, default_value = "General")]
        department: String,
        #[arg(short, long, default_value_t = 1)]
        semester: i64,
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Search the catalogue
    Search {
        /// Title substring
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Issue a book to a student
    Issue {
        book_id: i64,
        student_id: i64,
    },
    /// Return an issued book
    Return {
        issue_id: i64,
    },
    /// Run one reminder sweep and exit
    Sweep,
    /// Run the daily reminder scheduler until interrupted
    Schedule,
    /// Ask the query assistant a question
    Ask {
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("loading configuration")?;
    let db = Database::new(&config.database_path)
        .await
        .context("opening database")?;

    match cli.command {
        Commands::AddBook {
            title,
            isbn,
            copies,
            author,
            category,
        } => {
            let book = queries::insert_book(
                db.pool(),
                &NewBook {
                    title,
                    isbn,
                    number_of_copies: copies,
                    author,
                    category,
                },
            )
            .await?;
            println!("added book {}: {}", book.book_id, book.title);
        }
        Commands::AddStudent {
            name,
            roll_number,
            email,
            department,
            semester,
            phone,
        } => {
            let student = queries::insert_student(
                db.pool(),
                &NewStudent {
                    name,
                    roll_number,
                    department,
                    semester,
                    phone,
                    email,
                },
            )
            .await?;
            println!("added student {}: {}", student.student_id, student.name);
        }
        Commands::Search {
            title,
            author,
            category,
        } => {
            let filter = BookFilter {
                title,
                author,
                category,
                isbn: None,
            };
            let books = queries::search_books(db.pool(), &filter, Page::default()).await?;
            if books.is_empty() {
                println!("no matches");
            }
            for book in books {
                println!(
                    "{:>5}  {}  by {}  ({} copies)",
                    book.book_id, book.title, book.author, book.number_of_copies
                );
            }
        }
        Commands::Issue {
            book_id,
            student_id,
        } => {
            let issue =
                circulation::issue_book(db.pool(), &IssueRequest::new(book_id, student_id)).await?;
            println!(
                "issue {}: book {} to student {}, due {}",
                issue.issue_id, issue.book_id, issue.student_id, issue.due_date
            );
        }
        Commands::Return { issue_id } => {
            let issue = circulation::return_book(
                db.pool(),
                &ReturnRequest {
                    issue_id,
                    return_date: None,
                },
            )
            .await?;
            println!("issue {} returned", issue.issue_id);
        }
        Commands::Sweep => {
            let mailer = Arc::new(MailRelayClient::new(config.mail.clone())?);
            let sweep = ReminderSweep::new(db, mailer);
            let report = sweep.run().await?;
            println!(
                "{} candidates, {} sent, {} skipped, {} failed",
                report.candidates, report.sent, report.skipped, report.failed
            );
        }
        Commands::Schedule => {
            let mailer = Arc::new(MailRelayClient::new(config.mail.clone())?);
            let sweep = Arc::new(ReminderSweep::new(db, mailer));
            let mut scheduler = ReminderScheduler::new(sweep, config.reminder_hour);
            scheduler.start();
            println!(
                "scheduler running, daily sweep at {:02}:00; press Ctrl-C to stop",
                config.reminder_hour
            );
            tokio::signal::ctrl_c()
                .await
                .context("waiting for Ctrl-C")?;
            scheduler.stop().await;
        }
        Commands::Ask { question } => {
            let generator = TextGenClient::new(config.textgen.clone())?;
            let assistant = QueryAssistant::new(db, generator);
            let answer = assistant.ask(&question).await?;
            println!("-- {}", answer.sql);
            println!("{}", serde_json::to_string_pretty(&answer.rows)?);
        }
    }

    Ok(())
}
