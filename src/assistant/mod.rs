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

//! Natural-language query assistant
//!
//! Turns an English question into a read-only SQL query via a text
//! generation service, then runs it against the library database and
//! returns the rows as JSON objects. Generated SQL never reaches the
//! database without passing [`ensure_read_only`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::time::Duration;

use crate::config::TextGenConfig;
use crate::error::{LibraryError, Result};
use crate::storage::Database;

const GENERATION_TIMEOUT_SECS: u64 = 30;

/// Schema summary handed to the generator so it emits valid table and
/// column names.
const SCHEMA_DESCRIPTION: &str = "\
Database schema (SQLite):

Books(book_id INTEGER PK, title TEXT, isbn TEXT UNIQUE, number_of_copies INTEGER, author TEXT, category TEXT)
Students(student_id INTEGER PK, name TEXT, roll_number TEXT UNIQUE, department TEXT, semester INTEGER, phone TEXT, email TEXT UNIQUE)
BookIssues(issue_id INTEGER PK, book_id -> Books, student_id -> Students, issue_date DATE, due_date DATE, return_date DATE NULL)
ReminderHistory(reminder_id INTEGER PK, student_id -> Students, book_issue_id -> BookIssues, reminder_type TEXT ('pre_due' or 'overdue'), sent_date DATE, days_before_due INTEGER)

An issue is open while return_date IS NULL.";

const SYSTEM_PROMPT: &str = "\
You translate questions about a library database into a single SQLite SELECT \
statement. Respond with the SQL only, no explanation and no code fences. \
Never write anything other than a SELECT (or a WITH ... SELECT).";

/// Produces SQL for an English question. Seam for tests and for swapping
/// generation backends.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, question: &str) -> Result<String>;
}

/// Answer to one assistant question
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub sql: String,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat completions endpoint
pub struct TextGenClient {
    client: reqwest::Client,
    config: TextGenConfig,
}

impl TextGenClient {
    pub fn new(config: TextGenConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key);
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|_| LibraryError::InvalidConfiguration("TEXTGEN_API_KEY".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SqlGenerator for TextGenClient {
    async fn generate_sql(&self, question: &str) -> Result<String> {
        let prompt = format!("{SCHEMA_DESCRIPTION}\n\nQuestion: {question}");
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| LibraryError::GenerationFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::GenerationFailed(format!(
                "generator returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LibraryError::GenerationFailed(format!("malformed response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LibraryError::GenerationFailed("empty choices".to_string()))?;

        let sql = strip_code_fences(&content);
        if sql.is_empty() {
            return Err(LibraryError::GenerationFailed(
                "generator produced no SQL".to_string(),
            ));
        }
        Ok(sql)
    }
}

/// Assistant facade: generate, validate, execute
pub struct QueryAssistant<G> {
    db: Database,
    generator: G,
}

impl<G: SqlGenerator> QueryAssistant<G> {
    pub fn new(db: Database, generator: G) -> Self {
        Self { db, generator }
    }

    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let sql = self.generator.generate_sql(question).await?;
        log::debug!("assistant generated SQL: {sql}");
        ensure_read_only(&sql)?;

        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        let rows = rows.iter().map(row_to_json).collect::<Result<Vec<_>>>()?;

        Ok(AskResponse {
            question: question.to_string(),
            sql,
            rows,
        })
    }
}

/// Strip a Markdown code fence (with or without a language tag) that
/// generators habitually wrap SQL in, despite being told not to.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the language tag line, e.g. "sql"
    let body = match rest.split_once('\n') {
        Some((first, tail)) if !first.trim().contains(char::is_whitespace) => tail,
        _ => rest,
    };
    body.trim().to_string()
}

/// Reject anything but a single SELECT (or WITH ... SELECT) statement.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    if trimmed.contains(';') {
        return Err(LibraryError::UnsafeQuery(
            "multiple statements are not allowed".to_string(),
        ));
    }

    let lowered = trimmed.to_lowercase();
    if !(lowered.starts_with("select") || lowered.starts_with("with")) {
        return Err(LibraryError::UnsafeQuery(
            "only SELECT queries are allowed".to_string(),
        ));
    }

    const FORBIDDEN: &[&str] = &[
        "insert", "update", "delete", "drop", "alter", "create", "replace",
        "pragma", "attach", "detach", "vacuum", "reindex",
    ];
    for word in lowered.split(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
        if FORBIDDEN.contains(&word) {
            return Err(LibraryError::UnsafeQuery(format!(
                "forbidden keyword '{word}'"
            )));
        }
    }

    Ok(())
}

fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(i)?),
                "REAL" => Value::from(row.try_get::<f64, _>(i)?),
                "BLOB" => Value::Null,
                // TEXT, DATE, DATETIME and anything else decode as text
                _ => Value::from(row.try_get::<String, _>(i)?),
            }
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::NewBook;
    use crate::storage::queries;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl SqlGenerator for CannedGenerator {
        async fn generate_sql(&self, _question: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn strips_plain_and_tagged_fences() {
        assert_eq!(strip_code_fences("SELECT 1"), "SELECT 1");
        assert_eq!(strip_code_fences("```\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(strip_code_fences("```sql\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(
            strip_code_fences("  ```sql\nSELECT *\nFROM Books\n```  "),
            "SELECT *\nFROM Books"
        );
    }

    #[test]
    fn read_only_guard_accepts_selects() {
        assert!(ensure_read_only("SELECT * FROM Books;").is_ok());
        assert!(ensure_read_only("select title from Books where isbn = 'x'").is_ok());
        assert!(ensure_read_only(
            "WITH open AS (SELECT * FROM BookIssues WHERE return_date IS NULL) \
             SELECT COUNT(*) FROM open"
        )
        .is_ok());
    }

    #[test]
    fn read_only_guard_rejects_writes_and_stacking() {
        for sql in [
            "DELETE FROM Books",
            "UPDATE Books SET title = 'x'",
            "SELECT 1; DROP TABLE Books",
            "PRAGMA journal_mode = DELETE",
            "SELECT * FROM Books WHERE title = (DELETE FROM Students)",
            "INSERT INTO Books (title) VALUES ('x')",
        ] {
            let err = ensure_read_only(sql).expect_err(sql);
            assert!(matches!(err, LibraryError::UnsafeQuery(_)), "{sql}");
        }
    }

    #[test]
    fn read_only_guard_allows_keyword_substrings_in_identifiers() {
        // "created_at" contains "create" but is not the keyword
        assert!(ensure_read_only("SELECT created_at FROM Books").is_ok());
    }

    #[tokio::test]
    async fn ask_executes_generated_sql_and_serializes_rows() {
        let db = Database::new_in_memory().await.expect("database");
        queries::insert_book(
            db.pool(),
            &NewBook {
                title: "Dune".to_string(),
                isbn: "9780441172719".to_string(),
                number_of_copies: 2,
                author: "Frank Herbert".to_string(),
                category: "Fiction".to_string(),
            },
        )
        .await
        .expect("book");

        let assistant = QueryAssistant::new(
            db,
            CannedGenerator("SELECT title, number_of_copies FROM Books ORDER BY title"),
        );
        let answer = assistant.ask("what books do we have?").await.expect("ask");

        assert_eq!(answer.rows.len(), 1);
        assert_eq!(answer.rows[0]["title"], Value::from("Dune"));
        assert_eq!(answer.rows[0]["number_of_copies"], Value::from(2));
    }

    #[tokio::test]
    async fn ask_refuses_destructive_generation() {
        let db = Database::new_in_memory().await.expect("database");
        let assistant = QueryAssistant::new(db, CannedGenerator("DROP TABLE Books"));
        let err = assistant.ask("tidy up").await.expect_err("must refuse");
        assert!(matches!(err, LibraryError::UnsafeQuery(_)));
    }

    #[tokio::test]
    async fn null_columns_become_json_null() {
        let db = Database::new_in_memory().await.expect("database");
        let assistant = QueryAssistant::new(
            db,
            CannedGenerator("SELECT NULL AS missing, 'x' AS present"),
        );
        let answer = assistant.ask("anything").await.expect("ask");
        assert_eq!(answer.rows[0]["missing"], Value::Null);
        assert_eq!(answer.rows[0]["present"], Value::from("x"));
    }
}
