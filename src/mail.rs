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

//! Outbound email
//!
//! Delivery goes through an external HTTP mail relay that accepts
//! (recipient, subject, HTML body) and answers success or failure. The
//! [`MailTransport`] trait is the seam the reminder dispatcher depends on;
//! [`MailRelayClient`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{LibraryError, Result};

/// Request timeout for relay calls; a blocked relay must not stall a sweep
/// for longer than this per recipient.
const SEND_TIMEOUT_SECS: u64 = 20;

/// Delivery seam for the reminder dispatcher
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one HTML message. An `Err` means the message may not have
    /// reached the recipient; callers must not record it as sent.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Wire format the relay accepts
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from_name: &'a str,
    from_email: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// HTTP client for the mail relay
#[derive(Debug, Clone)]
pub struct MailRelayClient {
    http: reqwest::Client,
    config: MailConfig,
}

impl MailRelayClient {
    pub fn new(config: MailConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| {
                    LibraryError::InvalidConfiguration(
                        "MAIL_RELAY_API_KEY contains invalid header characters".to_string(),
                    )
                })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.config.relay_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MailTransport for MailRelayClient {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let message = RelayMessage {
            from_name: &self.config.sender_name,
            from_email: &self.config.sender_email,
            to,
            subject,
            html: html_body,
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&message)
            .send()
            .await
            .map_err(|e| LibraryError::MailDelivery {
                recipient: to.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::MailDelivery {
                recipient: to.to_string(),
                message: format!("relay answered {status}: {body}"),
            });
        }

        log::debug!("email sent to {to}: {subject}");
        Ok(())
    }
}
