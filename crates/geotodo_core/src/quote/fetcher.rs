//! HTTP client for the quote-of-the-day endpoint.

use super::{Quote, QuoteError, QuoteResult};
use log::{info, warn};
use serde::Deserialize;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Public endpoint returning one random quote.
pub const DEFAULT_QUOTE_ENDPOINT: &str = "https://api.quotable.io/random";

#[derive(Debug, Deserialize)]
struct QuotableResponse {
    content: String,
    #[serde(default)]
    author: Option<String>,
}

/// One-shot quote fetcher.
///
/// No retries and no timeout beyond the HTTP client defaults.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    endpoint: String,
}

impl Default for QuoteClient {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_ENDPOINT)
    }
}

impl QuoteClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues a single GET and decodes `{ "content": ... }`.
    ///
    /// # Errors
    /// - `Request` on transport failure.
    /// - `Status` on any non-2xx response.
    /// - `Decode` when the body is not the expected JSON object.
    pub async fn fetch(&self) -> QuoteResult<Quote> {
        let started_at = Instant::now();
        let result = self.fetch_inner().await;
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => info!("event=quote_fetch module=quote status=ok duration_ms={duration_ms}"),
            Err(err) => warn!(
                "event=quote_fetch module=quote status=error duration_ms={duration_ms} error={err}"
            ),
        }
        result
    }

    async fn fetch_inner(&self) -> QuoteResult<Quote> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(QuoteError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(QuoteError::Request)?;
        let decoded: QuotableResponse =
            serde_json::from_slice(&body).map_err(QuoteError::Decode)?;

        Ok(Quote {
            content: decoded.content,
            author: decoded.author,
        })
    }

    /// Runs `fetch` on `runtime` and returns a receipt the owning thread
    /// polls for the outcome.
    pub fn spawn_fetch(&self, runtime: &Handle) -> QuoteReceipt {
        let (tx, rx) = oneshot::channel();
        let client = self.clone();
        runtime.spawn(async move {
            let outcome = client.fetch().await;
            // Receiver gone means nobody is waiting for the quote any more.
            let _ = tx.send(outcome);
        });
        QuoteReceipt { rx: Some(rx) }
    }
}

/// Pending result of `QuoteClient::spawn_fetch`.
#[derive(Debug)]
pub struct QuoteReceipt {
    rx: Option<oneshot::Receiver<QuoteResult<Quote>>>,
}

impl QuoteReceipt {
    /// Non-blocking poll.
    ///
    /// Returns `None` while the fetch is still running and after the outcome
    /// has already been taken. A fetch task that ended without reporting
    /// yields `QuoteError::Aborted`.
    pub fn try_take(&mut self) -> Option<QuoteResult<Quote>> {
        let rx = self.rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(QuoteError::Aborted),
        };
        self.rx = None;
        Some(outcome)
    }

    pub fn is_finished(&self) -> bool {
        self.rx.is_none()
    }

    /// Waits for the outcome from async code.
    pub async fn wait(mut self) -> QuoteResult<Quote> {
        match self.rx.take() {
            Some(rx) => rx.await.unwrap_or(Err(QuoteError::Aborted)),
            None => Err(QuoteError::Aborted),
        }
    }
}
