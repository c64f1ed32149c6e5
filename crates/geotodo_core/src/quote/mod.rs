//! Quote of the day.
//!
//! # Responsibility
//! - Fetch one quote from a remote endpoint at launch.
//! - Expose UI-facing state: the quote text or an error flag.
//!
//! # Invariants
//! - Any fetch failure sets `show_error` and never panics.
//! - `QuoteState` is only mutated on the owning thread via `apply`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod fetcher;

pub use fetcher::{QuoteClient, QuoteReceipt, DEFAULT_QUOTE_ENDPOINT};

/// Generic alert text shown when the quote cannot be loaded.
pub const QUOTE_ERROR_MESSAGE: &str = "Failed to fetch quote or no Internet connection.";
/// Text shown while no quote has arrived.
pub const QUOTE_PLACEHOLDER: &str = "Loading quote...";

pub type QuoteResult<T> = Result<T, QuoteError>;

/// Decoded quote payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub content: String,
    pub author: Option<String>,
}

/// Quote fetch failures.
#[derive(Debug)]
pub enum QuoteError {
    Request(reqwest::Error),
    /// Non-2xx HTTP status.
    Status(u16),
    Decode(serde_json::Error),
    /// Background task ended without reporting.
    Aborted,
}

impl Display for QuoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(err) => write!(f, "quote request failed: {err}"),
            Self::Status(code) => write!(f, "quote endpoint returned HTTP {code}"),
            Self::Decode(err) => write!(f, "quote response could not be decoded: {err}"),
            Self::Aborted => write!(f, "quote fetch ended without a result"),
        }
    }
}

impl Error for QuoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status(_) | Self::Aborted => None,
        }
    }
}

/// Quote state bound by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteState {
    pub quote: Option<Quote>,
    /// Drives the generic error alert.
    pub show_error: bool,
}

impl QuoteState {
    /// Publishes a successful quote or raises the error flag.
    pub fn apply(&mut self, outcome: QuoteResult<Quote>) {
        match outcome {
            Ok(quote) => {
                self.quote = Some(quote);
                self.show_error = false;
            }
            Err(_) => self.show_error = true,
        }
    }

    /// Quote text, or the loading placeholder.
    pub fn display_text(&self) -> &str {
        self.quote
            .as_ref()
            .map_or(QUOTE_PLACEHOLDER, |quote| quote.content.as_str())
    }

    /// Clears the error flag once the alert has been dismissed.
    pub fn dismiss_error(&mut self) {
        self.show_error = false;
    }
}
