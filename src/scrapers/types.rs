use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::models::Operation;

pub const DEFAULT_BASE_URL: &str = "https://www.pisos.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Scrape parameters for a pisos.com run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeParams {
    /// Sale or rental market
    pub operation: Operation,
    /// Domain relative listing URLs are joined to
    pub base_url: String,
    /// First listing page; defaults to the operation's Madrid Capital page
    pub listing_url: Option<String>,
    pub user_agent: String,
    pub listing_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    /// Pause after every request
    pub polite_delay_ms: u64,
    /// JSON-LD `@type` values accepted as properties
    pub property_types: Vec<String>,
    /// Stop the listing traversal after this many pages
    pub max_pages: Option<u32>,
    /// Only detail-scrape the first N stubs
    pub max_details: Option<usize>,
}

impl Default for ScrapeParams {
    fn default() -> Self {
        Self {
            operation: Operation::Sale,
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            listing_timeout_secs: 10,
            detail_timeout_secs: 15,
            polite_delay_ms: 1500,
            property_types: ["SingleFamilyResidence", "Apartment", "Residence", "House", "Flat"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_pages: None,
            max_details: None,
        }
    }
}

impl ScrapeParams {
    pub fn listing_url(&self) -> &str {
        self.listing_url
            .as_deref()
            .unwrap_or_else(|| self.operation.default_listing_url())
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn polite_delay(&self) -> Duration {
        Duration::from_millis(self.polite_delay_ms)
    }
}

/// Coarse classification of transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Redirect,
    Body,
    Decode,
    Request,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Timeout => "Timeout",
            NetworkErrorKind::Connect => "ConnectionError",
            NetworkErrorKind::Redirect => "TooManyRedirects",
            NetworkErrorKind::Body => "BodyError",
            NetworkErrorKind::Decode => "ContentDecodingError",
            NetworkErrorKind::Request => "RequestException",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Http { status: u16 },
    #[error("{kind}: {message}")]
    Network { kind: NetworkErrorKind, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Http { status: 404 })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Http { status: status.as_u16() };
        }
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else if err.is_redirect() {
            NetworkErrorKind::Redirect
        } else if err.is_body() {
            NetworkErrorKind::Body
        } else if err.is_decode() {
            NetworkErrorKind::Decode
        } else {
            NetworkErrorKind::Request
        };
        FetchError::Network { kind, message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_falls_back_to_operation_default() {
        let mut params = ScrapeParams {
            operation: Operation::Rental,
            ..Default::default()
        };
        assert_eq!(
            params.listing_url(),
            "https://www.pisos.com/alquiler/pisos-madrid_capital_zona_urbana/"
        );
        params.listing_url = Some("https://example.test/list/".into());
        assert_eq!(params.listing_url(), "https://example.test/list/");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: ScrapeParams =
            serde_json::from_str(r#"{"operation":"rental","polite_delay_ms":0}"#).unwrap();
        assert_eq!(params.operation, Operation::Rental);
        assert_eq!(params.polite_delay(), Duration::ZERO);
        assert_eq!(params.detail_timeout_secs, 15);
        assert_eq!(params.property_types.len(), 5);
    }
}
