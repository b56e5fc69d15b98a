use crate::scrapers::types::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Source of page bodies for the collector and the detail extractor.
/// The HTTP client implements it; tests substitute canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body. Non-2xx responses are `FetchError::Http`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher that records every requested URL
    #[derive(Default)]
    pub struct CannedFetcher {
        pages: HashMap<String, Result<String, (u16, bool)>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err((status, false)));
            self
        }

        pub fn timeout(mut self, url: &str) -> Self {
            self.pages.insert(url.to_string(), Err((0, true)));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err((_, true))) => Err(FetchError::Network {
                    kind: crate::scrapers::types::NetworkErrorKind::Timeout,
                    message: "operation timed out".to_string(),
                }),
                Some(Err((status, false))) => Err(FetchError::Http { status: *status }),
                None => Err(FetchError::Http { status: 404 }),
            }
        }
    }
}
