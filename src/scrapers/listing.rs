use crate::models::ListingStub;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{FetchError, ScrapeParams};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Why the listing traversal ended
#[derive(Debug)]
pub enum StopReason {
    /// 404 past page 1, or a later page with nothing new on it
    EndOfListings { page: u32 },
    /// A later page carried no JSON-LD at all
    NoStructuredData { page: u32 },
    /// Page 1 yielded no property links
    EmptyFirstPage,
    /// Any other HTTP or network failure
    FetchFailed { page: u32, error: FetchError },
    PageLimit { page: u32 },
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::EmptyFirstPage | StopReason::FetchFailed { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndOfListings { page } => write!(f, "end of listings at page {}", page),
            StopReason::NoStructuredData { page } => {
                write!(f, "no JSON-LD blocks on page {}", page)
            }
            StopReason::EmptyFirstPage => f.write_str("no property links on the first page"),
            StopReason::FetchFailed { page, error } => {
                write!(f, "fetching page {} failed: {}", page, error)
            }
            StopReason::PageLimit { page } => write!(f, "page limit reached at page {}", page),
        }
    }
}

#[derive(Debug)]
pub struct CollectOutcome {
    pub stubs: Vec<ListingStub>,
    pub stop: StopReason,
}

/// What one listing page contributed
#[derive(Debug, Default)]
pub struct PageScan {
    pub structured_blocks: usize,
    pub new_stubs: Vec<ListingStub>,
}

/// URL of listing page `page`, derived from the first page URL
pub fn page_url(first_page: &str, page: u32) -> String {
    if page <= 1 {
        first_page.to_string()
    } else {
        format!("{}/{}/", first_page.trim_end_matches('/'), page)
    }
}

/// Resolve a JSON-LD `url` against the site domain
pub fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

fn coordinate(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Scan a listing page body for JSON-LD property stubs not yet in `seen`.
pub fn scan_listing_page(
    html: &str,
    page: u32,
    params: &ScrapeParams,
    seen: &mut HashSet<String>,
) -> PageScan {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    let mut scan = PageScan::default();

    for script in document.select(&script_selector) {
        scan.structured_blocks += 1;

        let raw = script.text().collect::<String>();
        if raw.trim().is_empty() {
            continue;
        }

        let data: Value = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                debug!("Skipping malformed JSON-LD block on page {}: {}", page, e);
                continue;
            }
        };

        let items = match data {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            _ => continue,
        };

        for item in &items {
            let Some(obj) = item.as_object() else { continue };

            let type_ok = obj
                .get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| params.property_types.iter().any(|p| p == t));
            if !type_ok || !obj.contains_key("geo") || !obj.contains_key("url") {
                continue;
            }

            let Some(href) = obj.get("url").and_then(Value::as_str).filter(|u| !u.is_empty()) else {
                continue;
            };
            let url = resolve_url(&params.base_url, href);
            if seen.contains(&url) {
                continue;
            }

            let geo = obj.get("geo");
            let latitude = coordinate(geo.and_then(|g| g.get("latitude")));
            let longitude = coordinate(geo.and_then(|g| g.get("longitude")));
            let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
                debug!("Skipping {} without coordinates", url);
                continue;
            };

            seen.insert(url.clone());
            scan.new_stubs.push(ListingStub {
                url,
                latitude,
                longitude,
                page_source: page,
            });
        }
    }

    scan
}

/// Walks the paginated listing and gathers unique property stubs
pub struct ListingCollector<'a, F: PageFetcher> {
    fetcher: &'a F,
    params: &'a ScrapeParams,
}

impl<'a, F: PageFetcher> ListingCollector<'a, F> {
    pub fn new(fetcher: &'a F, params: &'a ScrapeParams) -> Self {
        Self { fetcher, params }
    }

    pub async fn collect(&self) -> CollectOutcome {
        let first_page = self.params.listing_url();
        let mut stubs = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1u32;

        info!("Collecting property links from {}", first_page);

        let stop = loop {
            let url = page_url(first_page, page);
            info!("Scraping listing page {}: {}", page, url);

            let body = match self.fetcher.fetch(&url, self.params.listing_timeout()).await {
                Ok(body) => body,
                Err(e) if e.is_not_found() && page > 1 => {
                    info!("Page {} returned 404, assuming end of listings", page);
                    break StopReason::EndOfListings { page };
                }
                Err(e) => {
                    error!("Error fetching listing page {}: {}", url, e);
                    break StopReason::FetchFailed { page, error: e };
                }
            };

            let scan = scan_listing_page(&body, page, self.params, &mut seen);

            if scan.structured_blocks == 0 && page > 1 {
                info!("No JSON-LD blocks on page {}, assuming end of listings", page);
                break StopReason::NoStructuredData { page };
            }

            info!("Found {} new unique property links on page {}", scan.new_stubs.len(), page);

            if scan.new_stubs.is_empty() {
                if page == 1 {
                    warn!(
                        "No property links found on the first listing page {}; check the URL or site structure",
                        first_page
                    );
                    break StopReason::EmptyFirstPage;
                }
                info!("No new unique links on page {}, assuming end of listings", page);
                break StopReason::EndOfListings { page };
            }

            stubs.extend(scan.new_stubs);

            if self.params.max_pages.is_some_and(|max| page >= max) {
                break StopReason::PageLimit { page };
            }

            page += 1;
            tokio::time::sleep(self.params.polite_delay()).await;
        };

        info!("Collected {} unique property links ({})", stubs.len(), stop);
        CollectOutcome { stubs, stop }
    }
}
