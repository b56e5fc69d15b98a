use crate::models::{CombinedRecord, ListingStub, PropertyRecord, ScrapeStatus};
use crate::scrapers::pisos::parse_detail_page;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScrapeParams;
use tracing::{info, warn};

/// Fetches and parses property detail pages; never fails.
pub struct DetailExtractor<'a, F: PageFetcher> {
    fetcher: &'a F,
    params: &'a ScrapeParams,
}

impl<'a, F: PageFetcher> DetailExtractor<'a, F> {
    pub fn new(fetcher: &'a F, params: &'a ScrapeParams) -> Self {
        Self { fetcher, params }
    }

    /// One attempt per URL; failures are captured in `scrape_status`.
    pub async fn scrape(&self, url: &str) -> PropertyRecord {
        match self.fetcher.fetch(url, self.params.detail_timeout()).await {
            Ok(body) if body.trim().is_empty() => {
                warn!("Empty body for {}", url);
                PropertyRecord::failed(url, ScrapeStatus::ParseError { field: "body".into() })
            }
            Ok(body) => PropertyRecord::success(url, parse_detail_page(&body)),
            Err(e) => {
                warn!("Error scraping details for {}: {}", url, e);
                PropertyRecord::failed(url, ScrapeStatus::from(&e))
            }
        }
    }

    /// Scrape every stub in order, pausing after each request.
    pub async fn scrape_all(&self, stubs: Vec<ListingStub>) -> Vec<CombinedRecord> {
        let total = stubs.len();
        let mut combined = Vec::with_capacity(total);

        for (i, stub) in stubs.into_iter().enumerate() {
            if i == 0 || (i + 1) % 10 == 0 || i + 1 == total {
                info!("Processing details for property {}/{}: {}", i + 1, total, short_id(&stub.url));
            }

            let record = self.scrape(&stub.url).await;
            combined.push(CombinedRecord { stub, record });

            tokio::time::sleep(self.params.polite_delay()).await;
        }

        let ok = combined.iter().filter(|c| c.record.scrape_status.is_success()).count();
        info!("Detail scraping complete: {} ok, {} failed", ok, total - ok);
        combined
    }
}

/// Last non-empty path segment, for log lines
fn short_id(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::traits::testing::CannedFetcher;
    use crate::scrapers::types::NetworkErrorKind;

    fn stub(url: &str) -> ListingStub {
        ListingStub {
            url: url.to_string(),
            latitude: "40.41".into(),
            longitude: "-3.70".into(),
            page_source: 1,
        }
    }

    #[tokio::test]
    async fn failures_are_recorded_and_the_batch_continues() {
        let fetcher = CannedFetcher::default()
            .status("https://p/1/", 410)
            .timeout("https://p/2/")
            .page("https://p/3/", r#"<div class="details" data-ad-price="250000"></div>"#)
            .page("https://p/4/", "   ");
        let params = ScrapeParams {
            polite_delay_ms: 0,
            ..Default::default()
        };
        let extractor = DetailExtractor::new(&fetcher, &params);

        let records = extractor
            .scrape_all(vec![
                stub("https://p/1/"),
                stub("https://p/2/"),
                stub("https://p/3/"),
                stub("https://p/4/"),
            ])
            .await;

        let statuses: Vec<_> = records.iter().map(|c| c.record.scrape_status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                ScrapeStatus::HttpError { code: 410 },
                ScrapeStatus::NetworkError { kind: NetworkErrorKind::Timeout },
                ScrapeStatus::Success,
                ScrapeStatus::ParseError { field: "body".into() },
            ]
        );
        assert_eq!(records[2].record.details.price, Some(250000));
        assert_eq!(records[0].record.details.price, None);
        assert_eq!(fetcher.requested().len(), 4);
    }

    #[test]
    fn short_id_uses_last_segment() {
        assert_eq!(short_id("https://www.pisos.com/comprar/piso-opanel28019-123_456/"), "piso-opanel28019-123_456");
    }
}
