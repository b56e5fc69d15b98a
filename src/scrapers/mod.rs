pub mod detail;
pub mod http;
pub mod listing;
pub mod pisos;
pub mod traits;
pub mod types;

pub use detail::DetailExtractor;
pub use http::HttpFetcher;
pub use listing::{ListingCollector, StopReason};
