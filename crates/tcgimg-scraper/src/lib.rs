pub mod client;
pub mod collector;
pub mod details;
pub mod error;
pub mod listing_url;
pub mod markup;
pub mod pagination;
mod rate_limit;
pub mod resolver;

pub use client::{HtmlClient, PageFetcher};
pub use collector::{ListingCollector, MissReason, RowOutcome, TableCollector};
pub use details::{
    extract_card_details, fetch_all_card_details, fetch_card_details, CardDetails, DetailsBatch,
};
pub use error::ScraperError;
pub use listing_url::ListingUrlBuilder;
pub use pagination::{
    effective_end, ListingWalker, PageSink, WalkOutcome, WalkTermination, MAX_FORCED_PAGES,
};
pub use resolver::RowResolver;
