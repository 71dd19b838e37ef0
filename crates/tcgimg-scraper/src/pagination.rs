//! Sequential listing walk.
//!
//! The first fetched page (`range.start`) supplies the advertised page
//! count. Without `forced`, the walk never goes past that count. With
//! `forced`, the count is ignored and the walk stops at the first page that
//! shows no cards, capped at [`MAX_FORCED_PAGES`] pages.
//!
//! A fetch failure ends the walk; everything collected before it is kept.

use std::future::Future;

use scraper::Html;
use tcgimg_core::{Filter, PageRange};

use crate::client::PageFetcher;
use crate::collector::ListingCollector;
use crate::error::ScraperError;
use crate::listing_url::ListingUrlBuilder;
use crate::markup;
use crate::rate_limit::Pacer;

/// Upper bound on pages fetched by one forced walk.
pub const MAX_FORCED_PAGES: u32 = 100;

/// How a walk ended.
#[derive(Debug)]
pub enum WalkTermination {
    /// Every page up to the effective end was fetched.
    Exhausted { last_page: u32 },
    /// Forced walk reached a page with no cards.
    EmptyPage { page: u32 },
    /// The first page advertised no page count; nothing to walk.
    NoPagesDetected,
    /// The start page lies past the advertised page count.
    StartBeyondLimit { start: u32, limit: u32 },
    /// A page could not be fetched. Pages before it are in the collector.
    FetchFailed { page: u32, error: ScraperError },
}

impl WalkTermination {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, WalkTermination::FetchFailed { .. })
    }
}

#[derive(Debug)]
pub struct WalkOutcome {
    pub collection: ListingCollector,
    pub termination: WalkTermination,
}

/// Last page a walk may fetch, or `None` when there is nothing to walk.
///
/// Forced walks ignore `detected` and only apply the safety cap. Other walks
/// clamp an explicit end to `detected` and use `detected` when no end was
/// given.
#[must_use]
pub fn effective_end(range: PageRange, detected: Option<u32>) -> Option<u32> {
    if range.forced() {
        let cap = range.start().saturating_add(MAX_FORCED_PAGES - 1);
        return Some(range.end().map_or(cap, |end| end.min(cap)));
    }
    let limit = detected?;
    let end = range.end().map_or(limit, |end| end.min(limit));
    (end >= range.start()).then_some(end)
}

/// Receives the items of each listing page as soon as that page is scraped,
/// before the next page is fetched.
pub trait PageSink {
    fn page_done(&mut self, page: u32, items: &[String]) -> impl Future<Output = ()>;
}

impl PageSink for () {
    async fn page_done(&mut self, _page: u32, _items: &[String]) {}
}

/// Walks listing pages for one filter, one fetch per page.
pub struct ListingWalker<'a, F> {
    fetcher: &'a F,
    urls: &'a ListingUrlBuilder,
    inter_request_delay_ms: u64,
}

impl<'a, F: PageFetcher> ListingWalker<'a, F> {
    pub fn new(fetcher: &'a F, urls: &'a ListingUrlBuilder, inter_request_delay_ms: u64) -> Self {
        Self {
            fetcher,
            urls,
            inter_request_delay_ms,
        }
    }

    /// Collects card image URLs across the range.
    pub async fn walk(&self, filter: &Filter, range: PageRange) -> WalkOutcome {
        self.walk_with(filter, range, markup::image_urls, &mut ()).await
    }

    /// Collects absolute card detail URLs across the range.
    pub async fn walk_detail_links(&self, filter: &Filter, range: PageRange) -> WalkOutcome {
        self.walk_detail_links_into(filter, range, &mut ()).await
    }

    /// Like [`ListingWalker::walk_detail_links`], handing each page's links
    /// to `sink` before moving on to the next page.
    pub async fn walk_detail_links_into<S: PageSink>(
        &self,
        filter: &Filter,
        range: PageRange,
        sink: &mut S,
    ) -> WalkOutcome {
        let extract = |doc: &Html| -> Vec<String> {
            markup::detail_links(doc)
                .iter()
                .filter_map(|href| self.urls.resolve(href))
                .collect()
        };
        self.walk_with(filter, range, extract, sink).await
    }

    async fn walk_with<E, S>(
        &self,
        filter: &Filter,
        range: PageRange,
        extract: E,
        sink: &mut S,
    ) -> WalkOutcome
    where
        E: Fn(&Html) -> Vec<String>,
        S: PageSink,
    {
        let mut collection = ListingCollector::default();
        let mut pacer = Pacer::new(self.inter_request_delay_ms);
        let mut end: Option<u32> = None;
        let mut page = range.start();

        loop {
            pacer.wait().await;
            let url = self.urls.listing(filter, page);
            tracing::debug!(page, %url, "fetching listing page");

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(error) => {
                    tracing::error!(page, %url, error = %error, "listing fetch failed, stopping walk");
                    return WalkOutcome {
                        collection,
                        termination: WalkTermination::FetchFailed { page, error },
                    };
                }
            };

            let (items, detected) = {
                let doc = markup::parse(&body);
                let detected = end
                    .is_none()
                    .then(|| markup::total_pages(&doc, filter.per_page()))
                    .flatten();
                (extract(&doc), detected)
            };

            let last = if let Some(last) = end {
                last
            } else {
                collection.set_detected_limit(detected);
                let Some(last) = effective_end(range, detected) else {
                    let termination = match detected {
                        Some(limit) => WalkTermination::StartBeyondLimit {
                            start: range.start(),
                            limit,
                        },
                        None => WalkTermination::NoPagesDetected,
                    };
                    tracing::info!(?termination, "no pages to walk");
                    return WalkOutcome {
                        collection,
                        termination,
                    };
                };
                tracing::info!(
                    detected_limit = ?detected,
                    start = range.start(),
                    end = last,
                    forced = range.forced(),
                    "resolved page range"
                );
                end = Some(last);
                last
            };

            let found = items.len();
            sink.page_done(page, &items).await;
            collection.record_page(page, items);
            tracing::info!(page, last, found, "scraped listing page");

            if found == 0 {
                if range.forced() {
                    tracing::info!(page, "no cards on page, forced walk complete");
                    return WalkOutcome {
                        collection,
                        termination: WalkTermination::EmptyPage { page },
                    };
                }
                tracing::warn!(page, "no cards on page inside the advertised range, continuing");
            }

            if page >= last {
                return WalkOutcome {
                    collection,
                    termination: WalkTermination::Exhausted { last_page: page },
                };
            }
            page += 1;
        }
    }
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
