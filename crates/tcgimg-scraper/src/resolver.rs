//! Table-driven card lookup.
//!
//! Each row becomes a name+number search on the listing. The first result
//! is taken as the match (the site's own relevance order decides), its
//! detail page is fetched, and the primary image is read from there. This
//! is a heuristic: two cards with the same name and number in different
//! sets resolve to whichever the site ranks first.

use tcgimg_core::{CardRow, Filter, Locale, PerPage};

use crate::client::PageFetcher;
use crate::collector::{MissReason, RowOutcome, TableCollector};
use crate::listing_url::ListingUrlBuilder;
use crate::markup;
use crate::rate_limit::Pacer;

pub struct RowResolver<'a, F> {
    fetcher: &'a F,
    urls: &'a ListingUrlBuilder,
    pacer: Pacer,
}

impl<'a, F: PageFetcher> RowResolver<'a, F> {
    pub fn new(fetcher: &'a F, urls: &'a ListingUrlBuilder, inter_request_delay_ms: u64) -> Self {
        Self {
            fetcher,
            urls,
            pacer: Pacer::new(inter_request_delay_ms),
        }
    }

    /// Resolves every row in order. A row that fails never stops the run.
    pub async fn resolve_all(&mut self, rows: Vec<CardRow>, locale: Locale) -> TableCollector {
        let mut collector = TableCollector::default();
        let total = rows.len();
        for (index, row) in rows.into_iter().enumerate() {
            let outcome = self.resolve(&row, locale).await;
            match &outcome {
                RowOutcome::Found {
                    detail_url,
                    image_url,
                } => {
                    tracing::info!(
                        row = index + 1,
                        total,
                        card = %row,
                        %detail_url,
                        %image_url,
                        "resolved row"
                    );
                }
                RowOutcome::NotFound { reason } => {
                    tracing::warn!(row = index + 1, total, card = %row, %reason, "row not resolved");
                }
            }
            collector.record(row, outcome);
        }
        collector
    }

    /// Resolves one row to its card image. A row without a name is a miss
    /// and costs no request.
    pub async fn resolve(&mut self, row: &CardRow, locale: Locale) -> RowOutcome {
        if row.name.trim().is_empty() {
            return RowOutcome::NotFound {
                reason: MissReason::BlankName,
            };
        }
        let query = row.search_query();
        let filter = Filter::new(Some(&query), locale, None, PerPage::Thirty);
        let listing_url = self.urls.listing(&filter, 1);
        tracing::debug!(card = %row, %query, url = %listing_url, "searching for row");

        let body = match self.fetch(&listing_url).await {
            Ok(body) => body,
            Err(reason) => return RowOutcome::NotFound { reason },
        };

        let Some(link) = markup::first_detail_link(&markup::parse(&body)) else {
            return RowOutcome::NotFound {
                reason: MissReason::NoMatches,
            };
        };

        let Some(detail_url) = self.urls.resolve(&link.href) else {
            return Self::grid_fallback(link.href, link.image_url);
        };

        let detail_body = match self.fetch(&detail_url).await {
            Ok(body) => body,
            Err(reason) => return RowOutcome::NotFound { reason },
        };

        match markup::card_image_url(&markup::parse(&detail_body)) {
            Some(image_url) => RowOutcome::Found {
                detail_url,
                image_url,
            },
            None => {
                tracing::debug!(%detail_url, "detail page has no image, using grid thumbnail");
                Self::grid_fallback(detail_url, link.image_url)
            }
        }
    }

    async fn fetch(&mut self, url: &str) -> Result<String, MissReason> {
        self.pacer.wait().await;
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| MissReason::FetchFailed(e.to_string()))
    }

    fn grid_fallback(detail_url: String, grid_image: Option<String>) -> RowOutcome {
        match grid_image {
            Some(image_url) => RowOutcome::Found {
                detail_url,
                image_url,
            },
            None => RowOutcome::NotFound {
                reason: MissReason::MissingImage,
            },
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
