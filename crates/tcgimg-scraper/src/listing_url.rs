//! Listing and detail URL construction.

use reqwest::Url;
use tcgimg_core::Filter;

use crate::error::ScraperError;

/// Builds listing URLs from a [`Filter`] and a page number, and resolves
/// site-relative links found in listing markup.
///
/// The base URL is validated once in [`ListingUrlBuilder::new`]; building a
/// listing URL afterwards cannot fail.
#[derive(Debug, Clone)]
pub struct ListingUrlBuilder {
    base: Url,
}

impl ListingUrlBuilder {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ScraperError> {
        let base = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ScraperError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "expected an http(s) origin".to_owned(),
            });
        }
        Ok(Self { base })
    }

    /// Listing URL for `page` (1-based) of the results selected by `filter`.
    ///
    /// Query order is `displayAs`, `cardsPerPage`, the sort parameter,
    /// `cardSearch`, then `page`. Page 1 carries no `page` parameter; that is
    /// the site's canonical first-page URL.
    #[must_use]
    pub fn listing(&self, filter: &Filter, page: u32) -> String {
        let mut url = self.base.clone();
        url.set_path(filter.locale().listing_path());
        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("displayAs", "images")
                .append_pair("cardsPerPage", &filter.per_page().get().to_string());
            if let Some(sort) = filter.sort() {
                let (key, value) = sort.query_pair();
                query.append_pair(key, value);
            }
            if let Some(term) = filter.search_term() {
                query.append_pair("cardSearch", term);
            }
            if page > 1 {
                query.append_pair("page", &page.to_string());
            }
        }
        url.to_string()
    }

    /// Resolves an `href` from listing markup against the site base.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<String> {
        self.base.join(href.trim()).ok().map(String::from)
    }
}
