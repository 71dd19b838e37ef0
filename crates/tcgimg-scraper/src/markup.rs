//! Queries over listing and card pages.
//!
//! Parsing is lenient: malformed or unexpected markup yields empty results
//! rather than errors, so a broken page reads the same as a page with no
//! cards on it.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tcgimg_core::PerPage;

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static GRID_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector("img.card-image-grid-item-image"));
static GRID_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("a.card-image-grid-item-link[href]"));
static ANY_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static PAGINATION_LAST: LazyLock<Selector> = LazyLock::new(|| {
    selector("ul#card-search-result-pagination li.pagination-item-last a")
});
static PAGINATION_ITEM: LazyLock<Selector> =
    LazyLock::new(|| selector("ul#card-search-result-pagination li.pagination-item"));
static PAGE_ITEM_LINK: LazyLock<Selector> = LazyLock::new(|| selector("li.page-item a.page-link"));
static RESULTS_COUNT: LazyLock<Selector> = LazyLock::new(|| selector("div.results-count"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static CARD_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector("#card-image-container img[src]"));

static TOTAL_ITEMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bof\s+([\d,]+)").expect("valid regex"));

/// Parses raw markup into a queryable document.
#[must_use]
pub fn parse(body: &str) -> Html {
    Html::parse_document(body)
}

/// Card image URLs of a listing page, in document order. Repeats are kept.
#[must_use]
pub fn image_urls(doc: &Html) -> Vec<String> {
    doc.select(&GRID_IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Detail-page `href`s of every card on a listing page, in document order.
#[must_use]
pub fn detail_links(doc: &Html) -> Vec<String> {
    doc.select(&GRID_LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_owned)
        .collect()
}

/// The top-ranked result of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLink {
    pub href: String,
    /// Grid thumbnail shown inside the link, if any.
    pub image_url: Option<String>,
}

#[must_use]
pub fn first_detail_link(doc: &Html) -> Option<DetailLink> {
    doc.select(&GRID_LINK).find_map(|a| {
        let href = a.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let image_url = a
            .select(&ANY_IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty())
            .map(str::to_owned);
        Some(DetailLink {
            href: href.to_owned(),
            image_url,
        })
    })
}

/// Primary image of a card detail page.
#[must_use]
pub fn card_image_url(doc: &Html) -> Option<String> {
    doc.select(&CARD_IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_owned)
}

/// Reads the total page count a listing page advertises.
///
/// Sources, first match wins:
/// 1. the "last page" item of the result pagination,
/// 2. the highest numbered item of the result pagination (gap markers
///    skipped), when it is above 1,
/// 3. the highest numbered generic `page-item` link, when it is above 1,
/// 4. a results counter such as "Showing 1-60 of 157 items", divided by
///    `per_page` and rounded up,
/// 5. a page that shows cards but no pagination at all counts as one page.
///
/// Returns `None` when none of these apply, e.g. for a search with no
/// results. Callers must read `None` as "nothing to walk".
#[must_use]
pub fn total_pages(doc: &Html, per_page: PerPage) -> Option<u32> {
    if let Some(last) = doc.select(&PAGINATION_LAST).find_map(numeric_text) {
        return Some(last);
    }

    let from_items = doc
        .select(&PAGINATION_ITEM)
        .filter(|li| !li.value().classes().any(|c| c == "pagination-item-gap"))
        .filter_map(|li| li.select(&LINK).next())
        .filter_map(numeric_text)
        .max()
        .filter(|n| *n > 1);
    if from_items.is_some() {
        return from_items;
    }

    let from_page_items = doc
        .select(&PAGE_ITEM_LINK)
        .filter_map(numeric_text)
        .max()
        .filter(|n| *n > 1);
    if from_page_items.is_some() {
        return from_page_items;
    }

    if let Some(total_items) = doc.select(&RESULTS_COUNT).find_map(|div| {
        let text = collapsed_text(div);
        let caps = TOTAL_ITEMS_RE.captures(&text)?;
        caps[1].replace(',', "").parse::<u32>().ok()
    }) {
        return (total_items > 0).then_some(total_items.div_ceil(per_page.get()));
    }

    if doc.select(&GRID_IMAGE).next().is_some() {
        return Some(1);
    }

    None
}

/// Positive integer text content of an element, if that is all it holds.
fn numeric_text(el: ElementRef<'_>) -> Option<u32> {
    let text = collapsed_text(el);
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "markup_test.rs"]
mod tests;
