//! Accumulators for listing walks and table runs.

use tcgimg_core::CardRow;

/// URLs collected by a listing walk, in page-then-position order.
///
/// Nothing is deduplicated or reordered: the order is the result order the
/// site served for the requested sort.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListingCollector {
    urls: Vec<String>,
    pages_walked: u32,
    empty_pages: Vec<u32>,
    detected_limit: Option<u32>,
}

impl ListingCollector {
    pub(crate) fn record_page(&mut self, page: u32, urls: Vec<String>) {
        self.pages_walked += 1;
        if urls.is_empty() {
            self.empty_pages.push(page);
        }
        self.urls.extend(urls);
    }

    pub(crate) fn set_detected_limit(&mut self, limit: Option<u32>) {
        self.detected_limit = limit;
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn total_urls(&self) -> usize {
        self.urls.len()
    }

    /// Pages fetched successfully, empty ones included.
    #[must_use]
    pub fn pages_walked(&self) -> u32 {
        self.pages_walked
    }

    #[must_use]
    pub fn empty_pages(&self) -> &[u32] {
        &self.empty_pages
    }

    /// Page count the first fetched page advertised.
    #[must_use]
    pub fn detected_limit(&self) -> Option<u32> {
        self.detected_limit
    }
}

/// Why a table row produced no image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// The search returned no cards.
    NoMatches,
    /// A listing or detail fetch failed; carries the error text.
    FetchFailed(String),
    /// A card matched but neither its detail page nor its grid entry had an image.
    MissingImage,
    /// The row has no card name to search for.
    BlankName,
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissReason::NoMatches => write!(f, "no matching card"),
            MissReason::FetchFailed(error) => write!(f, "fetch failed: {error}"),
            MissReason::MissingImage => write!(f, "matched card has no image"),
            MissReason::BlankName => write!(f, "row has no card name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Found {
        detail_url: String,
        image_url: String,
    },
    NotFound {
        reason: MissReason,
    },
}

impl RowOutcome {
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        match self {
            RowOutcome::Found { image_url, .. } => Some(image_url),
            RowOutcome::NotFound { .. } => None,
        }
    }
}

/// One outcome per table row, in row order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableCollector {
    outcomes: Vec<(CardRow, RowOutcome)>,
}

impl TableCollector {
    pub fn record(&mut self, row: CardRow, outcome: RowOutcome) {
        self.outcomes.push((row, outcome));
    }

    #[must_use]
    pub fn outcomes(&self) -> &[(CardRow, RowOutcome)] {
        &self.outcomes
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.found_urls().count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Image URLs of the rows that resolved, in row order.
    pub fn found_urls(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| outcome.image_url())
    }

    /// Rows that did not resolve, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&CardRow, &MissReason)> {
        self.outcomes.iter().filter_map(|(row, outcome)| match outcome {
            RowOutcome::NotFound { reason } => Some((row, reason)),
            RowOutcome::Found { .. } => None,
        })
    }
}
