//! Listing filters, page ranges, and table rows.
//!
//! Everything here is validated at construction so the URL builder and the
//! pagination walk never have to handle malformed input.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("cards per page must be 30, 60 or 120 (got {0})")]
    InvalidPerPage(u32),

    #[error("start page must be at least 1")]
    InvalidStartPage,

    #[error("end page {end} is before start page {start}")]
    InvalidEndPage { start: u32, end: u32 },
}

/// Which catalog the listing pages come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Global,
    Japanese,
}

impl Locale {
    /// Listing path relative to the site origin.
    #[must_use]
    pub fn listing_path(self) -> &'static str {
        match self {
            Locale::Global => "/cards",
            Locale::Japanese => "/cards/jp",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Global => write!(f, "global"),
            Locale::Japanese => write!(f, "jp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ReleaseDate,
    Rarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A non-default result order. The site's own default applies when a
/// [`Filter`] carries no `Sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// The query parameter name and value the site expects for this order.
    #[must_use]
    pub fn query_pair(self) -> (&'static str, &'static str) {
        match (self.field, self.direction) {
            (SortField::ReleaseDate, SortDirection::Ascending) => ("releaseDateOrder", "oldToNew"),
            (SortField::ReleaseDate, SortDirection::Descending) => ("releaseDateOrder", "newToOld"),
            (SortField::Rarity, SortDirection::Ascending) => ("sortBy", "rarityAsc"),
            (SortField::Rarity, SortDirection::Descending) => ("sortBy", "rarityDesc"),
        }
    }
}

/// Page sizes the site accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerPage {
    Thirty,
    #[default]
    Sixty,
    OneHundredTwenty,
}

impl PerPage {
    #[must_use]
    pub fn get(self) -> u32 {
        match self {
            PerPage::Thirty => 30,
            PerPage::Sixty => 60,
            PerPage::OneHundredTwenty => 120,
        }
    }
}

impl TryFrom<u32> for PerPage {
    type Error = FilterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            30 => Ok(PerPage::Thirty),
            60 => Ok(PerPage::Sixty),
            120 => Ok(PerPage::OneHundredTwenty),
            other => Err(FilterError::InvalidPerPage(other)),
        }
    }
}

/// Search and ordering parameters for a listing walk. Together with a page
/// number this fully determines a listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    search_term: Option<String>,
    locale: Locale,
    sort: Option<Sort>,
    per_page: PerPage,
}

impl Filter {
    /// Blank search terms are normalized to `None`.
    #[must_use]
    pub fn new(
        search_term: Option<&str>,
        locale: Locale,
        sort: Option<Sort>,
        per_page: PerPage,
    ) -> Self {
        let search_term = search_term
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Self {
            search_term,
            locale,
            sort,
            per_page,
        }
    }

    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn sort(&self) -> Option<Sort> {
        self.sort
    }

    #[must_use]
    pub fn per_page(&self) -> PerPage {
        self.per_page
    }
}

/// Inclusive, 1-based page span for a walk.
///
/// `end == None` means "use the detected page limit". `forced` ignores the
/// detected limit and keeps walking until a page has no images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: Option<u32>,
    forced: bool,
}

impl PageRange {
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidStartPage`] for `start == 0` and
    /// [`FilterError::InvalidEndPage`] when `end` is before `start`.
    pub fn new(start: u32, end: Option<u32>, forced: bool) -> Result<Self, FilterError> {
        if start == 0 {
            return Err(FilterError::InvalidStartPage);
        }
        if let Some(end) = end {
            if end < start {
                return Err(FilterError::InvalidEndPage { start, end });
            }
        }
        Ok(Self { start, end, forced })
    }

    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<u32> {
        self.end
    }

    #[must_use]
    pub fn forced(&self) -> bool {
        self.forced
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
            forced: false,
        }
    }
}

/// One row of a lookup table: a card name and its printed number as it
/// appears in the source sheet (e.g. `"019 / 184"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub name: String,
    pub raw_number: String,
}

impl CardRow {
    #[must_use]
    pub fn new(name: impl Into<String>, raw_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_number: raw_number.into(),
        }
    }

    /// Leading run of ASCII digits of the trimmed number, so `"019 / 184"`
    /// becomes `"019"`. Empty when the number does not start with a digit.
    #[must_use]
    pub fn normalized_number(&self) -> &str {
        let trimmed = self.raw_number.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    }

    /// Search text sent to the listing: the name, followed by the normalized
    /// number when there is one.
    #[must_use]
    pub fn search_query(&self) -> String {
        let name = self.name.trim();
        match self.normalized_number() {
            "" => name.to_owned(),
            number => format!("{name} {number}"),
        }
    }
}

impl std::fmt::Display for CardRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.raw_number)
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
