//! Card detail page extraction.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::markup::{self, collapsed_text, selector};
use crate::rate_limit::Pacer;

static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("#card-info-title a"));
static CARD_TYPE: LazyLock<Selector> = LazyLock::new(|| selector(".card-type-container"));
static ENERGY_TYPE: LazyLock<Selector> = LazyLock::new(|| selector(".energy-type-symbol[title]"));
static SET_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("#card-info-footer-item-text-part-expansion-name"));
static SET_CODE: LazyLock<Selector> =
    LazyLock::new(|| selector("#card-info-footer-item-text-part-expansion-code"));
static FOOTER_PART: LazyLock<Selector> =
    LazyLock::new(|| selector(".card-info-footer-item-text-part"));
static RARITY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a.card-info-footer-item-text-part[href*="rarities="]"#));
static ILLUSTRATOR_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r#".card-info-footer-item a[href*="illustrator="]"#));
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static PRICE_BUTTON: LazyLock<Selector> =
    LazyLock::new(|| selector("button.card-price-details-modal-show-button"));

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*/\s*\d+").expect("valid regex"));
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+(?:\.\d+)?").expect("valid regex"));

/// Fields read from one card detail page. Anything the page does not show
/// is left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardDetails {
    pub url: String,
    pub image_url: String,
    pub name: String,
    pub card_type: String,
    pub pokemon_type: String,
    pub set_name: String,
    pub set_code: String,
    pub card_number: String,
    pub rarity: String,
    pub illustrator: String,
    pub price: String,
}

/// Fetches `url` and extracts its [`CardDetails`].
///
/// # Errors
///
/// Propagates the fetch error; extraction itself cannot fail.
pub async fn fetch_card_details<F: PageFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<CardDetails, ScraperError> {
    let body = fetcher.fetch(url).await?;
    Ok(extract_card_details(url, &body))
}

/// Result of fetching a batch of detail pages.
#[derive(Debug, Default)]
pub struct DetailsBatch {
    pub cards: Vec<CardDetails>,
    pub failures: Vec<(String, ScraperError)>,
}

/// Fetches every detail page in `urls` one after another, pausing
/// `inter_request_delay_ms` between requests. A failed page is recorded and
/// the batch moves on.
pub async fn fetch_all_card_details<F: PageFetcher>(
    fetcher: &F,
    urls: &[String],
    inter_request_delay_ms: u64,
) -> DetailsBatch {
    let mut pacer = Pacer::new(inter_request_delay_ms);
    let mut batch = DetailsBatch::default();
    for (index, url) in urls.iter().enumerate() {
        pacer.wait().await;
        match fetch_card_details(fetcher, url).await {
            Ok(card) => {
                tracing::debug!(index, %url, name = %card.name, "scraped card details");
                batch.cards.push(card);
            }
            Err(error) => {
                tracing::warn!(index, %url, error = %error, "card detail fetch failed");
                batch.failures.push((url.clone(), error));
            }
        }
    }
    batch
}

#[must_use]
pub fn extract_card_details(url: &str, body: &str) -> CardDetails {
    let doc = markup::parse(body);
    CardDetails {
        url: url.to_owned(),
        image_url: markup::card_image_url(&doc).unwrap_or_default(),
        name: first_text(&doc, &TITLE_LINK),
        card_type: first_text(&doc, &CARD_TYPE),
        pokemon_type: doc
            .select(&ENERGY_TYPE)
            .find_map(|el| el.value().attr("title"))
            .map(|t| t.trim().to_owned())
            .unwrap_or_default(),
        set_name: first_text(&doc, &SET_NAME),
        set_code: first_text(&doc, &SET_CODE),
        card_number: card_number(&doc),
        rarity: rarity(&doc),
        illustrator: illustrator(&doc),
        price: price(&doc),
    }
}

fn first_text(doc: &Html, sel: &Selector) -> String {
    doc.select(sel).next().map(collapsed_text).unwrap_or_default()
}

fn card_number(doc: &Html) -> String {
    doc.select(&FOOTER_PART)
        .map(collapsed_text)
        .find(|text| CARD_NUMBER_RE.is_match(text))
        .unwrap_or_default()
}

fn rarity(doc: &Html) -> String {
    if let Some(link) = doc.select(&RARITY_LINK).next() {
        return collapsed_text(link);
    }
    doc.select(&FOOTER_PART)
        .map(collapsed_text)
        .find(|text| text.contains("Rarity"))
        .map(|text| text.replace("Rarity:", "").trim().to_owned())
        .unwrap_or_default()
}

fn illustrator(doc: &Html) -> String {
    if let Some(link) = doc.select(&ILLUSTRATOR_LINK).next() {
        return collapsed_text(link);
    }
    doc.select(&FOOTER_PART)
        .filter(|part| collapsed_text(*part).contains("Illus"))
        .find_map(|part| part.select(&ANY_LINK).next())
        .map(collapsed_text)
        .unwrap_or_default()
}

fn price(doc: &Html) -> String {
    let Some(button) = doc.select(&PRICE_BUTTON).next() else {
        return String::new();
    };
    let text = collapsed_text(button);
    PRICE_RE
        .find(&text)
        .map_or(text.clone(), |m| m.as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <div id="card-image-container"><img src="https://img.example/charizard.png"></div>
          <h1 id="card-info-title"><a href="/cards/4/charizard">  Charizard </a></h1>
          <div class="card-type-container">Pokémon ·
            Stage 2</div>
          <span class="energy-type-symbol" title="Fire"></span>
          <div class="card-info-footer-item">
            <span id="card-info-footer-item-text-part-expansion-name" class="card-info-footer-item-text-part">Base Set</span>
            <span id="card-info-footer-item-text-part-expansion-code" class="card-info-footer-item-text-part">BS</span>
            <span class="card-info-footer-item-text-part">4/102</span>
            <a class="card-info-footer-item-text-part" href="/cards?rarities=holo">Holo Rare</a>
          </div>
          <div class="card-info-footer-item">
            <div class="card-info-footer-item-title">Illustrators</div>
            <a href="/cards?illustrator=mitsuhiro-arita">Mitsuhiro Arita</a>
          </div>
          <button class="card-price-details-modal-show-button">From $312.50 ▾</button>
        </body></html>"#;

    struct FakeSite;

    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
            if url.ends_with("/gone") {
                return Err(ScraperError::NotFound {
                    url: url.to_owned(),
                });
            }
            Ok(DETAIL_PAGE.to_owned())
        }
    }

    #[tokio::test]
    async fn batch_keeps_going_after_a_failed_card() {
        let urls = vec![
            "https://example.com/cards/1".to_owned(),
            "https://example.com/gone".to_owned(),
            "https://example.com/cards/3".to_owned(),
        ];

        let batch = fetch_all_card_details(&FakeSite, &urls, 0).await;

        let fetched: Vec<&str> = batch.cards.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            fetched,
            ["https://example.com/cards/1", "https://example.com/cards/3"]
        );
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].0, "https://example.com/gone");
        assert!(matches!(batch.failures[0].1, ScraperError::NotFound { .. }));
    }

    #[test]
    fn extracts_all_fields() {
        let details = extract_card_details("https://example.com/cards/4", DETAIL_PAGE);
        assert_eq!(
            details,
            CardDetails {
                url: "https://example.com/cards/4".to_owned(),
                image_url: "https://img.example/charizard.png".to_owned(),
                name: "Charizard".to_owned(),
                card_type: "Pokémon · Stage 2".to_owned(),
                pokemon_type: "Fire".to_owned(),
                set_name: "Base Set".to_owned(),
                set_code: "BS".to_owned(),
                card_number: "4/102".to_owned(),
                rarity: "Holo Rare".to_owned(),
                illustrator: "Mitsuhiro Arita".to_owned(),
                price: "$312.50".to_owned(),
            }
        );
    }

    #[test]
    fn missing_fields_are_empty() {
        let details = extract_card_details("u", "<html><body></body></html>");
        assert_eq!(
            details,
            CardDetails {
                url: "u".to_owned(),
                ..CardDetails::default()
            }
        );
    }

    #[test]
    fn rarity_falls_back_to_labelled_footer_part() {
        let page = r#"<span class="card-info-footer-item-text-part">Rarity: Common</span>"#;
        assert_eq!(extract_card_details("u", page).rarity, "Common");
    }

    #[test]
    fn illustrator_falls_back_to_labelled_footer_part() {
        let page = r#"<span class="card-info-footer-item-text-part">Illus. <a href="/x">Ken Sugimori</a></span>"#;
        assert_eq!(extract_card_details("u", page).illustrator, "Ken Sugimori");
    }

    #[test]
    fn price_without_dollar_amount_keeps_text() {
        let page = r#"<button class="card-price-details-modal-show-button"> No price </button>"#;
        assert_eq!(extract_card_details("u", page).price, "No price");
    }
}
