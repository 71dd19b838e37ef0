use std::sync::Mutex;

use reqwest::Url;

use crate::error::ScraperError;

use super::*;

/// In-memory catalog answering searches (`/cards?cardSearch=...`) and detail
/// pages (`/cards/<id>/<slug>`), recording every requested URL.
struct FakeCatalog<R> {
    respond: R,
    requested: Mutex<Vec<String>>,
}

impl<R> FakeCatalog<R>
where
    R: Fn(&Url) -> Result<String, ScraperError>,
{
    fn new(respond: R) -> Self {
        Self {
            respond,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl<R> PageFetcher for FakeCatalog<R>
where
    R: Fn(&Url) -> Result<String, ScraperError>,
{
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.requested.lock().unwrap().push(url.to_owned());
        (self.respond)(&Url::parse(url).unwrap())
    }
}

fn search_term(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == "cardSearch")
        .map(|(_, v)| v.into_owned())
}

fn results(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<a class="card-image-grid-item-link" href="{href}">
                     <img class="card-image-grid-item-image" src="https://img.example/thumb{href}.png">
                   </a>"#
            )
        })
        .collect()
}

fn detail(image: &str) -> String {
    format!(r#"<div id="card-image-container"><img src="{image}"></div>"#)
}

fn not_found(url: &Url) -> ScraperError {
    ScraperError::NotFound {
        url: url.to_string(),
    }
}

fn builder() -> ListingUrlBuilder {
    ListingUrlBuilder::new("https://www.tcgcollector.com").unwrap()
}

#[tokio::test]
async fn picks_first_result_and_reads_detail_image() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => Ok(results(&["/cards/1/pikachu", "/cards/2/pikachu-alt"])),
        "/cards/1/pikachu" => Ok(detail("https://img.example/pikachu-full.png")),
        _ => Err(not_found(url)),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Pikachu", "019 / 184"), Locale::Global)
        .await;

    assert_eq!(
        outcome,
        RowOutcome::Found {
            detail_url: "https://www.tcgcollector.com/cards/1/pikachu".to_owned(),
            image_url: "https://img.example/pikachu-full.png".to_owned(),
        }
    );
    let requested = site.requested();
    assert_eq!(requested.len(), 2);
    assert_eq!(
        search_term(&Url::parse(&requested[0]).unwrap()).as_deref(),
        Some("Pikachu 019")
    );
    assert!(requested[0].contains("cardsPerPage=30"), "got {}", requested[0]);
    assert!(!requested[0].contains("page="), "got {}", requested[0]);
}

#[tokio::test]
async fn japanese_rows_search_the_japanese_catalog() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards/jp" => Ok(results(&["/cards/9/mew"])),
        "/cards/9/mew" => Ok(detail("https://img.example/mew.png")),
        _ => Err(not_found(url)),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Mew", "151"), Locale::Japanese)
        .await;

    assert_eq!(outcome.image_url(), Some("https://img.example/mew.png"));
}

#[tokio::test]
async fn non_numeric_number_searches_by_name_only() {
    let site = FakeCatalog::new(|_| Ok(String::new()));
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    resolver
        .resolve(&CardRow::new("Snorlax", "promo"), Locale::Global)
        .await;

    let requested = site.requested();
    assert_eq!(
        search_term(&Url::parse(&requested[0]).unwrap()).as_deref(),
        Some("Snorlax")
    );
}

#[tokio::test]
async fn zero_results_is_no_matches() {
    let site = FakeCatalog::new(|_| Ok("<p>No cards found</p>".to_owned()));
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Missingno", "0"), Locale::Global)
        .await;

    assert_eq!(
        outcome,
        RowOutcome::NotFound {
            reason: MissReason::NoMatches
        }
    );
    assert_eq!(site.requested().len(), 1);
}

#[tokio::test]
async fn search_fetch_failure_is_distinguishable() {
    let site = FakeCatalog::new(|url| {
        Err(ScraperError::UnexpectedStatus {
            status: 500,
            url: url.to_string(),
        })
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Eevee", "7"), Locale::Global)
        .await;

    assert!(
        matches!(
            outcome,
            RowOutcome::NotFound {
                reason: MissReason::FetchFailed(ref msg)
            } if msg.contains("500")
        ),
        "got {outcome:?}"
    );
}

#[tokio::test]
async fn detail_fetch_failure_is_fetch_failed() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => Ok(results(&["/cards/5/eevee"])),
        _ => Err(not_found(url)),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Eevee", "7"), Locale::Global)
        .await;

    assert!(matches!(
        outcome,
        RowOutcome::NotFound {
            reason: MissReason::FetchFailed(_)
        }
    ));
}

#[tokio::test]
async fn detail_without_image_falls_back_to_thumbnail() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => Ok(results(&["/cards/5/eevee"])),
        _ => Ok("<html><body>no image here</body></html>".to_owned()),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Eevee", "7"), Locale::Global)
        .await;

    assert_eq!(
        outcome.image_url(),
        Some("https://img.example/thumb/cards/5/eevee.png")
    );
}

#[tokio::test]
async fn missing_image_everywhere_is_missing_image() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => Ok(r#"<a class="card-image-grid-item-link" href="/cards/5/eevee">Eevee</a>"#
            .to_owned()),
        _ => Ok(String::new()),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("Eevee", "7"), Locale::Global)
        .await;

    assert_eq!(
        outcome,
        RowOutcome::NotFound {
            reason: MissReason::MissingImage
        }
    );
}

#[tokio::test]
async fn every_row_gets_exactly_one_outcome() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => match search_term(url).as_deref() {
            Some("Pikachu 19") => Ok(results(&["/cards/1/pikachu"])),
            Some("Mew 151") => Ok(results(&["/cards/3/mew"])),
            Some("Ditto 132") => Err(ScraperError::UnexpectedStatus {
                status: 503,
                url: url.to_string(),
            }),
            _ => Ok(String::new()),
        },
        path => Ok(detail(&format!("https://img.example{path}.png"))),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);
    let rows = vec![
        CardRow::new("Pikachu", "19/102"),
        CardRow::new("Missingno", ""),
        CardRow::new("Mew", "151 / 165"),
        CardRow::new("Ditto", "132"),
    ];

    let table = resolver.resolve_all(rows, Locale::Global).await;

    assert_eq!(table.attempted(), 4);
    assert_eq!(table.succeeded(), 2);
    assert_eq!(table.failed(), 2);
    assert_eq!(
        table.found_urls().collect::<Vec<_>>(),
        [
            "https://img.example/cards/1/pikachu.png",
            "https://img.example/cards/3/mew.png",
        ]
    );
    let reasons: Vec<_> = table.failures().map(|(_, reason)| reason.clone()).collect();
    assert_eq!(reasons[0], MissReason::NoMatches);
    assert!(matches!(reasons[1], MissReason::FetchFailed(_)));
}

#[tokio::test]
async fn blank_name_is_a_miss_without_any_request() {
    let site = FakeCatalog::new(|url| Ok(results(&[url.path()])));
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);

    let outcome = resolver
        .resolve(&CardRow::new("   ", "025"), Locale::Global)
        .await;

    assert_eq!(
        outcome,
        RowOutcome::NotFound {
            reason: MissReason::BlankName
        }
    );
    assert!(site.requested().is_empty());
}

#[tokio::test]
async fn blank_name_rows_count_as_failures() {
    let site = FakeCatalog::new(|url| match url.path() {
        "/cards" => Ok(results(&["/cards/9/card"])),
        path => Ok(detail(&format!("https://img.example{path}.png"))),
    });
    let urls = builder();
    let mut resolver = RowResolver::new(&site, &urls, 0);
    let rows = vec![
        CardRow::new("Pikachu", "019 / 184"),
        CardRow::new("", "025"),
        CardRow::new("Mew", "151"),
    ];

    let table = resolver.resolve_all(rows, Locale::Global).await;

    assert_eq!(table.attempted(), 3);
    assert_eq!(table.succeeded(), 2);
    assert_eq!(table.failed(), 1);
    let failures: Vec<_> = table.failures().collect();
    assert_eq!(failures[0].0, &CardRow::new("", "025"));
    assert_eq!(failures[0].1, &MissReason::BlankName);
}
