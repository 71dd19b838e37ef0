use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use tcgimg_core::AppConfig;
use tcgimg_scraper::{
    fetch_all_card_details, CardDetails, ListingWalker, PageFetcher, PageSink, WalkTermination,
};

use crate::output;
use crate::site;
use crate::{DetailsArgs, DetailsFormat};

/// Walks listing pages and scrapes the cards linked from each page before
/// moving to the next one. The output file is rewritten after every page, so
/// an interrupted run leaves everything scraped so far on disk.
///
/// # Errors
///
/// Returns an error for invalid arguments, I/O failures, and when a listing
/// fetch ended the walk early. Cards collected before that are still written.
pub(crate) async fn run_details(config: &AppConfig, args: &DetailsArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    let filter = args.filter();
    let range = args.page_range()?;
    let (client, urls) = site::connect(config)?;

    let path = output::resolve_output_path(args.output.as_deref(), &config.output_dir, || {
        output::timestamped_filename(
            "cards_data",
            filter.locale(),
            Local::now().naive_local(),
            args.format.extension(),
        )
    });

    let delay_ms = config.scraper_inter_request_delay_ms;
    let walker = ListingWalker::new(&client, &urls, delay_ms);
    let mut pages = PageByPage::new(&client, delay_ms, |cards: &[CardDetails]| {
        save_cards(&path, args.format, cards)
    });
    let outcome = walker.walk_detail_links_into(&filter, range, &mut pages).await;
    let (cards, failed) = pages.into_parts();
    save_cards(&path, args.format, &cards)?;

    println!("Pages walked: {}", outcome.collection.pages_walked());
    println!("Cards scraped: {}", cards.len());
    println!("Cards failed: {failed}");
    println!("Elapsed: {}", format_elapsed(started.elapsed()));
    println!("Saved to {}", path.display());

    if let WalkTermination::FetchFailed { page, error } = outcome.termination {
        anyhow::bail!("listing walk stopped at page {page}: {error} (partial results kept)");
    }
    Ok(())
}

/// Fetches the cards of each walked listing page and hands the running
/// total to `save`.
pub(crate) struct PageByPage<'a, F, S> {
    fetcher: &'a F,
    delay_ms: u64,
    save: S,
    cards: Vec<CardDetails>,
    failed: usize,
}

impl<'a, F, S> PageByPage<'a, F, S>
where
    F: PageFetcher,
    S: FnMut(&[CardDetails]) -> anyhow::Result<()>,
{
    pub(crate) fn new(fetcher: &'a F, delay_ms: u64, save: S) -> Self {
        Self {
            fetcher,
            delay_ms,
            save,
            cards: Vec::new(),
            failed: 0,
        }
    }

    /// Cards scraped so far and the number of card pages that failed.
    pub(crate) fn into_parts(self) -> (Vec<CardDetails>, usize) {
        (self.cards, self.failed)
    }
}

impl<F, S> PageSink for PageByPage<'_, F, S>
where
    F: PageFetcher,
    S: FnMut(&[CardDetails]) -> anyhow::Result<()>,
{
    async fn page_done(&mut self, page: u32, links: &[String]) {
        if links.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        let batch = fetch_all_card_details(self.fetcher, links, self.delay_ms).await;
        self.failed += batch.failures.len();
        self.cards.extend(batch.cards);
        tracing::info!(
            page,
            cards = self.cards.len(),
            failed = self.failed,
            "scraped cards of listing page"
        );
        if let Err(error) = (self.save)(&self.cards) {
            tracing::warn!(page, error = %error, "could not save cards after page");
        }
    }
}

fn save_cards(path: &Path, format: DetailsFormat, cards: &[CardDetails]) -> anyhow::Result<()> {
    let out = output::create(path)?;
    match format {
        DetailsFormat::Csv => write_csv(out, cards),
        DetailsFormat::Json => write_json(out, cards),
    }
}

/// CSV with a header row named after the [`CardDetails`] fields.
pub(crate) fn write_csv<W: Write>(out: W, cards: &[CardDetails]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for card in cards {
        writer.serialize(card)?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_json<W: Write>(mut out: W, cards: &[CardDetails]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, cards)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// `42.0 seconds`, `3.5 minutes` or `1.2 hours`.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1} seconds")
    } else if secs < 3600.0 {
        format!("{:.1} minutes", secs / 60.0)
    } else {
        format!("{:.1} hours", secs / 3600.0)
    }
}
