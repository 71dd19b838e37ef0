use chrono::Local;
use tcgimg_core::AppConfig;
use tcgimg_scraper::{ListingWalker, WalkTermination};

use crate::output;
use crate::site;
use crate::ListingArgs;

/// Walks the listing pages selected by `args` and writes every image URL.
///
/// # Errors
///
/// Returns an error for invalid arguments, I/O failures, and when a page
/// fetch ended the walk early. In the last case the URLs collected before
/// the failure are still written.
pub(crate) async fn run_listing(config: &AppConfig, args: &ListingArgs) -> anyhow::Result<()> {
    let filter = args.filter();
    let range = args.page_range()?;
    let (client, urls) = site::connect(config)?;

    let path = output::resolve_output_path(args.output.as_deref(), &config.output_dir, || {
        output::timestamped_filename(
            &output::slug(filter.search_term()),
            filter.locale(),
            Local::now().naive_local(),
            "txt",
        )
    });
    tracing::info!(
        search = ?filter.search_term(),
        locale = %filter.locale(),
        per_page = filter.per_page().get(),
        start = range.start(),
        end = ?range.end(),
        forced = range.forced(),
        output = %path.display(),
        "starting listing walk"
    );

    let walker = ListingWalker::new(&client, &urls, config.scraper_inter_request_delay_ms);
    let outcome = walker.walk(&filter, range).await;
    let collection = &outcome.collection;

    let out = output::create(&path)?;
    output::write_url_lines(out, collection.urls().iter().map(String::as_str))?;

    println!(
        "Scraped {} image URLs from {} pages and saved to {}",
        collection.total_urls(),
        collection.pages_walked(),
        path.display()
    );
    if !collection.empty_pages().is_empty() {
        println!("Pages without cards: {:?}", collection.empty_pages());
    }

    match outcome.termination {
        WalkTermination::FetchFailed { page, error } => Err(anyhow::anyhow!(
            "listing walk stopped at page {page}: {error} (partial results kept)"
        )),
        WalkTermination::NoPagesDetected => {
            println!("No result pages found for this search");
            Ok(())
        }
        WalkTermination::StartBeyondLimit { start, limit } => {
            println!("Start page {start} is past the last page ({limit})");
            Ok(())
        }
        WalkTermination::Exhausted { .. } | WalkTermination::EmptyPage { .. } => Ok(()),
    }
}
