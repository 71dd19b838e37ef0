use anyhow::Context;
use tcgimg_core::AppConfig;
use tcgimg_scraper::{HtmlClient, ListingUrlBuilder};

/// Builds the HTTP client and URL builder every mode shares.
pub(crate) fn connect(config: &AppConfig) -> anyhow::Result<(HtmlClient, ListingUrlBuilder)> {
    let client = HtmlClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )
    .context("failed to build HTTP client")?;
    let urls = ListingUrlBuilder::new(&config.base_url).context("invalid TCGIMG_BASE_URL")?;
    Ok((client, urls))
}
