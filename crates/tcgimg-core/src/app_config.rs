use std::path::PathBuf;

/// Site origin the listing and detail paths are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://www.tcgcollector.com";

/// Desktop browser identity sent as the `User-Agent` of every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub log_level: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
}
