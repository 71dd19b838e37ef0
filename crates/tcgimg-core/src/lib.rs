pub mod app_config;
pub mod config;
pub mod filter;

pub use app_config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{
    CardRow, Filter, FilterError, Locale, PageRange, PerPage, Sort, SortDirection, SortField,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
