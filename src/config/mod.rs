use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_FRESHNESS;
use crate::error::Result;
use crate::scanner::DEFAULT_DEBOUNCE;

pub mod loader;
pub mod validator;

pub use loader::load_config;

pub const DEFAULT_API_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance";
pub const DEFAULT_URL_TEMPLATE: &str = "{base}/chart/{symbol}?interval={interval}&range={range}";
/// Overrides `provider.base_url` when set.
pub const API_BASE_ENV: &str = "HOVERQUOTE_API_BASE";

/// Interval/range pair sent to the chart endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub interval: String,
    pub range: String,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub url_template: String,
    pub headers: HashMap<String, String>,
    /// Day-range request: price, OHLC, volume and identity fields.
    pub quote: RequestConfig,
    /// Finer-grained request feeding the sparkline.
    pub history: RequestConfig,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub freshness: Duration,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub debounce: Duration,
    pub extra_stop_words: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub scanner: ScannerConfig,
}

impl Config {
    pub fn builtin() -> Self {
        let headers = HashMap::from([
            ("Accept".to_string(), "application/json".to_string()),
            (
                "Origin".to_string(),
                "https://finance.yahoo.com".to_string(),
            ),
        ]);

        Config {
            provider: ProviderConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
                headers,
                quote: RequestConfig {
                    interval: "1d".to_string(),
                    range: "1d".to_string(),
                },
                history: RequestConfig {
                    interval: "5m".to_string(),
                    range: "1d".to_string(),
                },
                timeout: Duration::from_secs(10),
            },
            cache: CacheConfig {
                freshness: DEFAULT_FRESHNESS,
            },
            scanner: ScannerConfig {
                debounce: DEFAULT_DEBOUNCE,
                extra_stop_words: Vec::new(),
            },
        }
    }
}

impl Config {
    /// Shorthand for [`load_config`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        load_config(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
