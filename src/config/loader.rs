use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, Config, RequestConfig, API_BASE_ENV};

/// Build the runtime configuration: builtin defaults, overlaid by the optional JSON file,
/// then by the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
            parse_config(&json)
                .with_context(|| format!("failed to parse config JSON at {}", path.display()))?
        }
        None => Config::builtin(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validator::validate_config(&config)?;

    Ok(config)
}

/// Overlay a JSON document on top of [`Config::builtin`]. Missing keys keep their defaults.
pub fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)?;
    Ok(raw.apply(Config::builtin()))
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(API_BASE_ENV).filter(|value| !value.trim().is_empty()) {
        log::debug!("{API_BASE_ENV} overrides provider base url with {base}");
        config.provider.base_url = base.trim().trim_end_matches('/').to_string();
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    provider: RawProviderConfig,
    cache: RawCacheConfig,
    scanner: RawScannerConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawProviderConfig {
    base_url: Option<String>,
    url_template: Option<String>,
    headers: Option<HashMap<String, String>>,
    quote: Option<RawRequestConfig>,
    history: Option<RawRequestConfig>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawRequestConfig {
    interval: String,
    range: String,
}

impl RawRequestConfig {
    fn into_request_config(self) -> RequestConfig {
        RequestConfig {
            interval: self.interval,
            range: self.range,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawCacheConfig {
    freshness_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawScannerConfig {
    debounce_ms: Option<u64>,
    extra_stop_words: Vec<String>,
}

impl RawConfig {
    fn apply(self, mut config: Config) -> Config {
        let provider = self.provider;
        if let Some(base_url) = provider.base_url {
            config.provider.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(template) = provider.url_template {
            config.provider.url_template = template;
        }
        if let Some(headers) = provider.headers {
            config.provider.headers = headers;
        }
        if let Some(quote) = provider.quote {
            config.provider.quote = quote.into_request_config();
        }
        if let Some(history) = provider.history {
            config.provider.history = history.into_request_config();
        }
        if let Some(timeout_ms) = provider.timeout_ms {
            config.provider.timeout = Duration::from_millis(timeout_ms);
        }

        if let Some(freshness_ms) = self.cache.freshness_ms {
            config.cache.freshness = Duration::from_millis(freshness_ms);
        }

        if let Some(debounce_ms) = self.scanner.debounce_ms {
            config.scanner.debounce = Duration::from_millis(debounce_ms);
        }
        config.scanner.extra_stop_words = self
            .scanner
            .extra_stop_words
            .into_iter()
            .map(|word| word.trim().to_uppercase())
            .filter(|word| !word.is_empty())
            .collect();

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_BASE_URL;

    #[test]
    fn empty_document_keeps_builtin_defaults() {
        let config = parse_config("{}").expect("parse empty config");

        assert_eq!(config.provider.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.provider.quote.interval, "1d");
        assert_eq!(config.provider.history.interval, "5m");
        assert_eq!(config.cache.freshness, Duration::from_secs(30));
        assert_eq!(config.scanner.debounce, Duration::from_millis(250));
    }

    #[test]
    fn overrides_selected_fields() {
        let config = parse_config(
            r#"{
                "provider": {
                    "base_url": "http://localhost:9000/v8/finance/",
                    "history": {"interval": "15m", "range": "5d"},
                    "timeout_ms": 2500
                },
                "cache": {"freshness_ms": 5000},
                "scanner": {"debounce_ms": 100, "extra_stop_words": [" ceo ", "usa"]}
            }"#,
        )
        .expect("parse config");

        assert_eq!(config.provider.base_url, "http://localhost:9000/v8/finance");
        assert_eq!(config.provider.history.range, "5d");
        assert_eq!(config.provider.quote.range, "1d");
        assert_eq!(config.provider.timeout, Duration::from_millis(2500));
        assert_eq!(config.cache.freshness, Duration::from_secs(5));
        assert_eq!(config.scanner.debounce, Duration::from_millis(100));
        assert_eq!(config.scanner.extra_stop_words, vec!["CEO", "USA"]);
    }

    #[test]
    fn environment_overrides_base_url() {
        let mut config = Config::builtin();
        apply_env_overrides(&mut config, |name| {
            (name == API_BASE_ENV).then(|| "http://127.0.0.1:8080/".to_string())
        });
        assert_eq!(config.provider.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_config(r#"{"cache": {"freshness_ms": "soon"}}"#)
            .expect_err("string freshness should not parse");
        assert!(
            err.to_string().contains("invalid type"),
            "unexpected error message: {err}"
        );
    }
}
