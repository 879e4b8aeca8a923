use reqwest::header::HeaderName;

use crate::error::{AppError, Result};
use crate::fetch::request::{render_template, TemplateValues};

use super::{Config, RequestConfig};

/// Validate a loaded configuration, collecting every problem before failing.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    let provider = &config.provider;
    if provider.base_url.trim().is_empty() {
        issues.push("provider.base_url must not be empty".to_string());
    } else if !provider.base_url.starts_with("http://")
        && !provider.base_url.starts_with("https://")
    {
        issues.push(format!(
            "provider.base_url must be an http(s) URL, found `{}`",
            provider.base_url
        ));
    }

    let probe = TemplateValues {
        base: &provider.base_url,
        symbol: "SYMBOL",
        interval: "1d",
        range: "1d",
    };
    if let Err(err) = render_template(&provider.url_template, &probe) {
        issues.push(format!("provider.url_template is invalid: {err}"));
    } else if !provider.url_template.contains("{symbol}") {
        issues.push("provider.url_template must contain a {symbol} placeholder".to_string());
    }

    validate_request("provider.quote", &provider.quote, &mut issues);
    validate_request("provider.history", &provider.history, &mut issues);

    for key in provider.headers.keys() {
        if HeaderName::from_bytes(key.as_bytes()).is_err() {
            issues.push(format!("provider.headers contains invalid name `{key}`"));
        }
    }

    if provider.timeout.is_zero() {
        issues.push("provider.timeout_ms must be greater than zero".to_string());
    }
    if config.cache.freshness.is_zero() {
        issues.push("cache.freshness_ms must be greater than zero".to_string());
    }
    if config.scanner.debounce.is_zero() {
        issues.push("scanner.debounce_ms must be greater than zero".to_string());
    }

    for word in &config.scanner.extra_stop_words {
        if !word.chars().all(|c| c.is_ascii_uppercase()) {
            issues.push(format!(
                "scanner.extra_stop_words entry `{word}` must be ASCII letters only"
            ));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "invalid configuration: {}",
            issues.join("; ")
        )))
    }
}

fn validate_request(label: &str, request: &RequestConfig, issues: &mut Vec<String>) {
    if request.interval.trim().is_empty() {
        issues.push(format!("{label}.interval must not be empty"));
    }
    if request.range.trim().is_empty() {
        issues.push(format!("{label}.range must not be empty"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builtin_config_is_valid() {
        validate_config(&Config::builtin()).expect("builtin config should be valid");
    }

    #[test]
    fn rejects_unknown_template_placeholder() {
        let mut config = Config::builtin();
        config.provider.url_template = "{base}/chart/{symbol}?period={period}".to_string();

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(
            message.contains("period"),
            "unexpected error message: {message}"
        );
    }

    #[test]
    fn reports_every_issue() {
        let mut config = Config::builtin();
        config.provider.base_url = "ftp://quotes".to_string();
        config.cache.freshness = Duration::ZERO;
        config.scanner.debounce = Duration::ZERO;

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains("http(s)"), "unexpected error message: {message}");
        assert!(message.contains("cache.freshness_ms"), "unexpected error message: {message}");
        assert!(message.contains("scanner.debounce_ms"), "unexpected error message: {message}");
    }
}
