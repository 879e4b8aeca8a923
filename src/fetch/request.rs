use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{ProviderConfig, RequestConfig};
use crate::error::{AppError, Context, QuoteError, Result};

use super::FetchResult;

/// Substitution values for the chart URL template.
pub struct TemplateValues<'a> {
    pub base: &'a str,
    pub symbol: &'a str,
    pub interval: &'a str,
    pub range: &'a str,
}

impl TemplateValues<'_> {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "base" => Some(self.base),
            "symbol" => Some(self.symbol),
            "interval" => Some(self.interval),
            "range" => Some(self.range),
            _ => None,
        }
    }
}

/// Resolve the request target for one symbol against the configured template.
pub fn request_target(
    provider: &ProviderConfig,
    request: &RequestConfig,
    symbol: &str,
) -> FetchResult<String> {
    let values = TemplateValues {
        base: &provider.base_url,
        symbol,
        interval: &request.interval,
        range: &request.range,
    };
    render_template(&provider.url_template, &values)
}

/// Replace every `{key}` in `template`. Unknown or unterminated placeholders are
/// configuration faults and surface as validation errors.
pub fn render_template(template: &str, values: &TemplateValues<'_>) -> FetchResult<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            QuoteError::validation(format!(
                "Unterminated placeholder in URL template: `{{{after}`"
            ))
        })?;

        let key = &after[..close];
        let value = values.lookup(key).ok_or_else(|| {
            QuoteError::validation(format!("Unknown placeholder `{{{key}}}` in URL template"))
        })?;
        rendered.push_str(value);
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Static request headers sent with every quote request.
pub fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name `{name}`"))?;
            let value = HeaderValue::from_str(value.trim())
                .with_context(|| format!("Invalid value for header `{name}`"))?;
            Ok::<_, AppError>((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn values() -> TemplateValues<'static> {
        TemplateValues {
            base: "http://x",
            symbol: "MSFT",
            interval: "1d",
            range: "1d",
        }
    }

    #[test]
    fn renders_quote_and_history_targets() {
        let config = Config::builtin();
        let quote = request_target(&config.provider, &config.provider.quote, "AAPL")
            .expect("render quote target");
        let history = request_target(&config.provider, &config.provider.history, "AAPL")
            .expect("render history target");

        assert_eq!(
            quote,
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?interval=1d&range=1d"
        );
        assert_eq!(
            history,
            "https://query1.finance.yahoo.com/v8/finance/chart/AAPL?interval=5m&range=1d"
        );
    }

    #[test]
    fn rejects_unterminated_placeholder() {
        let err = render_template("{base}/chart/{symbol", &values()).expect_err("should fail");
        assert!(err.is_validation());
        assert!(err.to_string().contains("Unterminated"), "unexpected: {err}");
    }

    #[test]
    fn rejects_unknown_and_empty_placeholders() {
        let err = render_template("{base}/{token}", &values()).expect_err("unknown key");
        assert!(err.to_string().contains("`{token}`"), "unexpected: {err}");

        let err = render_template("{base}/{}", &values()).expect_err("empty key");
        assert!(err.is_validation(), "unexpected: {err}");
    }

    #[test]
    fn builds_static_headers() {
        let headers = build_headers(&Config::builtin().provider.headers).expect("valid headers");
        assert_eq!(headers.get("accept").map(|v| v.as_bytes()), Some(&b"application/json"[..]));

        let bad = HashMap::from([("bad header".to_string(), "x".to_string())]);
        let err = build_headers(&bad).expect_err("space in header name");
        assert!(err.to_string().contains("bad header"), "unexpected: {err}");
    }
}
