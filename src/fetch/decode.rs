use std::collections::HashMap;

use serde::Deserialize;

use crate::error::QuoteError;
use crate::records::{format_market_cap, MarketEvent, QuoteRecord};

use super::FetchResult;

/// Minimum number of valid closes needed to draw a line.
pub const MIN_SPARKLINE_POINTS: usize = 2;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<Option<i64>>>,
    indicators: Option<Indicators>,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    currency: Option<String>,
    exchange_name: Option<String>,
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, RawEvent>,
    #[serde(default)]
    splits: HashMap<String, RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    date: i64,
}

/// Everything the day-range request contributes to a [`QuoteRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub display_name: String,
    pub price: f64,
    pub change_percent: f64,
    pub previous_close: Option<f64>,
    pub currency: String,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub market_cap: Option<String>,
    pub exchange: String,
    pub events: Vec<MarketEvent>,
}

impl QuoteSnapshot {
    pub fn into_record(self, sparkline: Vec<f64>) -> QuoteRecord {
        QuoteRecord {
            symbol: self.symbol,
            display_name: self.display_name,
            price: self.price,
            change_percent: self.change_percent,
            currency: self.currency,
            volume: self.volume,
            high: self.high,
            low: self.low,
            open: self.open,
            previous_close: self.previous_close,
            market_cap: self.market_cap,
            exchange: self.exchange,
            sparkline,
            events: self.events,
        }
    }
}

fn first_result(body: &str, label: &str) -> FetchResult<ChartResult> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|err| {
        QuoteError::validation(format!("Invalid {label} data structure: {err}"))
    })?;

    envelope
        .chart
        .and_then(|chart| chart.result)
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| QuoteError::validation(format!("Invalid {label} data structure")))
}

fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series
        .get(index)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}

/// Parse the day-range chart payload into price, change, OHLC and identity fields.
pub fn parse_quote_payload(body: &str) -> FetchResult<QuoteSnapshot> {
    let result = first_result(body, "quote")?;

    let meta = result
        .meta
        .ok_or_else(|| QuoteError::validation("No meta data in quote response"))?;

    let series = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .ok_or_else(|| QuoteError::validation("No quote data in quote response"))?;

    let closes = series.close.unwrap_or_default();
    let (latest, price) = closes
        .iter()
        .enumerate()
        .rev()
        .find_map(|(idx, value)| value.filter(|v| v.is_finite()).map(|v| (idx, v)))
        .ok_or_else(|| QuoteError::validation("Missing or invalid price in quote data"))?;

    let previous = latest
        .checked_sub(1)
        .and_then(|idx| value_at(&closes, idx))
        .or_else(|| value_at(&closes, 0));
    let change_percent = change_percent(price, previous);

    let symbol = meta
        .symbol
        .filter(|symbol| !symbol.trim().is_empty())
        .ok_or_else(|| QuoteError::validation("Missing symbol in quote data"))?;

    if let Some(points) = result.timestamp.as_ref() {
        if points.len() != closes.len() {
            log::warn!(
                "{symbol}: timestamp axis has {} points but close series has {}",
                points.len(),
                closes.len()
            );
        }
    }

    let display_name = meta
        .short_name
        .or(meta.long_name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| symbol.clone());

    Ok(QuoteSnapshot {
        display_name,
        price,
        change_percent,
        previous_close: previous.filter(|value| *value != 0.0),
        currency: meta.currency.unwrap_or_default(),
        volume: value_at(&series.volume, latest)
            .filter(|value| *value >= 0.0)
            .unwrap_or(0.0),
        high: value_at(&series.high, latest).unwrap_or(price),
        low: value_at(&series.low, latest).unwrap_or(price),
        open: value_at(&series.open, latest).unwrap_or(price),
        market_cap: meta
            .market_cap
            .filter(|cap| cap.is_finite() && *cap > 0.0)
            .map(format_market_cap),
        exchange: meta.exchange_name.unwrap_or_default(),
        events: collect_events(result.events.unwrap_or_default()),
        symbol,
    })
}

/// Parse the finer-grained chart payload into sparkline points.
pub fn parse_history_payload(body: &str) -> FetchResult<Vec<f64>> {
    let result = first_result(body, "chart")?;

    let series = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .ok_or_else(|| QuoteError::validation("No quote data in chart response"))?;

    let closes = series
        .close
        .ok_or_else(|| QuoteError::validation("Invalid close prices data"))?;

    let points: Vec<f64> = closes
        .into_iter()
        .flatten()
        .filter(|value| value.is_finite())
        .collect();

    if points.len() < MIN_SPARKLINE_POINTS {
        return Err(QuoteError::validation("Insufficient price data available"));
    }

    Ok(points)
}

/// Percent change from `previous` to `current`; zero when there is no usable baseline.
pub fn change_percent(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(previous) if previous != 0.0 => (current - previous) / previous * 100.0,
        _ => 0.0,
    }
}

fn collect_events(events: ChartEvents) -> Vec<MarketEvent> {
    let dividends = events.dividends.into_values().map(|event| MarketEvent {
        kind: "Dividend".to_string(),
        date: event.date,
    });
    let splits = events.splits.into_values().map(|event| MarketEvent {
        kind: "Split".to_string(),
        date: event.date,
    });

    let mut collected: Vec<MarketEvent> = dividends.chain(splits).collect();
    collected.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.kind.cmp(&b.kind)));
    collected
}
