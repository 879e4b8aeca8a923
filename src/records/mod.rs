use serde::{Deserialize, Serialize};

pub mod format;

pub use format::{format_market_cap, group_thousands};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Validated, display-ready quote for one symbol.
pub struct QuoteRecord {
    pub symbol: String,
    pub display_name: String,
    pub price: f64,
    pub change_percent: f64,
    pub currency: String,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
    pub exchange: String,
    pub sparkline: Vec<f64>,
    #[serde(default)]
    pub events: Vec<MarketEvent>,
}

/// Corporate action shown under the sparkline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    #[serde(rename = "type")]
    pub kind: String,
    /// Unix timestamp in seconds.
    pub date: i64,
}
