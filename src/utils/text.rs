/// `$` plus two decimals, as shown in the tooltip header and OHLC rows.
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Signed percentage with two decimals.
pub fn format_change(change_percent: f64) -> String {
    if change_percent > 0.0 {
        format!("+{:.2}%", change_percent)
    } else {
        format!("{:.2}%", change_percent)
    }
}
