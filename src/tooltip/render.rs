use std::fmt::Write as _;

use crate::dom::escape_html;
use crate::records::{group_thousands, QuoteRecord};
use crate::utils::{format_change, format_event_date, format_price};

use super::sparkline::render_sparkline;

pub const LOADING_TEXT: &str = "Loading...";
pub const MISSING_DATA_TEXT: &str = "Missing required data";

pub fn render_loading_html() -> String {
    format!("<div class=\"hoverquote-loading\">{LOADING_TEXT}</div>")
}

pub fn render_error_html(message: &str, symbol: &str) -> String {
    format!(
        "<div class=\"hoverquote-error\"><div>{}</div><div class=\"hoverquote-symbol\">{}</div></div>",
        escape_html(message),
        escape_html(symbol)
    )
}

fn has_required_fields(record: &QuoteRecord) -> bool {
    !record.symbol.trim().is_empty() && record.price.is_finite()
}

fn format_volume(volume: f64) -> String {
    if volume > 0.0 {
        group_thousands(volume)
    } else {
        "N/A".to_string()
    }
}

/// Full tooltip body for a resolved quote.
pub fn render_quote_html(record: &QuoteRecord) -> String {
    if !has_required_fields(record) {
        let symbol = record.symbol.trim();
        return render_error_html(MISSING_DATA_TEXT, if symbol.is_empty() { "?" } else { symbol });
    }

    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"hoverquote-header\"><span class=\"hoverquote-symbol\">{}</span>\
         <span class=\"hoverquote-price\">{}</span>",
        escape_html(&record.symbol),
        format_price(record.price)
    );
    if record.change_percent.is_finite() {
        let direction = if record.change_percent >= 0.0 { "up" } else { "down" };
        let _ = write!(
            html,
            "<span class=\"hoverquote-change {direction}\">{}</span>",
            format_change(record.change_percent)
        );
    }
    html.push_str("</div>");

    if !record.display_name.is_empty() && record.display_name != record.symbol {
        let _ = write!(
            html,
            "<div class=\"hoverquote-name\">{}</div>",
            escape_html(&record.display_name)
        );
    }

    let mut rows = vec![
        ("Open", format_price(record.open)),
        ("High", format_price(record.high)),
        ("Low", format_price(record.low)),
    ];
    if let Some(previous_close) = record.previous_close {
        rows.push(("Prev Close", format_price(previous_close)));
    }
    rows.push(("Volume", format_volume(record.volume)));
    if let Some(market_cap) = &record.market_cap {
        rows.push(("Market Cap", market_cap.clone()));
    }
    if !record.currency.is_empty() {
        rows.push(("Currency", record.currency.clone()));
    }

    html.push_str("<table class=\"hoverquote-details\">");
    for (label, value) in rows {
        let _ = write!(
            html,
            "<tr><th>{label}</th><td>{}</td></tr>",
            escape_html(&value)
        );
    }
    html.push_str("</table>");

    let sparkline = render_sparkline(&record.sparkline);
    if !sparkline.is_empty() {
        let _ = write!(html, "<div class=\"hoverquote-sparkline\">{sparkline}</div>");
    }

    if !record.events.is_empty() {
        html.push_str("<ul class=\"hoverquote-events\">");
        for event in &record.events {
            let _ = write!(
                html,
                "<li>{}: {}</li>",
                escape_html(&event.kind),
                format_event_date(event.date)
            );
        }
        html.push_str("</ul>");
    }

    html
}

/// Plain-text rendition for terminals.
pub fn render_quote_text(record: &QuoteRecord) -> String {
    if !has_required_fields(record) {
        return format!("{}: {MISSING_DATA_TEXT}", record.symbol);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        record.symbol,
        format_price(record.price),
        format_change(record.change_percent)
    );
    if !record.display_name.is_empty() {
        let _ = writeln!(out, "  {}", record.display_name);
    }
    let _ = writeln!(
        out,
        "  Open {}  High {}  Low {}",
        format_price(record.open),
        format_price(record.high),
        format_price(record.low)
    );
    if let Some(previous_close) = record.previous_close {
        let _ = writeln!(out, "  Prev Close {}", format_price(previous_close));
    }
    let _ = writeln!(out, "  Volume {}", format_volume(record.volume));
    if let Some(market_cap) = &record.market_cap {
        let _ = writeln!(out, "  Market Cap {market_cap}");
    }
    if !record.currency.is_empty() {
        let _ = writeln!(out, "  Currency {}", record.currency);
    }
    for event in &record.events {
        let _ = writeln!(out, "  {} {}", event.kind, format_event_date(event.date));
    }
    out.trim_end().to_string()
}
