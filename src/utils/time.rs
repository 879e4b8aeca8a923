use chrono::{DateTime, Local, Utc};

/// Calendar date (`M/D/YYYY`, UTC) of a unix timestamp; empty when out of range.
pub fn format_event_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|date| date.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

pub fn current_human_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_event_dates() {
        assert_eq!(format_event_date(1_700_000_000), "11/14/2023");
        assert_eq!(format_event_date(i64::MAX), "");
    }
}
