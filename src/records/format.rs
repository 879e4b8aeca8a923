const MARKET_CAP_SCALES: &[(f64, &str)] = &[(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Render a raw market capitalisation as `$<value><suffix>` with two decimals.
pub fn format_market_cap(market_cap: f64) -> String {
    for (threshold, suffix) in MARKET_CAP_SCALES {
        if market_cap >= *threshold {
            return format!("${:.2}{}", market_cap / threshold, suffix);
        }
    }
    format!("${:.2}", market_cap)
}

/// Round to an integer and insert `,` between thousands groups.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_cap_uses_largest_threshold() {
        assert_eq!(format_market_cap(2_500_000_000_000.0), "$2.50T");
        assert_eq!(format_market_cap(3_400_000_000.0), "$3.40B");
        assert_eq!(format_market_cap(12_340_000.0), "$12.34M");
        assert_eq!(format_market_cap(900_000.0), "$900.00K");
        assert_eq!(format_market_cap(500.0), "$500.00");
    }

    #[test]
    fn groups_volume_digits() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(52_431_987.4), "52,431,987");
        assert_eq!(group_thousands(-1_234_567.0), "-1,234,567");
    }
}
