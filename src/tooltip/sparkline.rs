/// Height of the sparkline's coordinate space; width is the number of points.
pub const SPARKLINE_HEIGHT: f64 = 100.0;

/// Map prices onto `(index, y)` with the series maximum at y = 0 and the minimum at y = 100.
///
/// A flat series has no range to normalise against and sits on the midline.
pub fn sparkline_points(values: &[f64]) -> Vec<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let y = if span > 0.0 {
                SPARKLINE_HEIGHT - (value - min) / span * SPARKLINE_HEIGHT
            } else {
                SPARKLINE_HEIGHT / 2.0
            };
            (idx as f64, y)
        })
        .collect()
}

/// Inline SVG polyline; empty input renders nothing.
pub fn render_sparkline(values: &[f64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let points = sparkline_points(values)
        .into_iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "<svg viewBox=\"0 0 {} {}\" preserveAspectRatio=\"none\">\
         <polyline points=\"{}\" fill=\"none\" stroke=\"currentColor\"/></svg>",
        values.len(),
        SPARKLINE_HEIGHT,
        points
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_against_own_range() {
        let points = sparkline_points(&[10.0, 15.0, 20.0]);
        assert_eq!(points, vec![(0.0, 100.0), (1.0, 50.0), (2.0, 0.0)]);
    }

    #[test]
    fn flat_series_sits_on_midline() {
        let points = sparkline_points(&[7.0, 7.0]);
        assert_eq!(points, vec![(0.0, 50.0), (1.0, 50.0)]);
    }

    #[test]
    fn empty_series_renders_nothing() {
        assert!(sparkline_points(&[]).is_empty());
        assert_eq!(render_sparkline(&[]), "");
    }

    #[test]
    fn svg_width_matches_point_count() {
        let svg = render_sparkline(&[1.0, 3.0, 2.0, 5.0]);
        assert!(svg.starts_with("<svg viewBox=\"0 0 4 100\""), "unexpected svg: {svg}");
        assert!(
            svg.contains("points=\"0,100 1,50 2,75 3,0\""),
            "unexpected svg: {svg}"
        );
    }
}
