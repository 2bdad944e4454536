use ratatui::symbols;

/// Horizontal bar like `████████░░░░` for `value` out of `max`.
#[must_use]
pub fn ascii_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || !value.is_finite() {
        return "░".repeat(width);
    }

    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// One bar glyph per value, e.g. `▁▂▃▅▇▅▃▂▁`. Non-positive values are blank.
#[must_use]
pub fn mini_bar_chart(values: &[i64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    if max <= 0 {
        return " ".repeat(values.len());
    }

    let bars = [
        symbols::bar::ONE_EIGHTH,
        symbols::bar::ONE_QUARTER,
        symbols::bar::THREE_EIGHTHS,
        symbols::bar::HALF,
        symbols::bar::FIVE_EIGHTHS,
        symbols::bar::THREE_QUARTERS,
        symbols::bar::SEVEN_EIGHTHS,
        symbols::bar::FULL,
    ];

    values
        .iter()
        .map(|&v| {
            if v <= 0 {
                " "
            } else {
                let index = ((v as f64 / max as f64) * 7.0) as usize;
                bars[index.min(7)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bar_fills_proportionally() {
        assert_eq!(ascii_bar(50.0, 100.0, 4), "██░░");
        assert_eq!(ascii_bar(150.0, 100.0, 2), "██");
        assert_eq!(ascii_bar(10.0, 0.0, 3), "░░░");
    }

    #[test]
    fn mini_chart_scales_to_max() {
        let chart = mini_bar_chart(&[0, 50, 100]);
        assert_eq!(chart.chars().count(), 3);
        assert!(chart.starts_with(' '));
        assert!(chart.ends_with(symbols::bar::FULL));
        assert_eq!(mini_bar_chart(&[0, 0]), "  ");
    }
}
