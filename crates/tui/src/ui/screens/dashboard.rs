use engine::{CategoryShare, Consumer, TrendPoint};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Paragraph},
};

use crate::{
    app::{AppState, View},
    ui::{
        components::{
            card::{panel, render_in, render_message, render_stat},
            charts::{ascii_bar, mini_bar_chart},
            money::styled_amount,
        },
        theme::{Theme, hex},
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_cards(frame, layout[0], state, theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout[1]);

    render_breakdown(frame, body[0], state, theme);
    render_trend(frame, body[1], state, theme);
}

/// Placeholder text while a view has nothing to show yet.
fn status<T>(view: &View<T>, loading: bool, theme: &Theme) -> Option<Span<'static>> {
    if let Some(err) = &view.error {
        return Some(Span::styled(err.clone(), Style::default().fg(theme.error)));
    }
    if view.data.is_none() {
        let text = if loading { "Loading…" } else { "No data" };
        return Some(Span::styled(text, Style::default().fg(theme.dim)));
    }
    None
}

fn render_cards(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let loading = state.is_loading(Consumer::SummaryCards);
    let Some(totals) = &state.summary.data else {
        let message = status(&state.summary, loading, theme)
            .unwrap_or_else(|| Span::raw(""));
        render_message(frame, area, "Summary", message, theme);
        return;
    };
    let currency = state.currency;

    let figures = [
        ("Income", totals.income),
        ("Expenses", -totals.expenses),
        ("Balance", totals.balance),
    ];
    for (column, (title, amount)) in columns.iter().zip(figures) {
        let value = styled_amount(amount, currency, theme);
        render_stat(frame, *column, title, value, None, theme);
    }

    let caption = match (&state.summary.error, &state.trend.data) {
        (Some(err), _) => Some(err.clone()),
        (None, Some(points)) => {
            let totals: Vec<i64> = points.iter().map(|point| point.total.minor()).collect();
            Some(mini_bar_chart(&totals))
        }
        (None, None) => None,
    };
    let count = Span::styled(totals.count.to_string(), Style::default().fg(theme.text));
    render_stat(frame, columns[3], "Transactions", count, caption.as_deref(), theme);
}

fn render_breakdown(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    const TITLE: &str = "Spending by Category";
    let loading = state.is_loading(Consumer::CategoryBreakdown);
    let Some(shares) = &state.breakdown.data else {
        let message = status(&state.breakdown, loading, theme).unwrap_or_else(|| Span::raw(""));
        render_message(frame, area, TITLE, message, theme);
        return;
    };
    if shares.is_empty() {
        let message = Span::styled("No spending in this period", Style::default().fg(theme.dim));
        render_message(frame, area, TITLE, message, theme);
        return;
    }

    let block = panel(TITLE, false, theme);
    let inner = block.inner(area);
    let mut lines: Vec<Line<'static>> = shares
        .iter()
        .map(|share| share_line(share, state, theme, inner.width))
        .collect();
    if let Some(err) = &state.breakdown.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(theme.error),
        )));
    }
    render_in(frame, area, block, Paragraph::new(lines));
}

fn share_line(share: &CategoryShare, state: &AppState, theme: &Theme, width: u16) -> Line<'static> {
    let bar_width = (width as usize).saturating_sub(44).clamp(4, 24);
    let color = hex(share.color);
    Line::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(
            format!("{:<16.16}", share.name),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            format!("{:>14} ", share.amount.format(state.currency)),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            ascii_bar(share.percent, 100.0, bar_width),
            Style::default().fg(color),
        ),
        Span::styled(
            format!(" {:>5.1}%", share.percent),
            Style::default().fg(theme.text_muted),
        ),
    ])
}

fn render_trend(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    const TITLE: &str = "Spending Trend";
    const BAR_WIDTH: u16 = 6;
    let loading = state.is_loading(Consumer::SpendingTrend);
    let Some(points) = &state.trend.data else {
        let message = status(&state.trend, loading, theme).unwrap_or_else(|| Span::raw(""));
        render_message(frame, area, TITLE, message, theme);
        return;
    };
    if points.is_empty() {
        let message = Span::styled("No transactions in this period", Style::default().fg(theme.dim));
        render_message(frame, area, TITLE, message, theme);
        return;
    }

    let block = panel(TITLE, false, theme);
    let inner = block.inner(area);
    let fits = usize::from(inner.width / (BAR_WIDTH + 1)).max(1);
    let shown = visible_points(points, fits);
    let data: Vec<(&str, u64)> = shown
        .iter()
        .map(|point| (point.label.as_str(), point.total.minor().max(0).unsigned_abs()))
        .collect();

    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(BAR_WIDTH)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(
            Style::default()
                .fg(theme.surface)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(Style::default().fg(theme.dim));
    render_in(frame, area, block, chart);
}

/// The most recent points that fit the chart width.
fn visible_points(points: &[TrendPoint], fits: usize) -> &[TrendPoint] {
    &points[points.len().saturating_sub(fits)..]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::Money;

    use super::*;

    fn point(day: u32) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            label: format!("{day:02} Mar"),
            total: Money::new(i64::from(day) * 100),
        }
    }

    #[test]
    fn trend_keeps_latest_points() {
        let points: Vec<TrendPoint> = (1..=5).map(point).collect();
        let shown = visible_points(&points, 2);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].label, "04 Mar");
        assert_eq!(visible_points(&points, 10).len(), 5);
    }
}
