use engine::{Period, PlatformFilter};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    app::{AppState, DateField, DateInputs, FilterPanel},
    ui::{
        components::{card::panel, centered_rect},
        theme::Theme,
    },
};

/// Preset buttons, the derived range and the narrowing filters on one line.
pub fn render_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let filters = state.filters.state();
    let mut spans = vec![Span::raw(" ")];

    for (i, period) in Period::ALL.iter().enumerate() {
        let label = format!("{} {}", i + 1, period.button_label());
        if *period == filters.period {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled("│ ", Style::default().fg(theme.border)));
    spans.push(Span::styled(
        filters.period.label(),
        Style::default().fg(theme.text),
    ));
    spans.push(Span::raw(format!(": {}", filters.date_range.label())));
    if filters.period == Period::Custom {
        spans.push(Span::styled(
            format!(" ({})", state.filters.displayed_month().label()),
            Style::default().fg(theme.dim),
        ));
    }

    spans.push(Span::styled(" │ ", Style::default().fg(theme.border)));
    spans.push(Span::raw(filters.platform.label().to_string()));
    spans.push(Span::styled(" │ ", Style::default().fg(theme.border)));
    let categories = if filters.categories.is_empty() {
        "All Categories".to_string()
    } else {
        filters.categories.iter().collect::<Vec<_>>().join(", ")
    };
    spans.push(Span::raw(categories));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    panel: &FilterPanel,
    theme: &Theme,
) {
    match panel {
        FilterPanel::Platform { cursor } => {
            let current = &state.filters.state().platform;
            let mut rows = vec![option_row(
                "All Platforms",
                current.is_all(),
                theme,
            )];
            rows.extend(state.platforms.iter().map(|platform| {
                let selected = *current == PlatformFilter::Only(platform.clone());
                option_row(platform, selected, theme)
            }));
            render_list(frame, area, "Platform", rows, *cursor, theme);
        }
        FilterPanel::Categories { cursor } => {
            let selection = &state.filters.state().categories;
            let names = state.category_names();
            if names.is_empty() {
                let message = state
                    .catalog_error
                    .clone()
                    .unwrap_or_else(|| "No categories loaded".to_string());
                let rows = vec![ListItem::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(theme.dim),
                )))];
                render_list(frame, area, "Categories", rows, 0, theme);
                return;
            }
            let rows = names
                .iter()
                .map(|name| {
                    let mark = if selection.contains(name) { "[x]" } else { "[ ]" };
                    ListItem::new(Line::from(format!("{mark} {name}")))
                })
                .collect();
            render_list(frame, area, "Categories", rows, *cursor, theme);
        }
        FilterPanel::User { cursor } => {
            let active = state.filters.state().active_user.as_deref();
            let rows = state
                .users
                .iter()
                .map(|user| option_row(user, Some(user.as_str()) == active, theme))
                .collect();
            render_list(frame, area, "User", rows, *cursor, theme);
        }
        FilterPanel::Dates(inputs) => render_dates(frame, area, inputs, theme),
    }
}

fn option_row<'a>(label: &str, selected: bool, theme: &Theme) -> ListItem<'a> {
    let style = if selected {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    let mark = if selected { "●" } else { "○" };
    ListItem::new(Line::from(Span::styled(format!("{mark} {label}"), style)))
}

fn render_list(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    rows: Vec<ListItem<'_>>,
    cursor: usize,
    theme: &Theme,
) {
    let popup = centered_rect(50, 60, area);
    frame.render_widget(Clear, popup);

    let mut list_state = ListState::default();
    if !rows.is_empty() {
        list_state.select(Some(cursor.min(rows.len() - 1)));
    }
    let list = List::new(rows)
        .block(panel(title, true, theme))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, popup, &mut list_state);
}

fn render_dates(frame: &mut Frame<'_>, area: Rect, inputs: &DateInputs, theme: &Theme) {
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);

    let block = panel("Date range", true, theme);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let cursor = if focused { "▏" } else { "" };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{label:<6}"), Style::default().fg(theme.text_muted)),
            Span::styled(format!("{value}{cursor}"), style),
        ]))
    };

    frame.render_widget(field("From", &inputs.from, inputs.focus == DateField::From), rows[0]);
    frame.render_widget(field("To", &inputs.to, inputs.focus == DateField::To), rows[1]);

    let note = match &inputs.error {
        Some(err) => Span::styled(err.clone(), Style::default().fg(theme.error)),
        None => Span::styled("YYYY-MM-DD, blank clears", Style::default().fg(theme.dim)),
    };
    frame.render_widget(Paragraph::new(Line::from(note)), rows[3]);
}
