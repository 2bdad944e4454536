use api_types::transaction::{LineItem, TransactionView};
use engine::{Consumer, Money, SortColumn, TransactionTable};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Row, Table, TableState},
};

use crate::{
    app::{AppState, Mode},
    ui::{
        components::{
            card::{panel, render_in, render_message},
            centered_rect,
            money::signed_amount,
        },
        theme::Theme,
    },
};

const WIDTHS: [Constraint; 5] = [
    Constraint::Length(17),
    Constraint::Min(20),
    Constraint::Length(16),
    Constraint::Length(12),
    Constraint::Length(16),
];

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_search(frame, layout[0], state, theme);
    render_table(frame, layout[1], state, theme);
    render_footer(frame, layout[2], state, theme);
}

fn render_search(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let editing = matches!(state.mode, Mode::Search);
    let search = state.table.search();
    let value = if search.is_empty() && !editing {
        Span::styled("press / to search description or category", Style::default().fg(theme.dim))
    } else {
        let cursor = if editing { "▏" } else { "" };
        Span::styled(format!("{search}{cursor}"), Style::default().fg(theme.text))
    };
    let label_style = if editing {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let line = Line::from(vec![Span::styled(" Search: ", label_style), value]);
    frame.render_widget(Paragraph::new(line), area);
}

fn header(table: &TransactionTable, theme: &Theme) -> Row<'static> {
    let active = table.sort();
    let cells = SortColumn::ALL.iter().map(|column| {
        let arrow = match active {
            Some((sorted, direction)) if sorted == *column => format!(" {}", direction.arrow()),
            _ => String::new(),
        };
        format!("{}{arrow}", column.label())
    });
    Row::new(cells).style(
        Style::default()
            .fg(theme.text_muted)
            .add_modifier(Modifier::BOLD),
    )
}

fn transaction_row(row: &TransactionView, state: &AppState, theme: &Theme) -> Row<'static> {
    let marker = if state.table.is_expanded(row.id) {
        "▾ "
    } else if row.item_count > 0 || !row.items.is_empty() {
        "▸ "
    } else {
        "  "
    };
    let amount = Money::from_major(row.amount, state.currency);
    Row::new(vec![
        Line::from(format!("{marker}{}", display_date(&row.date))),
        Line::from(row.description.clone().unwrap_or_default()),
        Line::from(row.category.clone().unwrap_or_else(|| "-".to_string())),
        Line::from(row.platform.clone().unwrap_or_else(|| "-".to_string())),
        Line::from(signed_amount(amount, row.transaction_type, state.currency, theme)).right_aligned(),
    ])
    .style(Style::default().fg(theme.text))
}

fn item_row(item: &LineItem, theme: &Theme) -> Row<'static> {
    Row::new(vec![
        Line::from(""),
        Line::from(format!("  └ {}", item.label())),
    ])
    .style(Style::default().fg(theme.dim))
}

/// `2024-03-15 14:30` from whatever the API sent.
fn display_date(raw: &str) -> String {
    let raw = raw.trim().replacen('T', " ", 1);
    raw.chars().take(16).collect()
}

fn render_table(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let visible = state.table.visible();

    if visible.is_empty() {
        let message = if let Some(err) = &state.table_error {
            Span::styled(err.clone(), Style::default().fg(theme.error))
        } else if state.is_loading(Consumer::TransactionsTable) {
            Span::styled("Loading…", Style::default().fg(theme.dim))
        } else {
            Span::styled("No transactions found", Style::default().fg(theme.dim))
        };
        render_message(frame, area, "Transactions", message, theme);
        return;
    }

    let mut rows = Vec::new();
    let mut selected_row = 0;
    for (index, row) in visible.iter().enumerate() {
        if index == state.selected {
            selected_row = rows.len();
        }
        rows.push(transaction_row(row, state, theme));
        if state.table.is_expanded(row.id) {
            if row.items.is_empty() {
                rows.push(
                    Row::new(vec![Line::from(""), Line::from("  └ no item details")])
                        .style(Style::default().fg(theme.dim)),
                );
            }
            rows.extend(row.items.iter().map(|item| item_row(item, theme)));
        }
    }

    let mut table_state = TableState::default();
    table_state.select(Some(selected_row));

    let table = Table::new(rows, WIDTHS)
        .header(header(&state.table, theme))
        .block(panel("Transactions", false, theme))
        .row_highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        format!(" {}", state.table.footer()),
        Style::default().fg(theme.text_muted),
    )];
    if let Some(err) = &state.table_error
        && !state.table.rows().is_empty()
    {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.clone(), Style::default().fg(theme.error)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_confirm(frame: &mut Frame<'_>, area: Rect, id: i64, theme: &Theme) {
    let popup = centered_rect(40, 20, area);
    frame.render_widget(Clear, popup);
    let lines = vec![
        Line::from(format!("Delete transaction #{id}?")),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.negative)),
            Span::raw(" delete   "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" keep"),
        ]),
    ];
    let content = Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center);
    render_in(frame, popup, panel("Confirm", true, theme), content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_trimmed_to_minutes() {
        assert_eq!(display_date("2024-03-15T14:30:59"), "2024-03-15 14:30");
        assert_eq!(display_date("2024-03-15"), "2024-03-15");
    }
}
