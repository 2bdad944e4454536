use engine::{FormField, ItemField};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::{
    app::{FormFocus, FormState},
    ui::{
        components::{
            card::{panel, render_in},
            centered_rect,
        },
        theme::Theme,
    },
};

const LABEL_WIDTH: usize = 12;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &FormState, theme: &Theme) {
    let popup = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup);

    let focused = state.focused();
    let form = &state.form;
    let mut lines = Vec::new();

    for field in form.fields() {
        let hint = match field {
            FormField::Date => "YYYY-MM-DD",
            FormField::Time => "HH:MM",
            FormField::Amount => "e.g. 120.50",
            _ => "",
        };
        lines.push(input_line(
            field.label(),
            form.field(*field),
            hint,
            focused == FormFocus::Field(*field),
            theme,
        ));
    }

    if !form.is_edit() {
        let is_focused = focused == FormFocus::Type;
        let style = if is_focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", "Type"),
                Style::default().fg(theme.text_muted),
            ),
            Span::styled(format!("‹ {} ›", form.transaction_type.label()), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Items ({})", form.items.len()),
        Style::default()
            .fg(theme.text_muted)
            .add_modifier(Modifier::BOLD),
    )));
    if form.items.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Ctrl+N adds a line item",
            Style::default().fg(theme.dim),
        )));
    }
    for (index, item) in form.items.iter().enumerate() {
        let cell = |field: ItemField, value: &str, width: usize| {
            let is_focused = focused == FormFocus::Item(index, field);
            let style = if is_focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.text)
            };
            let cursor = if is_focused { "▏" } else { "" };
            Span::styled(format!("{:<width$}", format!("{value}{cursor}")), style)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}. ", index + 1), Style::default().fg(theme.dim)),
            cell(ItemField::Name, &item.name, 24),
            Span::styled(" x ", Style::default().fg(theme.dim)),
            cell(ItemField::Quantity, &item.quantity, 4),
            Span::styled(" @ ", Style::default().fg(theme.dim)),
            cell(ItemField::UnitPrice, &item.unit_price, 10),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(err) = &state.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(theme.error),
        )));
    }

    render_in(frame, popup, panel(form.title(), true, theme), Paragraph::new(lines));
}

fn input_line(
    label: &str,
    value: &str,
    hint: &str,
    focused: bool,
    theme: &Theme,
) -> Line<'static> {
    let label = Span::styled(
        format!("{label:<LABEL_WIDTH$}"),
        Style::default().fg(theme.text_muted),
    );
    let value = if value.is_empty() && !focused {
        Span::styled(hint.to_string(), Style::default().fg(theme.dim))
    } else if focused {
        Span::styled(
            format!("{value}▏"),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(value.to_string(), Style::default().fg(theme.text))
    };
    Line::from(vec![label, value])
}
