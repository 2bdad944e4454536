use ratatui::{style::Style, text::Span};

use crate::{
    app::{AppState, FilterPanel, Mode, Section},
    ui::theme::Theme,
};

/// A key and what it does, shown in the bottom bar.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

const fn hint(key: &'static str, action: &'static str) -> KeyHint {
    KeyHint { key, action }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Hints for whatever currently owns the keyboard.
pub fn context_hints(state: &AppState) -> Vec<KeyHint> {
    match &state.mode {
        Mode::Normal => match state.section {
            Section::Dashboard => vec![
                hint("1-5", "period"),
                hint("[ ]", "month"),
                hint("f", "dates"),
                hint("p", "platform"),
                hint("c", "categories"),
                hint("u", "user"),
                hint("x", "reset"),
                hint("r", "refresh"),
                hint("a", "add"),
            ],
            Section::Transactions => vec![
                hint("↑↓", "select"),
                hint("Enter", "items"),
                hint("/", "search"),
                hint("D/N/C/P/A", "sort"),
                hint("a", "add"),
                hint("e", "edit"),
                hint("d", "delete"),
                hint("w/W", "csv/json"),
            ],
        },
        Mode::Search => vec![hint("Enter", "done"), hint("Esc", "clear")],
        Mode::Panel(FilterPanel::Dates(_)) => vec![
            hint("Tab", "from/to"),
            hint("Enter", "apply"),
            hint("Esc", "cancel"),
        ],
        Mode::Panel(FilterPanel::Categories { .. }) => vec![
            hint("↑↓", "move"),
            hint("Space", "toggle"),
            hint("x", "clear"),
            hint("Esc", "close"),
        ],
        Mode::Panel(_) => vec![hint("↑↓", "move"), hint("Enter", "select"), hint("Esc", "close")],
        Mode::Form(_) => vec![
            hint("Tab", "next"),
            hint("←→", "type"),
            hint("^N", "add item"),
            hint("^D", "remove item"),
            hint("Enter", "save"),
            hint("Esc", "cancel"),
        ],
        Mode::ConfirmDelete(_) => vec![hint("y", "delete"), hint("n", "keep")],
    }
}
