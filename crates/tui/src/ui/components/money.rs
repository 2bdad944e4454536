use api_types::transaction::TransactionType;
use engine::{Currency, Money};
use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// Amount colored by direction: income green with `+`, expenses red with `-`.
#[must_use]
pub fn signed_amount(
    amount: Money,
    kind: TransactionType,
    currency: Currency,
    theme: &Theme,
) -> Span<'static> {
    let formatted = amount.abs().format(currency);
    match kind {
        TransactionType::Income => {
            Span::styled(format!("+{formatted}"), Style::default().fg(theme.positive))
        }
        TransactionType::Expense => {
            Span::styled(format!("-{formatted}"), Style::default().fg(theme.negative))
        }
    }
}

/// Amount colored by its own sign, without a prefix.
#[must_use]
pub fn styled_amount(amount: Money, currency: Currency, theme: &Theme) -> Span<'static> {
    let color = if amount.is_positive() {
        theme.positive
    } else if amount.is_negative() {
        theme.negative
    } else {
        theme.text
    };
    Span::styled(amount.format(currency), Style::default().fg(color))
}
