use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::ui::theme::Theme;

/// Titled panel. Popups pass `focused` to get the highlighted border.
pub fn panel(title: &str, focused: bool, theme: &Theme) -> Block<'static> {
    let border = if focused {
        theme.border_focused
    } else {
        theme.border
    };
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Line::styled(
            format!(" {title} "),
            Style::default().fg(theme.accent),
        ))
        .style(Style::default().bg(theme.surface))
}

pub fn render_in<W: Widget>(frame: &mut Frame<'_>, area: Rect, block: Block<'_>, content: W) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(content, inner);
}

/// Headline figure in bold, with an optional dim caption below.
pub fn render_stat(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    value: Span<'_>,
    caption: Option<&str>,
    theme: &Theme,
) {
    let mut lines = vec![Line::from(
        value.patch_style(Style::default().add_modifier(Modifier::BOLD)),
    )];
    if let Some(caption) = caption {
        lines.push(Line::styled(
            caption.to_string(),
            Style::default().fg(theme.dim),
        ));
    }
    render_in(frame, area, panel(title, false, theme), Paragraph::new(lines));
}

/// Loading, empty or failed state of a panel.
pub fn render_message(frame: &mut Frame<'_>, area: Rect, title: &str, message: Span<'_>, theme: &Theme) {
    let content = Paragraph::new(Line::from(message)).alignment(Alignment::Center);
    render_in(frame, area, panel(title, false, theme), content);
}
