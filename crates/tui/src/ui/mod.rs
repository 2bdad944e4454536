pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Mode, Section};
use theme::Theme;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(1), // Filter bar
            Constraint::Length(2), // Tabs
            Constraint::Min(0),
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::filters::render_bar(frame, layout[1], state, &theme);
    components::tabs::render_tabs(frame, layout[2], state.section, &theme);

    match state.section {
        Section::Dashboard => screens::dashboard::render(frame, layout[3], state, &theme),
        Section::Transactions => screens::transactions::render(frame, layout[3], state, &theme),
    }

    render_bottom_bar(frame, layout[4], state, &theme);

    match &state.mode {
        Mode::Panel(panel) => screens::filters::render_panel(frame, area, state, panel, &theme),
        Mode::Form(form) => screens::form::render(frame, area, form, &theme),
        Mode::ConfirmDelete(id) => screens::transactions::render_confirm(frame, area, *id, &theme),
        Mode::Normal | Mode::Search => {}
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let filters = state.filters.state();
    let user = filters.active_user.as_deref().unwrap_or("all users");
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let loading = engine::Consumer::FILTERED
        .iter()
        .any(|consumer| state.is_loading(*consumer));

    let mut spans = vec![
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Today", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.today.format(engine::DATE_FORMAT))),
        Span::styled("Refresh", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {refresh}  ")),
        Span::styled("API", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {} ", state.base_url)),
    ];
    match &state.api_status {
        Some(Ok(status)) => spans.push(Span::styled(
            format!("{status}  "),
            Style::default().fg(theme.positive),
        )),
        Some(Err(_)) => spans.push(Span::styled("ERR  ", Style::default().fg(theme.error))),
        None => spans.push(Span::styled("…  ", Style::default().fg(theme.dim))),
    }
    if loading {
        spans.push(Span::styled("loading…", Style::default().fg(theme.warning)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = vec![
        Span::styled("Tab", Style::default().fg(theme.accent)),
        Span::raw(" section"),
        components::hints::hint_separator(theme),
    ];
    parts.extend(components::hints::hints_to_spans(
        &components::hints::context_hints(state),
        theme,
    ));
    parts.push(components::hints::hint_separator(theme));
    parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
