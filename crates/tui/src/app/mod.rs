mod state;
mod tasks;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use engine::{
    Consumer, Currency, DashboardTotals, ExportFormat, FetchTracker, FilterController, Period,
    PlatformFilter, SortColumn, TransactionForm, TransactionTable, category_shares,
    export_to_dir, parse_date_input, spending_trend,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    client::Client,
    config::{AppConfig, Clock},
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub use state::{
    AppState, DateField, DateInputs, FilterPanel, FormFocus, FormState, Mode, Section,
    ToastLevel, ToastState, View,
};
use tasks::{AppEvent, Payload, Write};

const TICK_RATE: Duration = Duration::from_millis(100);

pub struct App {
    config: AppConfig,
    client: Client,
    clock: Clock,
    pub state: AppState,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    fetched_generation: Option<u64>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let clock = Clock::new(config.tz()?);
        let today = clock.today();
        let (tx, rx) = mpsc::unbounded_channel();

        let state = AppState {
            section: Section::Dashboard,
            mode: Mode::Normal,
            filters: FilterController::new(today, config.active_user()),
            tracker: FetchTracker::new(),
            summary: View::default(),
            breakdown: View::default(),
            trend: View::default(),
            table: TransactionTable::new(),
            table_error: None,
            selected: 0,
            category_catalog: Vec::new(),
            catalog_error: None,
            configured_platforms: config.platforms.clone(),
            platforms: state::merge_platforms(&config.platforms, &[]),
            users: config
                .users
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect(),
            currency: Currency::default(),
            today,
            last_refresh: None,
            base_url: config.base_url.clone(),
            api_status: None,
            toast: None,
        };

        Ok(Self {
            config,
            client,
            clock,
            state,
            tx,
            rx,
            fetched_generation: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(base_url = %self.config.base_url, "starting dashboard");
        tasks::spawn_health(&self.client, &self.tx);
        self.fetch_catalogs();

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            self.state.today = self.clock.today();
            if self.fetched_generation != Some(self.state.filters.generation()) {
                self.refresh_filtered();
            }
            if let Some(toast) = &self.state.toast
                && toast.expired(Instant::now())
            {
                self.state.toast = None;
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            while let Ok(app_event) = self.rx.try_recv() {
                self.handle_event(app_event);
            }
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    /// Starts one fetch per filter-driven view with the current snapshot.
    fn refresh_filtered(&mut self) {
        let snapshot = self.state.filters.snapshot();
        let params = snapshot.query_params();
        tracing::debug!(query = %params, generation = self.state.filters.generation(), "refreshing views");
        for consumer in Consumer::FILTERED {
            let token = self.state.tracker.issue(consumer);
            tasks::spawn_fetch(&self.client, &self.tx, token, params.clone());
        }
        self.fetched_generation = Some(self.state.filters.generation());
    }

    fn fetch_catalogs(&mut self) {
        for consumer in [Consumer::CategoryCatalog, Consumer::PlatformCatalog] {
            let token = self.state.tracker.issue(consumer);
            tasks::spawn_fetch(&self.client, &self.tx, token, Default::default());
        }
    }

    fn handle_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::Fetched(token, result) => {
                if !self.state.tracker.accept(token) {
                    return;
                }
                let consumer = token.consumer();
                match result {
                    Ok(payload) => self.apply(payload),
                    Err(err) => {
                        tracing::warn!(consumer = consumer.label(), "fetch failed: {err}");
                        let message = tasks::load_error(consumer, &err);
                        match consumer {
                            Consumer::SummaryCards => self.state.summary.fail(message),
                            Consumer::CategoryBreakdown => self.state.breakdown.fail(message),
                            Consumer::SpendingTrend => self.state.trend.fail(message),
                            Consumer::TransactionsTable => self.state.table_error = Some(message),
                            Consumer::CategoryCatalog | Consumer::PlatformCatalog => {
                                self.state.catalog_error = Some(message)
                            }
                        }
                    }
                }
            }
            AppEvent::Saved(Ok(message)) => {
                self.state.toast(message, ToastLevel::Success);
                self.refresh_filtered();
            }
            AppEvent::Saved(Err(err)) => {
                self.state.toast(format!("Save failed: {err}"), ToastLevel::Error);
                // part of a multi-request write may have landed
                self.refresh_filtered();
            }
            AppEvent::Health(result) => {
                if let Err(err) = &result {
                    tracing::warn!("health check failed: {err}");
                }
                self.state.api_status = Some(result.map_err(|err| err.to_string()));
            }
        }
    }

    fn apply(&mut self, payload: Payload) {
        let currency = self.state.currency;
        match payload {
            Payload::Dashboard(data) => {
                self.state
                    .summary
                    .set(DashboardTotals::from_dashboard(&data, currency));
                self.state.last_refresh = Some(self.clock.now());
            }
            Payload::CategorySummary(rows) => {
                self.state.breakdown.set(category_shares(&rows, currency));
            }
            Payload::DateSummary(rows) => self.state.trend.set(spending_trend(&rows, currency)),
            Payload::Transactions(rows) => {
                tracing::debug!(rows = rows.len(), "transactions loaded");
                self.state.table.replace_rows(rows);
                self.state.table_error = None;
                self.state.clamp_selection();
            }
            Payload::Categories(categories) => {
                self.state.category_catalog = categories;
                self.state.catalog_error = None;
            }
            Payload::Platforms(reported) => {
                self.state.platforms =
                    state::merge_platforms(&self.state.configured_platforms, &reported);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::None {
            return;
        }
        let mode = std::mem::replace(&mut self.state.mode, Mode::Normal);
        self.state.mode = match mode {
            Mode::Normal => self.handle_normal(action),
            Mode::Search => self.handle_search(action),
            Mode::Panel(panel) => self.handle_panel(panel, action),
            Mode::Form(form) => self.handle_form(form, action),
            Mode::ConfirmDelete(id) => self.handle_confirm_delete(id, action),
        };
    }

    fn handle_normal(&mut self, action: AppAction) -> Mode {
        let today = self.state.today;
        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::NextField | AppAction::PrevField => {
                self.state.section = self.state.section.toggled();
            }
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Left => {
                self.state.filters.prev_month(today);
            }
            AppAction::Right => {
                self.state.filters.next_month(today);
            }
            AppAction::Submit => {
                if self.state.section == Section::Transactions
                    && let Some(id) = self.state.selected_id()
                {
                    self.state.table.toggle_expanded(id);
                }
            }
            AppAction::Input(ch) => return self.handle_normal_char(ch),
            AppAction::Cancel
            | AppAction::Backspace
            | AppAction::AddItem
            | AppAction::RemoveItem
            | AppAction::None => {}
        }
        Mode::Normal
    }

    fn handle_normal_char(&mut self, ch: char) -> Mode {
        let today = self.state.today;
        match ch {
            'q' => self.should_quit = true,
            '1'..='5' => {
                let index = (ch as usize) - ('1' as usize);
                if let Some(period) = Period::ALL.get(index) {
                    self.state.filters.select_period(*period, today);
                }
            }
            '[' => {
                self.state.filters.prev_month(today);
            }
            ']' => {
                self.state.filters.next_month(today);
            }
            'f' => {
                let range = self.state.filters.state().date_range;
                return Mode::Panel(FilterPanel::Dates(DateInputs {
                    from: range
                        .from
                        .map(|d| d.format(engine::DATE_FORMAT).to_string())
                        .unwrap_or_default(),
                    to: range
                        .to
                        .map(|d| d.format(engine::DATE_FORMAT).to_string())
                        .unwrap_or_default(),
                    focus: DateField::From,
                    error: None,
                }));
            }
            'p' => return Mode::Panel(FilterPanel::Platform { cursor: 0 }),
            'c' => return Mode::Panel(FilterPanel::Categories { cursor: 0 }),
            'u' => {
                if self.state.users.is_empty() {
                    self.state
                        .toast("No users configured", ToastLevel::Info);
                } else {
                    return Mode::Panel(FilterPanel::User { cursor: 0 });
                }
            }
            'x' => {
                self.state.filters.reset(today);
                self.state.toast("Filters cleared", ToastLevel::Info);
            }
            'r' => {
                tasks::spawn_health(&self.client, &self.tx);
                self.refresh_filtered();
                self.fetch_catalogs();
            }
            'a' => {
                return Mode::Form(FormState::new(TransactionForm::new(today)));
            }
            _ if self.state.section == Section::Transactions => {
                return self.handle_table_char(ch);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_table_char(&mut self, ch: char) -> Mode {
        match ch {
            '/' => return Mode::Search,
            'j' => self.state.select_next(),
            'k' => self.state.select_prev(),
            'e' => {
                let row = self
                    .state
                    .table
                    .visible()
                    .get(self.state.selected)
                    .map(|row| TransactionForm::edit(row));
                if let Some(form) = row {
                    return Mode::Form(FormState::new(form));
                }
            }
            'd' => {
                if let Some(id) = self.state.selected_id() {
                    return Mode::ConfirmDelete(id);
                }
            }
            'D' => self.sort(SortColumn::Date),
            'N' => self.sort(SortColumn::Description),
            'C' => self.sort(SortColumn::Category),
            'P' => self.sort(SortColumn::Platform),
            'A' => self.sort(SortColumn::Amount),
            'S' => self.state.table.clear_sort(),
            'w' => self.export(ExportFormat::Csv),
            'W' => self.export(ExportFormat::Json),
            _ => {}
        }
        Mode::Normal
    }

    fn sort(&mut self, column: SortColumn) {
        self.state.table.sort_by(column);
        self.state.selected = 0;
    }

    fn export(&mut self, format: ExportFormat) {
        let rows = self.state.table.visible();
        let count = rows.len();
        let result = export_to_dir(&self.config.export_dir, &rows, format, self.clock.now());
        match result {
            Ok(path) => {
                let message = format!("Exported {count} rows to {}", path.display());
                self.state.toast(message, ToastLevel::Success);
            }
            Err(err) => {
                tracing::warn!("export failed: {err}");
                self.state.toast(format!("Export failed: {err}"), ToastLevel::Error);
            }
        }
    }

    fn handle_search(&mut self, action: AppAction) -> Mode {
        let mut search = self.state.table.search().to_string();
        let mode = match action {
            AppAction::Cancel => {
                search.clear();
                Mode::Normal
            }
            AppAction::Submit => Mode::Normal,
            AppAction::Backspace => {
                search.pop();
                Mode::Search
            }
            AppAction::Input(ch) => {
                search.push(ch);
                Mode::Search
            }
            AppAction::Quit => {
                self.should_quit = true;
                Mode::Normal
            }
            _ => Mode::Search,
        };
        self.state.table.set_search(search);
        self.state.selected = 0;
        mode
    }

    fn handle_panel(&mut self, panel: FilterPanel, action: AppAction) -> Mode {
        if action == AppAction::Cancel {
            return Mode::Normal;
        }
        if action == AppAction::Quit {
            self.should_quit = true;
            return Mode::Normal;
        }
        match panel {
            FilterPanel::Platform { cursor } => {
                // Row 0 is "All Platforms".
                let len = self.state.platforms.len() + 1;
                match action {
                    AppAction::Up => Mode::Panel(FilterPanel::Platform {
                        cursor: cursor.saturating_sub(1),
                    }),
                    AppAction::Down => Mode::Panel(FilterPanel::Platform {
                        cursor: (cursor + 1).min(len - 1),
                    }),
                    AppAction::Submit => {
                        let platform = match cursor {
                            0 => PlatformFilter::All,
                            n => self
                                .state
                                .platforms
                                .get(n - 1)
                                .map(|p| PlatformFilter::from_label(p))
                                .unwrap_or_default(),
                        };
                        self.state.filters.set_platform(platform);
                        Mode::Normal
                    }
                    _ => Mode::Panel(FilterPanel::Platform { cursor }),
                }
            }
            FilterPanel::Categories { cursor } => {
                let names: Vec<String> = self
                    .state
                    .category_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                match action {
                    AppAction::Up => Mode::Panel(FilterPanel::Categories {
                        cursor: cursor.saturating_sub(1),
                    }),
                    AppAction::Down => Mode::Panel(FilterPanel::Categories {
                        cursor: (cursor + 1).min(names.len().saturating_sub(1)),
                    }),
                    AppAction::Submit | AppAction::Input(' ') => {
                        if let Some(name) = names.get(cursor) {
                            self.state.filters.toggle_category(name);
                        }
                        Mode::Panel(FilterPanel::Categories { cursor })
                    }
                    AppAction::Input('x') => {
                        self.state.filters.clear_categories();
                        Mode::Panel(FilterPanel::Categories { cursor })
                    }
                    _ => Mode::Panel(FilterPanel::Categories { cursor }),
                }
            }
            FilterPanel::User { cursor } => match action {
                AppAction::Up => Mode::Panel(FilterPanel::User {
                    cursor: cursor.saturating_sub(1),
                }),
                AppAction::Down => Mode::Panel(FilterPanel::User {
                    cursor: (cursor + 1).min(self.state.users.len().saturating_sub(1)),
                }),
                AppAction::Submit => {
                    let user = self.state.users.get(cursor).cloned();
                    self.state.filters.set_active_user(user);
                    Mode::Normal
                }
                _ => Mode::Panel(FilterPanel::User { cursor }),
            },
            FilterPanel::Dates(mut inputs) => {
                match action {
                    AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                        inputs.switch_focus()
                    }
                    AppAction::Backspace => {
                        inputs.focused_mut().pop();
                    }
                    AppAction::Input(ch) if ch.is_ascii_digit() || ch == '-' => {
                        inputs.focused_mut().push(ch);
                    }
                    AppAction::Submit => {
                        match (parse_date_input(&inputs.from), parse_date_input(&inputs.to)) {
                            (Ok(from), Ok(to)) => {
                                if let (Some(from), Some(to)) = (from, to)
                                    && from > to
                                {
                                    inputs.error = Some("From is after To".to_string());
                                    return Mode::Panel(FilterPanel::Dates(inputs));
                                }
                                self.state.filters.set_date_from(from);
                                self.state.filters.set_date_to(to);
                                return Mode::Normal;
                            }
                            (Err(err), _) | (_, Err(err)) => inputs.error = Some(err.to_string()),
                        }
                    }
                    _ => {}
                }
                Mode::Panel(FilterPanel::Dates(inputs))
            }
        }
    }

    fn handle_form(&mut self, mut form: FormState, action: AppAction) -> Mode {
        match action {
            AppAction::Cancel => return Mode::Normal,
            AppAction::Quit => {
                self.should_quit = true;
                return Mode::Normal;
            }
            AppAction::NextField | AppAction::Down => form.next(),
            AppAction::PrevField | AppAction::Up => form.prev(),
            AppAction::AddItem => form.add_item(),
            AppAction::RemoveItem => form.remove_focused_item(),
            AppAction::Backspace => {
                if let Some(text) = form.focused_text_mut() {
                    text.pop();
                }
            }
            AppAction::Left | AppAction::Right => {
                if form.focused() == FormFocus::Type {
                    form.form.toggle_type();
                }
            }
            AppAction::Input(ch) => match form.focused_text_mut() {
                Some(text) => text.push(ch),
                None if ch == ' ' => form.form.toggle_type(),
                None => {}
            },
            AppAction::Submit => return self.submit_form(form),
            AppAction::None => {}
        }
        Mode::Form(form)
    }

    fn submit_form(&mut self, mut form: FormState) -> Mode {
        let currency = self.state.currency;
        let write = if form.form.is_edit() {
            form.form.validate_edit(currency).map(Write::Update)
        } else {
            form.form.validate_new(currency).map(Write::Create)
        };
        match write {
            Ok(write) => {
                tasks::spawn_write(&self.client, &self.tx, write);
                self.state.toast("Saving...", ToastLevel::Info);
                Mode::Normal
            }
            Err(err) => {
                form.error = Some(err.to_string());
                Mode::Form(form)
            }
        }
    }

    fn handle_confirm_delete(&mut self, id: i64, action: AppAction) -> Mode {
        match action {
            AppAction::Input('y') | AppAction::Submit => {
                tasks::spawn_write(&self.client, &self.tx, Write::Delete(id));
                Mode::Normal
            }
            AppAction::Input('n') | AppAction::Cancel => Mode::Normal,
            _ => Mode::ConfirmDelete(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ClientError;

    use super::*;

    #[tokio::test]
    async fn failed_save_still_refetches_the_views() {
        let mut app = App::new(AppConfig::default()).unwrap();
        assert_eq!(app.fetched_generation, None);

        app.handle_event(AppEvent::Saved(Err(ClientError::Server(
            "500 Internal Server Error: item insert failed".to_string(),
        ))));

        assert_eq!(app.fetched_generation, Some(app.state.filters.generation()));
        for consumer in Consumer::FILTERED {
            assert!(app.state.is_loading(consumer));
        }
        let toast = app.state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert!(toast.message.starts_with("Save failed"));
    }
}
