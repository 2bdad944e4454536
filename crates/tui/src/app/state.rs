use std::time::{Duration, Instant};

use api_types::catalog::Category;
use chrono::{NaiveDate, NaiveDateTime};
use engine::{
    CategoryShare, Consumer, Currency, DashboardTotals, FetchTracker, FilterController, FormField,
    ItemField, TransactionForm, TransactionTable, TrendPoint,
};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Transactions,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Dashboard, Section::Transactions];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Transactions => "Transactions",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dashboard => Self::Transactions,
            Self::Transactions => Self::Dashboard,
        }
    }
}

/// Last data a view accepted, plus the error of its last failed fetch.
#[derive(Debug)]
pub struct View<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for View<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
        }
    }
}

impl<T> View<T> {
    pub fn set(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    From,
    To,
}

#[derive(Debug, Clone)]
pub struct DateInputs {
    pub from: String,
    pub to: String,
    pub focus: DateField,
    pub error: Option<String>,
}

impl DateInputs {
    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            DateField::From => &mut self.from,
            DateField::To => &mut self.to,
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            DateField::From => DateField::To,
            DateField::To => DateField::From,
        };
    }
}

#[derive(Debug, Clone)]
pub enum FilterPanel {
    Platform { cursor: usize },
    Categories { cursor: usize },
    Dates(DateInputs),
    User { cursor: usize },
}

/// Focusable rows of the transaction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field(FormField),
    Type,
    Item(usize, ItemField),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub form: TransactionForm,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    pub fn new(form: TransactionForm) -> Self {
        Self {
            form,
            focus: 0,
            error: None,
        }
    }

    pub fn focus_order(&self) -> Vec<FormFocus> {
        let mut order: Vec<FormFocus> = self
            .form
            .fields()
            .iter()
            .copied()
            .map(FormFocus::Field)
            .collect();
        if !self.form.is_edit() {
            order.push(FormFocus::Type);
        }
        for index in 0..self.form.items.len() {
            order.push(FormFocus::Item(index, ItemField::Name));
            order.push(FormFocus::Item(index, ItemField::Quantity));
            order.push(FormFocus::Item(index, ItemField::UnitPrice));
        }
        order
    }

    pub fn focused(&self) -> FormFocus {
        let order = self.focus_order();
        order
            .get(self.focus.min(order.len().saturating_sub(1)))
            .copied()
            .unwrap_or(FormFocus::Field(FormField::Description))
    }

    pub fn next(&mut self) {
        let len = self.focus_order().len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn prev(&mut self) {
        let len = self.focus_order().len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focused() {
            FormFocus::Field(field) => Some(self.form.field_mut(field)),
            FormFocus::Type => None,
            FormFocus::Item(index, field) => self
                .form
                .items
                .get_mut(index)
                .map(|item| item.field_mut(field)),
        }
    }

    pub fn add_item(&mut self) {
        self.form.add_item();
        let order = self.focus_order();
        let last = self.form.items.len() - 1;
        if let Some(position) = order
            .iter()
            .position(|f| *f == FormFocus::Item(last, ItemField::Name))
        {
            self.focus = position;
        }
    }

    pub fn remove_focused_item(&mut self) {
        if let FormFocus::Item(index, _) = self.focused() {
            self.form.remove_item(index);
            self.focus = self.focus.min(self.focus_order().len().saturating_sub(1));
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    Normal,
    Search,
    Panel(FilterPanel),
    Form(FormState),
    ConfirmDelete(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

impl ToastState {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        }
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub mode: Mode,
    pub filters: FilterController,
    pub tracker: FetchTracker,
    pub summary: View<DashboardTotals>,
    pub breakdown: View<Vec<CategoryShare>>,
    pub trend: View<Vec<TrendPoint>>,
    pub table: TransactionTable,
    pub table_error: Option<String>,
    pub selected: usize,
    pub category_catalog: Vec<Category>,
    pub catalog_error: Option<String>,
    pub configured_platforms: Vec<String>,
    pub platforms: Vec<String>,
    pub users: Vec<String>,
    pub currency: Currency,
    pub today: NaiveDate,
    pub last_refresh: Option<NaiveDateTime>,
    pub base_url: String,
    /// Outcome of the last `/api/health` probe; `None` until it answers.
    pub api_status: Option<Result<String, String>>,
    pub toast: Option<ToastState>,
}

impl AppState {
    pub fn is_loading(&self, consumer: Consumer) -> bool {
        self.tracker.is_loading(consumer)
    }

    pub fn toast(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toast = Some(ToastState::new(message, level));
    }

    pub fn visible_len(&self) -> usize {
        self.table.visible().len()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.table.visible().get(self.selected).map(|row| row.id)
    }

    /// Category names offered by the multi-select, catalog order.
    pub fn category_names(&self) -> Vec<&str> {
        self.category_catalog
            .iter()
            .map(|category| category.name.as_str())
            .collect()
    }
}

/// Configured platforms first, then the ones the API reports; no
/// duplicates, blanks dropped.
pub fn merge_platforms(configured: &[String], reported: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for platform in configured.iter().chain(reported) {
        let platform = platform.trim();
        if !platform.is_empty() && !merged.iter().any(|p| p == platform) {
            merged.push(platform.to_string());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn platforms_merge_without_duplicates() {
        let merged = merge_platforms(
            &strings(&["Grab", "Manual"]),
            &strings(&["Shopee", "Grab", " ", "KBANK"]),
        );
        assert_eq!(merged, ["Grab", "Manual", "Shopee", "KBANK"]);
    }

    #[test]
    fn form_focus_wraps_and_follows_items() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut state = FormState::new(TransactionForm::new(today));
        assert_eq!(state.focused(), FormFocus::Field(FormField::Description));
        state.prev();
        assert_eq!(state.focused(), FormFocus::Type);

        state.add_item();
        assert_eq!(state.focused(), FormFocus::Item(0, ItemField::Name));
        state.focused_text_mut().unwrap().push_str("Rice");
        assert_eq!(state.form.items[0].name, "Rice");

        state.remove_focused_item();
        assert!(state.form.items.is_empty());
        assert_eq!(state.focused(), FormFocus::Type);
    }
}
