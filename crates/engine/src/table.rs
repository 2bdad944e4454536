//! Client-side view over the rows returned by `/api/transactions`.

use std::{cmp::Ordering, collections::HashSet};

use api_types::transaction::TransactionView;

use crate::{Currency, Money, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Date,
    Description,
    Category,
    Platform,
    Amount,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Date,
        SortColumn::Description,
        SortColumn::Category,
        SortColumn::Platform,
        SortColumn::Amount,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Description => "Description",
            Self::Category => "Category",
            Self::Platform => "Platform",
            Self::Amount => "Amount",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Rows of the last accepted response plus the local search, sort and
/// expanded-row state. Nothing here touches the network.
#[derive(Debug, Default)]
pub struct TransactionTable {
    rows: Vec<TransactionView>,
    search: String,
    sort: Option<(SortColumn, SortDirection)>,
    expanded: HashSet<i64>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rows, keeping search and sort. Expanded ids that are no
    /// longer present are dropped.
    pub fn replace_rows(&mut self, rows: Vec<TransactionView>) {
        let ids: HashSet<i64> = rows.iter().map(|row| row.id).collect();
        self.expanded.retain(|id| ids.contains(id));
        self.rows = rows;
    }

    pub fn rows(&self) -> &[TransactionView] {
        &self.rows
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn sort(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    /// Sorts by `column`; picking the active column again flips the
    /// direction, a new column starts ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = match self.sort {
            Some((active, direction)) if active == column => Some((column, direction.flipped())),
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// Back to the order the server returned.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Only rows that carry line items can be expanded. Returns whether the
    /// row is expanded afterwards.
    pub fn toggle_expanded(&mut self, id: i64) -> bool {
        let Some(row) = self.rows.iter().find(|row| row.id == id) else {
            return false;
        };
        if row.item_count == 0 && row.items.is_empty() {
            return false;
        }
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        self.expanded.contains(&id)
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    /// Searched and sorted rows, in display order.
    pub fn visible(&self) -> Vec<&TransactionView> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<&TransactionView> = self
            .rows
            .iter()
            .filter(|row| matches_search(row, &needle))
            .collect();
        if let Some((column, direction)) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = compare(a, b, column);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }
        rows
    }

    pub fn footer(&self) -> String {
        format!("Total {} records found", self.visible().len())
    }
}

fn matches_search(row: &TransactionView, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [row.description.as_deref(), row.category.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| util::contains_ignore_case(field, needle))
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.unwrap_or_default().to_lowercase();
    let b = b.unwrap_or_default().to_lowercase();
    a.cmp(&b)
}

fn compare(a: &TransactionView, b: &TransactionView, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Date => util::api_date_time(&a.date)
            .cmp(&util::api_date_time(&b.date))
            .then_with(|| a.date.cmp(&b.date)),
        SortColumn::Description => compare_text(a.description.as_deref(), b.description.as_deref()),
        SortColumn::Category => compare_text(a.category.as_deref(), b.category.as_deref()),
        SortColumn::Platform => compare_text(a.platform.as_deref(), b.platform.as_deref()),
        SortColumn::Amount => Money::from_major(a.amount, Currency::Thb)
            .cmp(&Money::from_major(b.amount, Currency::Thb)),
    }
}

#[cfg(test)]
mod tests {
    use api_types::transaction::{LineItem, TransactionType};

    use super::*;

    fn row(id: i64, date: &str, description: &str, category: &str, amount: f64) -> TransactionView {
        TransactionView {
            id,
            date: date.to_string(),
            amount,
            category: Some(category.to_string()),
            description: Some(description.to_string()),
            transaction_type: TransactionType::Expense,
            platform: None,
            items: Vec::new(),
            item_count: 0,
        }
    }

    fn table() -> TransactionTable {
        let mut table = TransactionTable::new();
        table.replace_rows(vec![
            row(1, "2024-03-02", "Coffee", "Food", 60.0),
            row(2, "2024-03-01 18:00", "Taxi home", "Transport", 120.0),
            row(3, "2024-03-03", "Groceries", "food", 450.5),
        ]);
        table
    }

    fn ids(table: &TransactionTable) -> Vec<i64> {
        table.visible().iter().map(|row| row.id).collect()
    }

    #[test]
    fn default_order_is_server_order() {
        assert_eq!(ids(&table()), [1, 2, 3]);
    }

    #[test]
    fn search_is_case_insensitive_over_description_and_category() {
        let mut table = table();
        table.set_search("FOOD");
        assert_eq!(ids(&table), [1, 3]);
        table.set_search("taxi");
        assert_eq!(ids(&table), [2]);
        assert_eq!(table.footer(), "Total 1 records found");
    }

    #[test]
    fn same_column_flips_new_column_starts_ascending() {
        let mut table = table();
        table.sort_by(SortColumn::Amount);
        assert_eq!(ids(&table), [1, 2, 3]);
        table.sort_by(SortColumn::Amount);
        assert_eq!(ids(&table), [3, 2, 1]);
        table.sort_by(SortColumn::Date);
        assert_eq!(table.sort(), Some((SortColumn::Date, SortDirection::Ascending)));
        assert_eq!(ids(&table), [2, 1, 3]);
        table.clear_sort();
        assert_eq!(ids(&table), [1, 2, 3]);
    }

    #[test]
    fn only_rows_with_items_expand() {
        let mut table = table();
        let mut with_items = row(4, "2024-03-04", "Market", "Food", 90.0);
        with_items.items = vec![LineItem::Label("Eggs".to_string())];
        with_items.item_count = 1;
        let mut rows = table.rows().to_vec();
        rows.push(with_items);
        table.replace_rows(rows);

        assert!(!table.toggle_expanded(1));
        assert!(table.toggle_expanded(4));
        assert!(table.is_expanded(4));
        assert!(!table.toggle_expanded(4));
        assert!(!table.toggle_expanded(99));
    }

    #[test]
    fn refresh_drops_expanded_rows_that_vanished() {
        let mut table = table();
        let mut rows = table.rows().to_vec();
        rows[0].item_count = 2;
        table.replace_rows(rows);
        table.toggle_expanded(1);

        table.replace_rows(vec![row(2, "2024-03-01", "Taxi", "Transport", 1.0)]);
        assert!(!table.is_expanded(1));
    }
}
