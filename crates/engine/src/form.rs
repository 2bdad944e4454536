//! Add / edit transaction forms.
//!
//! The form holds raw text exactly as typed. Validation turns it into the
//! API payloads or reports the first problem.

use api_types::transaction::{
    ItemNew, LineItem, TransactionNew, TransactionType, TransactionUpdate, TransactionView,
};
use chrono::{NaiveDate, NaiveTime};

use crate::{
    Currency, EngineError, Money, ResultEngine,
    period::{DATE_FORMAT, parse_date_input},
    util,
};

const TIME_FORMAT: &str = "%H:%M";
const DEFAULT_PLATFORM: &str = "Manual";

#[derive(Clone, Debug, PartialEq, Eq)]
enum FormMode {
    Add,
    /// Editing an existing row. `original_items` are its line items as the
    /// form first showed them; items are only rewritten when they differ.
    Edit {
        id: i64,
        original_items: Vec<ItemDraft>,
    },
}

/// Text fields of the form, in tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    Description,
    Category,
    Amount,
    Date,
    Time,
    Platform,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Category => "Category",
            Self::Amount => "Amount",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Platform => "Platform",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemField {
    Name,
    Quantity,
    UnitPrice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: "1".to_string(),
            unit_price: String::new(),
        }
    }
}

impl ItemDraft {
    pub fn field_mut(&mut self, field: ItemField) -> &mut String {
        match field {
            ItemField::Name => &mut self.name,
            ItemField::Quantity => &mut self.quantity,
            ItemField::UnitPrice => &mut self.unit_price,
        }
    }

    fn from_line_item(item: &LineItem) -> Self {
        match item {
            LineItem::Detailed(view) => Self {
                name: view.name.clone(),
                quantity: format!("{}", view.quantity.max(1.0) as u32),
                unit_price: format!("{:.2}", view.unit_price),
            },
            LineItem::Label(label) => {
                let (name, quantity) = split_item_label(label);
                Self {
                    name,
                    quantity: quantity.to_string(),
                    unit_price: String::new(),
                }
            }
        }
    }

    /// `None` for rows left without a name.
    fn validate(&self, currency: Currency) -> ResultEngine<Option<ItemNew>> {
        let name = self.name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let quantity: u32 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidItem(format!("quantity of \"{name}\"")))?;
        if quantity == 0 {
            return Err(EngineError::InvalidItem(format!(
                "quantity of \"{name}\" must be greater than zero"
            )));
        }
        let unit_price = if self.unit_price.trim().is_empty() {
            Money::ZERO
        } else {
            Money::parse_major(&self.unit_price, currency)
                .map_err(|_| EngineError::InvalidItem(format!("unit price of \"{name}\"")))?
        };
        if unit_price.is_negative() {
            return Err(EngineError::InvalidItem(format!(
                "unit price of \"{name}\" cannot be negative"
            )));
        }
        Ok(Some(ItemNew {
            name: name.to_string(),
            quantity,
            unit_price: unit_price.to_major(currency),
        }))
    }
}

/// Reads `"Milk (x2)"` as `("Milk", 2)`; anything else is quantity 1.
fn split_item_label(label: &str) -> (String, u32) {
    let trimmed = label.trim();
    if let Some(rest) = trimmed.strip_suffix(')')
        && let Some((name, qty)) = rest.rsplit_once("(x")
        && let Ok(qty) = qty.trim().parse::<u32>()
    {
        return (name.trim().to_string(), qty.max(1));
    }
    (trimmed.to_string(), 1)
}

/// Validated payloads of an add form.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    pub transaction: TransactionNew,
    pub items: Vec<ItemNew>,
}

/// Validated payloads of an edit form.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionEdit {
    pub id: i64,
    pub update: TransactionUpdate,
    /// Replacement line items; `None` leaves the stored items untouched.
    pub items: Option<Vec<ItemNew>>,
}

/// Server ids of every stored item of `current`, all of which must go
/// before a replacement set is added.
///
/// Fails when an item has no id: it could not be deleted, and adding the
/// replacements would duplicate it.
pub fn stored_item_ids(current: &TransactionView) -> ResultEngine<Vec<i64>> {
    current
        .items
        .iter()
        .map(|item| {
            item.id().ok_or_else(|| {
                EngineError::InvalidItem(format!(
                    "item \"{}\" of transaction #{} has no id and cannot be replaced",
                    item.label(),
                    current.id
                ))
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionForm {
    mode: FormMode,
    pub description: String,
    pub category: String,
    pub amount: String,
    pub date: String,
    pub time: String,
    pub platform: String,
    pub transaction_type: TransactionType,
    pub items: Vec<ItemDraft>,
}

impl TransactionForm {
    /// Empty add form dated `today`, on the `Manual` platform.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: FormMode::Add,
            description: String::new(),
            category: String::new(),
            amount: String::new(),
            date: today.format(DATE_FORMAT).to_string(),
            time: String::new(),
            platform: DEFAULT_PLATFORM.to_string(),
            transaction_type: TransactionType::Expense,
            items: Vec::new(),
        }
    }

    /// Edit form prefilled from a table row.
    pub fn edit(tx: &TransactionView) -> Self {
        let (date, time) = util::split_date_time(&tx.date);
        let amount = Money::from_major(tx.amount, Currency::Thb);
        Self {
            mode: FormMode::Edit {
                id: tx.id,
                original_items: tx.items.iter().map(ItemDraft::from_line_item).collect(),
            },
            description: tx.description.clone().unwrap_or_default(),
            category: tx.category.clone().unwrap_or_default(),
            amount: format!("{:.2}", amount.to_major(Currency::Thb)),
            date,
            time,
            platform: tx.platform.clone().unwrap_or_default(),
            transaction_type: tx.transaction_type,
            items: tx.items.iter().map(ItemDraft::from_line_item).collect(),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Transaction",
            FormMode::Edit { .. } => "Edit Transaction",
        }
    }

    /// Fields shown for the current mode, in tab order.
    pub fn fields(&self) -> &'static [FormField] {
        match self.mode {
            FormMode::Add => &[
                FormField::Description,
                FormField::Category,
                FormField::Amount,
                FormField::Date,
                FormField::Platform,
            ],
            FormMode::Edit { .. } => &[
                FormField::Description,
                FormField::Category,
                FormField::Amount,
                FormField::Date,
                FormField::Time,
                FormField::Platform,
            ],
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Description => &self.description,
            FormField::Category => &self.category,
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Platform => &self.platform,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Description => &mut self.description,
            FormField::Category => &mut self.category,
            FormField::Amount => &mut self.amount,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
            FormField::Platform => &mut self.platform,
        }
    }

    pub fn toggle_type(&mut self) {
        self.transaction_type = self.transaction_type.toggled();
    }

    pub fn add_item(&mut self) {
        self.items.push(ItemDraft::default());
    }

    pub fn remove_item(&mut self, index: usize) -> Option<ItemDraft> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Checks the common fields and returns `(description, amount, date)`.
    fn validate_common(&self, currency: Currency) -> ResultEngine<(String, Money, NaiveDate)> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(EngineError::MissingField("Description".to_string()));
        }
        if self.amount.trim().is_empty() {
            return Err(EngineError::MissingField("Amount".to_string()));
        }
        let amount = Money::parse_major(&self.amount, currency)?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        let date = parse_date_input(&self.date)?
            .ok_or_else(|| EngineError::MissingField("Date".to_string()))?;
        Ok((description.to_string(), amount, date))
    }

    fn validate_items(&self, currency: Currency) -> ResultEngine<Vec<ItemNew>> {
        let mut items = Vec::new();
        for draft in &self.items {
            if let Some(item) = draft.validate(currency)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Payloads for `POST /api/transactions` and its items.
    pub fn validate_new(&self, currency: Currency) -> ResultEngine<NewTransaction> {
        let (description, amount, date) = self.validate_common(currency)?;
        let platform = match self.platform.trim() {
            "" => DEFAULT_PLATFORM.to_string(),
            other => other.to_string(),
        };
        Ok(NewTransaction {
            transaction: TransactionNew {
                description,
                amount: amount.to_major(currency),
                category: self.category.trim().to_string(),
                date: date.format(DATE_FORMAT).to_string(),
                platform,
                transaction_type: self.transaction_type,
            },
            items: self.validate_items(currency)?,
        })
    }

    /// Payloads for `PUT /api/transactions/{id}` and the item rewrite.
    ///
    /// Fails with [`EngineError::MissingField`] on an add form.
    pub fn validate_edit(&self, currency: Currency) -> ResultEngine<TransactionEdit> {
        let FormMode::Edit { id, original_items } = &self.mode else {
            return Err(EngineError::MissingField("transaction id".to_string()));
        };
        let (description, amount, date) = self.validate_common(currency)?;
        let time = match self.time.trim() {
            "" => NaiveTime::MIN,
            raw => NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map_err(|_| EngineError::InvalidDate(format!("time {raw}")))?,
        };
        Ok(TransactionEdit {
            id: *id,
            update: TransactionUpdate {
                description,
                amount: amount.to_major(currency),
                category: self.category.trim().to_string(),
                date: format!(
                    "{} {}",
                    date.format(DATE_FORMAT),
                    time.format(TIME_FORMAT)
                ),
                platform: self.platform.trim().to_string(),
            },
            items: if self.items == *original_items {
                None
            } else {
                Some(self.validate_items(currency)?)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use api_types::transaction::ItemView;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn filled() -> TransactionForm {
        let mut form = TransactionForm::new(today());
        form.description = " Lunch ".to_string();
        form.category = "Food".to_string();
        form.amount = "120.50".to_string();
        form
    }

    #[test]
    fn add_form_defaults() {
        let form = TransactionForm::new(today());
        assert_eq!(form.date, "2024-03-15");
        assert_eq!(form.platform, "Manual");
        assert_eq!(form.transaction_type, TransactionType::Expense);
        assert!(!form.fields().contains(&FormField::Time));
    }

    #[test]
    fn required_fields_are_checked_in_order() {
        let mut form = TransactionForm::new(today());
        assert_eq!(
            form.validate_new(Currency::Thb),
            Err(EngineError::MissingField("Description".to_string()))
        );
        form.description = "Lunch".to_string();
        assert_eq!(
            form.validate_new(Currency::Thb),
            Err(EngineError::MissingField("Amount".to_string()))
        );
        form.amount = "0".to_string();
        assert!(matches!(
            form.validate_new(Currency::Thb),
            Err(EngineError::InvalidAmount(_))
        ));
        form.amount = "1.234".to_string();
        assert!(form.validate_new(Currency::Thb).is_err());
        form.amount = "12".to_string();
        form.date = "2024-02-30".to_string();
        assert!(matches!(
            form.validate_new(Currency::Thb),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn unnamed_items_are_skipped_and_bad_ones_rejected() {
        let mut form = filled();
        form.add_item();
        form.add_item();
        *form.items[1].field_mut(ItemField::Name) = "Rice".to_string();
        form.items[1].quantity = "2".to_string();
        form.items[1].unit_price = "40".to_string();

        let new = form.validate_new(Currency::Thb).unwrap();
        assert_eq!(new.transaction.description, "Lunch");
        assert_eq!(new.transaction.amount, 120.5);
        assert_eq!(
            new.items,
            vec![ItemNew {
                name: "Rice".to_string(),
                quantity: 2,
                unit_price: 40.0
            }]
        );

        form.items[1].quantity = "0".to_string();
        assert!(matches!(
            form.validate_new(Currency::Thb),
            Err(EngineError::InvalidItem(_))
        ));
        form.items[1].quantity = "1".to_string();
        form.items[1].unit_price = "-1".to_string();
        assert!(matches!(
            form.validate_new(Currency::Thb),
            Err(EngineError::InvalidItem(_))
        ));
    }

    fn dinner(items: Vec<LineItem>) -> TransactionView {
        TransactionView {
            id: 9,
            date: "2024-03-10 18:45:00".to_string(),
            amount: 99.0,
            category: Some("Food".to_string()),
            description: Some("Dinner".to_string()),
            transaction_type: TransactionType::Expense,
            platform: None,
            item_count: items.len() as u32,
            items,
        }
    }

    fn stored(id: Option<i64>, name: &str, quantity: f64, unit_price: f64) -> LineItem {
        LineItem::Detailed(ItemView {
            id,
            name: name.to_string(),
            quantity,
            unit_price,
            formatted: None,
        })
    }

    #[test]
    fn edit_form_splits_date_and_time() {
        let tx = dinner(vec![
            stored(Some(31), "Soup", 1.0, 99.0),
            LineItem::Label("Tea (x3)".to_string()),
        ]);
        let mut form = TransactionForm::edit(&tx);
        assert_eq!(form.date, "2024-03-10");
        assert_eq!(form.time, "18:45");
        assert_eq!(form.items[1].name, "Tea");
        assert_eq!(form.items[1].quantity, "3");

        form.time.clear();
        let edit = form.validate_edit(Currency::Thb).unwrap();
        assert_eq!(edit.id, 9);
        assert_eq!(edit.update.date, "2024-03-10 00:00");

        form.time = "25:00".to_string();
        assert!(form.validate_edit(Currency::Thb).is_err());
    }

    #[test]
    fn untouched_items_are_not_rewritten() {
        let tx = dinner(vec![stored(None, "Rice", 2.0, 40.0)]);
        let mut form = TransactionForm::edit(&tx);
        form.description = "Late dinner".to_string();

        let edit = form.validate_edit(Currency::Thb).unwrap();
        assert_eq!(edit.update.description, "Late dinner");
        assert_eq!(edit.items, None);
    }

    #[test]
    fn changed_items_are_replaced_as_a_whole() {
        let tx = dinner(vec![stored(Some(31), "Soup", 1.0, 99.0)]);
        let mut form = TransactionForm::edit(&tx);
        form.items[0].quantity = "2".to_string();
        form.add_item();
        form.items[1].name = "Tea".to_string();

        let edit = form.validate_edit(Currency::Thb).unwrap();
        let items = edit.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].name, "Tea");
    }

    #[test]
    fn stored_items_without_ids_cannot_be_replaced() {
        let with_ids = dinner(vec![
            stored(Some(31), "Soup", 1.0, 99.0),
            stored(Some(32), "Tea", 3.0, 10.0),
        ]);
        assert_eq!(stored_item_ids(&with_ids).unwrap(), vec![31, 32]);
        assert!(stored_item_ids(&dinner(Vec::new())).unwrap().is_empty());

        let without = dinner(vec![
            stored(Some(31), "Soup", 1.0, 99.0),
            stored(None, "Rice", 2.0, 40.0),
        ]);
        assert!(matches!(
            stored_item_ids(&without),
            Err(EngineError::InvalidItem(_))
        ));
        let label = dinner(vec![LineItem::Label("Tea (x3)".to_string())]);
        assert!(stored_item_ids(&label).is_err());
    }

    #[test]
    fn add_form_cannot_produce_an_edit() {
        assert!(filled().validate_edit(Currency::Thb).is_err());
    }
}
