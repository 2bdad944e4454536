use serde::{Deserialize, Serialize};

pub mod envelope {
    use super::*;

    /// Response wrapper shared by every endpoint of the finance API.
    ///
    /// Read endpoints put their payload in `data`; a `success: false` body is
    /// an application-level failure even when the HTTP status is 2xx.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiEnvelope<T> {
        #[serde(default)]
        pub success: bool,
        pub data: Option<T>,
        pub count: Option<u64>,
        pub error: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        #[default]
        Expense,
        Income,
    }

    impl TransactionType {
        /// Wire value used by the API.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Expense => "expense",
                Self::Income => "income",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::Expense => "Expense",
                Self::Income => "Income",
            }
        }

        pub fn toggled(self) -> Self {
            match self {
                Self::Expense => Self::Income,
                Self::Income => Self::Expense,
            }
        }
    }

    /// A purchased line item as stored by the API.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ItemView {
        #[serde(default)]
        pub id: Option<i64>,
        pub name: String,
        #[serde(default = "default_quantity")]
        pub quantity: f64,
        #[serde(default)]
        pub unit_price: f64,
        #[serde(default)]
        pub formatted: Option<String>,
    }

    fn default_quantity() -> f64 {
        1.0
    }

    /// Line items come back either as objects or, from older servers, as
    /// preformatted strings such as `"Milk (x2)"`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum LineItem {
        Detailed(ItemView),
        Label(String),
    }

    impl LineItem {
        pub fn label(&self) -> String {
            match self {
                Self::Detailed(item) => match &item.formatted {
                    Some(formatted) => formatted.clone(),
                    None if item.quantity > 1.0 => {
                        format!("{} (x{})", item.name, item.quantity as i64)
                    }
                    None => item.name.clone(),
                },
                Self::Label(label) => label.clone(),
            }
        }

        pub fn id(&self) -> Option<i64> {
            match self {
                Self::Detailed(item) => item.id,
                Self::Label(_) => None,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]`.
        pub date: String,
        #[serde(default)]
        pub amount: f64,
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub transaction_type: TransactionType,
        #[serde(default)]
        pub platform: Option<String>,
        #[serde(default)]
        pub items: Vec<LineItem>,
        #[serde(default)]
        pub item_count: u32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub description: String,
        pub amount: f64,
        pub category: String,
        pub date: String,
        pub platform: String,
        pub transaction_type: TransactionType,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub description: String,
        pub amount: f64,
        pub category: String,
        pub date: String,
        pub platform: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: i64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ItemNew {
        pub name: String,
        pub quantity: u32,
        pub unit_price: f64,
    }
}

pub mod summary {
    use super::*;
    use crate::{catalog::Category, transaction::TransactionView};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategorySummary {
        #[serde(default)]
        pub category: Option<String>,
        /// `/summary/category` calls it `amount`, the dashboard payload `total`.
        #[serde(default, alias = "total")]
        pub amount: f64,
        #[serde(default)]
        pub count: u64,
        #[serde(default)]
        pub color: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DateSummary {
        pub date: String,
        #[serde(default)]
        pub total: f64,
        #[serde(default)]
        pub count: u64,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Balance {
        #[serde(default)]
        pub income: f64,
        #[serde(default)]
        pub expenses: f64,
        #[serde(default)]
        pub balance: Option<f64>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardData {
        #[serde(default)]
        pub balance: Balance,
        #[serde(default)]
        pub transactions: Vec<TransactionView>,
        #[serde(default)]
        pub category_summary: Vec<CategorySummary>,
        #[serde(default)]
        pub date_summary: Vec<DateSummary>,
        #[serde(default)]
        pub categories: Vec<Category>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i64,
        pub name: String,
        /// `expense` or `income`.
        #[serde(rename = "type", default)]
        pub kind: Option<String>,
        #[serde(default)]
        pub color: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        envelope::ApiEnvelope,
        summary::DashboardData,
        transaction::{LineItem, TransactionView},
    };

    #[test]
    fn line_items_accept_objects_and_strings() {
        let raw = r#"{
            "id": 7,
            "date": "2024-03-15 12:30",
            "amount": 120.5,
            "category": "Food",
            "description": "Lunch",
            "transaction_type": "expense",
            "platform": "Grab",
            "items": [{"name": "Rice", "quantity": 2, "unit_price": 40}, "Water"],
            "item_count": 2
        }"#;
        let tx: TransactionView = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.items.len(), 2);
        assert_eq!(tx.items[0].label(), "Rice (x2)");
        assert_eq!(tx.items[1], LineItem::Label("Water".to_string()));
    }

    #[test]
    fn dashboard_payload_uses_camel_case_keys() {
        let raw = r#"{
            "success": true,
            "data": {
                "balance": {"income": 0, "expenses": 250.0, "balance": -250.0},
                "transactions": [],
                "categorySummary": [{"category": "Food", "total": 250.0, "count": 3}],
                "dateSummary": [{"date": "2024-03-15", "total": 250.0, "count": 3}],
                "categories": []
            }
        }"#;
        let envelope: ApiEnvelope<DashboardData> = serde_json::from_str(raw).unwrap();
        let data = envelope.data.unwrap();
        assert!(envelope.success);
        assert_eq!(data.category_summary[0].amount, 250.0);
        assert_eq!(data.date_summary.len(), 1);
        assert_eq!(data.balance.balance, Some(-250.0));
    }

    #[test]
    fn null_category_is_tolerated() {
        let raw = r#"{"id": 1, "date": "2024-03-01", "amount": 10, "category": null}"#;
        let tx: TransactionView = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.category, None);
        assert!(tx.items.is_empty());
    }
}
