//! Numbers behind the summary cards, the category breakdown and the
//! spending trend.

use api_types::summary::{CategorySummary, DashboardData, DateSummary};
use chrono::NaiveDate;

use crate::{Currency, Money, util};

/// Totals shown on the summary cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashboardTotals {
    pub income: Money,
    pub expenses: Money,
    pub balance: Money,
    pub count: usize,
}

impl DashboardTotals {
    /// The server's balance wins unless it is missing or zero; then it is
    /// `income - expenses`.
    pub fn from_dashboard(data: &DashboardData, currency: Currency) -> Self {
        let income = Money::from_major(data.balance.income, currency);
        let expenses = Money::from_major(data.balance.expenses, currency);
        let balance = data
            .balance
            .balance
            .map(|b| Money::from_major(b, currency))
            .filter(|b| !b.is_zero())
            .unwrap_or(income - expenses);
        Self {
            income,
            expenses,
            balance,
            count: data.transactions.len(),
        }
    }
}

/// `#rrggbb` color sent by the API for a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    /// Slate gray used when a category has no usable color.
    pub const FALLBACK: HexColor = HexColor {
        r: 0x94,
        g: 0xa3,
        b: 0xb8,
    };

    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub color: HexColor,
    pub amount: Money,
    pub count: u64,
    /// Share of the positive total, `0.0..=100.0`.
    pub percent: f64,
}

/// One row per category, in server order, with its share of the total.
///
/// Only positive amounts count toward the total; when it is zero every
/// share is `0`.
pub fn category_shares(rows: &[CategorySummary], currency: Currency) -> Vec<CategoryShare> {
    let amounts: Vec<Money> = rows
        .iter()
        .map(|row| Money::from_major(row.amount, currency))
        .collect();
    let total: Money = amounts.iter().copied().filter(|a| a.is_positive()).sum();

    rows.iter()
        .zip(amounts)
        .map(|(row, amount)| {
            let percent = if total.is_zero() || !amount.is_positive() {
                0.0
            } else {
                amount.minor() as f64 * 100.0 / total.minor() as f64
            };
            CategoryShare {
                name: row
                    .category
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                color: row
                    .color
                    .as_deref()
                    .and_then(HexColor::parse)
                    .unwrap_or(HexColor::FALLBACK),
                amount,
                count: row.count,
                percent,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// `DD Mon`, e.g. `05 Mar`.
    pub label: String,
    pub total: Money,
}

/// Daily totals in ascending date order. Rows with an unreadable date are
/// skipped.
pub fn spending_trend(rows: &[DateSummary], currency: Currency) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = rows
        .iter()
        .filter_map(|row| {
            let Some(date) = util::api_date(&row.date) else {
                tracing::debug!(date = %row.date, "skipping trend row with bad date");
                return None;
            };
            Some(TrendPoint {
                date,
                label: date.format("%d %b").to_string(),
                total: Money::from_major(row.total, currency),
            })
        })
        .collect();
    points.sort_by_key(|point| point.date);
    points
}

#[cfg(test)]
mod tests {
    use api_types::summary::Balance;

    use super::*;

    fn summary(category: Option<&str>, amount: f64, color: Option<&str>) -> CategorySummary {
        CategorySummary {
            category: category.map(str::to_string),
            amount,
            count: 1,
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn balance_falls_back_to_income_minus_expenses() {
        let mut data = DashboardData {
            balance: Balance {
                income: 1000.0,
                expenses: 250.25,
                balance: Some(0.0),
            },
            ..DashboardData::default()
        };
        let totals = DashboardTotals::from_dashboard(&data, Currency::Thb);
        assert_eq!(totals.balance, Money::new(74_975));

        data.balance.balance = None;
        assert_eq!(
            DashboardTotals::from_dashboard(&data, Currency::Thb).balance,
            Money::new(74_975)
        );

        data.balance.balance = Some(500.0);
        assert_eq!(
            DashboardTotals::from_dashboard(&data, Currency::Thb).balance,
            Money::new(50_000)
        );
    }

    #[test]
    fn shares_use_positive_total() {
        let rows = [
            summary(Some("Food"), 300.0, Some("#ff0000")),
            summary(Some("Transport"), 100.0, None),
            summary(None, -50.0, Some("bogus")),
        ];
        let shares = category_shares(&rows, Currency::Thb);
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[0].color, HexColor { r: 255, g: 0, b: 0 });
        assert_eq!(shares[1].percent, 25.0);
        assert_eq!(shares[1].color, HexColor::FALLBACK);
        assert_eq!(shares[2].name, "Uncategorized");
        assert_eq!(shares[2].percent, 0.0);
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        let rows = [summary(Some("Food"), 0.0, None)];
        assert_eq!(category_shares(&rows, Currency::Thb)[0].percent, 0.0);
    }

    #[test]
    fn trend_is_sorted_and_labelled() {
        let rows = [
            DateSummary {
                date: "2024-03-15".to_string(),
                total: 80.0,
                count: 2,
            },
            DateSummary {
                date: "2024-03-05".to_string(),
                total: 20.0,
                count: 1,
            },
            DateSummary {
                date: "garbage".to_string(),
                total: 1.0,
                count: 1,
            },
        ];
        let points = spending_trend(&rows, Currency::Thb);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "05 Mar");
        assert_eq!(points[1].label, "15 Mar");
        assert_eq!(points[1].total, Money::new(8_000));
    }
}
