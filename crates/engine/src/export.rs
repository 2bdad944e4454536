//! CSV / JSON export of the visible transaction rows.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use api_types::transaction::TransactionView;
use chrono::NaiveDateTime;
use csv::Writer;
use serde::Serialize;

use crate::{Currency, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    date: &'a str,
    description: &'a str,
    category: &'a str,
    platform: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: String,
    items: String,
}

impl<'a> From<&'a TransactionView> for ExportRow<'a> {
    fn from(tx: &'a TransactionView) -> Self {
        let amount = Money::from_major(tx.amount, Currency::Thb);
        let items = tx
            .items
            .iter()
            .map(|item| item.label())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            id: tx.id,
            date: &tx.date,
            description: tx.description.as_deref().unwrap_or_default(),
            category: tx.category.as_deref().unwrap_or_default(),
            platform: tx.platform.as_deref().unwrap_or_default(),
            kind: tx.transaction_type.as_str(),
            amount: format!("{:.2}", amount.to_major(Currency::Thb)),
            items,
        }
    }
}

/// `transactions-YYYYMMDD-HHMMSS.{csv,json}`.
pub fn export_file_name(now: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "transactions-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Writes `rows` to `out` in the given format.
///
/// CSV columns: `id,date,description,category,platform,type,amount,items`,
/// with line items joined by `; `. JSON is the pretty-printed rows as
/// received from the API.
pub fn export_transactions<W: Write>(
    rows: &[&TransactionView],
    format: ExportFormat,
    out: W,
) -> ResultEngine<()> {
    match format {
        ExportFormat::Csv => {
            let mut writer = Writer::from_writer(out);
            if rows.is_empty() {
                writer.write_record([
                    "id",
                    "date",
                    "description",
                    "category",
                    "platform",
                    "type",
                    "amount",
                    "items",
                ])?;
            }
            for tx in rows {
                writer.serialize(ExportRow::from(*tx))?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, rows)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Exports into `dir` (created if needed) and returns the written path.
pub fn export_to_dir(
    dir: &Path,
    rows: &[&TransactionView],
    format: ExportFormat,
    now: NaiveDateTime,
) -> ResultEngine<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now, format));
    let file = File::create(&path)?;
    export_transactions(rows, format, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported transactions");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use api_types::transaction::{ItemView, LineItem, TransactionType};
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> TransactionView {
        TransactionView {
            id: 12,
            date: "2024-03-15 12:30".to_string(),
            amount: 1234.5,
            category: Some("Food".to_string()),
            description: Some("Lunch, with team".to_string()),
            transaction_type: TransactionType::Expense,
            platform: Some("Grab".to_string()),
            items: vec![
                LineItem::Detailed(ItemView {
                    id: Some(3),
                    name: "Rice".to_string(),
                    quantity: 2.0,
                    unit_price: 40.0,
                    formatted: None,
                }),
                LineItem::Label("Water".to_string()),
            ],
            item_count: 2,
        }
    }

    #[test]
    fn csv_has_fixed_columns() {
        let tx = sample();
        let mut out = Vec::new();
        export_transactions(&[&tx], ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,description,category,platform,type,amount,items")
        );
        assert_eq!(
            lines.next(),
            Some("12,2024-03-15 12:30,\"Lunch, with team\",Food,Grab,expense,1234.50,Rice (x2); Water")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_csv_still_has_header() {
        let mut out = Vec::new();
        export_transactions(&[], ExportFormat::Csv, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,date,description,category,platform,type,amount,items\n"
        );
    }

    #[test]
    fn json_is_an_array_of_rows() {
        let tx = sample();
        let mut out = Vec::new();
        export_transactions(&[&tx], ExportFormat::Json, &mut out).unwrap();
        let parsed: Vec<TransactionView> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, vec![tx]);
    }

    #[test]
    fn file_name_uses_timestamp() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 1)
            .unwrap();
        assert_eq!(
            export_file_name(now, ExportFormat::Csv),
            "transactions-20240305-090701.csv"
        );
        assert_eq!(
            export_file_name(now, ExportFormat::Json),
            "transactions-20240305-090701.json"
        );
    }
}
