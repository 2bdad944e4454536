//! Filtering, fetch bookkeeping and view math of the finance dashboard.
//!
//! Nothing in here talks to the network or the terminal: the TUI feeds it
//! API payloads and user input and renders what comes back.

pub use breakdown::{
    CategoryShare, DashboardTotals, HexColor, TrendPoint, category_shares, spending_trend,
};
pub use controller::FilterController;
pub use currency::Currency;
pub use error::EngineError;
pub use export::{ExportFormat, export_file_name, export_to_dir, export_transactions};
pub use fetch::{Consumer, FetchTracker, RequestToken};
pub use filters::{
    CategorySelection, FilterState, PlatformFilter, QueryParams, to_query_params, toggle_category,
};
pub use form::{
    FormField, ItemDraft, ItemField, NewTransaction, TransactionEdit, TransactionForm,
    stored_item_ids,
};
pub use money::Money;
pub use period::{DATE_FORMAT, DateRange, Period, YearMonth, derive_period_range, parse_date_input};
pub use table::{SortColumn, SortDirection, TransactionTable};

mod breakdown;
mod controller;
mod currency;
mod error;
mod export;
mod fetch;
mod filters;
mod form;
mod money;
mod period;
mod table;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
