//! The module contains the errors the engine can return.
//!
//! The filter derivation itself never fails; errors only come from parsing
//! user input (amounts, dates, months) and from writing exports.
//!
//! - [`InvalidAmount`] for amounts that are empty, malformed or out of range.
//! - [`InvalidDate`] for dates that are not `YYYY-MM-DD` (or `HH:MM` times).
//! - [`MissingField`] for required form fields left empty.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`MissingField`]: EngineError::MissingField
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("\"{0}\" is required")]
    MissingField(String),
    #[error("Invalid item: {0}")]
    InvalidItem(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidItem(a), Self::InvalidItem(b)) => a == b,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
