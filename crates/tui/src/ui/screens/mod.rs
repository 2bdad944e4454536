pub mod dashboard;
pub mod filters;
pub mod form;
pub mod transactions;
