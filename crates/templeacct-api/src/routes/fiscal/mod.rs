//! Fiscal routes - Active accounting year and live date correction

pub mod api;

pub use api::{api_active_year, api_correct};
