//! Route modules for the report server
//!
//! - reports: report pages, HTMX fragments, export and print
//! - fiscal: active accounting year and live date correction
//! - settings: configuration display
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: fragment, download and JSON endpoints
//! - page.rs: HTMX page rendering

pub mod fiscal;
pub mod reports;
pub mod settings;
