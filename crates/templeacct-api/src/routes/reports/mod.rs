//! Report routes - Generate, export and print the four reports

pub mod api;
pub mod markup;
pub mod page;
pub mod request;

pub use api::{htmx_report_view, report_export, report_print};
pub use page::page_report;
pub use request::ReportRequest;
