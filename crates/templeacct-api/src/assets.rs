//! Stylesheets served under `/assets`

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub const REPORT_CSS_HREF: &str = "/assets/report.css";
pub const PRINT_CSS_HREF: &str = "/assets/print.css";

const REPORT_CSS: &str = r#"
.report-table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
.report-table th { text-align: left; padding: 0.5rem 0.75rem; background: #f9fafb; border-bottom: 1px solid #e5e7eb; }
.report-table td { padding: 0.4rem 0.75rem; border-bottom: 1px solid #f3f4f6; }
.report-table .amount { text-align: right; font-variant-numeric: tabular-nums; white-space: nowrap; }
.report-table .row-group td { font-weight: 600; }
.report-table .row-ledger td { color: #374151; }
.report-table .row-total td { font-weight: 700; border-top: 2px solid #111827; }
.report-table .row-summary td { font-style: italic; background: #f9fafb; }
.report-table tr.is-hidden { display: none; }
.section-title { font-size: 1.1rem; font-weight: 700; margin: 1.25rem 0 0.5rem; }
.toggle { cursor: pointer; border: none; background: none; width: 1.25rem; color: #4f46e5; }
.empty-state { text-align: center; padding: 3rem 0; color: #6b7280; }
.balanced { color: #047857; }
.unbalanced { color: #b91c1c; }
.notice { padding: 0.75rem 1rem; border-radius: 0.5rem; margin-bottom: 1rem; }
.notice-info { background: #eff6ff; color: #1d4ed8; }
.notice-warning { background: #fffbeb; color: #b45309; }
.notice-error { background: #fef2f2; color: #b91c1c; }
"#;

const PRINT_CSS: &str = r#"
body { background: #fff; color: #000; font-family: serif; margin: 1.5cm; }
.no-print { display: none !important; }
.report-table { width: 100%; border-collapse: collapse; font-size: 10pt; }
.report-table th, .report-table td { padding: 2pt 4pt; border-bottom: 0.5pt solid #999; }
.report-table .amount { text-align: right; }
.report-table tr.is-hidden { display: table-row; }
.print-header { text-align: center; margin-bottom: 12pt; }
@page { size: A4; margin: 1cm; }
"#;

fn lookup(name: &str) -> Option<&'static str> {
    match name {
        "report.css" => Some(REPORT_CSS),
        "print.css" => Some(PRINT_CSS),
        _ => None,
    }
}

pub async fn serve_asset(Path(name): Path<String>) -> Response {
    match lookup(&name) {
        Some(css) => ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
