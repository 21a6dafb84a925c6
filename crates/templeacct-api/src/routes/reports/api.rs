//! Report fragment, export and print endpoints
//!
//! Every action runs the same pipeline: parse the form, fetch the active
//! year, validate the dates against its window, then call the backend.
//! Validation failures stop the pipeline before any report request is made.

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use templeacct_core::fiscal::today;
use templeacct_core::reports::{BalanceSheetReport, GeneralLedgerReport, IncomeStatementReport, TrialBalanceReport};
use templeacct_core::{
    AssetRegistry, CollapseState, CoreError, DateRange, DefaultErrorLogger, ErrorContext, ErrorLogger, FiscalSummary, ReportKind,
    ValidSelection,
};
use templeacct_utils::escape_html;

use crate::error::ApiError;
use crate::routes::reports::markup::{ReportMarkup, Target};
use crate::routes::reports::page::report_page;
use crate::routes::reports::request::{selection_range, Params, ReportRequest};
use crate::{assets, base_html, is_htmx_request, notice_fragment, notice_html, stale_response, AppState};

/// Backend payload of one generated report
#[derive(Debug, Clone)]
pub enum ReportData {
    BalanceSheet(BalanceSheetReport),
    TrialBalance(TrialBalanceReport),
    GeneralLedger(GeneralLedgerReport),
    IncomeStatement(IncomeStatementReport),
}

/// A request that passed validation
pub struct Prepared {
    pub request: ReportRequest,
    pub fiscal: FiscalSummary,
    pub valid: ValidSelection,
}

pub fn parse_kind(kind: &str) -> Result<ReportKind, ApiError> {
    kind.parse::<ReportKind>().map_err(|_| ApiError::NotFound {
        resource: format!("report '{}'", kind),
    })
}

async fn prepare(state: &AppState, kind: ReportKind, params: &Params) -> Result<Prepared, ApiError> {
    let request = ReportRequest::from_params(kind, params, &state.config.reports)?;
    let year = state.backend.active_year().await?;
    let fiscal = FiscalSummary::resolve(year, today());
    let valid = request.validate(&fiscal.window).map_err(|error| {
        log::debug!("Rejected {} request: {} ({})", kind, error, error.reason());
        error
    })?;
    Ok(Prepared { request, fiscal, valid })
}

async fn fetch(state: &AppState, prepared: &Prepared) -> Result<ReportData, ApiError> {
    let backend = &state.backend;
    let range = selection_range(&prepared.valid);
    log::info!("Fetching {} for {} to {}", prepared.request.kind, range.from, range.to);

    let data = match prepared.request.kind {
        ReportKind::BalanceSheet => ReportData::BalanceSheet(backend.balance_sheet(prepared.valid.to()).await?),
        ReportKind::TrialBalance => ReportData::TrialBalance(backend.trial_balance(range).await?),
        ReportKind::GeneralLedger => {
            ReportData::GeneralLedger(backend.general_ledger(&prepared.request.general_ledger_query(range)).await?)
        }
        ReportKind::IncomeStatement => {
            ReportData::IncomeStatement(backend.income_statement(&prepared.request.income_statement_query(range)).await?)
        }
    };
    Ok(data)
}

/// Report tables for fetched data
///
/// Print replays the trial balance toggles the page recorded; a fresh
/// generate starts from the view's default.
pub fn render_report(state: &AppState, prepared: &Prepared, data: &ReportData, target: Target) -> String {
    let markup = ReportMarkup::new(&state.config);
    let view = &prepared.request.view;
    let mut ctx = templeacct_core::RenderContext {
        indent_unit: state.config.reports.indent_px,
        drill: None,
    };

    match data {
        ReportData::BalanceSheet(report) => {
            ctx.drill = Some(DateRange {
                from: prepared.fiscal.window.min,
                to: prepared.valid.to(),
            });
            markup.balance_sheet(report, view, &ctx)
        }
        ReportData::TrialBalance(report) => {
            ctx.drill = Some(selection_range(&prepared.valid));
            let mut collapse = CollapseState::new(view.expand_all);
            if target == Target::Print {
                collapse.replay(&prepared.request.group_actions);
            }
            markup.trial_balance(report, view, &ctx, &collapse, target)
        }
        ReportData::GeneralLedger(report) => markup.general_ledger(report, view),
        ReportData::IncomeStatement(report) => {
            ctx.drill = Some(selection_range(&prepared.valid));
            markup.income_statement(report, view, &ctx)
        }
    }
}

fn report_heading(state: &AppState, prepared: &Prepared) -> String {
    let markup = ReportMarkup::new(&state.config);
    format!(
        r#"<div class='print-header mb-4'><h2 class='text-xl font-bold'>{}</h2><p class='text-sm text-gray-500'>{}</p><p class='text-xs text-gray-400'>Accounting year {}</p></div>"#,
        prepared.request.kind.title(),
        markup.period(&prepared.valid),
        escape_html(&prepared.fiscal.year.label())
    )
}

fn view_id(params: &Params) -> Option<&str> {
    params
        .iter()
        .find(|(k, v)| k == "view_id" && !v.trim().is_empty())
        .map(|(_, v)| v.trim())
}

fn log_failure(error: &ApiError, context: &ErrorContext) {
    let logger = DefaultErrorLogger;
    match error {
        ApiError::Core(CoreError::Validation(validation)) => logger.log_debug(&validation.to_string(), context),
        ApiError::Core(core) => logger.log_error(core, context),
        other => logger.log_warning(&other.to_string(), context),
    }
}

/// Failure of a page-level action
///
/// HTMX requests get the notice retargeted into the page (HTMX only swaps
/// 2xx responses). Plain navigations get the report page again, with the
/// submitted filters kept and the notice shown above the form.
async fn failure_response(
    state: &AppState,
    headers: &HeaderMap,
    kind: &str,
    params: &Params,
    error: ApiError,
    context: &ErrorContext,
) -> Response {
    log_failure(&error, context);
    let notice = error.notice();

    if is_htmx_request(headers) {
        return notice_fragment(&notice);
    }

    let body = match parse_kind(kind) {
        Ok(kind) => report_page(state, &HeaderMap::new(), kind, params, Some(&notice)).await,
        Err(_) => {
            let registry = AssetRegistry::new();
            let _report_css = registry.acquire(assets::REPORT_CSS_HREF);
            crate::page_response(headers, "Not found", "/", &notice_html(&notice), &registry)
        }
    };
    (error.status(), Html(body)).into_response()
}

/// GET /reports/:kind/view - HTMX fragment with the generated report
pub async fn htmx_report_view(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let ticket = view_id(&params).map(|id| state.sequences.issue(id));
    let mut context = ErrorContext::new(format!("{}/view", kind)).with_dates(&params);
    if let Some(ticket) = &ticket {
        context = context.with_view_id(ticket.view_id.clone());
    }

    let outcome = async {
        let prepared = prepare(&state, parse_kind(&kind)?, &params).await?;
        let data = fetch(&state, &prepared).await?;
        Ok::<_, ApiError>((prepared, data))
    }
    .await;

    if let Some(ticket) = &ticket {
        if !state.sequences.is_latest(ticket) {
            log::debug!("Dropping stale {} response for view {} (seq {})", kind, ticket.view_id, ticket.seq);
            return stale_response();
        }
    }

    match outcome {
        Ok((prepared, data)) => {
            let html = format!(
                r#"<div id='notice-area' hx-swap-oob='true'></div>{}{}"#,
                report_heading(&state, &prepared),
                render_report(&state, &prepared, &data, Target::Page)
            );
            Html(html).into_response()
        }
        Err(error) => failure_response(&state, &headers, &kind, &params, error, &context).await,
    }
}

/// POST /reports/:kind/export - proxy the backend's PDF or spreadsheet
pub async fn report_export(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    let context = ErrorContext::new(format!("{}/export", kind)).with_dates(&params);

    let outcome = async {
        let prepared = prepare(&state, parse_kind(&kind)?, &params).await?;
        let format = prepared.request.export_format.ok_or_else(|| ApiError::BadRequest {
            message: "Please choose an export format".to_string(),
        })?;
        let request = prepared.request.export_request(&prepared.valid, format);
        let file = state.backend.export(&request).await?;
        let content_type = header_value(&file.content_type)?;
        let disposition = header_value(&format!("attachment; filename=\"{}\"", file.filename.replace('"', "")))?;
        Ok::<_, ApiError>((content_type, disposition, file.bytes))
    }
    .await;

    match outcome {
        Ok((content_type, disposition, bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
            bytes,
        )
            .into_response(),
        Err(error) => failure_response(&state, &headers, &kind, &params, error, &context).await,
    }
}

/// Header value for the proxied download
fn header_value(raw: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(raw).map_err(|e| {
        ApiError::Core(CoreError::Internal {
            message: format!("export header {:?} is not valid: {}", raw, e),
        })
    })
}

const PRINT_SCRIPT: &str = "window.addEventListener('load', function () { window.print(); });";

/// GET /reports/:kind/print - standalone printable page
pub async fn report_print(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let context = ErrorContext::new(format!("{}/print", kind)).with_dates(&params);

    let outcome = async {
        let prepared = prepare(&state, parse_kind(&kind)?, &params).await?;
        let data = fetch(&state, &prepared).await?;
        Ok::<_, ApiError>((prepared, data))
    }
    .await;

    match outcome {
        Ok((prepared, data)) => {
            let registry = AssetRegistry::new();
            let _report_css = registry.acquire(assets::REPORT_CSS_HREF);
            let _print_css = registry.acquire(assets::PRINT_CSS_HREF);
            let content = format!(
                "{}{}<p class='text-xs mt-6'>Printed on {}</p><script>{}</script>",
                report_heading(&state, &prepared),
                render_report(&state, &prepared, &data, Target::Print),
                today().format("%Y-%m-%d"),
                PRINT_SCRIPT
            );
            Html(base_html(prepared.request.kind.title(), &registry, &content)).into_response()
        }
        Err(error) => failure_response(&state, &headers, &kind, &params, error, &context).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::create_router;
    use crate::testing::{body_string, get, get_htmx, fake_state, FakeBackend};
    use templeacct_core::SequenceRegistry;

    #[tokio::test]
    async fn test_validation_failure_retargets_and_skips_backend() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let (status, headers, body) = get_htmx(state, "/reports/balance-sheet/view?view_id=v1&date=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["HX-Retarget"], "#notice-area");
        assert!(body.contains("Please select a valid as-on date"));
        assert!(body.contains("notice-warning"));
        assert_eq!(backend.calls(), vec!["active_year"]);
    }

    #[tokio::test]
    async fn test_date_after_closed_year_is_rejected() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let (_, _, body) = get_htmx(state, "/reports/trial-balance/view?from_date=2023-04-01&to_date=2024-05-01").await;
        assert!(body.contains("after the closed accounting year end"));
        assert_eq!(backend.calls(), vec!["active_year"]);
    }

    #[tokio::test]
    async fn test_balance_sheet_fragment() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let (status, _, body) = get_htmx(state, "/reports/balance-sheet/view?view_id=v1&date=2024-03-31").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hx-swap-oob='true'"));
        assert!(body.contains("Total Assets"));
        assert!(body.contains("Temple Fund"));
        assert!(body.contains("ledger_ids=11"));
        assert!(body.contains("from_date=2023-04-01&amp;to_date=2024-03-31"));
        assert_eq!(backend.calls(), vec!["active_year", "balance_sheet"]);
    }

    #[tokio::test]
    async fn test_superseded_response_is_dropped() {
        let sequences = Arc::new(SequenceRegistry::default());
        let racing = sequences.clone();
        let backend = FakeBackend::closed_year().on_report(move || {
            racing.issue("v1");
        });
        let (state, _) = fake_state(backend);
        let state = AppState { sequences, ..state };

        let (status, headers, body) = get_htmx(state, "/reports/balance-sheet/view?view_id=v1&date=2024-03-31").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["HX-Reswap"], "none");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_notice() {
        let (state, _) = fake_state(FakeBackend::closed_year().failing("Accounting year is locked"));
        let (status, headers, body) = get_htmx(state, "/reports/trial-balance/view?from_date=2023-04-01&to_date=2024-03-31").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["HX-Retarget"], "#notice-area");
        assert!(body.contains("notice-error"));
        assert!(body.contains("Accounting year is locked"));
    }

    #[tokio::test]
    async fn test_plain_request_failure_renders_page_with_status() {
        let (state, _) = fake_state(FakeBackend::closed_year());
        let (status, _, body) = get(state, "/reports/balance-sheet/view?date=2020-01-01").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("before the accounting year start"));
        assert!(body.contains("value='2020-01-01'"));
    }

    #[test]
    fn test_unusable_export_header_is_internal_error() {
        let err = header_value("application/pdf\nX-Injected: 1").unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Core(CoreError::Internal { .. })));
        assert_eq!(header_value("application/pdf").unwrap(), "application/pdf");
    }

    #[tokio::test]
    async fn test_monthly_span_limit() {
        let (state, backend) = fake_state(FakeBackend::open_year());
        let (_, _, body) = get_htmx(
            state,
            "/reports/income-statement/view?from_date=2024-04-01&to_date=2025-06-30&display_type=monthly",
        )
        .await;
        assert!(body.contains("The monthly view must not exceed 11 months"));
        assert!(body.contains("spans 14 months"));
        assert_eq!(backend.calls(), vec!["active_year"]);
    }

    #[tokio::test]
    async fn test_general_ledger_passes_filters() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let (status, _, body) = get_htmx(
            state,
            "/reports/general-ledger/view?from_date=2023-04-01&to_date=2024-03-31&ledger_ids=11&invoice_type=receipt",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hundi Collections"));
        let query = backend.last_general_ledger().unwrap();
        assert_eq!(query.ledger_ids, vec!["11"]);
        assert_eq!(query.invoice_type.as_deref(), Some("receipt"));
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let (state, _) = fake_state(FakeBackend::closed_year());
        let (status, _, _) = get(state, "/reports/cash-flow/view").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_streams_backend_file() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let request = Request::builder()
            .method("POST")
            .uri("/reports/trial-balance/export")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("from_date=2023-04-01&to_date=2024-03-31&export_format=pdf&view_options=1"))
            .unwrap();
        let response = create_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"trial-balance.pdf\""
        );
        assert_eq!(body_string(response).await, "%PDF-1.4");

        let export = backend.last_export().unwrap();
        assert_eq!(export.filters.from_date.map(|d| d.to_string()).as_deref(), Some("2023-04-01"));
        assert!(!export.filters.show_previous_year);
    }

    #[tokio::test]
    async fn test_export_requires_format() {
        let (state, backend) = fake_state(FakeBackend::closed_year());
        let request = Request::builder()
            .method("POST")
            .uri("/reports/balance-sheet/export")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true")
            .body(Body::from("date=2024-03-31"))
            .unwrap();
        let response = create_router(state).oneshot(request).await.unwrap();
        assert!(body_string(response).await.contains("Please choose an export format"));
        assert!(backend.last_export().is_none());
    }

    #[tokio::test]
    async fn test_print_page() {
        let (state, _) = fake_state(FakeBackend::closed_year());
        let (status, _, body) = get(state, "/reports/balance-sheet/print?date=2024-03-31").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/assets/print.css""#));
        assert!(body.contains("window.print()"));
        assert!(body.contains("Balance Sheet"));
    }

    #[tokio::test]
    async fn test_print_follows_recorded_collapses() {
        let uri = "from_date=2023-04-01&to_date=2024-03-31&view_options=1&expand_all=1&group_actions=g1";

        let (state, _) = fake_state(FakeBackend::closed_year());
        let (_, _, body) = get(state, &format!("/reports/trial-balance/print?{}", uri)).await;
        assert!(body.contains("1000 - Assets"));
        assert!(!body.contains("Cash in Hand"));

        // A fresh generate starts from the expanded default again
        let (state, _) = fake_state(FakeBackend::closed_year());
        let (_, _, body) = get_htmx(state, &format!("/reports/trial-balance/view?{}", uri)).await;
        assert!(body.contains("Cash in Hand"));
        assert!(!body.contains("is-hidden"));
    }
}
