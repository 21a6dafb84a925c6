//! Report page rendering - Full page endpoints
//!
//! The filter form is pre-filled from the active year: default dates, and
//! `min`/`max` bounds the browser enforces while the user edits.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use templeacct_core::fiscal::today;
use templeacct_core::{
    AssetRegistry, DefaultErrorLogger, DisplayType, ErrorContext, ErrorLogger, FiscalSummary, Notice,
    ReportDateSelection, ReportKind, ReportView,
};
use templeacct_utils::{escape_html, generate_id};

use crate::error::ApiError;
use crate::routes::reports::request::{Params, ReportRequest, VIEW_OPTIONS_FIELD};
use crate::{assets, notice_html, page_response, AppState};

/// Values the form starts with
struct FormValues {
    date: String,
    from_date: String,
    to_date: String,
    view: ReportView,
    display_type: DisplayType,
    ledger_ids: String,
    invoice_type: String,
    fund_id: String,
    autoload: bool,
}

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl FormValues {
    /// Submitted values win; anything missing falls back to the fiscal defaults
    fn resolve(kind: ReportKind, request: Option<&ReportRequest>, fiscal: &FiscalSummary, state: &AppState) -> Self {
        let (as_on, from, to) = match request.map(|r| r.selection) {
            Some(ReportDateSelection::Single { as_on }) => (as_on, None, None),
            Some(ReportDateSelection::Range { from, to }) => (None, from, to),
            None => (None, None, None),
        };
        let mut default_view = ReportView::from_config(&state.config.reports);
        if kind == ReportKind::TrialBalance {
            default_view.expand_all = state.config.reports.trial_balance_expanded;
        }

        Self {
            date: iso(as_on.unwrap_or(fiscal.default_date)),
            from_date: iso(from.unwrap_or(fiscal.default_range.from)),
            to_date: iso(to.unwrap_or(fiscal.default_range.to)),
            view: request.map(|r| r.view).unwrap_or(default_view),
            display_type: request.map(|r| r.display_type).unwrap_or_default(),
            ledger_ids: request.map(|r| r.ledger_ids.join(",")).unwrap_or_default(),
            invoice_type: request.and_then(|r| r.invoice_type.clone()).unwrap_or_default(),
            fund_id: request.and_then(|r| r.fund_id.clone()).unwrap_or_default(),
            autoload: request.map(|r| r.autoload).unwrap_or(false),
        }
    }
}

fn date_input(name: &str, label: &str, value: &str, fiscal: &FiscalSummary) -> String {
    let max = fiscal.window.max_attr();
    let max_attr = if max.is_empty() { String::new() } else { format!(" max='{}'", max) };
    format!(
        r#"<label class='block'><span class='text-sm text-gray-600'>{}</span>
            <input type='date' name='{}' value='{}' min='{}'{} onchange='correctDates(this.form)' class='block border rounded px-2 py-1'></label>"#,
        label,
        name,
        escape_html(value),
        fiscal.window.min_attr(),
        max_attr
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        r#"<label class='inline-flex items-center gap-1 text-sm'><input type='checkbox' name='{}' value='1'{}> {}</label>"#,
        name,
        if checked { " checked" } else { "" },
        label
    )
}

fn select(name: &str, options: &[(&str, &str)], selected: &str) -> String {
    let options: String = options
        .iter()
        .map(|(value, label)| {
            format!(
                "<option value='{}'{}>{}</option>",
                value,
                if *value == selected { " selected" } else { "" },
                label
            )
        })
        .collect();
    format!("<select name='{}' class='border rounded px-2 py-1'>{}</select>", name, options)
}

fn text_input(name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        r#"<label class='block'><span class='text-sm text-gray-600'>{}</span>
            <input type='text' name='{}' value='{}' placeholder='{}' class='block border rounded px-2 py-1'></label>"#,
        label,
        name,
        escape_html(value),
        placeholder
    )
}

/// Submit the form to another action without HTMX intercepting it
const SUBMIT_SCRIPT: &str = r#"<script>
function submitTo(button) {
  const form = button.form;
  const saved = [form.action, form.method, form.target];
  form.action = button.dataset.action;
  form.method = button.dataset.method;
  form.target = button.dataset.target || "_self";
  form.submit();
  [form.action, form.method, form.target] = saved;
}
</script>"#;

fn filter_form(kind: ReportKind, values: &FormValues, fiscal: &FiscalSummary) -> String {
    let slug = kind.slug();
    let dates = if kind.is_point_in_time() {
        date_input("date", "As on", &values.date, fiscal)
    } else {
        format!(
            "{}{}",
            date_input("from_date", "From", &values.from_date, fiscal),
            date_input("to_date", "To", &values.to_date, fiscal)
        )
    };

    let extra = match kind {
        ReportKind::GeneralLedger => format!(
            "{}{}",
            text_input("ledger_ids", "Ledgers", &values.ledger_ids, "all, or ids separated by commas"),
            text_input("invoice_type", "Invoice type", &values.invoice_type, "any")
        ),
        ReportKind::IncomeStatement => format!(
            r#"<label class='block'><span class='text-sm text-gray-600'>Display</span>{}</label>{}"#,
            select(
                "display_type",
                &[("standard", "Standard"), ("monthly", "Month by month")],
                &values.display_type.to_string()
            ),
            text_input("fund_id", "Fund", &values.fund_id, "all funds")
        ),
        ReportKind::BalanceSheet | ReportKind::TrialBalance => String::new(),
    };

    let trigger = if values.autoload { "submit, load" } else { "submit" };
    let format = values.view.format.to_string();

    format!(
        r#"<form id='report-form' class='bg-white rounded-xl shadow-sm p-4 mb-6 no-print'
      hx-get='/reports/{slug}/view' hx-trigger='{trigger}' hx-target='#report-output' hx-swap='innerHTML' hx-indicator='#report-loading'>
    <input type='hidden' name='view_id' value='{view_id}'>
    <input type='hidden' name='{view_options}' value='1'>{group_actions}
    <div class='flex flex-wrap gap-4 items-end mb-4'>
        {dates}
        {extra}
        <label class='block'><span class='text-sm text-gray-600'>Layout</span>{layout}</label>
    </div>
    <div class='flex flex-wrap gap-4 mb-4'>
        {previous}{zero}{expand}
    </div>
    <div class='flex flex-wrap gap-2 items-center'>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded'>Generate</button>
        {export_format}
        <button type='button' class='px-4 py-2 border rounded' data-action='/reports/{slug}/export' data-method='post' onclick='submitTo(this)'>Export</button>
        <button type='button' class='px-4 py-2 border rounded' data-action='/reports/{slug}/print' data-method='get' data-target='_blank' onclick='submitTo(this)'>Print</button>
        <span id='report-loading' class='htmx-indicator text-sm text-gray-500'>Loading...</span>
    </div>
</form>{script}"#,
        slug = slug,
        trigger = trigger,
        view_id = generate_id(),
        view_options = VIEW_OPTIONS_FIELD,
        group_actions = if kind == ReportKind::TrialBalance {
            "\n    <input type='hidden' name='group_actions' value=''>"
        } else {
            ""
        },
        dates = dates,
        extra = extra,
        layout = select(
            "report_format",
            &[("detailed", "Detailed"), ("grouped", "Grouped"), ("condensed", "Condensed")],
            &format
        ),
        previous = checkbox("show_previous_year", "Previous year", values.view.show_previous_year),
        zero = checkbox("show_zero_balances", "Zero balances", values.view.show_zero_balances),
        expand = checkbox("expand_all", "Expand all", values.view.expand_all),
        export_format = select("export_format", &[("pdf", "PDF"), ("excel", "Excel")], "pdf"),
        script = SUBMIT_SCRIPT,
    )
}

/// Full report page; `notice` is shown above the form
///
/// When the active year cannot be fetched the page still renders, with the
/// failure as its notice and no form.
pub async fn report_page(
    state: &AppState,
    headers: &HeaderMap,
    kind: ReportKind,
    params: &Params,
    notice: Option<&Notice>,
) -> String {
    let registry = AssetRegistry::new();
    let _report_css = registry.acquire(assets::REPORT_CSS_HREF);

    let title = kind.title();
    let body = match state.backend.active_year().await {
        Ok(year) => {
            let fiscal = FiscalSummary::resolve(year, today());
            let request = ReportRequest::from_params(kind, params, &state.config.reports).ok();
            let values = FormValues::resolve(kind, request.as_ref(), &fiscal, state);
            format!(
                r#"<p class='text-sm text-gray-500 mb-4'>Accounting year {}</p>
<div id='notice-area'>{}</div>
{}
<div id='report-output' class='bg-white rounded-xl shadow-sm p-6'><div class='empty-state'>Choose the dates and press Generate.</div></div>"#,
                escape_html(&fiscal.year.label()),
                notice.map(notice_html).unwrap_or_default(),
                filter_form(kind, &values, &fiscal)
            )
        }
        Err(error) => {
            let error = ApiError::from(error);
            if let ApiError::Core(core) = &error {
                DefaultErrorLogger.log_error(core, &ErrorContext::new(format!("{}/page", kind)));
            }
            format!(
                r#"<div id='notice-area'>{}</div><p class='text-sm text-gray-500'>Reports need an active accounting year. <a class='text-indigo-600' href='/reports/{}'>Retry</a></p>"#,
                notice_html(&error.notice()),
                kind.slug()
            )
        }
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>{}</h2></div>{}"#,
        title, body
    );
    page_response(headers, title, &format!("/reports/{}", kind.slug()), &inner_content, &registry)
}

/// GET /reports/:kind
pub async fn page_report(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    match kind.parse::<ReportKind>() {
        Ok(kind) => Html(report_page(&state, &headers, kind, &params, None).await).into_response(),
        Err(message) => (StatusCode::NOT_FOUND, Html(notice_html(&Notice::warning(message)))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{get, get_htmx, test_state};

    #[tokio::test]
    async fn test_closed_year_form_is_bounded() {
        let (status, _, body) = get(test_state(true), "/reports/balance-sheet").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("name='date' value='2024-03-31' min='2023-04-01' max='2024-03-31'"));
        assert!(body.contains("name='view_id' value='"));
        assert!(body.contains("hx-trigger='submit'"));
        assert!(body.contains("id='notice-area'"));
    }

    #[tokio::test]
    async fn test_open_year_has_no_max() {
        let (_, _, body) = get(test_state(false), "/reports/trial-balance").await;
        assert!(body.contains("name='group_actions' value=''"));
        assert!(body.contains("name='from_date' value='2024-04-01' min='2024-04-01' onchange"));
        assert!(!body.contains(" max='"));
    }

    #[tokio::test]
    async fn test_drill_down_link_prefills_and_autoloads() {
        let (_, _, body) = get_htmx(
            test_state(true),
            "/reports/general-ledger?from_date=2023-04-01&to_date=2023-09-30&ledger_ids=11&autoload=1",
        )
        .await;
        assert!(!body.contains("<!DOCTYPE html>"));
        assert!(body.contains("name='to_date' value='2023-09-30'"));
        assert!(body.contains("name='ledger_ids' value='11'"));
        assert!(body.contains("hx-trigger='submit, load'"));
    }

    #[tokio::test]
    async fn test_unknown_report_page() {
        let (status, _, _) = get(test_state(true), "/reports/cash-flow").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
