//! HTTP report server with HTMX support
//!
//! `routes::reports` serves the four report pages with their fragments,
//! downloads and print views. `routes::fiscal` answers the form's live date
//! checks, and `routes::settings` shows the running configuration.

pub mod assets;
pub mod error;
pub mod routes;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use templeacct_client::BackendRef;
use templeacct_config::Config;
use templeacct_core::{AssetRegistry, Notice, ReportKind, SequenceRegistry};
use templeacct_utils::escape_html;

pub use error::ApiError;

/// Shared by every handler; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: BackendRef,
    pub sequences: Arc<SequenceRegistry>,
}

impl AppState {
    pub fn new(config: Config, backend: BackendRef) -> Self {
        Self {
            config,
            backend,
            sequences: Arc::new(SequenceRegistry::default()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    use routes::fiscal::{api_active_year, api_correct};
    use routes::reports::{htmx_report_view, page_report, report_export, report_print};
    use routes::settings::{api_settings, page_settings};

    Router::new()
        // JSON
        .route("/api/health", get(health_check))
        .route("/api/settings", get(api_settings))
        .route("/api/fiscal/active-year", get(api_active_year))
        .route("/api/fiscal/correct", get(api_correct))
        .route("/assets/:name", get(assets::serve_asset))
        // Pages
        .route("/", get(index_page))
        .route("/settings", get(page_settings))
        .route("/reports/:kind", get(page_report))
        // Fragments and downloads
        .route("/reports/:kind/view", get(htmx_report_view))
        .route("/reports/:kind/export", post(report_export))
        .route("/reports/:kind/print", get(report_print))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Collapsible groups and live date correction, shared by every report page
const PAGE_SCRIPT: &str = r##"
function refreshGroups(table) {
  const collapsed = new Set(Array.from(table.querySelectorAll("[data-toggle][aria-expanded='false']")).map(b => b.dataset.toggle));
  table.querySelectorAll("tr[data-ancestors]").forEach(tr => {
    const ids = tr.dataset.ancestors.split(" ").filter(Boolean);
    tr.classList.toggle("is-hidden", ids.some(id => collapsed.has(id)));
  });
}
function recordGroupAction(action) {
  const input = document.querySelector("#report-form [name='group_actions']");
  if (input) input.value = input.value ? input.value + "," + action : action;
}
function toggleGroup(btn) {
  recordGroupAction(btn.dataset.toggle);
  const expanded = btn.getAttribute("aria-expanded") !== "true";
  btn.setAttribute("aria-expanded", String(expanded));
  btn.textContent = expanded ? "▾" : "▸";
  refreshGroups(btn.closest("table"));
}
function setAllGroups(tableId, expanded) {
  const table = document.getElementById(tableId);
  if (!table) return;
  recordGroupAction(expanded ? "+all" : "-all");
  table.querySelectorAll("[data-toggle]").forEach(btn => {
    btn.setAttribute("aria-expanded", String(expanded));
    btn.textContent = expanded ? "▾" : "▸";
  });
  refreshGroups(table);
}
document.addEventListener("htmx:afterSwap", e => {
  if (e.detail.target.id !== "report-output") return;
  const input = document.querySelector("#report-form [name='group_actions']");
  if (input) input.value = "";
});
function correctDates(form) {
  const names = ["date", "from_date", "to_date"];
  const params = new URLSearchParams();
  names.forEach(n => { const el = form.elements[n]; if (el && el.value) params.set(n, el.value); });
  fetch("/api/fiscal/correct?" + params.toString())
    .then(r => r.ok ? r.json() : null)
    .then(data => {
      if (!data) return;
      names.forEach(n => { if (data[n] && form.elements[n]) form.elements[n].value = data[n]; });
      const area = document.getElementById("notice-area");
      if (!area) return;
      area.innerHTML = "";
      (data.warnings || []).forEach(w => {
        const div = document.createElement("div");
        div.className = "notice notice-warning";
        div.setAttribute("role", "alert");
        div.textContent = w;
        area.appendChild(div);
      });
    });
}
"##;

/// Base HTML template; links every stylesheet with a live lease
pub fn base_html(title: &str, assets: &AssetRegistry, content: &str) -> String {
    let stylesheets: String = assets
        .loaded()
        .iter()
        .map(|href| format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(href)))
        .collect::<Vec<_>>()
        .join("\n    ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Temple Accounts</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    {}
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
    <script>{}</script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        stylesheets,
        PAGE_SCRIPT,
        content
    )
}

/// Links to every report, with the current page highlighted
pub fn nav_sidebar(current_path: &str) -> String {
    let mut links: Vec<(String, &str)> = vec![("/".to_string(), "Reports")];
    links.extend(ReportKind::ALL.iter().map(|kind| (format!("/reports/{}", kind.slug()), kind.title())));
    links.push(("/settings".to_string(), "Settings"));

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Temple Accounts</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label) in &links {
        let is_active = if path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path.as_str())
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'><span>{}</span></a></li>"#,
            path, active_class, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// HTMX sets `HX-Request` on every request it issues
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str, assets: &AssetRegistry) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, assets, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0 no-print'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Notification markup for the notice area
pub fn notice_html(notice: &Notice) -> String {
    format!(
        r#"<div class='notice notice-{}' role='alert'>{}</div>"#,
        notice.level,
        escape_html(&notice.message)
    )
}

/// HTMX response that lands in `#notice-area` whatever the request targeted
pub fn notice_fragment(notice: &Notice) -> Response {
    (
        [("HX-Retarget", "#notice-area"), ("HX-Reswap", "innerHTML")],
        Html(notice_html(notice)),
    )
        .into_response()
}

/// Response to a request that was superseded while it was in flight
pub fn stale_response() -> Response {
    (StatusCode::NO_CONTENT, [("HX-Reswap", "none")]).into_response()
}

/// Index page listing the reports
async fn index_page(headers: HeaderMap) -> Html<String> {
    let registry = AssetRegistry::new();
    let _report_css = registry.acquire(assets::REPORT_CSS_HREF);

    let cards: String = ReportKind::ALL
        .iter()
        .map(|kind| {
            let scope = if kind.is_point_in_time() { "As on a single date" } else { "For a date range" };
            format!(
                r#"<a href='/reports/{}' class='block bg-white rounded-xl shadow-sm p-6 hover:shadow-md'><h3 class='text-lg font-semibold'>{}</h3><p class='text-sm text-gray-500'>{}</p></a>"#,
                kind.slug(),
                kind.title(),
                scope
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Reports</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 gap-4'>{}</div>"#,
        cards
    );

    Html(page_response(&headers, "Reports", "/", &inner_content, &registry))
}

/// Serve until the listener fails
pub async fn start_server(config: Config, backend: BackendRef) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let backend_url = config.backend_base().to_string();
    let router = create_router(AppState::new(config, backend));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting report server on http://{}", addr);
    log::info!("Accounting backend: {}", backend_url);
    log::info!("Available routes:");
    log::info!("  - / (Report index)");
    for kind in ReportKind::ALL {
        log::info!("  - /reports/{} ({})", kind.slug(), kind.title());
    }
    log::info!("  - /settings (Configuration)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
