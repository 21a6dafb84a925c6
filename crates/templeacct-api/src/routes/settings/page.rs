//! Settings page rendering - Full page endpoints

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use templeacct_core::AssetRegistry;
use templeacct_utils::escape_html;

use crate::AppState;

fn field(label: &str, value: &str) -> String {
    format!(
        "<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>",
        label,
        escape_html(value)
    )
}

fn card(title: &str, fields: &[String]) -> String {
    format!(
        "<div class='bg-white rounded-xl shadow-sm p-6 mb-6'><h3 class='text-lg font-semibold mb-4'>{}</h3><div class='grid grid-cols-2 gap-4'>{}</div></div>",
        title,
        fields.concat()
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = &state.config;
    let reports = &config.reports;
    let currency = &config.currency;

    let inner_content = format!(
        "<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>{}{}{}{}{}",
        card(
            "Server",
            &[
                field("Host", &config.server.host),
                field("Port", &config.server.port.to_string()),
            ]
        ),
        card(
            "Accounting backend",
            &[
                field("Base URL", config.backend_base()),
                field("Token", if config.backend.auth_token.is_some() { "Set" } else { "Not set" }),
            ]
        ),
        card(
            "Report defaults",
            &[
                field("Layout", &reports.default_format.to_string()),
                field("Previous year column", yes_no(reports.show_previous_year)),
                field("Zero balances", yes_no(reports.show_zero_balances)),
                field("Expand groups", yes_no(reports.expand_all)),
                field("Trial balance expanded", yes_no(reports.trial_balance_expanded)),
                field("Indent per level", &format!("{}px", reports.indent_px)),
            ]
        ),
        card(
            "Currency",
            &[
                field("Code", &currency.code),
                field("Symbol", &currency.symbol),
                field("Decimal places", &currency.decimal_places.to_string()),
                field(
                    "Separators",
                    &format!("thousands '{}', decimal '{}'", currency.thousands_separator, currency.decimal_separator)
                ),
            ]
        ),
        card(
            "Display",
            &[
                field("Date format", &config.dates.display_format),
                field("Log level", &config.logging.level),
            ]
        ),
    );

    let registry = AssetRegistry::new();
    Html(crate::page_response(&headers, "Settings", "/settings", &inner_content, &registry))
}

#[cfg(test)]
mod tests {
    use crate::testing::{get, test_state};

    #[tokio::test]
    async fn test_settings_page() {
        let (_, _, body) = get(test_state(true), "/settings").await;
        assert!(body.contains("http://127.0.0.1:8000/api/v1"));
        assert!(body.contains("Not set"));
        assert!(body.contains("USD"));
    }
}
