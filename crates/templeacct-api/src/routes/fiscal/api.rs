//! Fiscal API endpoints - JSON API

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use templeacct_core::fiscal::{resolve_bounds, today};
use templeacct_core::validate::{correct_date, correct_range, parse_date_input, DateField};
use templeacct_core::FiscalSummary;

use crate::error::ApiError;
use crate::AppState;

/// GET /api/fiscal/active-year
pub async fn api_active_year(State(state): State<AppState>) -> Result<Json<FiscalSummary>, ApiError> {
    let year = state.backend.active_year().await?;
    Ok(Json(FiscalSummary::resolve(year, today())))
}

#[derive(Debug, Default, Deserialize)]
pub struct CorrectParams {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

/// Corrected values; inputs that were blank or unparseable are left out
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct CorrectResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    pub warnings: Vec<String>,
}

fn parse(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref().and_then(parse_date_input)
}

/// GET /api/fiscal/correct - clamp edited dates into the active year
pub async fn api_correct(
    State(state): State<AppState>,
    Query(params): Query<CorrectParams>,
) -> Result<Json<CorrectResponse>, ApiError> {
    let year = state.backend.active_year().await?;
    let window = resolve_bounds(&year);
    let mut response = CorrectResponse::default();

    if let Some(date) = parse(&params.date) {
        let corrected = correct_date(DateField::AsOn, date, &window);
        response.date = Some(corrected.value);
        response.warnings.extend(corrected.warning);
    }

    match (parse(&params.from_date), parse(&params.to_date)) {
        (Some(from), Some(to)) => {
            let corrected = correct_range(from, to, &window);
            response.from_date = Some(corrected.from);
            response.to_date = Some(corrected.to);
            response.warnings.extend(corrected.warnings);
        }
        (Some(from), None) => {
            let corrected = correct_date(DateField::From, from, &window);
            response.from_date = Some(corrected.value);
            response.warnings.extend(corrected.warning);
        }
        (None, Some(to)) => {
            let corrected = correct_date(DateField::To, to, &window);
            response.to_date = Some(corrected.value);
            response.warnings.extend(corrected.warning);
        }
        (None, None) => {}
    }

    if !response.warnings.is_empty() {
        log::debug!("Corrected dates: {}", response.warnings.join("; "));
    }
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::testing::{get, test_state};

    #[tokio::test]
    async fn test_active_year_summary() {
        let (status, _, body) = get(test_state(true), "/api/fiscal/active-year").await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["window"]["min"], "2023-04-01");
        assert_eq!(json["window"]["max"], "2024-03-31");
        assert_eq!(json["default_range"]["to"], "2024-03-31");
        assert_eq!(json["year"]["has_closed"], true);
    }

    #[tokio::test]
    async fn test_correct_clamps_into_closed_year() {
        let (_, _, body) = get(test_state(true), "/api/fiscal/correct?from_date=2023-01-15&to_date=2024-06-01").await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["from_date"], "2023-04-01");
        assert_eq!(json["to_date"], "2024-03-31");
        assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
        assert!(json.get("date").is_none());
    }

    #[tokio::test]
    async fn test_correct_pulls_to_up_to_from() {
        let (_, _, body) = get(test_state(false), "/api/fiscal/correct?from_date=2024-08-01&to_date=2024-07-01").await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["to_date"], "2024-08-01");
        assert!(json["warnings"][0].as_str().unwrap().contains("cannot be before the from date"));
    }

    #[tokio::test]
    async fn test_correct_in_range_date_is_untouched() {
        let (_, _, body) = get(test_state(false), "/api/fiscal/correct?date=2024-11-20&to_date=").await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["date"], "2024-11-20");
        assert_eq!(json["warnings"], serde_json::json!([]));
    }
}
