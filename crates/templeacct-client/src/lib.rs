//! Typed client for the accounting backend's report endpoints
//!
//! Every JSON endpoint answers with the envelope
//! `{ success, data, message?, meta? }`. Decoding happens here, once, into
//! the normalised types of `templeacct-core`; nothing past this crate sees
//! raw backend JSON.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use templeacct_core::de;
use templeacct_core::models::AccountingYear;
use templeacct_core::reports::{
    BalanceSheetReport, ExportFile, GeneralLedgerReport, IncomeStatement, IncomeStatementData, IncomeStatementReport,
    MonthlyIncomeStatement, ReportMeta, TrialBalanceReport,
};
use templeacct_core::types::DisplayType;
use templeacct_core::DateRange;

pub mod error;
pub mod http;
pub mod query;

pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use query::{ExportFilters, ExportRequest, GeneralLedgerQuery, IncomeStatementQuery, QueryString};

/// Backend reference type
pub type BackendRef = Arc<dyn AccountsBackend>;

/// The report endpoints of the accounting backend
#[async_trait]
pub trait AccountsBackend: Send + Sync {
    /// The accounting year whose `status` is active
    async fn active_year(&self) -> ClientResult<AccountingYear>;

    async fn balance_sheet(&self, as_on: NaiveDate) -> ClientResult<BalanceSheetReport>;

    async fn trial_balance(&self, range: DateRange) -> ClientResult<TrialBalanceReport>;

    async fn general_ledger(&self, query: &GeneralLedgerQuery) -> ClientResult<GeneralLedgerReport>;

    async fn income_statement(&self, query: &IncomeStatementQuery) -> ClientResult<IncomeStatementReport>;

    /// Download a rendered PDF or spreadsheet
    async fn export(&self, request: &ExportRequest) -> ClientResult<ExportFile>;
}

fn default_success() -> bool {
    true
}

/// Response envelope shared by all JSON endpoints
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_success", deserialize_with = "de::loose_bool")]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Envelope {
    pub fn parse(body: &[u8]) -> ClientResult<Self> {
        let envelope: Envelope = serde_json::from_slice(body).map_err(ClientError::decode)?;
        if !envelope.success {
            return Err(ClientError::Unsuccessful {
                message: envelope
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "The accounting service reported a failure".to_string()),
            });
        }
        Ok(envelope)
    }

    /// Decode `data` into `T`
    pub fn into_data<T: DeserializeOwned>(self) -> ClientResult<T> {
        serde_json::from_value(self.data).map_err(ClientError::decode)
    }
}

/// `data` of the active-year endpoint, either wrapped in `active_year` or bare
pub fn decode_active_year(envelope: Envelope) -> ClientResult<AccountingYear> {
    let data = match envelope.data {
        Value::Object(mut map) if map.contains_key("active_year") => map.remove("active_year").unwrap_or(Value::Null),
        other => other,
    };
    if data.is_null() {
        return Err(ClientError::Unsuccessful {
            message: "No active accounting year".to_string(),
        });
    }
    let year: AccountingYear = serde_json::from_value(data).map_err(ClientError::decode)?;
    year.ensure_well_formed().map_err(ClientError::decode)?;
    Ok(year)
}

/// `data` of the income statement; its shape follows the requested display type
pub fn decode_income_statement(envelope: Envelope, query: &IncomeStatementQuery) -> ClientResult<IncomeStatementReport> {
    let meta = match envelope.meta.clone() {
        Some(meta) if !meta.is_null() => serde_json::from_value::<ReportMeta>(meta).map_err(ClientError::decode)?,
        _ => ReportMeta {
            from_date: query.range.from,
            to_date: query.range.to,
        },
    };
    let data = match query.display_type {
        DisplayType::Standard => IncomeStatementData::Standard(envelope.into_data::<IncomeStatement>()?),
        DisplayType::Monthly => IncomeStatementData::Monthly(envelope.into_data::<MonthlyIncomeStatement>()?),
    };
    Ok(IncomeStatementReport { data, meta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> Envelope {
        Envelope::parse(value.to_string().as_bytes()).unwrap()
    }

    fn range() -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
        }
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let err = Envelope::parse(br#"{"success": false, "message": "Invalid ledger"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Unsuccessful { ref message } if message == "Invalid ledger"));

        let err = Envelope::parse(br#"{"success": "0", "data": null}"#).unwrap_err();
        assert_eq!(err.to_string(), "The accounting service reported a failure");
    }

    #[test]
    fn test_not_json_is_decode_error() {
        let err = Envelope::parse(b"<html>502</html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn test_active_year_wrapped_and_bare() {
        let year = json!({ "id": 2, "from_year_month": "2024-04", "to_year_month": "2025-03", "has_closed": 0, "status": 1 });

        let wrapped = decode_active_year(envelope(json!({ "success": true, "data": { "active_year": year.clone() } }))).unwrap();
        let bare = decode_active_year(envelope(json!({ "success": true, "data": year }))).unwrap();
        assert_eq!(wrapped, bare);
        assert!(!wrapped.has_closed);
    }

    #[test]
    fn test_missing_active_year() {
        let err = decode_active_year(envelope(json!({ "success": true, "data": { "active_year": null } }))).unwrap_err();
        assert_eq!(err.to_string(), "No active accounting year");
    }

    #[test]
    fn test_inverted_active_year_is_malformed() {
        let err = decode_active_year(envelope(json!({
            "success": 1,
            "data": { "id": 2, "from_year_month": "2025-04-01", "to_year_month": "2024-03-31" }
        })))
        .unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn test_income_statement_by_display_type() {
        let query = IncomeStatementQuery { range: range(), display_type: DisplayType::Monthly, fund_id: None };
        let report = decode_income_statement(
            envelope(json!({
                "success": true,
                "data": { "months": ["2024-04"], "monthly_summary": [], "monthly_totals": {} },
                "meta": { "from_date": "2024-04-01", "to_date": "2024-04-30" }
            })),
            &query,
        )
        .unwrap();
        assert!(matches!(report.data, IncomeStatementData::Monthly(_)));
        assert_eq!(report.meta.to_date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());

        let query = IncomeStatementQuery { display_type: DisplayType::Standard, ..query };
        let report = decode_income_statement(
            envelope(json!({ "success": true, "data": { "income": [], "expenses": [], "net_income": "0" } })),
            &query,
        )
        .unwrap();
        assert!(matches!(report.data, IncomeStatementData::Standard(_)));
        assert_eq!(report.meta.from_date, range().from);
    }
}
