//! In-memory backend and request helpers for router tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::json;
use tower::ServiceExt;

use templeacct_client::{AccountsBackend, ClientError, ClientResult, ExportRequest, GeneralLedgerQuery, IncomeStatementQuery};
use templeacct_config::Config;
use templeacct_core::models::AccountingYear;
use templeacct_core::reports::{
    BalanceSheetReport, ExportFile, GeneralLedgerReport, IncomeStatement, IncomeStatementData, IncomeStatementReport,
    MonthlyIncomeStatement, ReportMeta, TrialBalanceReport,
};
use templeacct_core::{DateRange, DisplayType};

use crate::{create_router, AppState};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Canned accounting backend that records every call
pub struct FakeBackend {
    year: AccountingYear,
    failure: Option<String>,
    hook: Option<Hook>,
    calls: Mutex<Vec<&'static str>>,
    general_ledger: Mutex<Option<GeneralLedgerQuery>>,
    export: Mutex<Option<ExportRequest>>,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

impl FakeBackend {
    fn with_year(from: NaiveDate, to: NaiveDate, has_closed: bool) -> Self {
        Self {
            year: AccountingYear {
                id: "7".to_string(),
                from_year_month: from,
                to_year_month: to,
                has_closed,
                status: true,
            },
            failure: None,
            hook: None,
            calls: Mutex::new(Vec::new()),
            general_ledger: Mutex::new(None),
            export: Mutex::new(None),
        }
    }

    /// 2023-04-01 to 2024-03-31, closed
    pub fn closed_year() -> Self {
        Self::with_year(ymd(2023, 4, 1), ymd(2024, 3, 31), true)
    }

    /// 2024-04-01 to 2025-03-31, still open
    pub fn open_year() -> Self {
        Self::with_year(ymd(2024, 4, 1), ymd(2025, 3, 31), false)
    }

    /// Every report call fails with `message`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Run `hook` inside every report call, before it answers
    pub fn on_report(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_general_ledger(&self) -> Option<GeneralLedgerQuery> {
        self.general_ledger.lock().unwrap().clone()
    }

    pub fn last_export(&self) -> Option<ExportRequest> {
        self.export.lock().unwrap().clone()
    }

    fn report_call(&self, name: &'static str) -> ClientResult<()> {
        self.calls.lock().unwrap().push(name);
        if let Some(hook) = &self.hook {
            hook();
        }
        match &self.failure {
            Some(message) => Err(ClientError::Unsuccessful { message: message.clone() }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AccountsBackend for FakeBackend {
    async fn active_year(&self) -> ClientResult<AccountingYear> {
        self.calls.lock().unwrap().push("active_year");
        Ok(self.year.clone())
    }

    async fn balance_sheet(&self, as_on: NaiveDate) -> ClientResult<BalanceSheetReport> {
        self.report_call("balance_sheet")?;
        Ok(serde_json::from_value(json!({
            "as_on_date": as_on.to_string(),
            "balance_sheet": [
                {
                    "id": "g1", "code": "1000", "name": "Assets", "current_balance": "1500", "previous_balance": "900",
                    "ledgers": [{ "id": "11", "code": "1101", "name": "Cash in Hand", "current_balance": "1500", "previous_balance": "900" }]
                },
                {
                    "id": "g3", "code": "3000", "name": "Equity", "current_balance": "1500",
                    "ledgers": [{ "id": "31", "code": "3101", "name": "Temple Fund", "current_balance": "1500" }]
                }
            ],
            "totals": {
                "assets": { "current": "1500", "previous": "900" },
                "liabilities": { "current": 0, "previous": 0 },
                "equity": { "current": "1500", "previous": 0 }
            }
        }))
        .unwrap())
    }

    async fn trial_balance(&self, range: DateRange) -> ClientResult<TrialBalanceReport> {
        self.report_call("trial_balance")?;
        Ok(serde_json::from_value(json!({
            "trial_balance": [{
                "id": "g1", "code": "1000", "name": "Assets", "closing_debit": "1500",
                "ledgers": [{ "id": "11", "code": "1101", "name": "Cash in Hand", "closing_debit": "1500" }]
            }],
            "grand_totals": { "closing_debit": "1500", "closing_credit": "1500" },
            "is_balanced": true,
            "from_date": range.from.to_string(),
            "to_date": range.to.to_string()
        }))
        .unwrap())
    }

    async fn general_ledger(&self, query: &GeneralLedgerQuery) -> ClientResult<GeneralLedgerReport> {
        self.report_call("general_ledger")?;
        *self.general_ledger.lock().unwrap() = Some(query.clone());
        Ok(serde_json::from_value(json!({
            "ledger_reports": [{
                "ledger": { "id": 41, "code": "4101", "name": "Hundi Collections" },
                "opening_balance": "0",
                "transactions": [{ "date": "2023-05-02", "entry_code": "RV-3", "narration": "Festival", "credit": "250" }],
                "closing_balance": "-250"
            }]
        }))
        .unwrap())
    }

    async fn income_statement(&self, query: &IncomeStatementQuery) -> ClientResult<IncomeStatementReport> {
        self.report_call("income_statement")?;
        let data = match query.display_type {
            DisplayType::Standard => IncomeStatementData::Standard(
                serde_json::from_value::<IncomeStatement>(json!({
                    "income": [{ "id": "g4", "code": "4000", "name": "Income", "current_balance": "800" }],
                    "expenses": [{ "id": "g5", "code": "5000", "name": "Expenses", "current_balance": "300" }],
                    "total_income": "800",
                    "total_expenses": "300",
                    "net_income": "500"
                }))
                .unwrap(),
            ),
            DisplayType::Monthly => IncomeStatementData::Monthly(
                serde_json::from_value::<MonthlyIncomeStatement>(json!({
                    "months": ["2023-04", "2023-05"],
                    "monthly_summary": [
                        { "code": "4101", "name": "Hundi Collections", "category": "income", "amounts": [100, 150], "total": 250 }
                    ],
                    "monthly_totals": { "income": [100, 150], "expenses": [0, 0], "net": [100, 150] }
                }))
                .unwrap(),
            ),
        };
        Ok(IncomeStatementReport {
            data,
            meta: ReportMeta {
                from_date: query.range.from,
                to_date: query.range.to,
            },
        })
    }

    async fn export(&self, request: &ExportRequest) -> ClientResult<ExportFile> {
        self.report_call("export")?;
        *self.export.lock().unwrap() = Some(request.clone());
        Ok(ExportFile {
            filename: format!("{}.pdf", request.kind.slug()),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        })
    }
}

pub fn fake_state(backend: FakeBackend) -> (AppState, Arc<FakeBackend>) {
    let backend = Arc::new(backend);
    let state = AppState::new(Config::default(), backend.clone());
    (state, backend)
}

pub fn test_state(closed: bool) -> AppState {
    let backend = if closed { FakeBackend::closed_year() } else { FakeBackend::open_year() };
    fake_state(backend).0
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    (status, headers, body_string(response).await)
}

pub async fn get(state: AppState, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

/// GET as HTMX issues it
pub async fn get_htmx(state: AppState, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(
        state,
        Request::builder().uri(uri).header("hx-request", "true").body(Body::empty()).unwrap(),
    )
    .await
}
