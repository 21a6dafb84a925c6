//! `AccountsBackend` over HTTP/1 with hyper

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use hyper::client::HttpConnector;
use hyper::header::{HeaderMap, HeaderName, ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, StatusCode};

use templeacct_config::BackendConfig;
use templeacct_core::models::AccountingYear;
use templeacct_core::reports::{BalanceSheetReport, ExportFile, GeneralLedgerReport, IncomeStatementReport, TrialBalanceReport};
use templeacct_core::DateRange;

use crate::error::{ClientError, ClientResult};
use crate::query::{disposition_filename, ExportRequest, GeneralLedgerQuery, IncomeStatementQuery, QueryString};
use crate::{decode_active_year, decode_income_statement, AccountsBackend, Envelope};

const ACTIVE_YEAR_PATH: &str = "/accounts/chart-of-accounts/active_year";
const BALANCE_SHEET_PATH: &str = "/accounts/reports/balance-sheet";
const TRIAL_BALANCE_PATH: &str = "/accounts/reports/trial-balance";
const GENERAL_LEDGER_PATH: &str = "/accounts/reports/general-ledger";
const INCOME_STATEMENT_PATH: &str = "/accounts/income-statement";

struct RawResponse {
    headers: HeaderMap,
    body: Bytes,
}

/// Backend client for a plain `http://` base URL
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector>,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone().filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &QueryString) -> String {
        format!("{}{}{}", self.base_url, path, query.build())
    }

    async fn send(&self, method: Method, url: String, body: Option<Vec<u8>>) -> ClientResult<RawResponse> {
        log::debug!("{} {}", method, url);

        let mut builder = Request::builder().method(method).uri(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(bytes) => builder.header(CONTENT_TYPE, "application/json").body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        }
        .map_err(ClientError::transport)?;

        let response = self.client.request(request).await.map_err(ClientError::transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(ClientError::transport)?;

        if !status.is_success() {
            log::warn!("Backend answered {} for {}", status, url);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }
        Ok(RawResponse { headers, body })
    }

    async fn get(&self, path: &str, query: &QueryString) -> ClientResult<Envelope> {
        let response = self.send(Method::GET, self.url(path, query), None).await?;
        Envelope::parse(&response.body)
    }
}

/// Prefer the backend's own `message` for a failed request
fn failure_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unexpected status").to_string())
}

#[async_trait]
impl AccountsBackend for HttpBackend {
    async fn active_year(&self) -> ClientResult<AccountingYear> {
        let envelope = self.get(ACTIVE_YEAR_PATH, &QueryString::new()).await?;
        decode_active_year(envelope)
    }

    async fn balance_sheet(&self, as_on: NaiveDate) -> ClientResult<BalanceSheetReport> {
        let mut query = QueryString::new();
        query.push("date", as_on.format("%Y-%m-%d"));
        self.get(BALANCE_SHEET_PATH, &query).await?.into_data()
    }

    async fn trial_balance(&self, range: DateRange) -> ClientResult<TrialBalanceReport> {
        let mut query = QueryString::new();
        query
            .push("from_date", range.from.format("%Y-%m-%d"))
            .push("to_date", range.to.format("%Y-%m-%d"));
        self.get(TRIAL_BALANCE_PATH, &query).await?.into_data()
    }

    async fn general_ledger(&self, query: &GeneralLedgerQuery) -> ClientResult<GeneralLedgerReport> {
        self.get(GENERAL_LEDGER_PATH, &query.to_query()).await?.into_data()
    }

    async fn income_statement(&self, query: &IncomeStatementQuery) -> ClientResult<IncomeStatementReport> {
        let envelope = self.get(INCOME_STATEMENT_PATH, &query.to_query()).await?;
        decode_income_statement(envelope, query)
    }

    async fn export(&self, request: &ExportRequest) -> ClientResult<ExportFile> {
        let body = serde_json::to_vec(request).map_err(ClientError::decode)?;
        let url = self.url(&request.path(), &QueryString::new());
        let response = self.send(Method::POST, url, Some(body)).await?;

        let header = |name: HeaderName| {
            response
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header(CONTENT_DISPOSITION)
            .and_then(|value| disposition_filename(&value))
            .unwrap_or_else(|| request.fallback_filename());
        let content_type = header(CONTENT_TYPE).unwrap_or_else(|| request.fallback_content_type().to_string());

        log::info!("Exported {} ({} bytes)", filename, response.body.len());
        Ok(ExportFile {
            filename,
            content_type,
            bytes: response.body.to_vec(),
        })
    }
}
