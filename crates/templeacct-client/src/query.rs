//! Request parameters for the report endpoints

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

use templeacct_core::fiscal::DateRange;
use templeacct_core::types::{DisplayType, ExportFormat, ReportFormat, ReportKind, ReportView};

/// URL query string builder with percent-encoded keys and values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl ToString>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Repeat `key` once per value, e.g. `ledger_ids[]=1&ledger_ids[]=2`
    pub fn push_all<V: ToString>(&mut self, key: &str, values: impl IntoIterator<Item = V>) -> &mut Self {
        for value in values {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `?k=v&...`, or an empty string when there are no pairs
    pub fn build(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", joined)
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Filters for `GET /accounts/reports/general-ledger`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralLedgerQuery {
    pub range: DateRange,
    /// Restrict to these ledgers; empty means all
    pub ledger_ids: Vec<String>,
    pub invoice_type: Option<String>,
}

impl GeneralLedgerQuery {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            ledger_ids: Vec::new(),
            invoice_type: None,
        }
    }

    pub fn to_query(&self) -> QueryString {
        let mut query = QueryString::new();
        query
            .push("from_date", iso(self.range.from))
            .push("to_date", iso(self.range.to))
            .push_all("ledger_ids[]", &self.ledger_ids)
            .push_opt("invoice_type", self.invoice_type.as_deref());
        query
    }
}

/// Filters for `GET /accounts/income-statement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeStatementQuery {
    pub range: DateRange,
    pub display_type: DisplayType,
    pub fund_id: Option<String>,
}

impl IncomeStatementQuery {
    pub fn to_query(&self) -> QueryString {
        let mut query = QueryString::new();
        query
            .push("from_date", iso(self.range.from))
            .push("to_date", iso(self.range.to))
            .push("display_type", self.display_type)
            .push_opt("fund_id", self.fund_id.as_deref());
        query
    }
}

/// JSON body of an export request: the report's filters plus the file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ledger_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<DisplayType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_id: Option<String>,
    pub show_previous_year: bool,
    pub show_zero_balances: bool,
    pub report_format: ReportFormat,
}

impl ExportFilters {
    pub fn as_on(date: NaiveDate, view: &ReportView) -> Self {
        Self::with_view(view, Some(date), None, None)
    }

    pub fn range(range: DateRange, view: &ReportView) -> Self {
        Self::with_view(view, None, Some(range.from), Some(range.to))
    }

    fn with_view(view: &ReportView, date: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            date,
            from_date: from,
            to_date: to,
            ledger_ids: Vec::new(),
            display_type: None,
            fund_id: None,
            show_previous_year: view.show_previous_year,
            show_zero_balances: view.show_zero_balances,
            report_format: view.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRequest {
    #[serde(skip)]
    pub kind: ReportKind,
    pub format: ExportFormat,
    #[serde(flatten)]
    pub filters: ExportFilters,
}

impl ExportRequest {
    /// Backend path of the export endpoint
    pub fn path(&self) -> String {
        match self.kind {
            ReportKind::IncomeStatement => "/accounts/income-statement/export".to_string(),
            kind => format!("/accounts/reports/{}/export", kind.slug()),
        }
    }

    /// Name used when the backend sends no `Content-Disposition` filename
    pub fn fallback_filename(&self) -> String {
        let period = match (self.filters.date, self.filters.from_date, self.filters.to_date) {
            (Some(date), _, _) => iso(date),
            (None, Some(from), Some(to)) => format!("{}_{}", iso(from), iso(to)),
            _ => "report".to_string(),
        };
        format!("{}_{}.{}", self.kind.slug(), period, extension(self.format))
    }

    pub fn fallback_content_type(&self) -> &'static str {
        match self.format {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Pdf => "pdf",
        ExportFormat::Excel => "xlsx",
    }
}

/// Extract the filename from a `Content-Disposition` header
///
/// Prefers the RFC 5987 `filename*=UTF-8''...` form over plain `filename=`.
pub fn disposition_filename(header: &str) -> Option<String> {
    static EXTENDED: OnceCell<Regex> = OnceCell::new();
    static PLAIN: OnceCell<Regex> = OnceCell::new();

    let extended = EXTENDED
        .get_or_try_init(|| Regex::new(r"(?i)filename\*\s*=\s*(?:UTF-8)?''([^;]+)"))
        .ok()?;
    if let Some(caps) = extended.captures(header) {
        let raw = caps.get(1)?.as_str().trim();
        if let Ok(decoded) = urlencoding::decode(raw) {
            return sanitize_filename(&decoded);
        }
    }

    let plain = PLAIN
        .get_or_try_init(|| Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#))
        .ok()?;
    let caps = plain.captures(header)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    sanitize_filename(raw)
}

/// Drop any path components and surrounding whitespace
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
