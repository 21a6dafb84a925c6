//! Report payloads returned by the accounting backend

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::de;
use crate::models::{AccountGroupNode, LedgerReport, PeriodBalances, TrialBalanceGroup, TrialBalances};

/// Backend-computed section totals of the balance sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    #[serde(default)]
    pub assets: PeriodBalances,
    #[serde(default)]
    pub liabilities: PeriodBalances,
    #[serde(default)]
    pub equity: PeriodBalances,
}

/// `GET /accounts/reports/balance-sheet`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    #[serde(deserialize_with = "de::loose_date")]
    pub as_on_date: NaiveDate,
    #[serde(default)]
    pub balance_sheet: Vec<AccountGroupNode>,
    #[serde(default)]
    pub totals: BalanceSheetTotals,
}

/// `GET /accounts/reports/trial-balance`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    #[serde(default)]
    pub trial_balance: Vec<TrialBalanceGroup>,
    #[serde(default)]
    pub grand_totals: TrialBalances,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub is_balanced: bool,
    #[serde(deserialize_with = "de::loose_date")]
    pub from_date: NaiveDate,
    #[serde(deserialize_with = "de::loose_date")]
    pub to_date: NaiveDate,
}

/// `GET /accounts/reports/general-ledger`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralLedgerReport {
    #[serde(default)]
    pub ledger_reports: Vec<LedgerReport>,
}

/// Standard income statement: income and expense trees with backend totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    #[serde(default, alias = "revenue")]
    pub income: Vec<AccountGroupNode>,
    #[serde(default, alias = "expense")]
    pub expenses: Vec<AccountGroupNode>,
    #[serde(default, alias = "total_revenue", deserialize_with = "de::loose_decimal")]
    pub total_income: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub total_expenses: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub net_income: Decimal,
    /// Previous-year totals, when the backend sends them
    #[serde(default, alias = "previous_total_revenue", deserialize_with = "de::loose_decimal_opt")]
    pub previous_total_income: Option<Decimal>,
    #[serde(default, deserialize_with = "de::loose_decimal_opt")]
    pub previous_total_expenses: Option<Decimal>,
    #[serde(default, deserialize_with = "de::loose_decimal_opt")]
    pub previous_net_income: Option<Decimal>,
}

/// Side of the income statement a monthly line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCategory {
    #[serde(alias = "revenue")]
    Income,
    #[serde(alias = "expense")]
    Expenses,
}

/// One account row of the month-by-month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyLine {
    #[serde(default, deserialize_with = "de::loose_string")]
    pub code: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub name: String,
    pub category: LineCategory,
    /// One amount per entry of `months`
    #[serde(default, deserialize_with = "de::loose_decimal_vec")]
    pub amounts: Vec<Decimal>,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub total: Decimal,
}

impl MonthlyLine {
    pub fn is_zero(&self) -> bool {
        self.total.is_zero() && self.amounts.iter().all(Decimal::is_zero)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    #[serde(default, deserialize_with = "de::loose_decimal_vec")]
    pub income: Vec<Decimal>,
    #[serde(default, deserialize_with = "de::loose_decimal_vec")]
    pub expenses: Vec<Decimal>,
    #[serde(default, deserialize_with = "de::loose_decimal_vec")]
    pub net: Vec<Decimal>,
}

/// Monthly income statement (`display_type=monthly`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyIncomeStatement {
    /// `YYYY-MM` labels, oldest first
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub monthly_summary: Vec<MonthlyLine>,
    #[serde(default)]
    pub monthly_totals: MonthlyTotals,
}

/// Income statement body; the shape depends on the requested display type
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "display_type", rename_all = "lowercase")]
pub enum IncomeStatementData {
    Standard(IncomeStatement),
    Monthly(MonthlyIncomeStatement),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    #[serde(deserialize_with = "de::loose_date")]
    pub from_date: NaiveDate,
    #[serde(deserialize_with = "de::loose_date")]
    pub to_date: NaiveDate,
}

/// `GET /accounts/income-statement`
#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatementReport {
    pub data: IncomeStatementData,
    pub meta: ReportMeta,
}

/// Binary produced by an export endpoint
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
