//! Report assembly: backend payloads into the sections a page shows
//!
//! Section totals always come from the backend. Assembly only decides which
//! rows appear where.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::fiscal::DateRange;
use crate::models::{AccountGroupNode, LedgerInfo, LedgerReport, PeriodBalances, TrialBalances};
use crate::render::{render, render_forest, DisplayRow, RenderContext};
use crate::reports::{
    BalanceSheetReport, GeneralLedgerReport, IncomeStatement, MonthlyIncomeStatement, MonthlyLine, MonthlyTotals,
    LineCategory, TrialBalanceReport,
};
use crate::types::ReportView;

pub const ASSETS_CODE: &str = "1000";
pub const LIABILITIES_CODE: &str = "2000";
pub const EQUITY_CODE: &str = "3000";
pub const INCOME_CODE: &str = "4000";
pub const EXPENSES_CODE: &str = "5000";

/// One titled block of a report with its backend total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<B> {
    pub code: &'static str,
    pub title: &'static str,
    pub rows: Vec<DisplayRow<B>>,
    pub total: B,
}

impl<B> Section<B> {
    fn empty(code: &'static str, title: &'static str, total: B) -> Self {
        Self {
            code,
            title,
            rows: Vec::new(),
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheetView {
    pub as_on: NaiveDate,
    pub assets: Section<PeriodBalances>,
    pub liabilities: Section<PeriodBalances>,
    pub equity: Section<PeriodBalances>,
}

impl BalanceSheetView {
    pub fn sections(&self) -> [&Section<PeriodBalances>; 3] {
        [&self.assets, &self.liabilities, &self.equity]
    }
}

/// Split the balance sheet roots into Assets, Liabilities and Equity
pub fn assemble_balance_sheet(report: &BalanceSheetReport, view: &ReportView, ctx: &RenderContext) -> BalanceSheetView {
    let mut assets = Section::empty(ASSETS_CODE, "Assets", report.totals.assets.clone());
    let mut liabilities = Section::empty(LIABILITIES_CODE, "Liabilities", report.totals.liabilities.clone());
    let mut equity = Section::empty(EQUITY_CODE, "Equity", report.totals.equity.clone());

    for root in &report.balance_sheet {
        let section = match root.code.as_str() {
            ASSETS_CODE => &mut assets,
            LIABILITIES_CODE => &mut liabilities,
            EQUITY_CODE => &mut equity,
            other => {
                log::warn!("Ignoring balance sheet root '{}' with unknown code '{}'", root.name, other);
                continue;
            }
        };
        section.rows.extend(render(root, 0, view, ctx));
    }

    BalanceSheetView {
        as_on: report.as_on_date,
        assets,
        liabilities,
        equity,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceView {
    pub range: DateRange,
    pub rows: Vec<DisplayRow<TrialBalances>>,
    pub grand_totals: TrialBalances,
    pub is_balanced: bool,
}

pub fn assemble_trial_balance(report: &TrialBalanceReport, view: &ReportView, ctx: &RenderContext) -> TrialBalanceView {
    TrialBalanceView {
        range: DateRange {
            from: report.from_date,
            to: report.to_date,
        },
        rows: render_forest(&report.trial_balance, view, ctx),
        grand_totals: report.grand_totals.clone(),
        is_balanced: report.is_balanced,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerLineKind {
    Opening,
    Entry,
    Closing,
}

/// One row of a general ledger table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    pub kind: LedgerLineKind,
    pub date: Option<NaiveDate>,
    pub entry_code: String,
    pub narration: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

impl LedgerLine {
    fn summary(kind: LedgerLineKind, label: &str, balance: Decimal) -> Self {
        Self {
            kind,
            date: None,
            entry_code: String::new(),
            narration: label.to_string(),
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSection {
    pub ledger: LedgerInfo,
    pub lines: Vec<LedgerLine>,
}

fn flatten_ledger(report: &LedgerReport) -> LedgerSection {
    let mut lines = Vec::with_capacity(report.transactions.len() + 2);
    lines.push(LedgerLine::summary(LedgerLineKind::Opening, "Opening Balance", report.opening_balance));

    let mut running = report.opening_balance;
    for tx in &report.transactions {
        running = tx.running_balance.unwrap_or(running + tx.debit - tx.credit);
        lines.push(LedgerLine {
            kind: LedgerLineKind::Entry,
            date: Some(tx.date),
            entry_code: tx.entry_code.clone(),
            narration: tx.narration.clone(),
            debit: tx.debit,
            credit: tx.credit,
            balance: running,
        });
    }

    lines.push(LedgerLine::summary(LedgerLineKind::Closing, "Closing Balance", report.closing_balance));
    LedgerSection {
        ledger: report.ledger.clone(),
        lines,
    }
}

/// Opening, posting and closing lines per ledger
///
/// Ledgers with nothing to show are dropped unless zero balances are shown.
pub fn flatten_general_ledger(report: &GeneralLedgerReport, view: &ReportView) -> Vec<LedgerSection> {
    report
        .ledger_reports
        .iter()
        .filter(|ledger| view.show_zero_balances || !ledger.is_empty())
        .map(flatten_ledger)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomeStatementView {
    pub income: Section<PeriodBalances>,
    pub expenses: Section<PeriodBalances>,
    pub net_income: Decimal,
    pub previous_net_income: Option<Decimal>,
    /// Whether the section totals carry a backend previous-year figure
    pub has_previous_totals: bool,
}

fn statement_section(
    code: &'static str,
    title: &'static str,
    roots: &[AccountGroupNode],
    total: Decimal,
    previous_total: Option<Decimal>,
    view: &ReportView,
    ctx: &RenderContext,
) -> Section<PeriodBalances> {
    Section {
        code,
        title,
        rows: render_forest(roots, view, ctx),
        total: PeriodBalances::new(total, previous_total.unwrap_or_default()),
    }
}

pub fn assemble_income_statement(statement: &IncomeStatement, view: &ReportView, ctx: &RenderContext) -> IncomeStatementView {
    IncomeStatementView {
        income: statement_section(
            INCOME_CODE,
            "Income",
            &statement.income,
            statement.total_income,
            statement.previous_total_income,
            view,
            ctx,
        ),
        expenses: statement_section(
            EXPENSES_CODE,
            "Expenses",
            &statement.expenses,
            statement.total_expenses,
            statement.previous_total_expenses,
            view,
            ctx,
        ),
        net_income: statement.net_income,
        previous_net_income: statement.previous_net_income,
        has_previous_totals: statement.previous_total_income.is_some() || statement.previous_total_expenses.is_some(),
    }
}

/// Month-by-month income statement grid
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyGrid {
    /// Column headers, e.g. "Apr 2024"
    pub months: Vec<String>,
    pub income: Vec<MonthlyLine>,
    pub expenses: Vec<MonthlyLine>,
    pub totals: MonthlyTotals,
}

pub fn assemble_monthly(statement: &MonthlyIncomeStatement, view: &ReportView) -> MonthlyGrid {
    let keep = |line: &&MonthlyLine| view.show_zero_balances || !line.is_zero();
    let lines_of = |category: LineCategory| -> Vec<MonthlyLine> {
        statement
            .monthly_summary
            .iter()
            .filter(|line| line.category == category)
            .filter(keep)
            .cloned()
            .collect()
    };

    MonthlyGrid {
        months: statement.months.iter().map(|m| month_label(m)).collect(),
        income: lines_of(LineCategory::Income),
        expenses: lines_of(LineCategory::Expenses),
        totals: statement.monthly_totals.clone(),
    }
}

/// `2024-04` as `Apr 2024`; anything else is shown as given
pub fn month_label(raw: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
