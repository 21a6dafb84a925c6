//! Report table markup

use rust_decimal::Decimal;

use templeacct_config::Config;
use templeacct_core::format::{format_date, format_date_range};
use templeacct_core::models::{PeriodBalances, TrialBalances};
use templeacct_core::render::RowKind;
use templeacct_core::reports::{
    BalanceSheetReport, GeneralLedgerReport, IncomeStatementData, IncomeStatementReport, MonthlyIncomeStatement,
    MonthlyLine, TrialBalanceReport,
};
use templeacct_core::sheet::{
    assemble_balance_sheet, assemble_income_statement, assemble_monthly, assemble_trial_balance,
    flatten_general_ledger, LedgerLineKind, LedgerSection, Section,
};
use templeacct_core::{AmountFormat, CollapseState, DisplayRow, RenderContext, ReportFormat, ReportView, ValidSelection};
use templeacct_utils::escape_html;

/// Element id of the trial balance table, used by the expand/collapse buttons
pub const TRIAL_BALANCE_TABLE_ID: &str = "trial-balance-table";

/// Where rendered markup is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Interactive page: collapsed rows stay in the table, hidden by CSS
    Page,
    /// Print view: collapsed rows are left out
    Print,
}

/// Formatting settings for one rendered report
#[derive(Debug, Clone)]
pub struct ReportMarkup {
    pub amounts: AmountFormat,
    pub date_pattern: String,
}

impl ReportMarkup {
    pub fn new(config: &Config) -> Self {
        Self {
            amounts: AmountFormat::from(&config.currency),
            date_pattern: config.dates.display_format.clone(),
        }
    }

    fn date(&self, date: chrono::NaiveDate) -> String {
        format_date(date, &self.date_pattern)
    }

    /// "As on 20 Nov 2024" or "01 Apr 2024 to 20 Nov 2024"
    pub fn period(&self, valid: &ValidSelection) -> String {
        match valid {
            ValidSelection::Single(date) => format!("As on {}", self.date(*date)),
            ValidSelection::Range(range) => format_date_range(range.from, range.to, &self.date_pattern),
        }
    }

    fn amount_cell(&self, value: Decimal) -> String {
        format!("<td class='amount'>{}</td>", self.amounts.amount(value))
    }

    // ==================== Balance Sheet ====================

    pub fn balance_sheet(&self, report: &BalanceSheetReport, view: &ReportView, ctx: &RenderContext) -> String {
        if report.balance_sheet.is_empty() {
            return empty_state();
        }
        let sheet = assemble_balance_sheet(report, view, ctx);
        sheet
            .sections()
            .iter()
            .map(|section| self.period_section(section, view.show_previous_year, view.show_previous_year))
            .collect()
    }

    /// `previous_total` is false when the backend sent no previous-year total;
    /// the footer cell is then left blank
    fn period_section(&self, section: &Section<PeriodBalances>, show_previous: bool, previous_total: bool) -> String {
        let previous_head = if show_previous { "<th class='amount'>Previous Year</th>" } else { "" };
        let rows: String = section.rows.iter().map(|row| self.period_row(row, show_previous)).collect();
        let previous_total = match (show_previous, previous_total) {
            (true, true) => self.amount_cell(section.total.previous_balance),
            (true, false) => "<td></td>".to_string(),
            (false, _) => String::new(),
        };

        format!(
            r#"<h3 class='section-title'>{title}</h3>
<table class='report-table' data-section='{code}'>
    <thead><tr><th>Account</th><th class='amount'>Current</th>{previous_head}</tr></thead>
    <tbody>{rows}</tbody>
    <tfoot><tr class='row-total'><td>Total {title}</td>{current}{previous_total}</tr></tfoot>
</table>"#,
            title = section.title,
            code = section.code,
            previous_head = previous_head,
            rows = rows,
            current = self.amount_cell(section.total.current_balance),
            previous_total = previous_total,
        )
    }

    fn period_row(&self, row: &DisplayRow<PeriodBalances>, show_previous: bool) -> String {
        let previous = if show_previous { self.amount_cell(row.balances.previous_balance) } else { String::new() };
        format!(
            "<tr class='{}'>{}{}{}</tr>",
            row_class(row.kind),
            name_cell(row),
            self.amount_cell(row.balances.current_balance),
            previous
        )
    }

    // ==================== Trial Balance ====================

    pub fn trial_balance(
        &self,
        report: &TrialBalanceReport,
        view: &ReportView,
        ctx: &RenderContext,
        collapse: &CollapseState,
        target: Target,
    ) -> String {
        if report.trial_balance.is_empty() {
            return empty_state();
        }
        let sheet = assemble_trial_balance(report, view, ctx);
        let rows: String = match target {
            Target::Page => sheet.rows.iter().map(|row| self.trial_row(row, collapse)).collect(),
            Target::Print => collapse
                .visible_rows(&sheet.rows)
                .into_iter()
                .map(|row| self.trial_row(row, collapse))
                .collect(),
        };
        let totals = &sheet.grand_totals;
        let (status_class, status) = if sheet.is_balanced {
            ("balanced", "Trial balance is balanced")
        } else {
            ("unbalanced", "Trial balance does not balance")
        };

        format!(
            r#"<div class='flex gap-2 mb-2 no-print'>
    <button type='button' class='px-3 py-1 text-sm border rounded' onclick="setAllGroups('{id}', true)">Expand all</button>
    <button type='button' class='px-3 py-1 text-sm border rounded' onclick="setAllGroups('{id}', false)">Collapse all</button>
</div>
<table class='report-table' id='{id}'>
    <thead>
        <tr><th rowspan='2'>Account</th><th colspan='2' class='amount'>Opening</th><th colspan='2' class='amount'>Period</th><th colspan='2' class='amount'>Closing</th></tr>
        <tr><th class='amount'>Debit</th><th class='amount'>Credit</th><th class='amount'>Debit</th><th class='amount'>Credit</th><th class='amount'>Debit</th><th class='amount'>Credit</th></tr>
    </thead>
    <tbody>{rows}</tbody>
    <tfoot><tr class='row-total'><td>Grand Total</td>{totals}</tr></tfoot>
</table>
<p class='mt-3 font-semibold {status_class}'>{status}</p>"#,
            id = TRIAL_BALANCE_TABLE_ID,
            rows = rows,
            totals = self.trial_cells(totals),
            status_class = status_class,
            status = status,
        )
    }

    fn trial_cells(&self, balances: &TrialBalances) -> String {
        [
            balances.opening_debit,
            balances.opening_credit,
            balances.period_debit,
            balances.period_credit,
            balances.closing_debit,
            balances.closing_credit,
        ]
        .iter()
        .map(|value| self.amount_cell(*value))
        .collect()
    }

    fn trial_row(&self, row: &DisplayRow<TrialBalances>, collapse: &CollapseState) -> String {
        let hidden = if collapse.is_visible(row) { "" } else { " is-hidden" };
        let toggle = if row.kind == RowKind::Group && row.has_children {
            let expanded = collapse.is_expanded(&row.id);
            format!(
                "<button type='button' class='toggle no-print' data-toggle='{}' aria-expanded='{}' onclick='toggleGroup(this)'>{}</button>",
                escape_html(&row.id),
                expanded,
                if expanded { "▾" } else { "▸" }
            )
        } else {
            "<span class='toggle'></span>".to_string()
        };
        format!(
            "<tr class='{}{}' data-ancestors='{}'><td style='padding-left: {}px'>{}{}</td>{}</tr>",
            row_class(row.kind),
            hidden,
            escape_html(&row.ancestors.join(" ")),
            row.indent,
            toggle,
            account_label(row),
            self.trial_cells(&row.balances)
        )
    }

    // ==================== General Ledger ====================

    pub fn general_ledger(&self, report: &GeneralLedgerReport, view: &ReportView) -> String {
        let sections = flatten_general_ledger(report, view);
        if sections.is_empty() {
            return empty_state();
        }
        sections.iter().map(|section| self.ledger_section(section)).collect()
    }

    fn ledger_section(&self, section: &LedgerSection) -> String {
        let rows: String = section
            .lines
            .iter()
            .map(|line| {
                let class = match line.kind {
                    LedgerLineKind::Entry => "row-ledger",
                    LedgerLineKind::Opening | LedgerLineKind::Closing => "row-summary",
                };
                format!(
                    "<tr class='{}'><td>{}</td><td>{}</td><td>{}</td>{}{}<td class='amount'>{}</td></tr>",
                    class,
                    line.date.map(|d| self.date(d)).unwrap_or_default(),
                    escape_html(&line.entry_code),
                    escape_html(&line.narration),
                    self.amount_cell(line.debit),
                    self.amount_cell(line.credit),
                    self.amounts.dr_cr(line.balance)
                )
            })
            .collect();

        let ledger = &section.ledger;
        let title = if ledger.code.is_empty() {
            escape_html(&ledger.name)
        } else {
            format!("{} - {}", escape_html(&ledger.code), escape_html(&ledger.name))
        };

        format!(
            r#"<h3 class='section-title'>{}</h3>
<table class='report-table' data-ledger='{}'>
    <thead><tr><th>Date</th><th>Entry</th><th>Narration</th><th class='amount'>Debit</th><th class='amount'>Credit</th><th class='amount'>Balance</th></tr></thead>
    <tbody>{}</tbody>
</table>"#,
            title,
            escape_html(&ledger.id),
            rows
        )
    }

    // ==================== Income Statement ====================

    pub fn income_statement(&self, report: &IncomeStatementReport, view: &ReportView, ctx: &RenderContext) -> String {
        match &report.data {
            IncomeStatementData::Standard(statement) => {
                if statement.income.is_empty() && statement.expenses.is_empty() {
                    return empty_state();
                }
                let sheet = assemble_income_statement(statement, view, ctx);
                let show_previous = view.show_previous_year;
                let previous_net = match (show_previous, sheet.previous_net_income) {
                    (true, Some(previous)) => format!("<td class='amount'>{}</td>", self.amounts.money(previous)),
                    (true, None) => "<td></td>".to_string(),
                    (false, _) => String::new(),
                };
                format!(
                    r#"{}{}
<table class='report-table'><tbody><tr class='row-total'><td>Net Income</td><td class='amount'>{}</td>{}</tr></tbody></table>"#,
                    self.period_section(&sheet.income, show_previous, sheet.has_previous_totals),
                    self.period_section(&sheet.expenses, show_previous, sheet.has_previous_totals),
                    self.amounts.money(sheet.net_income),
                    previous_net
                )
            }
            IncomeStatementData::Monthly(statement) => self.monthly(statement, view),
        }
    }

    fn monthly(&self, statement: &MonthlyIncomeStatement, view: &ReportView) -> String {
        if statement.monthly_summary.is_empty() {
            return empty_state();
        }
        let grid = assemble_monthly(statement, view);
        let width = grid.months.len();
        let head: String = grid.months.iter().map(|m| format!("<th class='amount'>{}</th>", escape_html(m))).collect();

        let totals_row = |label: &str, values: &[Decimal]| -> String {
            let cells: String = (0..width)
                .map(|i| self.amount_cell(values.get(i).copied().unwrap_or_default()))
                .collect();
            format!("<tr class='row-total'><td>{}</td>{}<td></td></tr>", label, cells)
        };

        let mut body = String::new();
        body.push_str(&format!("<tr class='row-group'><td colspan='{}'>Income</td></tr>", width + 2));
        body.extend(grid.income.iter().map(|line| self.monthly_row(line, width, view.format)));
        body.push_str(&totals_row("Total Income", &grid.totals.income));
        body.push_str(&format!("<tr class='row-group'><td colspan='{}'>Expenses</td></tr>", width + 2));
        body.extend(grid.expenses.iter().map(|line| self.monthly_row(line, width, view.format)));
        body.push_str(&totals_row("Total Expenses", &grid.totals.expenses));
        body.push_str(&totals_row("Net Income", &grid.totals.net));

        format!(
            r#"<div class='overflow-x-auto'><table class='report-table'>
    <thead><tr><th>Account</th>{}<th class='amount'>Total</th></tr></thead>
    <tbody>{}</tbody>
</table></div>"#,
            head, body
        )
    }

    fn monthly_row(&self, line: &MonthlyLine, width: usize, format: ReportFormat) -> String {
        if format == ReportFormat::Condensed {
            return String::new();
        }
        let cells: String = (0..width)
            .map(|i| self.amount_cell(line.amounts.get(i).copied().unwrap_or_default()))
            .collect();
        let label = if line.code.is_empty() {
            escape_html(&line.name)
        } else {
            format!("{} - {}", escape_html(&line.code), escape_html(&line.name))
        };
        format!("<tr class='row-ledger'><td>{}</td>{}{}</tr>", label, cells, self.amount_cell(line.total))
    }
}

fn row_class(kind: RowKind) -> &'static str {
    match kind {
        RowKind::Group => "row-group",
        RowKind::Ledger => "row-ledger",
    }
}

fn account_label<B>(row: &DisplayRow<B>) -> String {
    let name = if row.code.is_empty() {
        escape_html(&row.name)
    } else {
        format!("{} - {}", escape_html(&row.code), escape_html(&row.name))
    };
    match &row.drill_down {
        Some(drill) => format!(
            "<a class='text-indigo-600 hover:underline' href='/reports/general-ledger?from_date={}&amp;to_date={}&amp;ledger_ids={}&amp;autoload=1'>{}</a>",
            drill.range.from.format("%Y-%m-%d"),
            drill.range.to.format("%Y-%m-%d"),
            urlencoding::encode(&drill.ledger_id),
            name
        ),
        None => name,
    }
}

fn name_cell<B>(row: &DisplayRow<B>) -> String {
    format!("<td style='padding-left: {}px'>{}</td>", row.indent + 12, account_label(row))
}

/// Shown instead of a table when the backend returned nothing to list
pub fn empty_state() -> String {
    "<div class='empty-state'>No records found for the selected period.</div>".to_string()
}
