//! Report request parsing
//!
//! Generate, export and print all submit the same filter form, either as a
//! query string or as a urlencoded body. This module turns those pairs into
//! a typed request.

use serde_json::Value;

use templeacct_client::{ExportFilters, ExportRequest, GeneralLedgerQuery, IncomeStatementQuery};
use templeacct_config::ReportsConfig;
use templeacct_core::de::bool_from_value;
use templeacct_core::validate::{validate, validate_monthly};
use templeacct_core::{
    DateRange, DateWindow, DisplayType, ExportFormat, ReportDateSelection, ReportFormat, ReportKind, ReportView,
    ValidSelection, ValidationError,
};

use crate::error::ApiError;

/// Raw form or query pairs, in submission order
pub type Params = [(String, String)];

/// Marker field sent by the filter form; absent checkboxes then mean "off"
pub const VIEW_OPTIONS_FIELD: &str = "view_options";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    /// Identifies the page instance for request sequencing
    pub view_id: Option<String>,
    pub selection: ReportDateSelection,
    pub view: ReportView,
    pub display_type: DisplayType,
    pub ledger_ids: Vec<String>,
    pub invoice_type: Option<String>,
    pub fund_id: Option<String>,
    pub export_format: Option<ExportFormat>,
    /// Generate as soon as the page loads (drill-down links)
    pub autoload: bool,
    /// Trial balance expand/collapse clicks since the last generate, oldest first
    pub group_actions: Vec<String>,
}

/// First non-blank value among `keys`
fn value<'a>(params: &'a Params, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        params
            .iter()
            .find(|(k, v)| k == key && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    })
}

fn flag(params: &Params, key: &str, default: bool, explicit: bool) -> Result<bool, ApiError> {
    let present = params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
    match present {
        Some(raw) => bool_from_value(&Value::String(raw.to_string())).ok_or_else(|| ApiError::BadRequest {
            message: format!("Invalid value for {}: {}", key, raw),
        }),
        None if explicit => Ok(false),
        None => Ok(default),
    }
}

fn parsed<T: std::str::FromStr<Err = String>>(params: &Params, keys: &[&str]) -> Result<Option<T>, ApiError> {
    value(params, keys)
        .map(|raw| raw.parse::<T>())
        .transpose()
        .map_err(|message| ApiError::BadRequest { message })
}

/// Comma list kept in order, duplicates included
fn group_actions(params: &Params) -> Vec<String> {
    value(params, &["group_actions"])
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|action| !action.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Ledger ids from `ledger_ids[]`, `ledger_ids` or `ledger_id`, comma lists allowed
fn ledger_ids(params: &Params) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for (_, raw) in params
        .iter()
        .filter(|(k, _)| matches!(k.as_str(), "ledger_ids[]" | "ledger_ids" | "ledger_id"))
    {
        for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

impl ReportRequest {
    pub fn from_params(kind: ReportKind, params: &Params, config: &ReportsConfig) -> Result<Self, ApiError> {
        let selection = if kind.is_point_in_time() {
            ReportDateSelection::single_input(value(params, &["date", "as_on"]).unwrap_or_default())
        } else {
            ReportDateSelection::range_input(
                value(params, &["from_date"]).unwrap_or_default(),
                value(params, &["to_date"]).unwrap_or_default(),
            )
        };

        let mut defaults = ReportView::from_config(config);
        if kind == ReportKind::TrialBalance {
            defaults.expand_all = config.trial_balance_expanded;
        }
        let explicit = params.iter().any(|(k, _)| k == VIEW_OPTIONS_FIELD);
        let view = ReportView {
            show_previous_year: flag(params, "show_previous_year", defaults.show_previous_year, explicit)?,
            show_zero_balances: flag(params, "show_zero_balances", defaults.show_zero_balances, explicit)?,
            format: parsed::<ReportFormat>(params, &["report_format"])?.unwrap_or(defaults.format),
            expand_all: flag(params, "expand_all", defaults.expand_all, explicit)?,
        };

        Ok(Self {
            kind,
            view_id: value(params, &["view_id"]).map(str::to_string),
            selection,
            view,
            display_type: parsed::<DisplayType>(params, &["display_type"])?.unwrap_or_default(),
            ledger_ids: ledger_ids(params),
            invoice_type: value(params, &["invoice_type"]).map(str::to_string),
            fund_id: value(params, &["fund_id"]).map(str::to_string),
            export_format: parsed::<ExportFormat>(params, &["export_format"])?,
            autoload: flag(params, "autoload", false, false)?,
            group_actions: group_actions(params),
        })
    }

    /// The month-by-month income statement also limits the span
    pub fn is_monthly(&self) -> bool {
        self.kind == ReportKind::IncomeStatement && self.display_type == DisplayType::Monthly
    }

    pub fn validate(&self, window: &DateWindow) -> Result<ValidSelection, ValidationError> {
        if self.is_monthly() {
            validate_monthly(&self.selection, window)
        } else {
            validate(&self.selection, window)
        }
    }

    pub fn general_ledger_query(&self, range: DateRange) -> GeneralLedgerQuery {
        GeneralLedgerQuery {
            range,
            ledger_ids: self.ledger_ids.clone(),
            invoice_type: self.invoice_type.clone(),
        }
    }

    pub fn income_statement_query(&self, range: DateRange) -> IncomeStatementQuery {
        IncomeStatementQuery {
            range,
            display_type: self.display_type,
            fund_id: self.fund_id.clone(),
        }
    }

    /// Export body carrying the same filters the report was generated with
    pub fn export_request(&self, valid: &ValidSelection, format: ExportFormat) -> ExportRequest {
        let mut filters = match valid {
            ValidSelection::Single(date) => ExportFilters::as_on(*date, &self.view),
            ValidSelection::Range(range) => ExportFilters::range(*range, &self.view),
        };
        match self.kind {
            ReportKind::GeneralLedger => filters.ledger_ids = self.ledger_ids.clone(),
            ReportKind::IncomeStatement => {
                filters.display_type = Some(self.display_type);
                filters.fund_id = self.fund_id.clone();
            }
            ReportKind::BalanceSheet | ReportKind::TrialBalance => {}
        }
        ExportRequest {
            kind: self.kind,
            format,
            filters,
        }
    }
}

/// Range covered by a validated selection
pub fn selection_range(valid: &ValidSelection) -> DateRange {
    DateRange {
        from: valid.from(),
        to: valid.to(),
    }
}
