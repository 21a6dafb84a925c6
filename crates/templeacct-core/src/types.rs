//! Basic types shared by the report pages

use serde::{Deserialize, Serialize};
use templeacct_config::ReportsConfig;

pub use templeacct_config::ReportFormat;

/// Transient render options for one generated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportView {
    pub show_previous_year: bool,
    pub show_zero_balances: bool,
    pub format: ReportFormat,
    pub expand_all: bool,
}

impl Default for ReportView {
    fn default() -> Self {
        Self {
            show_previous_year: true,
            show_zero_balances: false,
            format: ReportFormat::Detailed,
            expand_all: true,
        }
    }
}

impl ReportView {
    /// View used when the request supplies no options
    pub fn from_config(config: &ReportsConfig) -> Self {
        Self {
            show_previous_year: config.show_previous_year,
            show_zero_balances: config.show_zero_balances,
            format: config.default_format,
            expand_all: config.expand_all,
        }
    }
}

/// Report pages served by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    BalanceSheet,
    TrialBalance,
    GeneralLedger,
    IncomeStatement,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::BalanceSheet,
        ReportKind::TrialBalance,
        ReportKind::GeneralLedger,
        ReportKind::IncomeStatement,
    ];

    /// URL segment, e.g. `balance-sheet`
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "balance-sheet",
            ReportKind::TrialBalance => "trial-balance",
            ReportKind::GeneralLedger => "general-ledger",
            ReportKind::IncomeStatement => "income-statement",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::BalanceSheet => "Balance Sheet",
            ReportKind::TrialBalance => "Trial Balance",
            ReportKind::GeneralLedger => "General Ledger",
            ReportKind::IncomeStatement => "Income Statement",
        }
    }

    /// Balance sheet reports as on a single date; the rest cover a range
    pub fn is_point_in_time(&self) -> bool {
        matches!(self, ReportKind::BalanceSheet)
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .find(|kind| kind.slug() == s)
            .copied()
            .ok_or_else(|| format!("Unknown report: {}", s))
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Income statement layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    #[default]
    Standard,
    Monthly,
}

impl std::str::FromStr for DisplayType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "" => Ok(DisplayType::Standard),
            "monthly" => Ok(DisplayType::Monthly),
            _ => Err(format!("Invalid display type: {}", s)),
        }
    }
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayType::Standard => write!(f, "standard"),
            DisplayType::Monthly => write!(f, "monthly"),
        }
    }
}

/// Export file formats offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Excel => write!(f, "excel"),
        }
    }
}

/// Severity of a transient notification shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// Transient notification (the "toast")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_slugs_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.slug().parse::<ReportKind>().unwrap(), kind);
        }
        assert!("cash-flow".parse::<ReportKind>().is_err());
        assert!(ReportKind::BalanceSheet.is_point_in_time());
        assert!(!ReportKind::TrialBalance.is_point_in_time());
    }

    #[test]
    fn test_view_from_config() {
        let config = ReportsConfig {
            default_format: ReportFormat::Grouped,
            show_zero_balances: true,
            ..ReportsConfig::default()
        };
        let view = ReportView::from_config(&config);
        assert_eq!(view.format, ReportFormat::Grouped);
        assert!(view.show_zero_balances);
        assert!(view.show_previous_year);
    }

    #[test]
    fn test_export_and_display_parsing() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("csv".parse::<ExportFormat>().is_err());
        assert_eq!("".parse::<DisplayType>().unwrap(), DisplayType::Standard);
        assert_eq!(DisplayType::Monthly.to_string(), "monthly");
    }
}
