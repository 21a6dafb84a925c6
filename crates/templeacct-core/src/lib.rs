//! Core report logic: fiscal windows, date validation and report rendering

pub mod assets;
pub mod de;
pub mod error;
pub mod fiscal;
pub mod format;
pub mod models;
pub mod render;
pub mod reports;
pub mod sequence;
pub mod sheet;
pub mod types;
pub mod validate;

pub use assets::{AssetLease, AssetRegistry};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use fiscal::{DateRange, DateWindow, FiscalSummary};
pub use format::AmountFormat;
pub use models::{AccountGroupNode, AccountingYear, Balances, GroupNode, LedgerLeaf, PeriodBalances, TrialBalances};
pub use render::{CollapseState, DisplayRow, RenderContext};
pub use sequence::{SequenceRegistry, Ticket};
pub use types::{DisplayType, ExportFormat, Notice, NoticeLevel, ReportFormat, ReportKind, ReportView};
pub use validate::{ReportDateSelection, ValidSelection, ValidationError};
