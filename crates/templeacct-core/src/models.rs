//! Core data models for the accounting reports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::de;
use crate::error::{CoreError, CoreResult};

/// Accounting year information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingYear {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: String,
    /// First day of the year (a bare `YYYY-MM` means the 1st)
    #[serde(deserialize_with = "de::month_start")]
    pub from_year_month: NaiveDate,
    /// Last day of the year (a bare `YYYY-MM` means the month's last day)
    #[serde(deserialize_with = "de::month_end")]
    pub to_year_month: NaiveDate,
    /// Year-end closing has run; the year is frozen
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub has_closed: bool,
    /// This is the active year
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub status: bool,
}

impl AccountingYear {
    /// Reject a year whose bounds are inverted
    pub fn ensure_well_formed(&self) -> CoreResult<()> {
        if self.from_year_month > self.to_year_month {
            return Err(CoreError::MalformedResponse {
                message: format!(
                    "accounting year {} starts {} after it ends {}",
                    self.id, self.from_year_month, self.to_year_month
                ),
            });
        }
        Ok(())
    }

    /// Human-readable label, e.g. "2024-04-01 to 2025-03-31 (closed)"
    pub fn label(&self) -> String {
        format!(
            "{} to {}{}",
            self.from_year_month,
            self.to_year_month,
            if self.has_closed { " (closed)" } else { "" }
        )
    }
}

/// Balance record carried by every node of a report tree
pub trait Balances {
    /// True when every amount in the record is zero
    fn is_zero(&self) -> bool;
}

/// Current and previous period balances (balance sheet, income statement)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodBalances {
    #[serde(default, alias = "current", deserialize_with = "de::loose_decimal")]
    pub current_balance: Decimal,
    #[serde(default, alias = "previous", deserialize_with = "de::loose_decimal")]
    pub previous_balance: Decimal,
}

impl PeriodBalances {
    pub fn new(current_balance: Decimal, previous_balance: Decimal) -> Self {
        Self {
            current_balance,
            previous_balance,
        }
    }
}

impl Balances for PeriodBalances {
    fn is_zero(&self) -> bool {
        self.current_balance.is_zero() && self.previous_balance.is_zero()
    }
}

/// Opening, period and closing debit/credit columns of the trial balance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrialBalances {
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub opening_debit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub opening_credit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub period_debit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub period_credit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub closing_debit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub closing_credit: Decimal,
}

impl Balances for TrialBalances {
    fn is_zero(&self) -> bool {
        [
            self.opening_debit,
            self.opening_credit,
            self.period_debit,
            self.period_credit,
            self.closing_debit,
            self.closing_credit,
        ]
        .iter()
        .all(Decimal::is_zero)
    }
}

/// Group node of the chart-of-accounts tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode<B> {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub code: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub name: String,
    /// The group's own aggregate, as computed by the backend
    #[serde(flatten)]
    pub balances: B,
    #[serde(default)]
    pub children: Vec<GroupNode<B>>,
    #[serde(default, alias = "accounts")]
    pub ledgers: Vec<LedgerLeaf<B>>,
}

/// Ledger (leaf account) inside a report tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLeaf<B> {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub code: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub name: String,
    #[serde(flatten)]
    pub balances: B,
}

pub type AccountGroupNode = GroupNode<PeriodBalances>;
pub type TrialBalanceGroup = GroupNode<TrialBalances>;

/// Ledger identity in general ledger reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub code: String,
    #[serde(default, deserialize_with = "de::loose_string")]
    pub name: String,
}

/// One posting line of a general ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    #[serde(deserialize_with = "de::loose_date")]
    pub date: NaiveDate,
    /// Voucher / entry number
    #[serde(default, alias = "voucher_no", alias = "entry_no", deserialize_with = "de::loose_string")]
    pub entry_code: String,
    #[serde(default, alias = "description", deserialize_with = "de::loose_string")]
    pub narration: String,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub debit: Decimal,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub credit: Decimal,
    /// Balance after this line, when the backend supplies it
    #[serde(default, alias = "balance", deserialize_with = "de::loose_decimal_opt")]
    pub running_balance: Option<Decimal>,
}

/// General ledger for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub ledger: LedgerInfo,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub opening_balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
    #[serde(default, deserialize_with = "de::loose_decimal")]
    pub closing_balance: Decimal,
}

impl LedgerReport {
    /// Nothing to show: zero opening, zero closing, no postings
    pub fn is_empty(&self) -> bool {
        self.opening_balance.is_zero() && self.closing_balance.is_zero() && self.transactions.is_empty()
    }
}
