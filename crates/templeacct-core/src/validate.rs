//! Submit-time date validation and input-time live correction
//!
//! `validate` gates every report action (generate, export, print). The
//! checks run in a fixed order and the first failure wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fiscal::{months_between, Boundary, DateRange, DateWindow};

/// Most months the monthly income statement allows between the from and to months
pub const MAX_MONTHLY_SPAN: i32 = 11;

/// Machine-readable validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    MissingDate,
    BeforeFiscalStart,
    AfterFiscalEnd,
    EndBeforeStart,
    RangeTooLong,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonCode::MissingDate => write!(f, "MISSING_DATE"),
            ReasonCode::BeforeFiscalStart => write!(f, "BEFORE_FISCAL_START"),
            ReasonCode::AfterFiscalEnd => write!(f, "AFTER_FISCAL_END"),
            ReasonCode::EndBeforeStart => write!(f, "END_BEFORE_START"),
            ReasonCode::RangeTooLong => write!(f, "RANGE_TOO_LONG"),
        }
    }
}

/// Date input a failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    AsOn,
    From,
    To,
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateField::AsOn => write!(f, "as-on"),
            DateField::From => write!(f, "from"),
            DateField::To => write!(f, "to"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a valid {field} date")]
    MissingDate { field: DateField },

    #[error("The {field} date {date} is before the accounting year start ({min})")]
    BeforeFiscalStart { field: DateField, date: NaiveDate, min: NaiveDate },

    #[error("The {field} date {date} is after the closed accounting year end ({max})")]
    AfterFiscalEnd { field: DateField, date: NaiveDate, max: NaiveDate },

    #[error("The to date {to} is before the from date {from}")]
    EndBeforeStart { from: NaiveDate, to: NaiveDate },

    #[error("The monthly view must not exceed 11 months; {from} to {to} spans {months} months")]
    RangeTooLong { from: NaiveDate, to: NaiveDate, months: i32 },
}

impl ValidationError {
    pub fn reason(&self) -> ReasonCode {
        match self {
            ValidationError::MissingDate { .. } => ReasonCode::MissingDate,
            ValidationError::BeforeFiscalStart { .. } => ReasonCode::BeforeFiscalStart,
            ValidationError::AfterFiscalEnd { .. } => ReasonCode::AfterFiscalEnd,
            ValidationError::EndBeforeStart { .. } => ReasonCode::EndBeforeStart,
            ValidationError::RangeTooLong { .. } => ReasonCode::RangeTooLong,
        }
    }
}

/// Raw date selection as submitted; any field may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDateSelection {
    Single { as_on: Option<NaiveDate> },
    Range { from: Option<NaiveDate>, to: Option<NaiveDate> },
}

impl ReportDateSelection {
    /// Build a single-date selection from a form value
    pub fn single_input(as_on: &str) -> Self {
        ReportDateSelection::Single { as_on: parse_date_input(as_on) }
    }

    /// Build a range selection from form values
    pub fn range_input(from: &str, to: &str) -> Self {
        ReportDateSelection::Range {
            from: parse_date_input(from),
            to: parse_date_input(to),
        }
    }
}

/// Selection that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidSelection {
    Single(NaiveDate),
    Range(DateRange),
}

impl ValidSelection {
    /// Start of the selection (the as-on date for single selections)
    pub fn from(&self) -> NaiveDate {
        match self {
            ValidSelection::Single(date) => *date,
            ValidSelection::Range(range) => range.from,
        }
    }

    /// End of the selection (the as-on date for single selections)
    pub fn to(&self) -> NaiveDate {
        match self {
            ValidSelection::Single(date) => *date,
            ValidSelection::Range(range) => range.to,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` form value; blank or malformed input is missing
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Validate a selection against the fiscal window
pub fn validate(selection: &ReportDateSelection, window: &DateWindow) -> Result<ValidSelection, ValidationError> {
    let (from_field, from, to) = match *selection {
        ReportDateSelection::Single { as_on } => {
            let as_on = as_on.ok_or(ValidationError::MissingDate { field: DateField::AsOn })?;
            (DateField::AsOn, as_on, None)
        }
        ReportDateSelection::Range { from, to } => {
            let from = from.ok_or(ValidationError::MissingDate { field: DateField::From })?;
            let to = to.ok_or(ValidationError::MissingDate { field: DateField::To })?;
            (DateField::From, from, Some(to))
        }
    };

    if from < window.min {
        return Err(ValidationError::BeforeFiscalStart { field: from_field, date: from, min: window.min });
    }

    if let Some(max) = window.max {
        if from > max {
            return Err(ValidationError::AfterFiscalEnd { field: from_field, date: from, max });
        }
        if let Some(to) = to {
            if to > max {
                return Err(ValidationError::AfterFiscalEnd { field: DateField::To, date: to, max });
            }
        }
    }

    match to {
        None => Ok(ValidSelection::Single(from)),
        Some(to) if to < from => Err(ValidationError::EndBeforeStart { from, to }),
        Some(to) => Ok(ValidSelection::Range(DateRange { from, to })),
    }
}

/// Validation for the month-by-month income statement
pub fn validate_monthly(selection: &ReportDateSelection, window: &DateWindow) -> Result<ValidSelection, ValidationError> {
    let valid = validate(selection, window)?;
    let months = months_between(valid.from(), valid.to());
    if months > MAX_MONTHLY_SPAN {
        return Err(ValidationError::RangeTooLong {
            from: valid.from(),
            to: valid.to(),
            months,
        });
    }
    Ok(valid)
}

/// A date after live correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub value: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Clamp one edited input into the window, warning when it moved
pub fn correct_date(field: DateField, value: NaiveDate, window: &DateWindow) -> Correction {
    let (clamped, boundary) = window.clamp(value);
    let warning = boundary.map(|b| match b {
        Boundary::Min => format!(
            "The {} date cannot be before the accounting year start; reset to {}",
            field, clamped
        ),
        Boundary::Max => format!(
            "The {} date cannot be after the closed accounting year end; reset to {}",
            field, clamped
        ),
    });
    Correction { value: clamped, warning }
}

/// A from/to pair after live correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeCorrection {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub warnings: Vec<String>,
}

/// Clamp both ends into the window, then pull `to` up to `from` if needed
pub fn correct_range(from: NaiveDate, to: NaiveDate, window: &DateWindow) -> RangeCorrection {
    let from = correct_date(DateField::From, from, window);
    let to = correct_date(DateField::To, to, window);
    let mut warnings: Vec<String> = from.warning.into_iter().chain(to.warning).collect();

    let mut to_value = to.value;
    if to_value < from.value {
        to_value = from.value;
        warnings.push(format!("The to date cannot be before the from date; reset to {}", to_value));
    }

    RangeCorrection { from: from.value, to: to_value, warnings }
}
