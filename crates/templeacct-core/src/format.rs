//! Amount and date formatting for report cells
//!
//! Display only. Nothing here feeds back into validation or totals.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use templeacct_config::CurrencyConfig;
use templeacct_utils::group_thousands;

/// Placeholder printed for amounts that round to zero
pub const ZERO_PLACEHOLDER: &str = "-";

/// Number formatting settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormat {
    pub decimal_places: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub symbol: String,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            symbol: String::new(),
        }
    }
}

impl From<&CurrencyConfig> for AmountFormat {
    fn from(config: &CurrencyConfig) -> Self {
        Self {
            decimal_places: config.decimal_places,
            thousands_separator: config.thousands_separator.clone(),
            decimal_separator: config.decimal_separator.clone(),
            symbol: config.symbol.clone(),
        }
    }
}

impl AmountFormat {
    fn round(&self, value: Decimal) -> Decimal {
        let mut rounded = value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.decimal_places);
        rounded
    }

    /// Absolute value with grouped thousands and fixed decimals
    fn digits(&self, rounded: Decimal) -> String {
        let plain = rounded.abs().to_string();
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (plain.as_str(), None),
        };
        let grouped = group_thousands(int_part, &self.thousands_separator);
        match frac_part {
            Some(frac) => format!("{}{}{}", grouped, self.decimal_separator, frac),
            None => grouped,
        }
    }

    /// `"-"` for zero, `"(1,234.50)"` for negatives, `"1,234.50"` otherwise
    pub fn amount(&self, value: Decimal) -> String {
        let rounded = self.round(value);
        if rounded.is_zero() {
            return ZERO_PLACEHOLDER.to_string();
        }
        let digits = self.digits(rounded);
        if rounded.is_sign_negative() {
            format!("({})", digits)
        } else {
            digits
        }
    }

    /// Like `amount`, with the currency symbol in front of the digits
    pub fn money(&self, value: Decimal) -> String {
        let rounded = self.round(value);
        if rounded.is_zero() {
            return ZERO_PLACEHOLDER.to_string();
        }
        let digits = format!("{}{}", self.symbol, self.digits(rounded));
        if rounded.is_sign_negative() {
            format!("({})", digits)
        } else {
            digits
        }
    }

    /// Absolute value suffixed `Dr` (non-negative) or `Cr` (negative)
    pub fn dr_cr(&self, value: Decimal) -> String {
        let rounded = self.round(value);
        if rounded.is_zero() {
            return ZERO_PLACEHOLDER.to_string();
        }
        let side = if rounded.is_sign_negative() { "Cr" } else { "Dr" };
        format!("{} {}", self.digits(rounded), side)
    }
}

/// Format with two decimals and comma grouping
pub fn format_amount(value: Decimal) -> String {
    AmountFormat::default().amount(value)
}

pub fn format_dr_cr(value: Decimal) -> String {
    AmountFormat::default().dr_cr(value)
}

/// Format a date with a chrono pattern, e.g. `%d %b %Y`
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}

pub fn format_date_range(from: NaiveDate, to: NaiveDate, pattern: &str) -> String {
    format!("{} to {}", format_date(from, pattern), format_date(to, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "-");
        assert_eq!(format_amount(dec("-50")), "(50.00)");
        assert_eq!(format_amount(dec("1234.5")), "1,234.50");
        assert_eq!(format_amount(dec("1234567.891")), "1,234,567.89");
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(format_amount(dec("0.005")), "0.01");
        assert_eq!(format_amount(dec("-0.005")), "(0.01)");
        assert_eq!(format_amount(dec("0.004")), "-");
        assert_eq!(format_amount(dec("2.675")), "2.68");
    }

    #[test]
    fn test_custom_separators_and_symbol() {
        let fmt = AmountFormat {
            decimal_places: 0,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            symbol: "Rs ".to_string(),
        };
        assert_eq!(fmt.amount(dec("1234567.6")), "1.234.568");
        assert_eq!(fmt.money(dec("-1500")), "(Rs 1.500)");

        let fmt = AmountFormat {
            decimal_separator: ",".to_string(),
            thousands_separator: " ".to_string(),
            ..AmountFormat::default()
        };
        assert_eq!(fmt.amount(dec("9876.5")), "9 876,50");
    }

    #[test]
    fn test_from_currency_config() {
        let config = CurrencyConfig {
            symbol: "$".to_string(),
            ..CurrencyConfig::default()
        };
        let fmt = AmountFormat::from(&config);
        assert_eq!(fmt.money(dec("12.3")), "$12.30");
        assert_eq!(fmt.money(Decimal::ZERO), "-");
    }

    #[test]
    fn test_format_dr_cr() {
        assert_eq!(format_dr_cr(dec("1500")), "1,500.00 Dr");
        assert_eq!(format_dr_cr(dec("-250.5")), "250.50 Cr");
        assert_eq!(format_dr_cr(Decimal::ZERO), "-");
    }

    #[test]
    fn test_format_dates() {
        let from = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        assert_eq!(format_date(from, "%d %b %Y"), "01 Apr 2024");
        assert_eq!(format_date_range(from, to, "%Y-%m-%d"), "2024-04-01 to 2024-11-20");
    }

    proptest! {
        #[test]
        fn prop_negatives_mirror_positives(cents in 1i64..10_000_000_000) {
            let value = Decimal::new(cents, 2);
            prop_assert_eq!(format_amount(-value), format!("({})", format_amount(value)));
        }
    }
}
