// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A date range has its end before its start.
    InvalidDateRange {
        /// The start date of the invalid range.
        start: Date,
        /// The end date of the invalid range.
        end: Date,
    },
    /// A stay window has its check-out on or before its check-in.
    InvalidStayWindow {
        /// The check-in date.
        check_in: Date,
        /// The check-out date.
        check_out: Date,
    },
    /// A pricing rule failed validation.
    InvalidRule {
        /// The identifier of the offending rule.
        rule_id: i64,
        /// A human-readable description of the violation.
        reason: String,
    },
    /// A property's base rate is negative.
    InvalidBaseRate {
        /// The invalid rate value.
        value: Decimal,
    },
    /// A custom price override is negative.
    InvalidPrice {
        /// The date the price was set for.
        date: Date,
        /// The invalid price value.
        value: Decimal,
    },
    /// A calendar day state string is not recognized.
    InvalidDayState(String),
    /// A suggestion status string is not recognized.
    InvalidSuggestionStatus(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateRange { start, end } => {
                write!(f, "Invalid date range: end {end} is before start {start}")
            }
            Self::InvalidStayWindow {
                check_in,
                check_out,
            } => {
                write!(
                    f,
                    "Invalid stay window: check-out {check_out} must be after check-in {check_in}"
                )
            }
            Self::InvalidRule { rule_id, reason } => {
                write!(f, "Invalid pricing rule {rule_id}: {reason}")
            }
            Self::InvalidBaseRate { value } => {
                write!(f, "Invalid base rate: {value} must not be negative")
            }
            Self::InvalidPrice { date, value } => {
                write!(f, "Invalid price {value} for {date}: must not be negative")
            }
            Self::InvalidDayState(s) => write!(f, "Unknown calendar day state: {s}"),
            Self::InvalidSuggestionStatus(s) => write!(f, "Unknown suggestion status: {s}"),
        }
    }
}

impl std::error::Error for DomainError {}
