// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! DTOs are distinct from domain types and represent the API contract;
//! handlers translate between the two at the boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use stayrate_domain::{SuggestionFactor, SuggestionStatus};
use thiserror::Error;
use time::{Date, Month, OffsetDateTime};

/// Failure to parse a `YYYY-MM` month query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    /// The value did not split into a year and a month part.
    #[error("Expected YYYY-MM, got '{0}'")]
    Malformed(String),
    /// The year part was not a number.
    #[error("Invalid year in '{0}'")]
    InvalidYear(String),
    /// The month part was not in 1-12.
    #[error("Invalid month in '{0}'")]
    InvalidMonth(String),
}

/// A calendar month, parsed from the `YYYY-MM` query form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month.
    pub month: Month,
}

impl YearMonth {
    /// Returns the first and last date of the month.
    #[must_use]
    pub fn bounds(&self) -> Option<(Date, Date)> {
        let first: Date = Date::from_calendar_date(self.year, self.month, 1).ok()?;
        let last_day: u8 = time::util::days_in_month(self.month, self.year);
        let last: Date = Date::from_calendar_date(self.year, self.month, last_day).ok()?;
        Some((first, last))
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_part, month_part) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError::Malformed(s.to_string()))?;
        let year: i32 = year_part
            .parse()
            .map_err(|_| MonthParseError::InvalidYear(s.to_string()))?;
        let month_num: u8 = month_part
            .parse()
            .map_err(|_| MonthParseError::InvalidMonth(s.to_string()))?;
        let month: Month =
            Month::try_from(month_num).map_err(|_| MonthParseError::InvalidMonth(s.to_string()))?;
        Ok(Self { year, month })
    }
}

/// API request to register a property's pricing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePropertyRequest {
    /// The property identifier.
    pub property_id: i64,
    /// The base nightly rate.
    pub base_rate: Decimal,
    /// Optional property-level price floor.
    pub minimum_price: Option<Decimal>,
    /// Minor-unit digits of the property's currency (defaults to 2).
    pub minor_units: Option<u32>,
}

/// API response for a successful property registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePropertyResponse {
    /// The registered property identifier.
    pub property_id: i64,
    /// A success message.
    pub message: String,
}

/// One date of a calendar response: state and effective price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDayInfo {
    /// The date.
    pub date: Date,
    /// The availability state (`available`, `blocked`, or `booked`).
    pub state: String,
    /// The resolved nightly price.
    pub price: Decimal,
    /// Where the price came from (`base_rate`, `custom_override`, or
    /// `rules`).
    pub source: String,
    /// The block reason, when blocked.
    pub block_reason: Option<String>,
}

/// API response for the calendar overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCalendarResponse {
    /// The property queried.
    pub property_id: i64,
    /// One entry per date in the requested range, in order.
    pub days: Vec<CalendarDayInfo>,
}

/// API response for month pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMonthPricingResponse {
    /// The property queried.
    pub property_id: i64,
    /// The queried month in `YYYY-MM` form.
    pub month: String,
    /// One entry per date of the month, in order.
    pub days: Vec<CalendarDayInfo>,
}

/// A contiguous blocked range in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRangeInfo {
    /// The first blocked date.
    pub start_date: Date,
    /// The last blocked date (inclusive).
    pub end_date: Date,
    /// The block reason shared by the run, if any.
    pub reason: Option<String>,
}

/// API response listing a property's blocked ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlockedDatesResponse {
    /// The property queried.
    pub property_id: i64,
    /// Coalesced blocked ranges, in date order.
    pub ranges: Vec<BlockedRangeInfo>,
}

/// API request to block a single date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDatesRequest {
    /// First date to block.
    pub start_date: Date,
    /// Last date to block (inclusive).
    pub end_date: Date,
    /// Optional reason recorded on every blocked day.
    pub reason: Option<String>,
}

/// API request to unblock a single date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnblockDatesRequest {
    /// First date to unblock.
    pub start_date: Date,
    /// Last date to unblock (inclusive).
    pub end_date: Date,
}

/// One range of a bulk block request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkBlockRange {
    /// First date to block.
    pub start_date: Date,
    /// Last date to block (inclusive).
    pub end_date: Date,
    /// Optional reason for this range.
    pub reason: Option<String>,
}

/// API request to block several ranges atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkBlockRequest {
    /// The ranges to block; all of them or none are applied.
    pub dates: Vec<BulkBlockRange>,
}

/// One range of a bulk unblock request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUnblockRange {
    /// First date to unblock.
    pub start_date: Date,
    /// Last date to unblock (inclusive).
    pub end_date: Date,
}

/// API request to unblock several ranges atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUnblockRequest {
    /// The ranges to unblock; all of them or none are applied.
    pub dates: Vec<BulkUnblockRange>,
}

/// API response for a calendar mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMutationResponse {
    /// The property mutated.
    pub property_id: i64,
    /// Number of dates the mutation covered.
    pub dates_affected: u32,
    /// A success message.
    pub message: String,
}

/// One per-date price of a custom pricing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPriceEntry {
    /// The date to override.
    pub date: Date,
    /// The nightly price for that date.
    pub price: Decimal,
}

/// API request to set custom per-date prices atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCustomPricingRequest {
    /// The overrides to set; all of them or none are applied.
    pub pricing: Vec<CustomPriceEntry>,
}

/// API request to generate a price suggestion for a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestPriceRequest {
    /// First date of the window.
    pub start_date: Date,
    /// Last date of the window (inclusive).
    pub end_date: Date,
    /// Average nightly price of comparable listings, when known.
    pub market_average_price: Option<Decimal>,
    /// Number of comparable listings behind the average.
    #[serde(default)]
    pub competitor_count: u32,
    /// Recent occupancy rate, 0-1; derived from the calendar when absent.
    pub occupancy_rate: Option<f64>,
    /// Historical occupancy baseline, 0-1.
    pub historical_occupancy: Option<f64>,
    /// Externally supplied demand score, 0-1.
    pub demand_score: Option<f64>,
    /// Trailing average nightly price, when known.
    pub historical_price: Option<Decimal>,
    /// Days of history behind the trailing signals.
    #[serde(default)]
    pub history_window_days: u32,
}

/// A contributing signal in a suggestion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionFactorInfo {
    /// The signal name.
    pub name: String,
    /// The weight applied to the signal.
    pub weight: f64,
    /// The normalized observed value.
    pub value: f64,
}

impl From<SuggestionFactor> for SuggestionFactorInfo {
    fn from(factor: SuggestionFactor) -> Self {
        Self {
            name: factor.name,
            weight: factor.weight,
            value: factor.value,
        }
    }
}

/// API response carrying a price suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestionResponse {
    /// The suggestion identifier.
    pub id: i64,
    /// The property the suggestion targets.
    pub property_id: i64,
    /// First date of the window.
    pub start_date: Date,
    /// Last date of the window (inclusive).
    pub end_date: Date,
    /// The current effective nightly price over the window.
    pub current_price: Decimal,
    /// The suggested nightly price.
    pub suggested_price: Decimal,
    /// Lower bound of the recommendation band.
    pub min_recommended_price: Decimal,
    /// Upper bound of the recommendation band.
    pub max_recommended_price: Decimal,
    /// Evidence measure in 0-1.
    pub confidence_score: f64,
    /// Ordered contributing signals.
    pub factors: Vec<SuggestionFactorInfo>,
    /// Lifecycle status.
    pub status: String,
    /// The scoring formula that produced this suggestion.
    pub model_version: String,
    /// When the suggestion was generated.
    pub created_at: OffsetDateTime,
    /// When the suggestion stops being actionable.
    pub expires_at: OffsetDateTime,
}

/// How an accepted suggestion should be materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyAs {
    /// Convert into a date-ranged pricing rule.
    Rule,
    /// Convert into per-date custom price overrides.
    Override,
}

/// API request to accept a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptSuggestionRequest {
    /// How the suggestion is converted into pricing state.
    pub apply_as: ApplyAs,
}

impl PriceSuggestionResponse {
    /// Builds the response from a stored suggestion.
    #[must_use]
    pub fn from_suggestion(suggestion: stayrate_domain::PriceSuggestion) -> Self {
        let status: SuggestionStatus = suggestion.status;
        Self {
            id: suggestion.id,
            property_id: suggestion.property_id.value(),
            start_date: suggestion.start_date,
            end_date: suggestion.end_date,
            current_price: suggestion.current_price,
            suggested_price: suggestion.suggested_price,
            min_recommended_price: suggestion.min_recommended_price,
            max_recommended_price: suggestion.max_recommended_price,
            confidence_score: suggestion.confidence_score,
            factors: suggestion
                .factors
                .into_iter()
                .map(SuggestionFactorInfo::from)
                .collect(),
            status: status.as_str().to_string(),
            model_version: suggestion.model_version,
            created_at: suggestion.created_at,
            expires_at: suggestion.expires_at,
        }
    }
}
