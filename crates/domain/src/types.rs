// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Canonical identifier for a property.
///
/// Properties themselves (listings, owners, amenities) live outside this
/// engine; only the identifier crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(i64);

impl PropertyId {
    /// Creates a new `PropertyId`.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive range of calendar dates.
///
/// Used for rule scopes, blocking operations, and suggestion windows.
/// Construction validates ordering, so a `DateRange` value is always
/// well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date in the range.
    start: Date,
    /// The last date in the range (inclusive).
    end: Date,
}

impl DateRange {
    /// Creates a new inclusive `DateRange`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `end` is before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first date in the range.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last date in the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns whether the given date falls inside this range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns the number of days covered by this range (at least 1).
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Iterates over every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end: Date = self.end;
        std::iter::successors(Some(self.start), move |d| {
            if *d < end { d.next_day() } else { None }
        })
    }
}

/// A half-open stay window: `[check_in, check_out)`.
///
/// A guest occupying this window stays `check_out - check_in` nights and
/// is priced for every date from `check_in` up to but excluding
/// `check_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayWindow {
    /// The check-in date (first priced night).
    check_in: Date,
    /// The check-out date (exclusive).
    check_out: Date,
}

impl StayWindow {
    /// Creates a new `StayWindow`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStayWindow` if `check_out` is on or
    /// before `check_in`.
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStayWindow {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in date.
    #[must_use]
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the check-out date (exclusive).
    #[must_use]
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Returns the number of nights in the stay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn nights(&self) -> u32 {
        // Construction guarantees check_out > check_in.
        (self.check_out - self.check_in).whole_days() as u32
    }

    /// Returns the lead time in days between a booking date and check-in.
    ///
    /// Negative when the booking date is after check-in (a same-window
    /// walk-in is lead time zero; a retroactive quote is negative).
    #[must_use]
    pub fn lead_time_days(&self, booking_date: Date) -> i64 {
        (self.check_in - booking_date).whole_days()
    }

    /// Iterates over every priced night, from check-in up to but
    /// excluding check-out.
    pub fn dates(&self) -> impl Iterator<Item = Date> + use<> {
        let check_out: Date = self.check_out;
        std::iter::successors(Some(self.check_in), move |d| {
            d.next_day().filter(|next| *next < check_out)
        })
    }
}

/// The availability state of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    /// Open for booking. The sparse store's implicit default.
    #[default]
    Available,
    /// Blocked by the owner; unbookable but owner-reversible.
    Blocked,
    /// Held by a confirmed booking; immutable from this engine.
    Booked,
}

impl DayState {
    /// Converts this state to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Blocked => "blocked",
            Self::Booked => "booked",
        }
    }
}

impl FromStr for DayState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "blocked" => Ok(Self::Blocked),
            "booked" => Ok(Self::Booked),
            _ => Err(DomainError::InvalidDayState(s.to_string())),
        }
    }
}

impl std::fmt::Display for DayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-date calendar record for a property.
///
/// The calendar store is sparse: a `CalendarDay` exists only for dates
/// that deviate from the default of available-with-no-override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The property this day belongs to.
    pub property_id: PropertyId,
    /// The calendar date (property-local).
    pub date: Date,
    /// The availability state.
    pub state: DayState,
    /// Optional owner-set price override; wins over rule evaluation.
    pub custom_price: Option<Decimal>,
    /// Optional reason, present only when `state` is `Blocked`.
    pub block_reason: Option<String>,
}

impl CalendarDay {
    /// Creates an available day carrying only a custom price override.
    #[must_use]
    pub const fn with_custom_price(property_id: PropertyId, date: Date, price: Decimal) -> Self {
        Self {
            property_id,
            date,
            state: DayState::Available,
            custom_price: Some(price),
            block_reason: None,
        }
    }

    /// Returns whether this entry is indistinguishable from the sparse
    /// default and can be pruned from the store.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self.state, DayState::Available) && self.custom_price.is_none()
    }
}

/// A contiguous run of blocked days, derived from the sparse calendar.
///
/// Not separately persisted; used for bulk operations and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedDateRange {
    /// The property the range belongs to.
    pub property_id: PropertyId,
    /// The first blocked date.
    pub start_date: Date,
    /// The last blocked date (inclusive).
    pub end_date: Date,
    /// The block reason shared by every day in the run.
    pub reason: Option<String>,
}

/// Pricing configuration for a registered property.
///
/// Stands in for the external property aggregate and the currency policy
/// provider: the engine needs only the base nightly rate, the optional
/// price floor, and the currency's minor-unit precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// The property identifier.
    pub property_id: PropertyId,
    /// The base nightly rate rules adjust from.
    pub base_rate: Decimal,
    /// Optional property-level price floor.
    pub minimum_price: Option<Decimal>,
    /// Number of minor-unit digits for the property's currency.
    pub minor_units: u32,
}

impl PropertyConfig {
    /// Default minor-unit precision (cents).
    pub const DEFAULT_MINOR_UNITS: u32 = 2;

    /// Creates a new `PropertyConfig` with the default minor-unit
    /// precision.
    #[must_use]
    pub const fn new(property_id: PropertyId, base_rate: Decimal) -> Self {
        Self {
            property_id,
            base_rate,
            minimum_price: None,
            minor_units: Self::DEFAULT_MINOR_UNITS,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBaseRate` if the base rate or the
    /// minimum price is negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.base_rate.is_sign_negative() && !self.base_rate.is_zero() {
            return Err(DomainError::InvalidBaseRate {
                value: self.base_rate,
            });
        }
        if let Some(min) = self.minimum_price
            && min.is_sign_negative()
            && !min.is_zero()
        {
            return Err(DomainError::InvalidBaseRate { value: min });
        }
        Ok(())
    }

    /// Returns the effective price floor: the property minimum when set,
    /// never below zero.
    #[must_use]
    pub fn price_floor(&self) -> Decimal {
        self.minimum_price.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
    }
}

/// Rounds a price to the currency's minor-unit precision using banker's
/// rounding (round half to even), avoiding systematic drift over many
/// dates.
#[must_use]
pub fn round_to_minor_units(value: Decimal, minor_units: u32) -> Decimal {
    value.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use time::Month;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let start: Date = date(2026, Month::July, 10);
        let end: Date = date(2026, Month::July, 1);

        let result = DateRange::new(start, end);

        assert_eq!(result, Err(DomainError::InvalidDateRange { start, end }));
    }

    #[test]
    fn test_date_range_single_day() {
        let d: Date = date(2026, Month::July, 4);
        let range: DateRange = DateRange::new(d, d).unwrap();

        assert_eq!(range.len_days(), 1);
        assert_eq!(range.days().collect::<Vec<Date>>(), vec![d]);
        assert!(range.contains(d));
    }

    #[test]
    fn test_date_range_iterates_inclusive() {
        let range: DateRange =
            DateRange::new(date(2026, Month::July, 1), date(2026, Month::July, 4)).unwrap();

        let days: Vec<Date> = range.days().collect();

        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date(2026, Month::July, 1));
        assert_eq!(days[3], date(2026, Month::July, 4));
    }

    #[test]
    fn test_stay_window_rejects_zero_nights() {
        let d: Date = date(2026, Month::July, 10);

        let result = StayWindow::new(d, d);

        assert_eq!(
            result,
            Err(DomainError::InvalidStayWindow {
                check_in: d,
                check_out: d,
            })
        );
    }

    #[test]
    fn test_stay_window_excludes_check_out_date() {
        let stay: StayWindow =
            StayWindow::new(date(2026, Month::July, 10), date(2026, Month::July, 13)).unwrap();

        let nights: Vec<Date> = stay.dates().collect();

        assert_eq!(stay.nights(), 3);
        assert_eq!(nights.len(), 3);
        assert_eq!(*nights.last().unwrap(), date(2026, Month::July, 12));
    }

    #[test]
    fn test_stay_window_lead_time() {
        let stay: StayWindow =
            StayWindow::new(date(2026, Month::July, 10), date(2026, Month::July, 12)).unwrap();

        assert_eq!(stay.lead_time_days(date(2026, Month::July, 1)), 9);
        assert_eq!(stay.lead_time_days(date(2026, Month::July, 10)), 0);
        assert_eq!(stay.lead_time_days(date(2026, Month::July, 11)), -1);
    }

    #[test]
    fn test_day_state_round_trips_through_strings() {
        for state in [DayState::Available, DayState::Blocked, DayState::Booked] {
            assert_eq!(state.as_str().parse::<DayState>().unwrap(), state);
        }
        assert!("vacant".parse::<DayState>().is_err());
    }

    #[test]
    fn test_property_config_rejects_negative_base_rate() {
        let config: PropertyConfig =
            PropertyConfig::new(PropertyId::new(1), Decimal::from(-10));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_property_config_price_floor_defaults_to_zero() {
        let config: PropertyConfig = PropertyConfig::new(PropertyId::new(1), Decimal::from(100));

        assert_eq!(config.price_floor(), Decimal::ZERO);
    }

    #[test]
    fn test_bankers_rounding_half_to_even() {
        assert_eq!(
            round_to_minor_units(Decimal::new(100_125, 3), 2),
            Decimal::new(10_012, 2)
        );
        assert_eq!(
            round_to_minor_units(Decimal::new(100_135, 3), 2),
            Decimal::new(10_014, 2)
        );
    }

    #[test]
    fn test_calendar_day_default_detection() {
        let day: CalendarDay = CalendarDay {
            property_id: PropertyId::new(1),
            date: date(2026, Month::July, 1),
            state: DayState::Available,
            custom_price: None,
            block_reason: None,
        };

        assert!(day.is_default());

        let priced: CalendarDay = CalendarDay::with_custom_price(
            PropertyId::new(1),
            date(2026, Month::July, 1),
            Decimal::from(95),
        );
        assert!(!priced.is_default());
    }
}
