// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing rules and the nightly-rate resolution pipeline.
//!
//! Rules are a closed taxonomy: each kind names the scope dimension it
//! cares about (calendar season, weekday, stay length, booking lead time)
//! and an exhaustive match over [`RuleKind`] keeps evaluation honest when
//! the taxonomy grows.
//!
//! ## Invariants
//!
//! - Matching rules apply as a compounding pipeline in priority order
//!   (highest first, `id` ascending as the tie-break), never by exclusive
//!   override, unless a rule is explicitly flagged `exclusive`, which
//!   short-circuits the remainder of the pipeline.
//! - A custom per-date override bypasses rule evaluation entirely.
//! - Resolved prices are clamped to the property floor and rounded with
//!   banker's rounding to the currency's minor units.

use crate::error::DomainError;
use crate::types::{DateRange, PropertyConfig, PropertyId, StayWindow, round_to_minor_units};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use time::Date;

/// The closed set of pricing rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Applies within a calendar date range (e.g. high season).
    Seasonal,
    /// Applies on matching weekdays, recurring across the calendar.
    DayOfWeek,
    /// Applies when the requested stay length falls inside the rule's
    /// night bounds.
    LengthOfStay,
    /// Applies when the booking is made at least `advance_booking_days`
    /// before check-in.
    EarlyBird,
    /// Applies when the booking is made within `last_minute_days` of
    /// check-in.
    LastMinute,
    /// Free-form rule; any combination of the optional constraints.
    Custom,
}

impl RuleKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seasonal => "seasonal",
            Self::DayOfWeek => "day_of_week",
            Self::LengthOfStay => "length_of_stay",
            Self::EarlyBird => "early_bird",
            Self::LastMinute => "last_minute",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rule's adjustment value is applied to the running price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Multiplies the running price by `1 + value / 100`.
    Percentage,
    /// Adds the (signed) value to the running price.
    FixedAmount,
}

impl AdjustmentType {
    /// Converts this adjustment type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed_amount",
        }
    }
}

impl FromStr for AdjustmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed_amount" => Ok(Self::FixedAmount),
            _ => Err(DomainError::InvalidRule {
                rule_id: 0,
                reason: format!("Unknown adjustment type: {s}"),
            }),
        }
    }
}

/// An owner-editable pricing rule attached to a property.
///
/// Rules are soft-deactivated (`is_active = false`) rather than deleted
/// once historical computations reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Canonical rule identifier; the tie-break for equal priorities.
    pub id: i64,
    /// The property this rule belongs to.
    pub property_id: PropertyId,
    /// The rule kind.
    pub kind: RuleKind,
    /// Optional inclusive date scope; absent for recurring rules.
    pub date_range: Option<DateRange>,
    /// Optional weekday scope (0 = Sunday through 6 = Saturday).
    pub days_of_week: Option<BTreeSet<u8>>,
    /// How the adjustment value is applied.
    pub adjustment_type: AdjustmentType,
    /// Signed adjustment value (negative = discount).
    pub adjustment_value: Decimal,
    /// Minimum requested stay length for the rule to apply.
    pub min_nights: Option<u32>,
    /// Maximum requested stay length for the rule to apply.
    pub max_nights: Option<u32>,
    /// Minimum lead time in days (early-bird bound).
    pub advance_booking_days: Option<u32>,
    /// Maximum lead time in days (last-minute bound).
    pub last_minute_days: Option<u32>,
    /// Higher priority applies earlier in the pipeline.
    pub priority: i32,
    /// When set, this rule short-circuits all lower-priority rules.
    pub exclusive: bool,
    /// Soft-deactivation flag; inactive rules never match.
    pub is_active: bool,
}

impl PricingRule {
    /// Validates the rule's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRule` if:
    /// - `min_nights` exceeds `max_nights`
    /// - a weekday index is out of range (valid: 0-6)
    /// - the kind's required scope field is missing (e.g. a seasonal rule
    ///   without a date range)
    pub fn validate(&self) -> Result<(), DomainError> {
        if let (Some(min), Some(max)) = (self.min_nights, self.max_nights)
            && min > max
        {
            return Err(DomainError::InvalidRule {
                rule_id: self.id,
                reason: format!("min_nights {min} exceeds max_nights {max}"),
            });
        }
        if let Some(days) = &self.days_of_week {
            if days.is_empty() {
                return Err(DomainError::InvalidRule {
                    rule_id: self.id,
                    reason: String::from("days_of_week must not be empty when present"),
                });
            }
            if let Some(bad) = days.iter().find(|d| **d > 6) {
                return Err(DomainError::InvalidRule {
                    rule_id: self.id,
                    reason: format!("weekday index {bad} out of range (0-6)"),
                });
            }
        }
        let missing: Option<&'static str> = match self.kind {
            RuleKind::Seasonal => self.date_range.is_none().then_some("date_range"),
            RuleKind::DayOfWeek => self.days_of_week.is_none().then_some("days_of_week"),
            RuleKind::LengthOfStay => (self.min_nights.is_none() && self.max_nights.is_none())
                .then_some("min_nights or max_nights"),
            RuleKind::EarlyBird => self
                .advance_booking_days
                .is_none()
                .then_some("advance_booking_days"),
            RuleKind::LastMinute => self.last_minute_days.is_none().then_some("last_minute_days"),
            RuleKind::Custom => None,
        };
        if let Some(field) = missing {
            return Err(DomainError::InvalidRule {
                rule_id: self.id,
                reason: format!("{} rule requires {field}", self.kind),
            });
        }
        Ok(())
    }

    /// Returns whether the rule's calendar scope covers the given date.
    ///
    /// A rule with neither a date range nor a weekday set is recurring
    /// and covers every date.
    #[must_use]
    pub fn scope_contains(&self, date: Date) -> bool {
        if let Some(range) = &self.date_range
            && !range.contains(date)
        {
            return false;
        }
        if let Some(days) = &self.days_of_week
            && !days.contains(&date.weekday().number_days_from_sunday())
        {
            return false;
        }
        true
    }

    /// Returns whether this rule applies to a specific date of a stay.
    ///
    /// Scope, stay-length bounds, and lead-time bounds must all admit the
    /// request. Inactive rules never apply.
    #[must_use]
    pub fn applies_to(&self, date: Date, stay_nights: u32, lead_time_days: i64) -> bool {
        if !self.is_active || !self.scope_contains(date) {
            return false;
        }
        if let Some(min) = self.min_nights
            && stay_nights < min
        {
            return false;
        }
        if let Some(max) = self.max_nights
            && stay_nights > max
        {
            return false;
        }
        if let Some(advance) = self.advance_booking_days
            && lead_time_days < i64::from(advance)
        {
            return false;
        }
        if let Some(last_minute) = self.last_minute_days
            && lead_time_days > i64::from(last_minute)
        {
            return false;
        }
        true
    }
}

/// Where a resolved nightly price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// No rule matched; the base rate passed through unchanged.
    BaseRate,
    /// An owner-set custom override; rule evaluation was skipped.
    CustomOverride,
    /// One or more rules adjusted the base rate.
    Rules,
}

impl PriceSource {
    /// Converts this source to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BaseRate => "base_rate",
            Self::CustomOverride => "custom_override",
            Self::Rules => "rules",
        }
    }
}

/// A resolved nightly price for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePrice {
    /// The priced date.
    pub date: Date,
    /// The effective nightly price, rounded to minor units.
    pub price: Decimal,
    /// How the price was derived.
    pub source: PriceSource,
}

/// Resolves the effective nightly price for every date of a stay.
///
/// This is the pure core of the Rule Resolver: it reads an immutable rule
/// snapshot and override map and never mutates either. Per date:
///
/// 1. A custom override is final and skips rule evaluation.
/// 2. Otherwise all active rules matching the date, the stay length, and
///    the booking lead time apply as a compounding pipeline in priority
///    order (descending), tie-broken by `id` ascending. An `exclusive`
///    rule stops the pipeline after applying.
/// 3. The result is clamped to the property floor and rounded to minor
///    units with banker's rounding.
///
/// An empty rule set yields the base rate for every date.
#[must_use]
pub fn resolve_prices(
    rules: &[PricingRule],
    overrides: &BTreeMap<Date, Decimal>,
    config: &PropertyConfig,
    stay: &StayWindow,
    booking_date: Date,
) -> Vec<DatePrice> {
    let stay_nights: u32 = stay.nights();
    let lead_time_days: i64 = stay.lead_time_days(booking_date);
    let floor: Decimal = config.price_floor();

    stay.dates()
        .map(|date| {
            if let Some(price) = overrides.get(&date) {
                return DatePrice {
                    date,
                    price: round_to_minor_units(*price, config.minor_units),
                    source: PriceSource::CustomOverride,
                };
            }

            let mut matching: Vec<&PricingRule> = rules
                .iter()
                .filter(|rule| rule.applies_to(date, stay_nights, lead_time_days))
                .collect();
            // Deterministic pipeline order: priority descending, id
            // ascending. Never dependent on map iteration order.
            matching.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

            let mut price: Decimal = config.base_rate;
            let mut any_applied: bool = false;
            for rule in matching {
                match rule.adjustment_type {
                    AdjustmentType::Percentage => {
                        price *= Decimal::ONE + rule.adjustment_value / Decimal::ONE_HUNDRED;
                    }
                    AdjustmentType::FixedAmount => {
                        price += rule.adjustment_value;
                    }
                }
                any_applied = true;
                if rule.exclusive {
                    break;
                }
            }

            if price < floor {
                price = floor;
            }

            DatePrice {
                date,
                price: round_to_minor_units(price, config.minor_units),
                source: if any_applied {
                    PriceSource::Rules
                } else {
                    PriceSource::BaseRate
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use time::Month;

    const PROPERTY: PropertyId = PropertyId::new(7);

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    fn config(base_rate: i64) -> PropertyConfig {
        PropertyConfig::new(PROPERTY, Decimal::from(base_rate))
    }

    fn rule(id: i64, kind: RuleKind) -> PricingRule {
        PricingRule {
            id,
            property_id: PROPERTY,
            kind,
            date_range: None,
            days_of_week: None,
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: Decimal::ZERO,
            min_nights: None,
            max_nights: None,
            advance_booking_days: None,
            last_minute_days: None,
            priority: 0,
            exclusive: false,
            is_active: true,
        }
    }

    fn july_stay(check_in_day: u8, check_out_day: u8) -> StayWindow {
        StayWindow::new(
            date(2026, Month::July, check_in_day),
            date(2026, Month::July, check_out_day),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_rule_set_returns_base_rate_every_date() {
        let stay: StayWindow = july_stay(10, 14);

        let prices: Vec<DatePrice> = resolve_prices(
            &[],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices.len(), 4);
        for p in &prices {
            assert_eq!(p.price, Decimal::new(10_000, 2));
            assert_eq!(p.source, PriceSource::BaseRate);
        }
    }

    #[test]
    fn test_seasonal_percentage_rule_scenario() {
        // base_rate=100, seasonal +20% over July, priority 5 => Jul 10 = 120.00
        let mut seasonal: PricingRule = rule(1, RuleKind::Seasonal);
        seasonal.date_range =
            Some(DateRange::new(date(2026, Month::July, 1), date(2026, Month::July, 31)).unwrap());
        seasonal.adjustment_value = Decimal::from(20);
        seasonal.priority = 5;

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[seasonal],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(12_000, 2));
        assert_eq!(prices[0].source, PriceSource::Rules);
    }

    #[test]
    fn test_compounding_pipeline_percentage_then_fixed() {
        // (100 * 1.20) - 10 = 110.00
        let mut pct: PricingRule = rule(1, RuleKind::Custom);
        pct.adjustment_value = Decimal::from(20);
        pct.priority = 10;

        let mut fixed: PricingRule = rule(2, RuleKind::Custom);
        fixed.adjustment_type = AdjustmentType::FixedAmount;
        fixed.adjustment_value = Decimal::from(-10);
        fixed.priority = 5;

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[fixed, pct],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(11_000, 2));
    }

    #[test]
    fn test_equal_priority_ties_break_by_id_deterministically() {
        let mut a: PricingRule = rule(1, RuleKind::Custom);
        a.adjustment_type = AdjustmentType::FixedAmount;
        a.adjustment_value = Decimal::from(50);
        a.priority = 10;

        let mut b: PricingRule = rule(2, RuleKind::Custom);
        b.adjustment_value = Decimal::from(10);
        b.priority = 10;

        let stay: StayWindow = july_stay(10, 11);
        // Rule 1 (fixed +50) applies before rule 2 (+10%): (100+50)*1.10.
        let expected: Decimal = Decimal::new(16_500, 2);

        let forward: Vec<DatePrice> = resolve_prices(
            &[a.clone(), b.clone()],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );
        let reversed: Vec<DatePrice> = resolve_prices(
            &[b, a],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(forward[0].price, expected);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_custom_override_wins_over_matching_rules() {
        let mut seasonal: PricingRule = rule(1, RuleKind::Seasonal);
        seasonal.date_range =
            Some(DateRange::new(date(2026, Month::July, 1), date(2026, Month::July, 31)).unwrap());
        seasonal.adjustment_value = Decimal::from(20);

        let mut overrides: BTreeMap<Date, Decimal> = BTreeMap::new();
        overrides.insert(date(2026, Month::July, 10), Decimal::from(77));

        let stay: StayWindow = july_stay(10, 12);
        let prices: Vec<DatePrice> = resolve_prices(
            &[seasonal],
            &overrides,
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(7_700, 2));
        assert_eq!(prices[0].source, PriceSource::CustomOverride);
        // The next night has no override and takes the rule.
        assert_eq!(prices[1].price, Decimal::new(12_000, 2));
        assert_eq!(prices[1].source, PriceSource::Rules);
    }

    #[test]
    fn test_min_nights_bound_excludes_short_stay() {
        let mut los: PricingRule = rule(1, RuleKind::LengthOfStay);
        los.min_nights = Some(3);
        los.adjustment_value = Decimal::from(-10);

        let stay: StayWindow = july_stay(10, 12); // 2 nights
        let prices: Vec<DatePrice> = resolve_prices(
            &[los],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(10_000, 2));
        assert_eq!(prices[0].source, PriceSource::BaseRate);
    }

    #[test]
    fn test_day_of_week_rule_matches_only_listed_weekdays() {
        // 2026-07-10 is a Friday, 2026-07-11 a Saturday, 2026-07-12 a Sunday.
        let mut weekend: PricingRule = rule(1, RuleKind::DayOfWeek);
        weekend.days_of_week = Some(BTreeSet::from([5, 6])); // Fri, Sat
        weekend.adjustment_value = Decimal::from(15);

        let stay: StayWindow = july_stay(10, 13);
        let prices: Vec<DatePrice> = resolve_prices(
            &[weekend],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(11_500, 2)); // Friday
        assert_eq!(prices[1].price, Decimal::new(11_500, 2)); // Saturday
        assert_eq!(prices[2].price, Decimal::new(10_000, 2)); // Sunday
    }

    #[test]
    fn test_early_bird_requires_minimum_lead_time() {
        let mut early: PricingRule = rule(1, RuleKind::EarlyBird);
        early.advance_booking_days = Some(30);
        early.adjustment_value = Decimal::from(-5);

        let stay: StayWindow = july_stay(10, 11);

        let far_out: Vec<DatePrice> = resolve_prices(
            &[early.clone()],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::May, 1),
        );
        let late: Vec<DatePrice> = resolve_prices(
            &[early],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::July, 1),
        );

        assert_eq!(far_out[0].price, Decimal::new(9_500, 2));
        assert_eq!(late[0].price, Decimal::new(10_000, 2));
    }

    #[test]
    fn test_last_minute_requires_short_lead_time() {
        let mut last_minute: PricingRule = rule(1, RuleKind::LastMinute);
        last_minute.last_minute_days = Some(3);
        last_minute.adjustment_value = Decimal::from(-25);

        let stay: StayWindow = july_stay(10, 11);

        let close_in: Vec<DatePrice> = resolve_prices(
            &[last_minute.clone()],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::July, 8),
        );
        let far_out: Vec<DatePrice> = resolve_prices(
            &[last_minute],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(close_in[0].price, Decimal::new(7_500, 2));
        assert_eq!(far_out[0].price, Decimal::new(10_000, 2));
    }

    #[test]
    fn test_exclusive_rule_short_circuits_lower_priorities() {
        let mut exclusive: PricingRule = rule(1, RuleKind::Custom);
        exclusive.adjustment_value = Decimal::from(30);
        exclusive.priority = 10;
        exclusive.exclusive = true;

        let mut ignored: PricingRule = rule(2, RuleKind::Custom);
        ignored.adjustment_type = AdjustmentType::FixedAmount;
        ignored.adjustment_value = Decimal::from(-40);
        ignored.priority = 5;

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[exclusive, ignored],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(13_000, 2));
    }

    #[test]
    fn test_price_clamped_to_property_floor() {
        let mut discount: PricingRule = rule(1, RuleKind::Custom);
        discount.adjustment_type = AdjustmentType::FixedAmount;
        discount.adjustment_value = Decimal::from(-90);

        let mut cfg: PropertyConfig = config(100);
        cfg.minimum_price = Some(Decimal::from(45));

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[discount],
            &BTreeMap::new(),
            &cfg,
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::new(4_500, 2));
    }

    #[test]
    fn test_price_never_below_zero_without_floor() {
        let mut discount: PricingRule = rule(1, RuleKind::Custom);
        discount.adjustment_type = AdjustmentType::FixedAmount;
        discount.adjustment_value = Decimal::from(-250);

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[discount],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].price, Decimal::ZERO);
    }

    #[test]
    fn test_inactive_rule_never_applies() {
        let mut inactive: PricingRule = rule(1, RuleKind::Custom);
        inactive.adjustment_value = Decimal::from(20);
        inactive.is_active = false;

        let stay: StayWindow = july_stay(10, 11);
        let prices: Vec<DatePrice> = resolve_prices(
            &[inactive],
            &BTreeMap::new(),
            &config(100),
            &stay,
            date(2026, Month::June, 1),
        );

        assert_eq!(prices[0].source, PriceSource::BaseRate);
    }

    #[test]
    fn test_validate_rejects_inverted_night_bounds() {
        let mut bad: PricingRule = rule(9, RuleKind::LengthOfStay);
        bad.min_nights = Some(7);
        bad.max_nights = Some(2);

        let result = bad.validate();

        assert!(matches!(
            result,
            Err(DomainError::InvalidRule { rule_id: 9, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_weekday() {
        let mut bad: PricingRule = rule(3, RuleKind::DayOfWeek);
        bad.days_of_week = Some(BTreeSet::from([2, 7]));

        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_requires_kind_scope_field() {
        let seasonal_without_range: PricingRule = rule(4, RuleKind::Seasonal);
        assert!(seasonal_without_range.validate().is_err());

        let mut ok: PricingRule = rule(5, RuleKind::Seasonal);
        ok.date_range =
            Some(DateRange::new(date(2026, Month::July, 1), date(2026, Month::July, 31)).unwrap());
        assert!(ok.validate().is_ok());
    }
}
