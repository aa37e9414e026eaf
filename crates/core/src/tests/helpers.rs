// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::PricingEngine;
use rust_decimal::Decimal;
use stayrate_domain::{
    AdjustmentType, DateRange, MarketSignals, PricingRule, PropertyConfig, PropertyId, RuleKind,
    StayWindow,
};
use time::{Date, Month, OffsetDateTime};

pub const PROPERTY: PropertyId = PropertyId::new(7);

pub fn date(month: Month, day: u8) -> Date {
    Date::from_calendar_date(2026, month, day).unwrap()
}

pub fn range(start: Date, end: Date) -> DateRange {
    DateRange::new(start, end).unwrap()
}

pub fn stay(check_in: Date, check_out: Date) -> StayWindow {
    StayWindow::new(check_in, check_out).unwrap()
}

pub fn now() -> OffsetDateTime {
    date(Month::June, 1).midnight().assume_utc()
}

/// Engine with one property registered at a 100.00 base rate.
pub fn engine_with_property() -> PricingEngine {
    let engine: PricingEngine = PricingEngine::default();
    engine
        .register_property(PropertyConfig::new(PROPERTY, Decimal::from(100)))
        .unwrap();
    engine
}

pub fn seasonal_rule(id: i64, scope: DateRange, percent: i64) -> PricingRule {
    PricingRule {
        id,
        property_id: PROPERTY,
        kind: RuleKind::Seasonal,
        date_range: Some(scope),
        days_of_week: None,
        adjustment_type: AdjustmentType::Percentage,
        adjustment_value: Decimal::from(percent),
        min_nights: None,
        max_nights: None,
        advance_booking_days: None,
        last_minute_days: None,
        priority: 10,
        exclusive: false,
        is_active: true,
    }
}

pub fn full_signals() -> MarketSignals {
    MarketSignals {
        market_average_price: Some(Decimal::from(120)),
        competitor_count: 12,
        occupancy_rate: Some(0.85),
        historical_occupancy: Some(0.70),
        demand_score: Some(0.8),
        historical_price: Some(Decimal::from(100)),
        history_window_days: 90,
    }
}
