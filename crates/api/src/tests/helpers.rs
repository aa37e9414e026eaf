// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::handlers::create_property;
use crate::request_response::{CreatePropertyRequest, SuggestPriceRequest};
use rust_decimal::Decimal;
use stayrate::PricingEngine;
use time::{Date, Month, OffsetDateTime};

pub const PROPERTY_ID: i64 = 11;

pub fn date(month: Month, day: u8) -> Date {
    Date::from_calendar_date(2026, month, day).unwrap()
}

pub fn now() -> OffsetDateTime {
    date(Month::June, 1).midnight().assume_utc()
}

pub fn engine_with_property() -> PricingEngine {
    let engine: PricingEngine = PricingEngine::default();
    create_property(
        &engine,
        CreatePropertyRequest {
            property_id: PROPERTY_ID,
            base_rate: Decimal::from(100),
            minimum_price: None,
            minor_units: None,
        },
    )
    .unwrap();
    engine
}

pub fn suggest_request() -> SuggestPriceRequest {
    SuggestPriceRequest {
        start_date: date(Month::July, 1),
        end_date: date(Month::July, 31),
        market_average_price: Some(Decimal::from(120)),
        competitor_count: 12,
        occupancy_rate: Some(0.85),
        historical_occupancy: Some(0.70),
        demand_score: Some(0.8),
        historical_price: Some(Decimal::from(100)),
        history_window_days: 90,
    }
}
