// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for calendar mutations and read-only queries.
//!
//! Each handler translates the API request into engine calls, applies
//! the operation, and translates any errors to API errors. Handlers
//! never touch engine internals directly; everything flows through the
//! [`PricingEngine`] facade.

use rust_decimal::Decimal;
use stayrate::{CalendarDayView, PricingEngine, SuggestionConversion};
use stayrate_domain::{
    DateRange, MarketSignals, PriceSuggestion, PropertyConfig, PropertyId,
};
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    AcceptSuggestionRequest, ApplyAs, BlockDatesRequest, BlockedRangeInfo, BulkBlockRequest,
    BulkUnblockRequest, CalendarDayInfo, CalendarMutationResponse, CreatePropertyRequest,
    CreatePropertyResponse, GetCalendarResponse, GetMonthPricingResponse,
    ListBlockedDatesResponse, PriceSuggestionResponse, SetCustomPricingRequest,
    SuggestPriceRequest, UnblockDatesRequest, YearMonth,
};

fn parse_range(start: Date, end: Date) -> Result<DateRange, ApiError> {
    DateRange::new(start, end).map_err(translate_domain_error)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn range_days(range: &DateRange) -> u32 {
    range.len_days() as u32
}

fn day_info(view: CalendarDayView) -> CalendarDayInfo {
    CalendarDayInfo {
        date: view.date,
        state: view.state.as_str().to_string(),
        price: view.price.price,
        source: view.price.source.as_str().to_string(),
        block_reason: view.block_reason,
    }
}

/// Registers a property's pricing configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the property is
/// already registered.
pub fn create_property(
    engine: &PricingEngine,
    request: CreatePropertyRequest,
) -> Result<CreatePropertyResponse, ApiError> {
    let config: PropertyConfig = PropertyConfig {
        property_id: PropertyId::new(request.property_id),
        base_rate: request.base_rate,
        minimum_price: request.minimum_price,
        minor_units: request
            .minor_units
            .unwrap_or(PropertyConfig::DEFAULT_MINOR_UNITS),
    };
    engine
        .register_property(config)
        .map_err(translate_core_error)?;
    info!(property_id = request.property_id, "Property registered via API");
    Ok(CreatePropertyResponse {
        property_id: request.property_id,
        message: format!("Property {} registered", request.property_id),
    })
}

/// Returns per-date state and effective price for a date range.
///
/// Prices are display prices resolved per night, independent of the
/// requested view length; quotes for an actual stay use the pricing
/// resolution endpoint.
///
/// # Errors
///
/// Returns an error if the range is invalid or the property is unknown.
pub fn get_calendar(
    engine: &PricingEngine,
    property_id: i64,
    start_date: Date,
    end_date: Date,
    today: Date,
) -> Result<GetCalendarResponse, ApiError> {
    let range: DateRange = parse_range(start_date, end_date)?;
    let days: Vec<CalendarDayView> = engine
        .calendar_overview(PropertyId::new(property_id), &range, today)
        .map_err(translate_core_error)?;
    Ok(GetCalendarResponse {
        property_id,
        days: days.into_iter().map(day_info).collect(),
    })
}

/// Returns per-date state and effective price for a calendar month
/// given in `YYYY-MM` form. Prices are per-night display prices, as in
/// [`get_calendar`].
///
/// # Errors
///
/// Returns an error if the month is malformed or the property is
/// unknown.
pub fn get_month_pricing(
    engine: &PricingEngine,
    property_id: i64,
    month: &str,
    today: Date,
) -> Result<GetMonthPricingResponse, ApiError> {
    let parsed: YearMonth = month.parse().map_err(|e: crate::request_response::MonthParseError| {
        ApiError::InvalidInput {
            field: String::from("month"),
            message: e.to_string(),
        }
    })?;
    let (first, last) = parsed.bounds().ok_or_else(|| ApiError::InvalidInput {
        field: String::from("month"),
        message: format!("Month '{month}' is outside the supported date range"),
    })?;
    let calendar: GetCalendarResponse =
        get_calendar(engine, property_id, first, last, today)?;
    Ok(GetMonthPricingResponse {
        property_id,
        month: month.to_string(),
        days: calendar.days,
    })
}

/// Lists a property's blocked ranges, coalesced.
///
/// # Errors
///
/// Returns an error if the property is unknown.
pub fn list_blocked_dates(
    engine: &PricingEngine,
    property_id: i64,
) -> Result<ListBlockedDatesResponse, ApiError> {
    let ranges = engine
        .blocked_dates(PropertyId::new(property_id))
        .map_err(translate_core_error)?;
    Ok(ListBlockedDatesResponse {
        property_id,
        ranges: ranges
            .into_iter()
            .map(|r| BlockedRangeInfo {
                start_date: r.start_date,
                end_date: r.end_date,
                reason: r.reason,
            })
            .collect(),
    })
}

/// Blocks a date range.
///
/// # Errors
///
/// Returns a conflict error, with every conflicting date, if any date
/// in the range is booked; nothing is applied in that case.
pub fn block_dates(
    engine: &PricingEngine,
    property_id: i64,
    request: BlockDatesRequest,
) -> Result<CalendarMutationResponse, ApiError> {
    let range: DateRange = parse_range(request.start_date, request.end_date)?;
    engine
        .block(
            PropertyId::new(property_id),
            &range,
            request.reason.as_deref(),
        )
        .map_err(translate_core_error)?;
    Ok(CalendarMutationResponse {
        property_id,
        dates_affected: range_days(&range),
        message: format!(
            "Blocked {} through {}",
            request.start_date, request.end_date
        ),
    })
}

/// Unblocks a date range. Idempotent: dates that are not blocked are
/// left untouched.
///
/// # Errors
///
/// Returns a conflict error if any date in the range is booked.
pub fn unblock_dates(
    engine: &PricingEngine,
    property_id: i64,
    request: UnblockDatesRequest,
) -> Result<CalendarMutationResponse, ApiError> {
    let range: DateRange = parse_range(request.start_date, request.end_date)?;
    engine
        .unblock(PropertyId::new(property_id), &range)
        .map_err(translate_core_error)?;
    Ok(CalendarMutationResponse {
        property_id,
        dates_affected: range_days(&range),
        message: format!(
            "Unblocked {} through {}",
            request.start_date, request.end_date
        ),
    })
}

/// Blocks several ranges as one atomic unit.
///
/// # Errors
///
/// Returns a conflict error carrying every conflicting date across the
/// whole batch; none of the ranges are applied in that case.
pub fn bulk_block(
    engine: &PricingEngine,
    property_id: i64,
    request: BulkBlockRequest,
) -> Result<CalendarMutationResponse, ApiError> {
    let ranges: Vec<(DateRange, Option<String>)> = request
        .dates
        .into_iter()
        .map(|r| Ok((parse_range(r.start_date, r.end_date)?, r.reason)))
        .collect::<Result<_, ApiError>>()?;
    let dates_affected: u32 = ranges.iter().map(|(range, _)| range_days(range)).sum();
    engine
        .bulk_block(PropertyId::new(property_id), &ranges)
        .map_err(translate_core_error)?;
    Ok(CalendarMutationResponse {
        property_id,
        dates_affected,
        message: format!("Blocked {} range(s)", ranges.len()),
    })
}

/// Unblocks several ranges as one atomic unit.
///
/// # Errors
///
/// Returns a conflict error if any date across the batch is booked.
pub fn bulk_unblock(
    engine: &PricingEngine,
    property_id: i64,
    request: BulkUnblockRequest,
) -> Result<CalendarMutationResponse, ApiError> {
    let ranges: Vec<DateRange> = request
        .dates
        .into_iter()
        .map(|r| parse_range(r.start_date, r.end_date))
        .collect::<Result<_, ApiError>>()?;
    let dates_affected: u32 = ranges.iter().map(range_days).sum();
    engine
        .bulk_unblock(PropertyId::new(property_id), &ranges)
        .map_err(translate_core_error)?;
    Ok(CalendarMutationResponse {
        property_id,
        dates_affected,
        message: format!("Unblocked {} range(s)", ranges.len()),
    })
}

/// Sets custom per-date prices as one atomic unit.
///
/// # Errors
///
/// Returns an error for negative prices, or a conflict error if any
/// targeted date is booked.
pub fn set_custom_pricing(
    engine: &PricingEngine,
    property_id: i64,
    request: SetCustomPricingRequest,
) -> Result<CalendarMutationResponse, ApiError> {
    let prices: Vec<(Date, Decimal)> = request
        .pricing
        .iter()
        .map(|entry| (entry.date, entry.price))
        .collect();
    engine
        .set_custom_prices(PropertyId::new(property_id), &prices)
        .map_err(translate_core_error)?;
    Ok(CalendarMutationResponse {
        property_id,
        dates_affected: u32::try_from(prices.len()).unwrap_or(u32::MAX),
        message: format!("Set {} custom price(s)", prices.len()),
    })
}

/// Generates an advisory price suggestion for a date window.
///
/// The suggestion mutates nothing until explicitly accepted.
///
/// # Errors
///
/// Returns an error if the window is invalid or the property is
/// unknown.
pub fn suggest_price(
    engine: &PricingEngine,
    property_id: i64,
    request: SuggestPriceRequest,
    now: OffsetDateTime,
) -> Result<PriceSuggestionResponse, ApiError> {
    let window: DateRange = parse_range(request.start_date, request.end_date)?;
    let signals: MarketSignals = MarketSignals {
        market_average_price: request.market_average_price,
        competitor_count: request.competitor_count,
        occupancy_rate: request.occupancy_rate,
        historical_occupancy: request.historical_occupancy,
        demand_score: request.demand_score,
        historical_price: request.historical_price,
        history_window_days: request.history_window_days,
    };
    let suggestion: PriceSuggestion = engine
        .suggest(PropertyId::new(property_id), &window, &signals, now)
        .map_err(translate_core_error)?;
    Ok(PriceSuggestionResponse::from_suggestion(suggestion))
}

/// Returns a stored suggestion.
///
/// # Errors
///
/// Returns an error if the suggestion is unknown.
pub fn get_suggestion(
    engine: &PricingEngine,
    suggestion_id: i64,
) -> Result<PriceSuggestionResponse, ApiError> {
    let suggestion: PriceSuggestion = engine
        .suggestion(suggestion_id)
        .map_err(translate_core_error)?;
    Ok(PriceSuggestionResponse::from_suggestion(suggestion))
}

/// Accepts a pending suggestion, converting it into pricing state as
/// the request directs.
///
/// # Errors
///
/// Returns an error if the suggestion is unknown or no longer pending,
/// or a conflict error when an override conversion touches booked
/// dates (the suggestion stays pending).
pub fn accept_suggestion(
    engine: &PricingEngine,
    suggestion_id: i64,
    request: AcceptSuggestionRequest,
    now: OffsetDateTime,
) -> Result<PriceSuggestionResponse, ApiError> {
    let conversion: SuggestionConversion = match request.apply_as {
        ApplyAs::Rule => SuggestionConversion::AsRule,
        ApplyAs::Override => SuggestionConversion::AsOverride,
    };
    let accepted: PriceSuggestion = engine
        .accept_suggestion(suggestion_id, conversion, now)
        .map_err(translate_core_error)?;
    Ok(PriceSuggestionResponse::from_suggestion(accepted))
}

/// Rejects a pending suggestion.
///
/// # Errors
///
/// Returns an error if the suggestion is unknown or no longer pending.
pub fn reject_suggestion(
    engine: &PricingEngine,
    suggestion_id: i64,
    now: OffsetDateTime,
) -> Result<PriceSuggestionResponse, ApiError> {
    let rejected: PriceSuggestion = engine
        .reject_suggestion(suggestion_id, now)
        .map_err(translate_core_error)?;
    Ok(PriceSuggestionResponse::from_suggestion(rejected))
}
