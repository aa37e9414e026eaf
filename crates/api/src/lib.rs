// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the StayRate pricing engine.
//!
//! Translates transport-agnostic requests into engine operations and
//! engine errors into the API error contract. The HTTP server crate is
//! a thin shell over these handlers.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::{
    accept_suggestion, block_dates, bulk_block, bulk_unblock, create_property, get_calendar,
    get_month_pricing, get_suggestion, list_blocked_dates, reject_suggestion, set_custom_pricing,
    suggest_price, unblock_dates,
};
pub use request_response::{
    AcceptSuggestionRequest, ApplyAs, BlockDatesRequest, BlockedRangeInfo, BulkBlockRange,
    BulkBlockRequest, BulkUnblockRange, BulkUnblockRequest, CalendarDayInfo,
    CalendarMutationResponse, CreatePropertyRequest, CreatePropertyResponse, CustomPriceEntry,
    GetCalendarResponse, GetMonthPricingResponse, ListBlockedDatesResponse, MonthParseError,
    PriceSuggestionResponse, SetCustomPricingRequest, SuggestPriceRequest, SuggestionFactorInfo,
    UnblockDatesRequest, YearMonth,
};
