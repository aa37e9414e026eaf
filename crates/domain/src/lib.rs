// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and pure algorithms for the StayRate pricing and
//! availability engine.
//!
//! This crate holds the value types (dates, ranges, calendar days, rules,
//! suggestions) and the pure functions that operate on them: nightly-rate
//! resolution and price-suggestion scoring. It performs no I/O and takes
//! no locks; stateful orchestration lives in the `stayrate` core crate.

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
mod rules;
mod suggestion;
mod types;

pub use error::DomainError;
pub use rules::{
    AdjustmentType, DatePrice, PriceSource, PricingRule, RuleKind, resolve_prices,
};
pub use suggestion::{
    MarketSignals, PriceSuggestion, SuggestionConfig, SuggestionFactor, SuggestionStatus,
    score_suggestion,
};
pub use types::{
    BlockedDateRange, CalendarDay, DateRange, DayState, PropertyConfig, PropertyId, StayWindow,
    round_to_minor_units,
};
