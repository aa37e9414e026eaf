// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stateful core of the StayRate pricing and availability engine.
//!
//! This crate owns the per-property state: the sparse calendar store, the
//! versioned rule sets, and the suggestion registry. All mutation flows
//! through the [`PricingEngine`] facade, which serializes writers per
//! property (bounded wait, `LockTimeout` on contention) and validates
//! every mutation against confirmed bookings before committing. No
//! partial application, ever.
//!
//! Pure pricing and scoring algorithms live in `stayrate-domain`; this
//! crate feeds them immutable snapshots.

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

mod calendar;
mod engine;
mod error;
mod rule_set;

#[cfg(test)]
mod tests;

pub use calendar::PropertyCalendar;
pub use engine::{
    CalendarDayView, EngineConfig, PricingEngine, SuggestionConversion,
};
pub use error::CoreError;
pub use rule_set::RuleSet;
