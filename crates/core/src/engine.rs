// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The pricing and availability engine facade.
//!
//! All stateful operations flow through [`PricingEngine`]. Mutations are
//! serialized per property: each property's calendar and rule set sit
//! behind their own `RwLock`, and writers acquire the write side with a
//! bounded wait, failing with [`CoreError::LockTimeout`] rather than
//! queuing indefinitely. Unrelated properties never contend. Reads take
//! the read side only and observe each committed mutation atomically.
//!
//! Every mutation validates its full target against confirmed bookings
//! before touching state; a conflict rejects the entire operation with
//! the complete set of conflicting dates.

use crate::calendar::PropertyCalendar;
use crate::error::CoreError;
use crate::rule_set::RuleSet;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};
use std::time::{Duration, Instant};
use stayrate_domain::{
    AdjustmentType, BlockedDateRange, DatePrice, DateRange, DayState, MarketSignals,
    PriceSuggestion, PricingRule, PropertyConfig, PropertyId, RuleKind, StayWindow,
    SuggestionConfig, SuggestionStatus, resolve_prices, round_to_minor_units, score_suggestion,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bounded wait for the per-property write lock.
    pub lock_wait: Duration,
    /// Scoring configuration for the suggestion engine.
    pub suggestion: SuggestionConfig,
    /// How long settled (accepted, rejected, expired) suggestions stay
    /// retrievable after their expiry before the periodic sweep evicts
    /// them.
    pub suggestion_retention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_wait: Duration::from_secs(2),
            suggestion: SuggestionConfig::default(),
            suggestion_retention_days: 30,
        }
    }
}

/// Per-property state: pricing configuration, calendar, and rule set.
///
/// Calendar and rules are locked independently so a long calendar commit
/// never blocks a rule edit.
#[derive(Debug)]
struct PropertyEntry {
    config: PropertyConfig,
    calendar: RwLock<PropertyCalendar>,
    rules: RwLock<RuleSet>,
}

/// One date of a calendar overview: state plus effective price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayView {
    /// The date.
    pub date: Date,
    /// The availability state.
    pub state: DayState,
    /// The resolved nightly price for the date.
    pub price: DatePrice,
    /// The block reason, when the date is blocked.
    pub block_reason: Option<String>,
}

/// How an accepted suggestion is converted into pricing state.
///
/// The direction is an explicit caller decision, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionConversion {
    /// Materialize as a date-ranged fixed-amount pricing rule.
    AsRule,
    /// Materialize as per-date custom price overrides.
    AsOverride,
}

/// Priority assigned to rules materialized from accepted suggestions,
/// so they win over ordinary owner rules for the window.
const ACCEPTED_SUGGESTION_RULE_PRIORITY: i32 = 100;

/// The pricing and availability engine.
pub struct PricingEngine {
    config: EngineConfig,
    properties: DashMap<PropertyId, Arc<PropertyEntry>>,
    suggestions: DashMap<i64, PriceSuggestion>,
    /// Monotonic id source for suggestions and materialized rules.
    next_id: AtomicI64,
}

impl PricingEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            properties: DashMap::new(),
            suggestions: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Registers a property's pricing configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainViolation` if the configuration is invalid, or
    /// `DuplicateProperty` if the id is already registered.
    pub fn register_property(&self, config: PropertyConfig) -> Result<(), CoreError> {
        config.validate()?;
        let property_id: PropertyId = config.property_id;
        // Insert only into a vacant slot: a rejected re-registration must
        // leave the existing calendar, rules, and config untouched.
        match self.properties.entry(property_id) {
            Entry::Occupied(_) => Err(CoreError::DuplicateProperty(property_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(PropertyEntry {
                    calendar: RwLock::new(PropertyCalendar::new(property_id)),
                    rules: RwLock::new(RuleSet::new()),
                    config,
                }));
                info!(property_id = %property_id, "Registered property");
                Ok(())
            }
        }
    }

    /// Returns a property's pricing configuration.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn property_config(&self, property_id: PropertyId) -> Result<PropertyConfig, CoreError> {
        Ok(self.entry(property_id)?.config.clone())
    }

    fn entry(&self, property_id: PropertyId) -> Result<Arc<PropertyEntry>, CoreError> {
        self.properties
            .get(&property_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(CoreError::UnknownProperty(property_id))
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Acquires a write guard within the configured bounded wait.
    fn write_with_deadline<'a, T>(
        &self,
        lock: &'a RwLock<T>,
        property_id: PropertyId,
    ) -> Result<RwLockWriteGuard<'a, T>, CoreError> {
        let deadline: Instant = Instant::now() + self.config.lock_wait;
        loop {
            match lock.try_write() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(CoreError::LockTimeout { property_id });
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(TryLockError::Poisoned(_)) => {
                    return Err(CoreError::Internal(format!(
                        "poisoned lock for property {property_id}"
                    )));
                }
            }
        }
    }

    fn read_guard<'a, T>(
        lock: &'a RwLock<T>,
        property_id: PropertyId,
    ) -> Result<RwLockReadGuard<'a, T>, CoreError> {
        lock.read().map_err(|_| {
            CoreError::Internal(format!("poisoned lock for property {property_id}"))
        })
    }

    // ---- Rule management ----------------------------------------------

    /// Inserts or replaces a pricing rule on its property.
    ///
    /// Returns the new rule-set version.
    ///
    /// # Errors
    ///
    /// Returns `DomainViolation` for structurally invalid rules,
    /// `UnknownProperty`, or `LockTimeout`.
    pub fn upsert_rule(&self, rule: PricingRule) -> Result<u64, CoreError> {
        rule.validate()?;
        let property_id: PropertyId = rule.property_id;
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut rules: RwLockWriteGuard<'_, RuleSet> =
            self.write_with_deadline(&entry.rules, property_id)?;
        let rule_id: i64 = rule.id;
        let version: u64 = rules.upsert(rule);
        drop(rules);
        info!(property_id = %property_id, rule_id, version, "Upserted pricing rule");
        Ok(version)
    }

    /// Soft-deactivates a rule.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound`, `UnknownProperty`, or `LockTimeout`.
    pub fn deactivate_rule(&self, property_id: PropertyId, rule_id: i64) -> Result<(), CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut rules: RwLockWriteGuard<'_, RuleSet> =
            self.write_with_deadline(&entry.rules, property_id)?;
        if !rules.deactivate(rule_id) {
            return Err(CoreError::RuleNotFound {
                property_id,
                rule_id,
            });
        }
        drop(rules);
        info!(property_id = %property_id, rule_id, "Deactivated pricing rule");
        Ok(())
    }

    /// Returns a snapshot of the property's rules.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn rules(&self, property_id: PropertyId) -> Result<Vec<PricingRule>, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let rules: RwLockReadGuard<'_, RuleSet> = Self::read_guard(&entry.rules, property_id)?;
        Ok(rules.snapshot())
    }

    // ---- Price resolution ---------------------------------------------

    /// Resolves the effective nightly price for every night of a stay.
    ///
    /// Reads immutable snapshots of the rule set and the stay's custom
    /// overrides, then evaluates outside any lock.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn resolve(
        &self,
        property_id: PropertyId,
        stay: &StayWindow,
        booking_date: Date,
    ) -> Result<Vec<DatePrice>, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let rules: Vec<PricingRule> = {
            let guard: RwLockReadGuard<'_, RuleSet> = Self::read_guard(&entry.rules, property_id)?;
            guard.snapshot()
        };
        let overrides: BTreeMap<Date, Decimal> = {
            let guard: RwLockReadGuard<'_, PropertyCalendar> =
                Self::read_guard(&entry.calendar, property_id)?;
            guard.overrides_for_stay(stay)
        };
        Ok(resolve_prices(
            &rules,
            &overrides,
            &entry.config,
            stay,
            booking_date,
        ))
    }

    /// Quotes the total price of a stay, for the booking-creation flow.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn quote_total(
        &self,
        property_id: PropertyId,
        stay: &StayWindow,
        booking_date: Date,
    ) -> Result<Decimal, CoreError> {
        let prices: Vec<DatePrice> = self.resolve(property_id, stay, booking_date)?;
        Ok(prices.iter().map(|p| p.price).sum())
    }

    /// Returns per-date state and effective price across a range.
    ///
    /// Display pricing is per night: each date is resolved as a one-night
    /// stay booked on `today`, so the view length never changes which
    /// stay-length or lead-time rules apply. Quotes for an actual stay go
    /// through [`Self::resolve`] instead.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` or `Internal` on date overflow.
    pub fn calendar_overview(
        &self,
        property_id: PropertyId,
        range: &DateRange,
        today: Date,
    ) -> Result<Vec<CalendarDayView>, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let rules: Vec<PricingRule> = {
            let guard: RwLockReadGuard<'_, RuleSet> = Self::read_guard(&entry.rules, property_id)?;
            guard.snapshot()
        };
        let calendar: RwLockReadGuard<'_, PropertyCalendar> =
            Self::read_guard(&entry.calendar, property_id)?;
        let overrides: BTreeMap<Date, Decimal> = range
            .days()
            .filter_map(|date| calendar.custom_price(date).map(|price| (date, price)))
            .collect();

        let mut views: Vec<CalendarDayView> = Vec::new();
        for date in range.days() {
            let check_out: Date = date
                .next_day()
                .ok_or_else(|| CoreError::Internal(String::from("calendar range end overflow")))?;
            let night: StayWindow = StayWindow::new(date, check_out)?;
            let price: DatePrice =
                resolve_prices(&rules, &overrides, &entry.config, &night, today)
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        CoreError::Internal(String::from("empty resolution for a single night"))
                    })?;
            views.push(CalendarDayView {
                date,
                state: calendar.state_of(date),
                price,
                block_reason: calendar.day(date).and_then(|d| d.block_reason.clone()),
            });
        }
        Ok(views)
    }

    // ---- Availability mutation ----------------------------------------

    /// Collects booked dates across the given ranges, sorted and
    /// deduplicated.
    fn conflicts_in(calendar: &PropertyCalendar, ranges: &[DateRange]) -> Vec<Date> {
        let conflicts: BTreeSet<Date> = ranges
            .iter()
            .flat_map(|range| calendar.booked_dates_in(range))
            .collect();
        conflicts.into_iter().collect()
    }

    fn reject_if_booked(
        property_id: PropertyId,
        calendar: &PropertyCalendar,
        ranges: &[DateRange],
    ) -> Result<(), CoreError> {
        let conflicts: Vec<Date> = Self::conflicts_in(calendar, ranges);
        if let Some(first) = conflicts.first() {
            return Err(CoreError::BookingConflict {
                property_id,
                first_conflict: *first,
                conflicts,
            });
        }
        Ok(())
    }

    /// Blocks every date in the range.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict` (nothing applied) if any date in the
    /// range is booked, `UnknownProperty`, or `LockTimeout`.
    pub fn block(
        &self,
        property_id: PropertyId,
        range: &DateRange,
        reason: Option<&str>,
    ) -> Result<(), CoreError> {
        self.bulk_block(property_id, &[(*range, reason.map(str::to_string))])
    }

    /// Unblocks every blocked date in the range. Idempotent: dates that
    /// are not blocked are untouched.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict` if any date in the range is booked,
    /// `UnknownProperty`, or `LockTimeout`.
    pub fn unblock(&self, property_id: PropertyId, range: &DateRange) -> Result<(), CoreError> {
        self.bulk_unblock(property_id, &[*range])
    }

    /// Blocks a batch of ranges as one all-or-nothing unit.
    ///
    /// Every range is validated first; conflicts across the whole batch
    /// are collected and reported together, and nothing is applied
    /// unless the batch is conflict-free.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict` carrying every conflicting date,
    /// `UnknownProperty`, or `LockTimeout`.
    pub fn bulk_block(
        &self,
        property_id: PropertyId,
        ranges: &[(DateRange, Option<String>)],
    ) -> Result<(), CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut calendar: RwLockWriteGuard<'_, PropertyCalendar> =
            self.write_with_deadline(&entry.calendar, property_id)?;

        let targets: Vec<DateRange> = ranges.iter().map(|(range, _)| *range).collect();
        Self::reject_if_booked(property_id, &calendar, &targets)?;

        for (range, reason) in ranges {
            calendar.block(range, reason.as_deref());
        }
        drop(calendar);
        info!(property_id = %property_id, ranges = ranges.len(), "Blocked date ranges");
        Ok(())
    }

    /// Unblocks a batch of ranges as one all-or-nothing unit.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict`, `UnknownProperty`, or `LockTimeout`.
    pub fn bulk_unblock(
        &self,
        property_id: PropertyId,
        ranges: &[DateRange],
    ) -> Result<(), CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut calendar: RwLockWriteGuard<'_, PropertyCalendar> =
            self.write_with_deadline(&entry.calendar, property_id)?;

        Self::reject_if_booked(property_id, &calendar, ranges)?;

        for range in ranges {
            calendar.unblock(range);
        }
        drop(calendar);
        info!(property_id = %property_id, ranges = ranges.len(), "Unblocked date ranges");
        Ok(())
    }

    /// Sets custom price overrides as one all-or-nothing unit.
    ///
    /// Overrides on blocked dates succeed (they take effect when the
    /// date is unblocked); overrides on booked dates reject the batch.
    ///
    /// # Errors
    ///
    /// Returns `DomainViolation` for negative prices, `BookingConflict`,
    /// `UnknownProperty`, or `LockTimeout`.
    pub fn set_custom_prices(
        &self,
        property_id: PropertyId,
        prices: &[(Date, Decimal)],
    ) -> Result<(), CoreError> {
        for (date, price) in prices {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(CoreError::DomainViolation(
                    stayrate_domain::DomainError::InvalidPrice {
                        date: *date,
                        value: *price,
                    },
                ));
            }
        }

        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut calendar: RwLockWriteGuard<'_, PropertyCalendar> =
            self.write_with_deadline(&entry.calendar, property_id)?;

        let conflicts: Vec<Date> = {
            let booked: BTreeSet<Date> = prices
                .iter()
                .map(|(date, _)| *date)
                .filter(|date| calendar.is_booked(*date))
                .collect();
            booked.into_iter().collect()
        };
        if let Some(first) = conflicts.first() {
            return Err(CoreError::BookingConflict {
                property_id,
                first_conflict: *first,
                conflicts,
            });
        }

        for (date, price) in prices {
            calendar.set_custom_price(*date, *price);
        }
        drop(calendar);
        info!(property_id = %property_id, dates = prices.len(), "Set custom prices");
        Ok(())
    }

    /// Returns the coalesced blocked ranges for a property.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn blocked_dates(&self, property_id: PropertyId) -> Result<Vec<BlockedDateRange>, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let calendar: RwLockReadGuard<'_, PropertyCalendar> =
            Self::read_guard(&entry.calendar, property_id)?;
        Ok(calendar.blocked_ranges())
    }

    // ---- Booking subsystem integration --------------------------------

    /// Records a confirmed booking over a range. Only the booking
    /// subsystem calls this; a booked date is immutable to every other
    /// mutation in this engine.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict` if any date is already booked,
    /// `UnknownProperty`, or `LockTimeout`.
    pub fn record_booking(
        &self,
        property_id: PropertyId,
        range: &DateRange,
    ) -> Result<(), CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let mut calendar: RwLockWriteGuard<'_, PropertyCalendar> =
            self.write_with_deadline(&entry.calendar, property_id)?;

        Self::reject_if_booked(property_id, &calendar, &[*range])?;

        calendar.record_booking(range);
        drop(calendar);
        info!(
            property_id = %property_id,
            start = %range.start(),
            end = %range.end(),
            "Recorded booking"
        );
        Ok(())
    }

    /// Returns whether every night of a stay is available. The booking
    /// flow runs this check before confirming.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property is not registered.
    pub fn is_range_available(
        &self,
        property_id: PropertyId,
        stay: &StayWindow,
    ) -> Result<bool, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;
        let calendar: RwLockReadGuard<'_, PropertyCalendar> =
            Self::read_guard(&entry.calendar, property_id)?;
        Ok(stay
            .dates()
            .all(|date| calendar.state_of(date) == DayState::Available))
    }

    // ---- Price suggestions --------------------------------------------

    /// Generates an advisory price suggestion for a window.
    ///
    /// Signal gathering and scoring happen outside any write lock; the
    /// suggestion mutates nothing until explicitly accepted. When the
    /// caller supplies no occupancy rate, it is derived from the
    /// calendar's trailing window.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` or `Internal` on date overflow.
    pub fn suggest(
        &self,
        property_id: PropertyId,
        window: &DateRange,
        signals: &MarketSignals,
        now: OffsetDateTime,
    ) -> Result<PriceSuggestion, CoreError> {
        let entry: Arc<PropertyEntry> = self.entry(property_id)?;

        // Current price: average resolved nightly rate over the window.
        let check_out: Date = window
            .end()
            .next_day()
            .ok_or_else(|| CoreError::Internal(String::from("suggestion window end overflow")))?;
        let stay: StayWindow = StayWindow::new(window.start(), check_out)?;
        let prices: Vec<DatePrice> = self.resolve(property_id, &stay, now.date())?;
        let total: Decimal = prices.iter().map(|p| p.price).sum();
        let current_price: Decimal = round_to_minor_units(
            total / Decimal::from(prices.len().max(1)),
            entry.config.minor_units,
        );

        let mut signals: MarketSignals = signals.clone();
        if signals.occupancy_rate.is_none() {
            signals.occupancy_rate =
                self.derived_occupancy(property_id, &entry, window, signals.history_window_days)?;
        }

        let suggestion: PriceSuggestion = score_suggestion(
            self.next_id(),
            property_id,
            window,
            current_price,
            entry.config.minor_units,
            &signals,
            &self.config.suggestion,
            now,
        );
        self.suggestions.insert(suggestion.id, suggestion.clone());
        debug!(
            property_id = %property_id,
            suggestion_id = suggestion.id,
            suggested = %suggestion.suggested_price,
            confidence = suggestion.confidence_score,
            "Generated price suggestion"
        );
        Ok(suggestion)
    }

    /// Derives occupancy as the share of non-available days over the
    /// trailing window ending before the suggestion window.
    #[allow(clippy::cast_precision_loss)]
    fn derived_occupancy(
        &self,
        property_id: PropertyId,
        entry: &PropertyEntry,
        window: &DateRange,
        history_window_days: u32,
    ) -> Result<Option<f64>, CoreError> {
        if history_window_days == 0 {
            return Ok(None);
        }
        let Some(trailing_end) = window.start().previous_day() else {
            return Ok(None);
        };
        let Some(trailing_start) =
            trailing_end.checked_sub(time::Duration::days(i64::from(history_window_days) - 1))
        else {
            return Ok(None);
        };
        let trailing: DateRange = DateRange::new(trailing_start, trailing_end)?;
        let calendar: RwLockReadGuard<'_, PropertyCalendar> =
            Self::read_guard(&entry.calendar, property_id)?;
        let unavailable: u32 = calendar.unavailable_count_in(&trailing);
        drop(calendar);
        Ok(Some(
            f64::from(unavailable) / trailing.len_days() as f64,
        ))
    }

    /// Returns a stored suggestion.
    ///
    /// # Errors
    ///
    /// Returns `SuggestionNotFound` if the id is unknown.
    pub fn suggestion(&self, suggestion_id: i64) -> Result<PriceSuggestion, CoreError> {
        self.suggestions
            .get(&suggestion_id)
            .map(|s| s.clone())
            .ok_or(CoreError::SuggestionNotFound(suggestion_id))
    }

    /// Accepts a suggestion, converting it into pricing state.
    ///
    /// `AsRule` materializes the delta between the suggested and current
    /// price as a fixed-amount rule over the window at priority 100; the
    /// rule joins the normal compounding pipeline, so where other rules
    /// also match, the resolved price reflects the combination rather
    /// than the bare suggested price. `AsOverride` writes the suggested
    /// price as a custom override per date. The conversion direction is
    /// the caller's explicit choice.
    ///
    /// The suggestion is claimed under a single map guard before the
    /// conversion runs, so concurrent accepts apply it at most once; a
    /// failed conversion returns the suggestion to pending.
    ///
    /// # Errors
    ///
    /// Returns `SuggestionNotFound`, `StaleSuggestion` for anything not
    /// pending-and-unexpired, `BookingConflict` when an override
    /// conversion touches booked dates (the suggestion stays pending), or
    /// `LockTimeout`.
    pub fn accept_suggestion(
        &self,
        suggestion_id: i64,
        conversion: SuggestionConversion,
        now: OffsetDateTime,
    ) -> Result<PriceSuggestion, CoreError> {
        let accepted: PriceSuggestion =
            self.transition_if_pending(suggestion_id, SuggestionStatus::Accepted, now)?;
        if let Err(err) = self.apply_conversion(&accepted, conversion) {
            self.reopen_suggestion(suggestion_id);
            return Err(err);
        }
        Ok(accepted)
    }

    fn apply_conversion(
        &self,
        suggestion: &PriceSuggestion,
        conversion: SuggestionConversion,
    ) -> Result<(), CoreError> {
        let window: DateRange = DateRange::new(suggestion.start_date, suggestion.end_date)?;
        match conversion {
            SuggestionConversion::AsRule => {
                let rule: PricingRule = PricingRule {
                    id: self.next_id(),
                    property_id: suggestion.property_id,
                    kind: RuleKind::Custom,
                    date_range: Some(window),
                    days_of_week: None,
                    adjustment_type: AdjustmentType::FixedAmount,
                    adjustment_value: suggestion.suggested_price - suggestion.current_price,
                    min_nights: None,
                    max_nights: None,
                    advance_booking_days: None,
                    last_minute_days: None,
                    priority: ACCEPTED_SUGGESTION_RULE_PRIORITY,
                    exclusive: false,
                    is_active: true,
                };
                self.upsert_rule(rule)?;
            }
            SuggestionConversion::AsOverride => {
                let prices: Vec<(Date, Decimal)> = window
                    .days()
                    .map(|date| (date, suggestion.suggested_price))
                    .collect();
                self.set_custom_prices(suggestion.property_id, &prices)?;
            }
        }
        Ok(())
    }

    /// Rejects a pending suggestion.
    ///
    /// # Errors
    ///
    /// Returns `SuggestionNotFound` or `StaleSuggestion`.
    pub fn reject_suggestion(
        &self,
        suggestion_id: i64,
        now: OffsetDateTime,
    ) -> Result<PriceSuggestion, CoreError> {
        self.transition_if_pending(suggestion_id, SuggestionStatus::Rejected, now)
    }

    /// Expires every pending suggestion past its expiry, then evicts
    /// settled suggestions whose expiry is more than
    /// [`EngineConfig::suggestion_retention_days`] in the past. Returns
    /// how many were expired. Intended for a periodic sweep outside the
    /// request path; without the eviction the suggestion registry would
    /// grow without bound.
    pub fn expire_suggestions(&self, now: OffsetDateTime) -> usize {
        let mut expired: usize = 0;
        for mut item in self.suggestions.iter_mut() {
            if item.status == SuggestionStatus::Pending && item.is_expired(now) {
                item.status = SuggestionStatus::Expired;
                expired += 1;
            }
        }
        if expired > 0 {
            info!(expired, "Expired stale price suggestions");
        }
        let retention: time::Duration =
            time::Duration::days(i64::from(self.config.suggestion_retention_days));
        let before: usize = self.suggestions.len();
        self.suggestions.retain(|_, suggestion| {
            suggestion.status == SuggestionStatus::Pending
                || now < suggestion.expires_at + retention
        });
        let evicted: usize = before - self.suggestions.len();
        if evicted > 0 {
            info!(evicted, "Evicted settled price suggestions past retention");
        }
        expired
    }

    /// Moves a suggestion from pending to `target` under one map guard,
    /// marking it expired en passant when its expiry has passed. Holding
    /// the guard across the check and the write makes the claim atomic:
    /// of two racing callers, exactly one sees pending.
    fn transition_if_pending(
        &self,
        suggestion_id: i64,
        target: SuggestionStatus,
        now: OffsetDateTime,
    ) -> Result<PriceSuggestion, CoreError> {
        let mut item = self
            .suggestions
            .get_mut(&suggestion_id)
            .ok_or(CoreError::SuggestionNotFound(suggestion_id))?;
        if item.status == SuggestionStatus::Pending && item.is_expired(now) {
            item.status = SuggestionStatus::Expired;
        }
        if item.status != SuggestionStatus::Pending {
            return Err(CoreError::StaleSuggestion {
                suggestion_id,
                status: item.status,
            });
        }
        item.status = target;
        info!(suggestion_id, status = %target, "Suggestion transitioned");
        Ok(item.clone())
    }

    /// Returns a claimed suggestion to pending after a failed conversion.
    fn reopen_suggestion(&self, suggestion_id: i64) {
        if let Some(mut item) = self.suggestions.get_mut(&suggestion_id) {
            item.status = SuggestionStatus::Pending;
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
