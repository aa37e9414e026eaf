// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sparse per-property calendar.
//!
//! One entry exists per date that deviates from the default of
//! available-with-no-override; mutation and query costs stay
//! proportional to the number of exceptions, not calendar length.
//! Callers (the engine) validate booking conflicts before invoking the
//! mutating methods here.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use stayrate_domain::{
    BlockedDateRange, CalendarDay, DateRange, DayState, PropertyId, StayWindow,
};
use time::Date;

/// The calendar state of a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCalendar {
    property_id: PropertyId,
    days: BTreeMap<Date, CalendarDay>,
}

impl PropertyCalendar {
    /// Creates an empty calendar: every date available, no overrides.
    #[must_use]
    pub const fn new(property_id: PropertyId) -> Self {
        Self {
            property_id,
            days: BTreeMap::new(),
        }
    }

    /// Returns the stored entry for a date, if any deviation exists.
    #[must_use]
    pub fn day(&self, date: Date) -> Option<&CalendarDay> {
        self.days.get(&date)
    }

    /// Returns the state of a date; absent entries are available.
    #[must_use]
    pub fn state_of(&self, date: Date) -> DayState {
        self.days.get(&date).map_or(DayState::Available, |d| d.state)
    }

    /// Returns whether a date is held by a confirmed booking.
    #[must_use]
    pub fn is_booked(&self, date: Date) -> bool {
        self.state_of(date) == DayState::Booked
    }

    /// Returns every booked date inside the range, in order.
    #[must_use]
    pub fn booked_dates_in(&self, range: &DateRange) -> Vec<Date> {
        self.days
            .range(range.start()..=range.end())
            .filter(|(_, day)| day.state == DayState::Booked)
            .map(|(date, _)| *date)
            .collect()
    }

    /// Returns the custom price override for a date, if set.
    #[must_use]
    pub fn custom_price(&self, date: Date) -> Option<Decimal> {
        self.days.get(&date).and_then(|d| d.custom_price)
    }

    /// Collects the custom price overrides for every night of a stay.
    #[must_use]
    pub fn overrides_for_stay(&self, stay: &StayWindow) -> BTreeMap<Date, Decimal> {
        self.days
            .range(stay.check_in()..stay.check_out())
            .filter_map(|(date, day)| day.custom_price.map(|p| (*date, p)))
            .collect()
    }

    /// Counts the dates in the range that are not available (blocked or
    /// booked). Used to derive occupancy for suggestion scoring.
    #[must_use]
    pub fn unavailable_count_in(&self, range: &DateRange) -> u32 {
        u32::try_from(
            self.days
                .range(range.start()..=range.end())
                .filter(|(_, day)| day.state != DayState::Available)
                .count(),
        )
        .unwrap_or(u32::MAX)
    }

    /// Marks every date in the range as blocked with the given reason.
    ///
    /// Preserves any custom price on the affected dates. Callers must
    /// have verified that no date in the range is booked.
    pub fn block(&mut self, range: &DateRange, reason: Option<&str>) {
        for date in range.days() {
            let entry: &mut CalendarDay =
                self.days.entry(date).or_insert_with(|| CalendarDay {
                    property_id: self.property_id,
                    date,
                    state: DayState::Available,
                    custom_price: None,
                    block_reason: None,
                });
            entry.state = DayState::Blocked;
            entry.block_reason = reason.map(str::to_string);
        }
    }

    /// Unblocks every blocked date in the range.
    ///
    /// Set subtraction, not a precondition-checked transition: dates that
    /// are not blocked are left untouched. Entries that become
    /// indistinguishable from the sparse default are pruned.
    pub fn unblock(&mut self, range: &DateRange) {
        for date in range.days() {
            if let Some(entry) = self.days.get_mut(&date)
                && entry.state == DayState::Blocked
            {
                entry.state = DayState::Available;
                entry.block_reason = None;
                if entry.is_default() {
                    self.days.remove(&date);
                }
            }
        }
    }

    /// Sets a custom price override for a date.
    ///
    /// Callers must have verified the date is not booked. Setting a
    /// price on a blocked date succeeds; it has no pricing effect until
    /// the date is unblocked.
    pub fn set_custom_price(&mut self, date: Date, price: Decimal) {
        self.days
            .entry(date)
            .or_insert_with(|| CalendarDay {
                property_id: self.property_id,
                date,
                state: DayState::Available,
                custom_price: None,
                block_reason: None,
            })
            .custom_price = Some(price);
    }

    /// Marks every date in the range as booked.
    ///
    /// Integration point for the booking subsystem; this engine itself
    /// never transitions a date into `Booked`. A booking replaces any
    /// owner block on the same dates.
    pub fn record_booking(&mut self, range: &DateRange) {
        for date in range.days() {
            let entry: &mut CalendarDay =
                self.days.entry(date).or_insert_with(|| CalendarDay {
                    property_id: self.property_id,
                    date,
                    state: DayState::Available,
                    custom_price: None,
                    block_reason: None,
                });
            entry.state = DayState::Booked;
            entry.block_reason = None;
        }
    }

    /// Derives the blocked-range view: consecutive blocked dates with
    /// the same reason coalesce into one [`BlockedDateRange`].
    #[must_use]
    pub fn blocked_ranges(&self) -> Vec<BlockedDateRange> {
        let mut ranges: Vec<BlockedDateRange> = Vec::new();
        for (date, day) in &self.days {
            if day.state != DayState::Blocked {
                continue;
            }
            let extends_previous: bool = ranges.last().is_some_and(|last| {
                last.end_date.next_day() == Some(*date) && last.reason == day.block_reason
            });
            if extends_previous {
                if let Some(last) = ranges.last_mut() {
                    last.end_date = *date;
                }
            } else {
                ranges.push(BlockedDateRange {
                    property_id: self.property_id,
                    start_date: *date,
                    end_date: *date,
                    reason: day.block_reason.clone(),
                });
            }
        }
        ranges
    }

    /// Returns the number of stored (non-default) entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.days.len()
    }
}
