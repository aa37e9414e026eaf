// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use stayrate_domain::{DomainError, PropertyId, SuggestionStatus};
use time::Date;

/// Errors produced by the stateful engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain invariant was violated.
    DomainViolation(DomainError),
    /// No pricing or calendar context exists for the property.
    UnknownProperty(PropertyId),
    /// The property is already registered.
    DuplicateProperty(PropertyId),
    /// The rule does not exist on the property.
    RuleNotFound {
        /// The property that was searched.
        property_id: PropertyId,
        /// The missing rule identifier.
        rule_id: i64,
    },
    /// A mutation touched one or more dates held by confirmed bookings.
    /// The operation was rejected atomically; nothing was applied.
    BookingConflict {
        /// The property the mutation targeted.
        property_id: PropertyId,
        /// The first conflicting date in the request.
        first_conflict: Date,
        /// Every conflicting date across the request, sorted.
        conflicts: Vec<Date>,
    },
    /// The per-property lock could not be acquired within the bounded
    /// wait. Retryable by the caller.
    LockTimeout {
        /// The contended property.
        property_id: PropertyId,
    },
    /// The suggestion does not exist.
    SuggestionNotFound(i64),
    /// The suggestion is no longer actionable.
    StaleSuggestion {
        /// The suggestion identifier.
        suggestion_id: i64,
        /// The status that made it unactionable.
        status: SuggestionStatus,
    },
    /// An internal error occurred.
    Internal(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "{err}"),
            Self::UnknownProperty(id) => write!(f, "Unknown property: {id}"),
            Self::DuplicateProperty(id) => write!(f, "Property {id} is already registered"),
            Self::RuleNotFound {
                property_id,
                rule_id,
            } => {
                write!(f, "Rule {rule_id} not found on property {property_id}")
            }
            Self::BookingConflict {
                property_id,
                first_conflict,
                conflicts,
            } => {
                write!(
                    f,
                    "Booking conflict on property {property_id}: {first_conflict} is booked ({} conflicting date{})",
                    conflicts.len(),
                    if conflicts.len() == 1 { "" } else { "s" }
                )
            }
            Self::LockTimeout { property_id } => {
                write!(
                    f,
                    "Timed out waiting for the calendar lock on property {property_id}"
                )
            }
            Self::SuggestionNotFound(id) => write!(f, "Suggestion {id} not found"),
            Self::StaleSuggestion {
                suggestion_id,
                status,
            } => {
                write!(
                    f,
                    "Suggestion {suggestion_id} is {status} and no longer actionable"
                )
            }
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
