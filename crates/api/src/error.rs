// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use stayrate::CoreError;
use stayrate_domain::DomainError;
use time::Date;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract; every core error is translated explicitly so internal
/// details are never leaked directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The request touched dates held by confirmed bookings. Nothing
    /// was applied.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
        /// Every conflicting date, sorted.
        conflicting_dates: Vec<Date>,
    },
    /// The property was too contended to mutate within the bounded
    /// wait; the client should retry.
    RetryLater {
        /// A human-readable description of the contention.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::Conflict {
                message,
                conflicting_dates,
            } => {
                write!(
                    f,
                    "Booking conflict: {message} ({} date{})",
                    conflicting_dates.len(),
                    if conflicting_dates.len() == 1 { "" } else { "s" }
                )
            }
            Self::RetryLater { message } => {
                write!(f, "Temporarily unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not
/// leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidDateRange { start, end } => ApiError::InvalidInput {
            field: String::from("date_range"),
            message: format!("End date {end} is before start date {start}"),
        },
        DomainError::InvalidStayWindow {
            check_in,
            check_out,
        } => ApiError::InvalidInput {
            field: String::from("stay"),
            message: format!("Check-out {check_out} must be after check-in {check_in}"),
        },
        DomainError::InvalidRule { rule_id, reason } => ApiError::InvalidInput {
            field: String::from("rule"),
            message: format!("Rule {rule_id} is invalid: {reason}"),
        },
        DomainError::InvalidBaseRate { value } => ApiError::InvalidInput {
            field: String::from("base_rate"),
            message: format!("Rate must not be negative, got {value}"),
        },
        DomainError::InvalidPrice { date, value } => ApiError::InvalidInput {
            field: String::from("price"),
            message: format!("Price for {date} must not be negative, got {value}"),
        },
        DomainError::InvalidDayState(value) => ApiError::InvalidInput {
            field: String::from("state"),
            message: format!("Unknown day state: {value}"),
        },
        DomainError::InvalidSuggestionStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown suggestion status: {value}"),
        },
    }
}

/// Translates a core engine error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnknownProperty(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Property"),
            message: format!("Property {id} is not registered"),
        },
        CoreError::DuplicateProperty(id) => ApiError::DomainRuleViolation {
            rule: String::from("unique_property"),
            message: format!("Property {id} is already registered"),
        },
        CoreError::RuleNotFound {
            property_id,
            rule_id,
        } => ApiError::ResourceNotFound {
            resource_type: String::from("Pricing rule"),
            message: format!("Rule {rule_id} does not exist on property {property_id}"),
        },
        CoreError::BookingConflict {
            property_id,
            first_conflict,
            conflicts,
        } => ApiError::Conflict {
            message: format!(
                "Property {property_id} has a confirmed booking on {first_conflict}"
            ),
            conflicting_dates: conflicts,
        },
        CoreError::LockTimeout { property_id } => ApiError::RetryLater {
            message: format!("Property {property_id} calendar is busy, retry shortly"),
        },
        CoreError::SuggestionNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Price suggestion"),
            message: format!("Suggestion {id} does not exist"),
        },
        CoreError::StaleSuggestion {
            suggestion_id,
            status,
        } => ApiError::DomainRuleViolation {
            rule: String::from("pending_suggestions_only"),
            message: format!(
                "Suggestion {suggestion_id} is {status} and can no longer be acted on"
            ),
        },
        CoreError::Internal(message) => ApiError::Internal { message },
    }
}
