// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Price suggestion scoring.
//!
//! The suggestion engine is advisory and heuristic, never authoritative:
//! its output mutates nothing until an owner explicitly accepts it. The
//! scoring function is pure, a deterministic function of its declared
//! input signals, and is identified by a `model_version` string so the
//! formula can evolve without breaking stored historical suggestions.

use crate::error::DomainError;
use crate::types::{DateRange, PropertyId, round_to_minor_units};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Market signals ingested by the suggestion engine.
///
/// Signals are gathered before any calendar lock is taken; absent signals
/// simply drop out of the weighted sum and lower the confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarketSignals {
    /// Average nightly price of comparable listings.
    pub market_average_price: Option<Decimal>,
    /// Number of comparable listings behind the market average.
    pub competitor_count: u32,
    /// Recent occupancy rate for this property, 0-1.
    pub occupancy_rate: Option<f64>,
    /// Occupancy rate over the historical baseline window, 0-1.
    pub historical_occupancy: Option<f64>,
    /// Externally supplied demand score, 0-1.
    pub demand_score: Option<f64>,
    /// Trailing average nightly price for this property.
    pub historical_price: Option<Decimal>,
    /// Length in days of the historical window behind the trailing
    /// signals (caps confidence when short).
    pub history_window_days: u32,
}

/// Tunables for the suggestion scoring heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Weight of the competitor price gap signal.
    pub weight_competitor_gap: f64,
    /// Weight of the occupancy trend signal.
    pub weight_occupancy_trend: f64,
    /// Weight of the demand score signal.
    pub weight_demand: f64,
    /// Half-width of the recommendation band around the historical
    /// average, as a fraction (0.15 = ±15%).
    pub band_fraction: Decimal,
    /// Days until a pending suggestion expires.
    pub expiry_days: u32,
    /// Identifier of the scoring formula, stored with each suggestion.
    pub model_version: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            weight_competitor_gap: 0.5,
            weight_occupancy_trend: 0.3,
            weight_demand: 0.2,
            band_fraction: Decimal::new(15, 2),
            expiry_days: 7,
            model_version: String::from("heuristic-v1"),
        }
    }
}

/// Lifecycle status of a price suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// Generated and actionable until it expires.
    #[default]
    Pending,
    /// The owner applied the suggestion (as a rule or as overrides).
    Accepted,
    /// The owner declined the suggestion.
    Rejected,
    /// Passed `expires_at` without being acted on; no longer actionable.
    Expired,
}

impl SuggestionStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for SuggestionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            _ => Err(DomainError::InvalidSuggestionStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named signal that contributed to a suggestion, with its weight and
/// observed value. Reported in the order the formula applies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionFactor {
    /// The signal name (e.g. `competitor_gap`).
    pub name: String,
    /// The weight the formula assigned to the signal.
    pub weight: f64,
    /// The normalized observed value of the signal.
    pub value: f64,
}

/// An advisory price suggestion for a property over a date window.
///
/// A derived, disposable artifact: deleting it has no effect on price
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    /// Engine-assigned suggestion identifier.
    pub id: i64,
    /// The property the suggestion targets.
    pub property_id: PropertyId,
    /// First date of the suggested window.
    pub start_date: time::Date,
    /// Last date of the suggested window (inclusive).
    pub end_date: time::Date,
    /// The property's current effective nightly price over the window.
    pub current_price: Decimal,
    /// The suggested nightly price.
    pub suggested_price: Decimal,
    /// Lower bound of the recommendation band.
    pub min_recommended_price: Decimal,
    /// Upper bound of the recommendation band.
    pub max_recommended_price: Decimal,
    /// Evidence measure in 0-1. Not a probability of acceptance.
    pub confidence_score: f64,
    /// Ordered contributing signals with weights and values.
    pub factors: Vec<SuggestionFactor>,
    /// Market average behind the competitor gap, when known.
    pub market_average_price: Option<Decimal>,
    /// Number of comparable listings sampled.
    pub competitor_count: u32,
    /// Occupancy rate used by the formula, when known.
    pub occupancy_rate: Option<f64>,
    /// Demand score used by the formula, when known.
    pub demand_score: Option<f64>,
    /// Trailing average price used to anchor the band, when known.
    pub historical_price: Option<Decimal>,
    /// Historical occupancy baseline, when known.
    pub historical_occupancy: Option<f64>,
    /// Lifecycle status.
    pub status: SuggestionStatus,
    /// Identifier of the scoring formula that produced this suggestion.
    pub model_version: String,
    /// When the suggestion was generated.
    pub created_at: OffsetDateTime,
    /// When the suggestion stops being actionable.
    pub expires_at: OffsetDateTime,
}

impl PriceSuggestion {
    /// Returns whether the suggestion has passed its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Maximum history window, in days, that still increases confidence.
const FULL_HISTORY_DAYS: f64 = 90.0;

/// Number of competitors at which competitor evidence reaches one half.
const COMPETITOR_HALF_COUNT: f64 = 3.0;

/// Scores a price suggestion from market signals.
///
/// `heuristic-v1`: normalized signals (competitor price gap, occupancy
/// trend, demand) combine as a weighted sum into a relative adjustment of
/// the current price, clamped to a band of `band_fraction` around the
/// trailing historical average (the current price when no history
/// exists). The adjustment is capped at ±50% as a sanity bound.
///
/// Confidence is the product of signal coverage, competitor evidence, and
/// history depth, so it decreases monotonically as signals drop out and
/// is capped at 0.25 when no competitors were sampled; a single weak
/// signal can never masquerade as high confidence.
#[must_use]
#[allow(clippy::too_many_arguments, clippy::cast_precision_loss)]
pub fn score_suggestion(
    id: i64,
    property_id: PropertyId,
    window: &DateRange,
    current_price: Decimal,
    minor_units: u32,
    signals: &MarketSignals,
    config: &SuggestionConfig,
    now: OffsetDateTime,
) -> PriceSuggestion {
    let mut factors: Vec<SuggestionFactor> = Vec::new();

    let competitor_gap: Option<f64> = signals.market_average_price.and_then(|avg| {
        if avg.is_zero() || signals.competitor_count == 0 {
            return None;
        }
        let gap: Decimal = (avg - current_price) / avg;
        gap.to_f64()
    });
    if let Some(gap) = competitor_gap {
        factors.push(SuggestionFactor {
            name: String::from("competitor_gap"),
            weight: config.weight_competitor_gap,
            value: gap,
        });
    }

    let occupancy_trend: Option<f64> = match (signals.occupancy_rate, signals.historical_occupancy)
    {
        (Some(current), Some(baseline)) => Some(current - baseline),
        _ => None,
    };
    if let Some(trend) = occupancy_trend {
        factors.push(SuggestionFactor {
            name: String::from("occupancy_trend"),
            weight: config.weight_occupancy_trend,
            value: trend,
        });
    }

    // Demand is supplied in 0-1; center it so 0.5 is neutral.
    let demand: Option<f64> = signals.demand_score.map(|d| d - 0.5);
    if let Some(d) = demand {
        factors.push(SuggestionFactor {
            name: String::from("demand"),
            weight: config.weight_demand,
            value: d,
        });
    }

    let weighted_adjustment: f64 = factors
        .iter()
        .map(|f| f.weight * f.value)
        .sum::<f64>()
        .clamp(-0.5, 0.5);

    let adjustment: Decimal = Decimal::from_f64(weighted_adjustment).unwrap_or(Decimal::ZERO);
    let raw_suggested: Decimal = current_price * (Decimal::ONE + adjustment);

    let band_anchor: Decimal = signals.historical_price.unwrap_or(current_price);
    let min_recommended: Decimal = round_to_minor_units(
        band_anchor * (Decimal::ONE - config.band_fraction),
        minor_units,
    );
    let max_recommended: Decimal = round_to_minor_units(
        band_anchor * (Decimal::ONE + config.band_fraction),
        minor_units,
    );
    let suggested: Decimal = round_to_minor_units(
        raw_suggested.clamp(min_recommended, max_recommended),
        minor_units,
    );

    let coverage: f64 = factors.len() as f64 / 3.0;
    let competitor_evidence: f64 = f64::from(signals.competitor_count)
        / (f64::from(signals.competitor_count) + COMPETITOR_HALF_COUNT);
    let history_depth: f64 = (f64::from(signals.history_window_days) / FULL_HISTORY_DAYS).min(1.0);
    let confidence: f64 = ((0.25 + 0.75 * competitor_evidence)
        * coverage
        * (0.6 + 0.4 * history_depth))
        .clamp(0.0, 1.0);

    PriceSuggestion {
        id,
        property_id,
        start_date: window.start(),
        end_date: window.end(),
        current_price,
        suggested_price: suggested,
        min_recommended_price: min_recommended,
        max_recommended_price: max_recommended,
        confidence_score: confidence,
        factors,
        market_average_price: signals.market_average_price,
        competitor_count: signals.competitor_count,
        occupancy_rate: signals.occupancy_rate,
        demand_score: signals.demand_score,
        historical_price: signals.historical_price,
        historical_occupancy: signals.historical_occupancy,
        status: SuggestionStatus::Pending,
        model_version: config.model_version.clone(),
        created_at: now,
        expires_at: now + Duration::days(i64::from(config.expiry_days)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use time::{Date, Month};

    const PROPERTY: PropertyId = PropertyId::new(42);

    fn window() -> DateRange {
        DateRange::new(
            Date::from_calendar_date(2026, Month::July, 1).unwrap(),
            Date::from_calendar_date(2026, Month::July, 31).unwrap(),
        )
        .unwrap()
    }

    fn now() -> OffsetDateTime {
        Date::from_calendar_date(2026, Month::June, 1)
            .unwrap()
            .midnight()
            .assume_utc()
    }

    fn full_signals() -> MarketSignals {
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

    fn score(signals: &MarketSignals) -> PriceSuggestion {
        score_suggestion(
            1,
            PROPERTY,
            &window(),
            Decimal::from(100),
            2,
            signals,
            &SuggestionConfig::default(),
            now(),
        )
    }

    #[test]
    fn test_underpriced_property_gets_upward_suggestion() {
        let suggestion: PriceSuggestion = score(&full_signals());

        assert!(suggestion.suggested_price > suggestion.current_price);
        assert!(suggestion.suggested_price <= suggestion.max_recommended_price);
        assert_eq!(suggestion.status, SuggestionStatus::Pending);
        assert_eq!(suggestion.model_version, "heuristic-v1");
    }

    #[test]
    fn test_suggestion_clamped_to_recommendation_band() {
        let mut signals: MarketSignals = full_signals();
        // A huge market gap would push far past +15% without the clamp.
        signals.market_average_price = Some(Decimal::from(500));

        let suggestion: PriceSuggestion = score(&signals);

        assert_eq!(
            suggestion.suggested_price,
            suggestion.max_recommended_price
        );
        assert_eq!(suggestion.max_recommended_price, Decimal::new(11_500, 2));
        assert_eq!(suggestion.min_recommended_price, Decimal::new(8_500, 2));
    }

    #[test]
    fn test_zero_competitors_caps_confidence_low() {
        let mut signals: MarketSignals = full_signals();
        signals.competitor_count = 0;
        signals.market_average_price = None;

        let suggestion: PriceSuggestion = score(&signals);

        assert!(suggestion.confidence_score < 0.3);
    }

    #[test]
    fn test_confidence_decreases_as_signals_drop_out() {
        let full: PriceSuggestion = score(&full_signals());

        let mut fewer: MarketSignals = full_signals();
        fewer.demand_score = None;
        let partial: PriceSuggestion = score(&fewer);

        let mut fewest: MarketSignals = fewer.clone();
        fewest.occupancy_rate = None;
        let minimal: PriceSuggestion = score(&fewest);

        assert!(full.confidence_score > partial.confidence_score);
        assert!(partial.confidence_score > minimal.confidence_score);
    }

    #[test]
    fn test_confidence_grows_with_competitor_count() {
        let few: PriceSuggestion = score(&MarketSignals {
            competitor_count: 2,
            ..full_signals()
        });
        let many: PriceSuggestion = score(&MarketSignals {
            competitor_count: 40,
            ..full_signals()
        });

        assert!(many.confidence_score > few.confidence_score);
    }

    #[test]
    fn test_short_history_lowers_confidence() {
        let deep: PriceSuggestion = score(&full_signals());
        let shallow: PriceSuggestion = score(&MarketSignals {
            history_window_days: 10,
            ..full_signals()
        });

        assert!(deep.confidence_score > shallow.confidence_score);
    }

    #[test]
    fn test_no_signals_yields_current_price_and_zero_confidence() {
        let suggestion: PriceSuggestion = score(&MarketSignals::default());

        assert_eq!(suggestion.suggested_price, suggestion.current_price);
        assert!(suggestion.confidence_score.abs() < f64::EPSILON);
        assert!(suggestion.factors.is_empty());
    }

    #[test]
    fn test_factors_report_in_formula_order() {
        let suggestion: PriceSuggestion = score(&full_signals());

        let names: Vec<&str> = suggestion.factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["competitor_gap", "occupancy_trend", "demand"]);
    }

    #[test]
    fn test_expiry_set_seven_days_out() {
        let suggestion: PriceSuggestion = score(&full_signals());

        assert_eq!(suggestion.expires_at - suggestion.created_at, Duration::days(7));
        assert!(!suggestion.is_expired(now()));
        assert!(suggestion.is_expired(now() + Duration::days(8)));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a: PriceSuggestion = score(&full_signals());
        let b: PriceSuggestion = score(&full_signals());

        assert_eq!(a, b);
    }
}
