// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    PROPERTY, date, engine_with_property, range, seasonal_rule, stay,
};
use crate::{CoreError, PricingEngine};
use rust_decimal::Decimal;
use stayrate_domain::{DatePrice, PriceSource, PricingRule};
use time::Month;

#[test]
fn test_resolve_without_rules_returns_base_rate() {
    let engine: PricingEngine = engine_with_property();

    let prices: Vec<DatePrice> = engine
        .resolve(
            PROPERTY,
            &stay(date(Month::July, 10), date(Month::July, 13)),
            date(Month::June, 1),
        )
        .unwrap();

    assert_eq!(prices.len(), 3);
    assert!(prices
        .iter()
        .all(|p| p.price == Decimal::from(100) && p.source == PriceSource::BaseRate));
}

#[test]
fn test_upserted_rule_takes_effect_on_next_resolve() {
    let engine: PricingEngine = engine_with_property();
    let scope = range(date(Month::July, 1), date(Month::July, 31));

    let version: u64 = engine.upsert_rule(seasonal_rule(1, scope, 20)).unwrap();
    assert_eq!(version, 1);

    let prices: Vec<DatePrice> = engine
        .resolve(
            PROPERTY,
            &stay(date(Month::July, 10), date(Month::July, 11)),
            date(Month::June, 1),
        )
        .unwrap();

    assert_eq!(prices[0].price, Decimal::new(12_000, 2));
    assert_eq!(prices[0].source, PriceSource::Rules);
}

#[test]
fn test_upsert_replaces_rule_with_same_id() {
    let engine: PricingEngine = engine_with_property();
    let scope = range(date(Month::July, 1), date(Month::July, 31));
    engine.upsert_rule(seasonal_rule(1, scope, 20)).unwrap();

    let version: u64 = engine.upsert_rule(seasonal_rule(1, scope, 50)).unwrap();

    assert_eq!(version, 2);
    let rules: Vec<PricingRule> = engine.rules(PROPERTY).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].adjustment_value, Decimal::from(50));
}

#[test]
fn test_deactivated_rule_stops_matching_but_remains_listed() {
    let engine: PricingEngine = engine_with_property();
    let scope = range(date(Month::July, 1), date(Month::July, 31));
    engine.upsert_rule(seasonal_rule(1, scope, 20)).unwrap();

    engine.deactivate_rule(PROPERTY, 1).unwrap();

    let prices: Vec<DatePrice> = engine
        .resolve(
            PROPERTY,
            &stay(date(Month::July, 10), date(Month::July, 11)),
            date(Month::June, 1),
        )
        .unwrap();
    assert_eq!(prices[0].price, Decimal::from(100));

    let rules: Vec<PricingRule> = engine.rules(PROPERTY).unwrap();
    assert_eq!(rules.len(), 1);
    assert!(!rules[0].is_active);
}

#[test]
fn test_deactivate_unknown_rule_fails() {
    let engine: PricingEngine = engine_with_property();

    let result = engine.deactivate_rule(PROPERTY, 99);

    assert_eq!(
        result,
        Err(CoreError::RuleNotFound {
            property_id: PROPERTY,
            rule_id: 99,
        })
    );
}

#[test]
fn test_upsert_rejects_invalid_rule() {
    let engine: PricingEngine = engine_with_property();
    let mut rule: PricingRule =
        seasonal_rule(1, range(date(Month::July, 1), date(Month::July, 31)), 20);
    rule.min_nights = Some(5);
    rule.max_nights = Some(2);

    let result = engine.upsert_rule(rule);

    assert!(matches!(result, Err(CoreError::DomainViolation(_))));
    assert!(engine.rules(PROPERTY).unwrap().is_empty());
}

#[test]
fn test_custom_override_wins_over_rules() {
    let engine: PricingEngine = engine_with_property();
    engine
        .upsert_rule(seasonal_rule(
            1,
            range(date(Month::July, 1), date(Month::July, 31)),
            20,
        ))
        .unwrap();
    engine
        .set_custom_prices(PROPERTY, &[(date(Month::July, 10), Decimal::from(95))])
        .unwrap();

    let prices: Vec<DatePrice> = engine
        .resolve(
            PROPERTY,
            &stay(date(Month::July, 10), date(Month::July, 12)),
            date(Month::June, 1),
        )
        .unwrap();

    assert_eq!(prices[0].price, Decimal::from(95));
    assert_eq!(prices[0].source, PriceSource::CustomOverride);
    assert_eq!(prices[1].price, Decimal::new(12_000, 2));
    assert_eq!(prices[1].source, PriceSource::Rules);
}

#[test]
fn test_quote_total_sums_nightly_prices() {
    let engine: PricingEngine = engine_with_property();
    engine
        .set_custom_prices(PROPERTY, &[(date(Month::July, 11), Decimal::from(150))])
        .unwrap();

    let total: Decimal = engine
        .quote_total(
            PROPERTY,
            &stay(date(Month::July, 10), date(Month::July, 13)),
            date(Month::June, 1),
        )
        .unwrap();

    assert_eq!(total, Decimal::from(350));
}
