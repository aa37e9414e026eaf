// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned per-property rule collection.
//!
//! Rules are owner-editable records; resolution never reads them in
//! place. Each mutation bumps the version and resolution takes a cloned
//! snapshot, so concurrent edits cannot corrupt an in-flight resolution.

use stayrate_domain::PricingRule;

/// The ordered collection of pricing rules attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    version: u64,
    rules: Vec<PricingRule>,
}

impl RuleSet {
    /// Creates an empty rule set at version zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: 0,
            rules: Vec::new(),
        }
    }

    /// Returns the current version, bumped on every mutation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the rules, active and inactive.
    #[must_use]
    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    /// Inserts a rule, replacing any existing rule with the same id.
    ///
    /// Returns the new version.
    pub fn upsert(&mut self, rule: PricingRule) -> u64 {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
        self.version += 1;
        self.version
    }

    /// Soft-deactivates a rule so historical computations can still
    /// reference it. Returns false if the rule does not exist.
    pub fn deactivate(&mut self, rule_id: i64) -> bool {
        let Some(rule) = self.rules.iter_mut().find(|r| r.id == rule_id) else {
            return false;
        };
        rule.is_active = false;
        self.version += 1;
        true
    }

    /// Clones an immutable snapshot for resolution.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PricingRule> {
        self.rules.clone()
    }
}
