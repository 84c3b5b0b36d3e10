//! Rule tables — the mapping from queue depth to desired worker count.
//!
//! A table is either a set of ascending thresholds ("at 25 pending jobs,
//! run 2 workers") or an ordered list of predicates ("while jobs < 30,
//! run 2 workers"). The form is decided once at configuration-load time;
//! a table that mixes the two forms is rejected with
//! [`ConfigError::MixedRuleForms`] instead of being shape-sniffed at
//! evaluation time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One step of an ascending threshold table: once `jobs` or more are
/// pending, the fleet should run `workers` workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub jobs: u64,
    pub workers: u32,
}

/// One step of a predicate table: while the predicate accepts the
/// pending-job count, the fleet should run `workers` workers.
#[derive(Clone)]
pub struct PredicateRule {
    when: Arc<dyn Fn(u64) -> bool + Send + Sync>,
    pub workers: u32,
}

impl PredicateRule {
    pub fn new(when: impl Fn(u64) -> bool + Send + Sync + 'static, workers: u32) -> Self {
        Self {
            when: Arc::new(when),
            workers,
        }
    }

    /// Whether this rule's predicate accepts the given pending-job count.
    pub fn accepts(&self, pending_jobs: u64) -> bool {
        (self.when)(pending_jobs)
    }
}

impl fmt::Debug for PredicateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRule")
            .field("when", &"<predicate>")
            .field("workers", &self.workers)
            .finish()
    }
}

/// A validated rule table in exactly one of the two forms.
#[derive(Debug, Clone)]
pub enum RuleTable {
    /// Ascending thresholds, matched from the highest threshold downward.
    Thresholds(Vec<ThresholdRule>),
    /// Ordered predicates, matched in definition order, first match wins.
    Predicates(Vec<PredicateRule>),
}

/// Untagged rule input for programmatic configuration. [`RuleTable::from_specs`]
/// decides the table form once and rejects mixes.
pub enum RuleSpec {
    Threshold { jobs: u64, workers: u32 },
    Predicate(PredicateRule),
}

impl RuleTable {
    /// Build a threshold table, validating shape up front: non-empty,
    /// strictly ascending thresholds, every rule hiring at least one worker.
    pub fn thresholds(rules: Vec<ThresholdRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyRuleTable);
        }
        for (index, rule) in rules.iter().enumerate() {
            if rule.workers == 0 {
                return Err(ConfigError::ZeroWorkerRule { index });
            }
            if index > 0 && rules[index - 1].jobs >= rule.jobs {
                return Err(ConfigError::UnorderedThresholds { index });
            }
        }
        Ok(RuleTable::Thresholds(rules))
    }

    /// Build a predicate table. Order is significant: evaluation scans in
    /// definition order and stops at the first acceptable rule.
    pub fn predicates(rules: Vec<PredicateRule>) -> Result<Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyRuleTable);
        }
        for (index, rule) in rules.iter().enumerate() {
            if rule.workers == 0 {
                return Err(ConfigError::ZeroWorkerRule { index });
            }
        }
        Ok(RuleTable::Predicates(rules))
    }

    /// Build a table from mixed-form input, deciding the form from the
    /// rules themselves. A table that contains both threshold and
    /// predicate rules is a configuration error, not a runtime branch.
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyRuleTable);
        }

        let mut thresholds = Vec::new();
        let mut predicates = Vec::new();
        for spec in specs {
            match spec {
                RuleSpec::Threshold { jobs, workers } => {
                    thresholds.push(ThresholdRule { jobs, workers });
                }
                RuleSpec::Predicate(rule) => predicates.push(rule),
            }
        }

        match (thresholds.is_empty(), predicates.is_empty()) {
            (false, true) => Self::thresholds(thresholds),
            (true, false) => Self::predicates(predicates),
            _ => Err(ConfigError::MixedRuleForms),
        }
    }

    /// The highest threshold in a threshold table, if that is the form.
    pub fn highest_threshold(&self) -> Option<u64> {
        match self {
            RuleTable::Thresholds(rules) => rules.last().map(|r| r.jobs),
            RuleTable::Predicates(_) => None,
        }
    }
}
