//! Policy evaluation — pure functions from queue snapshot to decision.

use crewscale_core::{QueueSnapshot, RuleTable, ScaleDecision, ScalePolicy};

/// Decide the hire target for a snapshot.
///
/// Threshold tables are scanned from the highest threshold downward; the
/// first rule whose threshold is met and whose worker count fits under
/// `max_workers` is selected. Predicate tables are scanned in definition
/// order. Either way the result is monotonic: a target is produced only
/// when it is strictly above the current worker count, and it never
/// exceeds `max_workers`.
///
/// A backlog that overflows the table (past the highest threshold, or
/// rejected by every predicate) escalates straight to `max_workers`.
pub fn evaluate(snapshot: &QueueSnapshot, policy: &ScalePolicy) -> ScaleDecision {
    match &policy.rules {
        RuleTable::Thresholds(rules) => {
            for rule in rules.iter().rev() {
                if rule.jobs <= snapshot.pending_jobs && rule.workers <= policy.max_workers {
                    return if rule.workers > snapshot.active_workers {
                        ScaleDecision::ScaleTo(rule.workers)
                    } else {
                        ScaleDecision::NoChange
                    };
                }
            }

            // No rule fit under the cap. If the backlog is past the end
            // of the table, run everything we are allowed to.
            if let Some(highest) = rules.last()
                && snapshot.pending_jobs > highest.jobs
                && snapshot.active_workers < policy.max_workers
            {
                return ScaleDecision::ScaleTo(policy.max_workers);
            }
            ScaleDecision::NoChange
        }
        RuleTable::Predicates(rules) => {
            let mut any_accepted = false;
            for rule in rules {
                if rule.accepts(snapshot.pending_jobs) {
                    any_accepted = true;
                    if rule.workers <= policy.max_workers
                        && rule.workers > snapshot.active_workers
                    {
                        return ScaleDecision::ScaleTo(rule.workers);
                    }
                }
            }

            // Queue depth beyond every predicate's domain.
            if !any_accepted && snapshot.active_workers < policy.max_workers {
                return ScaleDecision::ScaleTo(policy.max_workers);
            }
            ScaleDecision::NoChange
        }
    }
}

/// Decide the fire target for a snapshot.
///
/// Produces `min_workers` exactly when the queue is empty and the fleet
/// sits above the floor. Deliberately binary: a partial reduction risks
/// the provider terminating a worker mid-job, so the fleet either stays
/// put or drains fully to the floor.
pub fn evaluate_drain(snapshot: &QueueSnapshot, policy: &ScalePolicy) -> ScaleDecision {
    if snapshot.pending_jobs == 0 && snapshot.active_workers > policy.min_workers {
        ScaleDecision::ScaleTo(policy.min_workers)
    } else {
        ScaleDecision::NoChange
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crewscale_core::{PredicateRule, ThresholdRule};

    fn threshold_policy(pairs: &[(u64, u32)], max: u32, min: u32) -> ScalePolicy {
        let rules = pairs
            .iter()
            .map(|&(jobs, workers)| ThresholdRule { jobs, workers })
            .collect();
        ScalePolicy::new(RuleTable::thresholds(rules).unwrap(), max, min).unwrap()
    }

    fn stock_policy() -> ScalePolicy {
        threshold_policy(&[(1, 1), (15, 2), (30, 3), (60, 4), (90, 5)], 5, 0)
    }

    fn predicate_policy(max: u32) -> ScalePolicy {
        let rules = RuleTable::predicates(vec![
            PredicateRule::new(|jobs| jobs < 15, 1),
            PredicateRule::new(|jobs| jobs < 30, 2),
            PredicateRule::new(|jobs| jobs < 60, 3),
            PredicateRule::new(|jobs| jobs < 90, 4),
        ])
        .unwrap();
        ScalePolicy::new(rules, max, 0).unwrap()
    }

    #[test]
    fn first_job_hires_first_worker() {
        let decision = evaluate(&QueueSnapshot::new(1, 0), &stock_policy());
        assert_eq!(decision, ScaleDecision::ScaleTo(1));
    }

    #[test]
    fn backlog_growth_hires_up() {
        let decision = evaluate(&QueueSnapshot::new(20, 1), &stock_policy());
        assert_eq!(decision, ScaleDecision::ScaleTo(2));
    }

    #[test]
    fn satisfied_target_is_no_change() {
        let decision = evaluate(&QueueSnapshot::new(25, 2), &stock_policy());
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn never_lowers_the_worker_count() {
        // 25 pending maps to 2 workers, but 3 are running. Hiring is
        // monotonic, so this stays put rather than stepping down.
        let decision = evaluate(&QueueSnapshot::new(25, 3), &stock_policy());
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn empty_queue_is_no_change_for_hire() {
        let decision = evaluate(&QueueSnapshot::new(0, 0), &stock_policy());
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn max_workers_caps_rule_lookup() {
        // The only rule wants 5 workers but the cap is 3: the rule is
        // skipped and the overflow path escalates to the cap instead.
        let policy = threshold_policy(&[(5, 5)], 3, 0);
        let decision = evaluate(&QueueSnapshot::new(100, 0), &policy);
        assert_eq!(decision, ScaleDecision::ScaleTo(3));
    }

    #[test]
    fn capped_table_at_capacity_is_no_change() {
        let policy = threshold_policy(&[(5, 5)], 3, 0);
        let decision = evaluate(&QueueSnapshot::new(100, 3), &policy);
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn backlog_below_lowest_threshold_is_no_change() {
        let policy = threshold_policy(&[(10, 1), (20, 2)], 5, 0);
        let decision = evaluate(&QueueSnapshot::new(3, 0), &policy);
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn predicate_table_first_match_wins() {
        let decision = evaluate(&QueueSnapshot::new(20, 1), &predicate_policy(5));
        assert_eq!(decision, ScaleDecision::ScaleTo(2));
    }

    #[test]
    fn predicate_overflow_escalates_to_max() {
        // 100 pending is outside every predicate's domain.
        let decision = evaluate(&QueueSnapshot::new(100, 4), &predicate_policy(5));
        assert_eq!(decision, ScaleDecision::ScaleTo(5));
    }

    #[test]
    fn predicate_overflow_at_max_is_no_change() {
        let decision = evaluate(&QueueSnapshot::new(100, 5), &predicate_policy(5));
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn predicate_rules_respect_the_cap() {
        // Matching rule wants 3 workers but the cap is 2.
        let decision = evaluate(&QueueSnapshot::new(40, 0), &predicate_policy(2));
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let snapshot = QueueSnapshot::new(20, 1);
        let policy = stock_policy();
        assert_eq!(evaluate(&snapshot, &policy), evaluate(&snapshot, &policy));
    }

    #[test]
    fn hire_bounds_hold_across_the_grid() {
        // Exhaustive sweep: targets stay within (active, max].
        let policies = [stock_policy(), threshold_policy(&[(5, 5)], 3, 0)];
        for policy in &policies {
            for pending in 0..200u64 {
                for active in 0..8u32 {
                    let snapshot = QueueSnapshot::new(pending, active);
                    if let ScaleDecision::ScaleTo(target) = evaluate(&snapshot, policy) {
                        assert!(target <= policy.max_workers, "target above cap");
                        assert!(target > active, "hire lowered the fleet");
                    }
                }
            }
        }
    }

    #[test]
    fn drain_to_floor_when_queue_empties() {
        let policy = threshold_policy(&[(1, 1)], 10, 2);
        let decision = evaluate_drain(&QueueSnapshot::new(0, 10), &policy);
        assert_eq!(decision, ScaleDecision::ScaleTo(2));
    }

    #[test]
    fn drain_is_no_change_at_the_floor() {
        let policy = threshold_policy(&[(1, 1)], 10, 2);
        let decision = evaluate_drain(&QueueSnapshot::new(0, 2), &policy);
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn drain_is_no_change_with_backlog() {
        let policy = threshold_policy(&[(1, 1)], 10, 2);
        let decision = evaluate_drain(&QueueSnapshot::new(5, 10), &policy);
        assert_eq!(decision, ScaleDecision::NoChange);
    }

    #[test]
    fn drain_to_zero_floor() {
        let policy = threshold_policy(&[(1, 1)], 10, 0);
        let decision = evaluate_drain(&QueueSnapshot::new(0, 1), &policy);
        assert_eq!(decision, ScaleDecision::ScaleTo(0));
    }

    #[test]
    fn drain_only_triggers_on_empty_queue() {
        let policy = threshold_policy(&[(1, 1)], 10, 0);
        for pending in 1..50u64 {
            for active in 0..12u32 {
                let snapshot = QueueSnapshot::new(pending, active);
                assert_eq!(evaluate_drain(&snapshot, &policy), ScaleDecision::NoChange);
            }
        }
    }
}
