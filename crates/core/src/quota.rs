//! Quota accounting constants and pure logic.
//!
//! Voice-session allowances are tracked in whole minutes. Each billing
//! period has a base pool (`remaining`/`used`, granted by the plan) and an
//! administratively topped-up `bonus` pool that is always consumed first.
//! This module holds the arithmetic only; persistence lives in `cleo-db`.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Conversion constants
// ---------------------------------------------------------------------------

/// Seconds per billed minute.
pub const SECS_PER_MINUTE: i64 = 60;

// ---------------------------------------------------------------------------
// Billable duration
// ---------------------------------------------------------------------------

/// Round a session duration up to whole billable minutes.
///
/// Partial minutes bill as a full minute (ceiling policy); non-positive
/// durations bill zero.
pub fn billable_minutes(duration_seconds: i64) -> i64 {
    if duration_seconds <= 0 {
        return 0;
    }
    (duration_seconds + SECS_PER_MINUTE - 1) / SECS_PER_MINUTE
}

// ---------------------------------------------------------------------------
// Deduction split
// ---------------------------------------------------------------------------

/// How a deduction is satisfied across the two pools.
///
/// `from_bonus` is drawn first, then `from_base`. Whatever the pools could
/// not supply ends up in `shortfall` and is absorbed -- overdraft is not
/// tracked or reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionSplit {
    pub from_bonus: i64,
    pub from_base: i64,
    pub shortfall: i64,
}

/// Split an `amount` of minutes across the bonus and base pools.
///
/// Bonus-first order is strict: the base pool is only touched once the
/// bonus pool is exhausted. Both pools are clamped at zero.
pub fn split_deduction(bonus: i64, remaining: i64, amount: i64) -> DeductionSplit {
    let amount = amount.max(0);
    let from_bonus = amount.min(bonus.max(0));
    let from_base = (amount - from_bonus).min(remaining.max(0));
    DeductionSplit {
        from_bonus,
        from_base,
        shortfall: amount - from_bonus - from_base,
    }
}

// ---------------------------------------------------------------------------
// Cost estimation
// ---------------------------------------------------------------------------

/// Estimate the AI cost of a session from its duration.
///
/// Uses the same ceiling-rounded minute count the quota deduction uses, so
/// the money estimate and the charge are derived from one quantity.
pub fn estimate_ai_cost(duration_seconds: i64, rate_per_minute: f64) -> f64 {
    billable_minutes(duration_seconds) as f64 * rate_per_minute
}

// ---------------------------------------------------------------------------
// Period bounds
// ---------------------------------------------------------------------------

/// Whether `at` falls inside the half-open period `[start, end)`.
///
/// The instant `at == end` belongs to the next period.
pub fn period_contains(start: DateTime<Utc>, end: DateTime<Utc>, at: DateTime<Utc>) -> bool {
    start <= at && at < end
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // -- billable_minutes --

    #[test]
    fn zero_seconds_bills_nothing() {
        assert_eq!(billable_minutes(0), 0);
    }

    #[test]
    fn negative_duration_bills_nothing() {
        assert_eq!(billable_minutes(-30), 0);
    }

    #[test]
    fn one_second_bills_one_minute() {
        assert_eq!(billable_minutes(1), 1);
    }

    #[test]
    fn sixty_seconds_bills_one_minute() {
        assert_eq!(billable_minutes(60), 1);
    }

    #[test]
    fn sixty_one_seconds_bills_two_minutes() {
        assert_eq!(billable_minutes(61), 2);
    }

    #[test]
    fn exact_two_minutes_bills_two() {
        assert_eq!(billable_minutes(120), 2);
    }

    #[test]
    fn full_cap_session_bills_fifteen() {
        assert_eq!(billable_minutes(900), 15);
    }

    // -- split_deduction --

    #[test]
    fn deduction_within_bonus_leaves_base_untouched() {
        let split = split_deduction(5, 10, 4);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 4,
                from_base: 0,
                shortfall: 0
            }
        );
    }

    #[test]
    fn deduction_spills_from_bonus_into_base() {
        let split = split_deduction(1, 10, 3);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 1,
                from_base: 2,
                shortfall: 0
            }
        );
    }

    #[test]
    fn deduction_exactly_draining_both_pools() {
        let split = split_deduction(3, 7, 10);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 3,
                from_base: 7,
                shortfall: 0
            }
        );
    }

    #[test]
    fn overdraw_is_absorbed_as_shortfall() {
        let split = split_deduction(2, 3, 10);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 2,
                from_base: 3,
                shortfall: 5
            }
        );
    }

    #[test]
    fn empty_pools_absorb_everything() {
        let split = split_deduction(0, 0, 4);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 0,
                from_base: 0,
                shortfall: 4
            }
        );
    }

    #[test]
    fn zero_amount_touches_nothing() {
        let split = split_deduction(5, 10, 0);
        assert_eq!(
            split,
            DeductionSplit {
                from_bonus: 0,
                from_base: 0,
                shortfall: 0
            }
        );
    }

    #[test]
    fn negative_amount_treated_as_zero() {
        let split = split_deduction(5, 10, -3);
        assert_eq!(split.from_bonus, 0);
        assert_eq!(split.from_base, 0);
        assert_eq!(split.shortfall, 0);
    }

    // Scenario from the top-up flow: {remaining: 10, bonus: 5}, charge 4
    // then 3. First charge comes entirely from bonus; the second drains
    // the last bonus minute and takes 2 from base.

    #[test]
    fn top_up_then_two_sessions_scenario() {
        let first = split_deduction(5, 10, 4);
        assert_eq!(first.from_bonus, 4);
        assert_eq!(first.from_base, 0);

        let second = split_deduction(5 - first.from_bonus, 10, 3);
        assert_eq!(second.from_bonus, 1);
        assert_eq!(second.from_base, 2);
        assert_eq!(second.shortfall, 0);
    }

    // -- estimate_ai_cost --

    #[test]
    fn cost_uses_ceiled_minutes() {
        // 61 seconds -> 2 billed minutes.
        let cost = estimate_ai_cost(61, 0.05);
        assert!((cost - 0.10).abs() < 1e-9);
    }

    #[test]
    fn cost_of_zero_duration_is_zero() {
        assert!((estimate_ai_cost(0, 0.05) - 0.0).abs() < f64::EPSILON);
    }

    // -- period_contains --

    #[test]
    fn period_is_half_open() {
        let start = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();

        assert!(period_contains(start, end, start));
        assert!(!period_contains(start, end, end));

        let inside = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();
        assert!(period_contains(start, end, inside));

        let before = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        assert!(!period_contains(start, end, before));
    }
}
