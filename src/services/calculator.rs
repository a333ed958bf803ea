//! Time-entry lifecycle calculator.
//!
//! Pure functions that turn raw clock-in/clock-out/break records into
//! regular hours, overtime hours and a billable amount. The caller owns
//! persistence and must re-invoke the computation on every mutation of
//! the inputs.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::{DateTime, Utc};

use crate::database::models::{BreakEntry, TimeEntry};
use crate::error::AppError;

/// Compliance inputs consumed read-only: the user's settings when
/// present, otherwise the organization's.
#[derive(Debug, Clone)]
pub struct Thresholds {
    pub daily_limit: BigDecimal,
    pub overtime_multiplier: BigDecimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            daily_limit: BigDecimal::from(8),
            overtime_multiplier: BigDecimal::from(3) / BigDecimal::from(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryTotals {
    pub regular_hours: BigDecimal,
    pub overtime_hours: BigDecimal,
    pub total_hours: BigDecimal,
    pub break_hours: BigDecimal,
    pub billable_amount: BigDecimal,
}

fn round2(value: BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Duration of a single break in hours. An open break contributes
/// nothing until it is closed; a stored duration wins over the interval.
pub fn break_duration_hours(entry: &BreakEntry) -> BigDecimal {
    if let Some(minutes) = entry.duration_minutes {
        return BigDecimal::from(minutes) / BigDecimal::from(60);
    }
    match entry.end_time {
        Some(end) => {
            let minutes = (end - entry.start_time).num_minutes().max(0);
            BigDecimal::from(minutes) / BigDecimal::from(60)
        }
        None => BigDecimal::zero(),
    }
}

/// Minutes between start and end, the derived value stored when a break
/// is closed without an explicit duration.
pub fn derived_break_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    ((end - start).num_seconds().max(0) / 60) as i32
}

/// Compute all derived fields for a time entry.
///
/// `now` substitutes for clock-out while the entry is still open, so the
/// function stays pure and repeatable for a fixed instant.
pub fn compute_totals(
    entry: &TimeEntry,
    breaks: &[BreakEntry],
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Result<EntryTotals, AppError> {
    let clock_out = entry.clock_out.unwrap_or(now);
    if clock_out < entry.clock_in {
        return Err(AppError::InvalidInterval);
    }

    let raw_seconds = (clock_out - entry.clock_in).num_seconds();
    let raw_hours = BigDecimal::from(raw_seconds) / BigDecimal::from(3600);

    // Only unpaid breaks subtract from worked time.
    let break_hours = breaks
        .iter()
        .filter(|b| !b.is_paid)
        .map(break_duration_hours)
        .fold(BigDecimal::zero(), |acc, hours| acc + hours);

    let net_hours = raw_hours - &break_hours;
    let total_hours = if net_hours < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        net_hours
    };
    let total_hours = round2(total_hours);

    // Split after rounding so regular + overtime == total exactly.
    let regular_hours = round2(total_hours.clone().min(thresholds.daily_limit.clone()));
    let overtime_hours = &total_hours - &regular_hours;

    let billable_amount = match (&entry.hourly_rate, entry.is_billable) {
        (Some(rate), true) => {
            let regular_amount = &regular_hours * rate;
            let overtime_amount = &overtime_hours * rate * &thresholds.overtime_multiplier;
            round2(regular_amount + overtime_amount)
        }
        _ => round2(BigDecimal::zero()),
    };

    Ok(EntryTotals {
        regular_hours,
        overtime_hours,
        total_hours,
        break_hours: round2(break_hours),
        billable_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ApprovalStatus, BreakType};
    use chrono::TimeZone;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    fn entry(clock_in: DateTime<Utc>, clock_out: Option<DateTime<Utc>>) -> TimeEntry {
        let now = at(0, 0);
        TimeEntry {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_id: None,
            task_id: None,
            department_id: None,
            date: clock_in.date_naive(),
            clock_in,
            clock_out,
            regular_hours: BigDecimal::zero(),
            overtime_hours: BigDecimal::zero(),
            total_hours: BigDecimal::zero(),
            break_hours: BigDecimal::zero(),
            is_billable: false,
            hourly_rate: None,
            billable_amount: BigDecimal::zero(),
            description: None,
            status: ApprovalStatus::Draft,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            is_locked: false,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn break_entry(
        parent: &TimeEntry,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        is_paid: bool,
    ) -> BreakEntry {
        BreakEntry {
            id: Uuid::new_v4(),
            organization_id: parent.organization_id,
            time_entry_id: parent.id,
            break_type: BreakType::ShortBreak,
            start_time: start,
            end_time: end,
            duration_minutes: end.map(|e| derived_break_minutes(start, e)),
            is_paid,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn thresholds(limit: i32, multiplier: &str) -> Thresholds {
        Thresholds {
            daily_limit: BigDecimal::from(limit),
            overtime_multiplier: dec(multiplier),
        }
    }

    #[test]
    fn full_day_with_overtime_splits_at_daily_limit() {
        // 09:00 -> 17:30, no breaks, limit 8
        let e = entry(at(9, 0), Some(at(17, 30)));
        let totals = compute_totals(&e, &[], &thresholds(8, "1.5"), at(18, 0)).unwrap();

        assert_eq!(totals.total_hours, dec("8.50"));
        assert_eq!(totals.regular_hours, dec("8.00"));
        assert_eq!(totals.overtime_hours, dec("0.50"));
        assert_eq!(totals.break_hours, dec("0.00"));
    }

    #[test]
    fn unpaid_break_subtracts_from_total() {
        // 09:00 -> 17:00 with a 30 minute unpaid lunch
        let e = entry(at(9, 0), Some(at(17, 0)));
        let b = break_entry(&e, at(12, 0), Some(at(12, 30)), false);
        let totals = compute_totals(&e, &[b], &thresholds(8, "1.5"), at(18, 0)).unwrap();

        assert_eq!(totals.total_hours, dec("7.50"));
        assert_eq!(totals.regular_hours, dec("7.50"));
        assert_eq!(totals.overtime_hours, dec("0.00"));
        assert_eq!(totals.break_hours, dec("0.50"));
    }

    #[test]
    fn paid_break_does_not_subtract() {
        let e = entry(at(9, 0), Some(at(17, 0)));
        let b = break_entry(&e, at(12, 0), Some(at(12, 30)), true);
        let totals = compute_totals(&e, &[b], &thresholds(8, "1.5"), at(18, 0)).unwrap();

        assert_eq!(totals.total_hours, dec("8.00"));
        assert_eq!(totals.break_hours, dec("0.00"));
    }

    #[test]
    fn billable_amount_applies_overtime_multiplier() {
        // 10 hours at 50.00/h, limit 8, multiplier 1.5:
        // 8 x 50 + 2 x 50 x 1.5 = 550.00
        let mut e = entry(at(8, 0), Some(at(18, 0)));
        e.is_billable = true;
        e.hourly_rate = Some(dec("50.00"));
        let totals = compute_totals(&e, &[], &thresholds(8, "1.5"), at(19, 0)).unwrap();

        assert_eq!(totals.regular_hours, dec("8.00"));
        assert_eq!(totals.overtime_hours, dec("2.00"));
        assert_eq!(totals.billable_amount, dec("550.00"));
    }

    #[test]
    fn not_billable_yields_zero_amount() {
        let mut e = entry(at(8, 0), Some(at(18, 0)));
        e.is_billable = false;
        e.hourly_rate = Some(dec("50.00"));
        let totals = compute_totals(&e, &[], &thresholds(8, "1.5"), at(19, 0)).unwrap();
        assert_eq!(totals.billable_amount, dec("0.00"));
    }

    #[test]
    fn missing_rate_yields_zero_amount() {
        let mut e = entry(at(8, 0), Some(at(18, 0)));
        e.is_billable = true;
        e.hourly_rate = None;
        let totals = compute_totals(&e, &[], &thresholds(8, "1.5"), at(19, 0)).unwrap();
        assert_eq!(totals.billable_amount, dec("0.00"));
    }

    #[test]
    fn open_entry_uses_now_as_clock_out() {
        let e = entry(at(9, 0), None);
        let totals = compute_totals(&e, &[], &thresholds(8, "1.5"), at(13, 0)).unwrap();
        assert_eq!(totals.total_hours, dec("4.00"));
    }

    #[test]
    fn open_break_contributes_nothing_until_closed() {
        let e = entry(at(9, 0), None);
        let b = break_entry(&e, at(12, 0), None, false);
        let totals = compute_totals(&e, &[b], &thresholds(8, "1.5"), at(13, 0)).unwrap();
        assert_eq!(totals.total_hours, dec("4.00"));
        assert_eq!(totals.break_hours, dec("0.00"));
    }

    #[test]
    fn clock_out_before_clock_in_is_rejected() {
        let e = entry(at(9, 0), Some(at(8, 0)));
        let err = compute_totals(&e, &[], &thresholds(8, "1.5"), at(10, 0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInterval));
    }

    #[test]
    fn breaks_longer_than_worked_time_clamp_to_zero() {
        // 30 minutes worked, 60 minutes of unpaid break recorded
        let e = entry(at(9, 0), Some(at(9, 30)));
        let b = break_entry(&e, at(9, 0), Some(at(10, 0)), false);
        let totals = compute_totals(&e, &[b], &thresholds(8, "1.5"), at(11, 0)).unwrap();

        assert_eq!(totals.total_hours, dec("0.00"));
        assert_eq!(totals.regular_hours, dec("0.00"));
        assert_eq!(totals.overtime_hours, dec("0.00"));
    }

    #[test]
    fn regular_plus_overtime_equals_total() {
        let cases = [
            (at(9, 0), at(17, 30), 8),
            (at(0, 0), at(23, 59), 8),
            (at(9, 0), at(9, 1), 8),
            (at(6, 15), at(19, 45), 10),
        ];
        for (start, end, limit) in cases {
            let e = entry(start, Some(end));
            let totals = compute_totals(&e, &[], &thresholds(limit, "1.5"), end).unwrap();
            assert_eq!(
                &totals.regular_hours + &totals.overtime_hours,
                totals.total_hours
            );
            assert!(totals.regular_hours <= BigDecimal::from(limit));
            assert!(totals.overtime_hours >= BigDecimal::zero());
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let e = entry(at(9, 0), Some(at(17, 30)));
        let now = at(18, 0);
        let t = thresholds(8, "1.5");
        let first = compute_totals(&e, &[], &t, now).unwrap();
        let second = compute_totals(&e, &[], &t, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stored_break_duration_wins_over_interval() {
        let e = entry(at(9, 0), Some(at(17, 0)));
        let mut b = break_entry(&e, at(12, 0), Some(at(13, 0)), false);
        b.duration_minutes = Some(15);
        let totals = compute_totals(&e, &[b], &thresholds(8, "1.5"), at(18, 0)).unwrap();
        assert_eq!(totals.break_hours, dec("0.25"));
        assert_eq!(totals.total_hours, dec("7.75"));
    }
}
