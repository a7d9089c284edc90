use chrono::NaiveDate;
use serde::Serialize;

/// Per-status goal counts with percentages rounded to one decimal.
/// Percentages are defined as 0.0 when there are no goals at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GoalBreakdown {
    pub active: u64,
    pub completed: u64,
    pub abandoned: u64,
    pub total: u64,
    pub active_percent: f64,
    pub completed_percent: f64,
    pub abandoned_percent: f64,
}

impl GoalBreakdown {
    pub fn new(active: u64, completed: u64, abandoned: u64) -> Self {
        let total = active + completed + abandoned;
        Self {
            active,
            completed,
            abandoned,
            total,
            active_percent: percent_of(active, total, 1),
            completed_percent: percent_of(completed, total, 1),
            abandoned_percent: percent_of(abandoned, total, 1),
        }
    }
}

/// Daily habit bookkeeping since creation. The creation day counts as day 1,
/// so a habit created today already has one elapsed day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HabitProgress {
    pub total_days: u64,
    pub completed_days: u64,
    pub not_completed_days: u64,
    pub ignored_days: u64,
    pub progress_percent: f64,
}

impl HabitProgress {
    pub fn compute(created: NaiveDate, today: NaiveDate, completed: u64, not_completed: u64) -> Self {
        let elapsed = (today - created).num_days();
        // A clock running behind the stored creation date yields zero days,
        // never a negative count.
        let total_days = if elapsed < 0 { 0 } else { elapsed as u64 + 1 };
        let recorded = completed + not_completed;
        let ignored_days = total_days.saturating_sub(recorded);
        Self {
            total_days,
            completed_days: completed,
            not_completed_days: not_completed,
            ignored_days,
            progress_percent: percent_of(completed, total_days, 2),
        }
    }
}

/// count / total * 100, rounded to `decimals` places; 0.0 on a zero total.
fn percent_of(count: u64, total: u64, decimals: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (count as f64 / total as f64 * 100.0 * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn breakdown_splits_evenly_across_three_statuses() {
        let breakdown = GoalBreakdown::new(1, 1, 1);
        assert_eq!(breakdown.total, 3);
        assert_eq!(breakdown.active_percent, 33.3);
        assert_eq!(breakdown.completed_percent, 33.3);
        assert_eq!(breakdown.abandoned_percent, 33.3);
    }

    #[test]
    fn breakdown_with_no_goals_is_all_zero() {
        let breakdown = GoalBreakdown::new(0, 0, 0);
        assert_eq!(breakdown.total, 0);
        assert_eq!(breakdown.active_percent, 0.0);
        assert_eq!(breakdown.completed_percent, 0.0);
        assert_eq!(breakdown.abandoned_percent, 0.0);
    }

    #[test]
    fn breakdown_rounds_to_one_decimal() {
        let breakdown = GoalBreakdown::new(1, 2, 4);
        assert_eq!(breakdown.active_percent, 14.3);
        assert_eq!(breakdown.completed_percent, 28.6);
        assert_eq!(breakdown.abandoned_percent, 57.1);
    }

    #[test]
    fn habit_created_today_counts_one_ignored_day() {
        let today = date(2023, 3, 4);
        let progress = HabitProgress::compute(today, today, 0, 0);
        assert_eq!(progress.total_days, 1);
        assert_eq!(progress.completed_days, 0);
        assert_eq!(progress.not_completed_days, 0);
        assert_eq!(progress.ignored_days, 1);
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn habit_progress_rounds_to_two_decimals() {
        let created = date(2023, 3, 1);
        let today = date(2023, 3, 3);
        let progress = HabitProgress::compute(created, today, 2, 0);
        assert_eq!(progress.total_days, 3);
        assert_eq!(progress.ignored_days, 1);
        assert_eq!(progress.progress_percent, 66.67);
    }

    #[test]
    fn habit_progress_handles_future_creation_date() {
        let created = date(2023, 3, 10);
        let today = date(2023, 3, 4);
        let progress = HabitProgress::compute(created, today, 0, 0);
        assert_eq!(progress.total_days, 0);
        assert_eq!(progress.ignored_days, 0);
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn habit_progress_every_day_completed() {
        let created = date(2023, 3, 1);
        let today = date(2023, 3, 5);
        let progress = HabitProgress::compute(created, today, 5, 0);
        assert_eq!(progress.total_days, 5);
        assert_eq!(progress.ignored_days, 0);
        assert_eq!(progress.progress_percent, 100.0);
    }
}
