//! Response shapes for the HTTP layer. These mirror the page contexts the
//! product renders: the dashboard summary, the paged lists and the two
//! detail pages.

use serde::Serialize;

use crate::app::{GoalDetail, HabitDetail};
use crate::entities::{commentary, goal, goal_stage, habit, user};
use crate::model::Page;
use crate::stats::GoalBreakdown;

#[derive(Debug, Serialize)]
pub struct DashboardContext {
    pub display_name: String,
    pub active_goals_number: u64,
    pub active_goals_percent: f64,
    pub completed_goals_number: u64,
    pub completed_goals_percent: f64,
    pub abandoned_goals_number: u64,
    pub abandoned_goals_percent: f64,
    pub total_goals_number: u64,
    pub habits_number: u64,
    pub habits: Vec<habit::Model>,
}

pub fn dashboard_context(
    account: &user::Model,
    breakdown: GoalBreakdown,
    habits: Vec<habit::Model>,
) -> DashboardContext {
    DashboardContext {
        display_name: account.display_name.clone(),
        active_goals_number: breakdown.active,
        active_goals_percent: breakdown.active_percent,
        completed_goals_number: breakdown.completed,
        completed_goals_percent: breakdown.completed_percent,
        abandoned_goals_number: breakdown.abandoned,
        abandoned_goals_percent: breakdown.abandoned_percent,
        total_goals_number: breakdown.total,
        habits_number: habits.len() as u64,
        habits,
    }
}

#[derive(Debug, Serialize)]
pub struct GoalListContext {
    pub goals: Vec<goal::Model>,
    pub page: u64,
    pub page_count: u64,
    pub total: u64,
}

pub fn goal_list_context(page: Page<goal::Model>) -> GoalListContext {
    GoalListContext {
        goals: page.items,
        page: page.page,
        page_count: page.page_count,
        total: page.total,
    }
}

#[derive(Debug, Serialize)]
pub struct HabitListContext {
    pub habits: Vec<habit::Model>,
    pub page: u64,
    pub page_count: u64,
    pub total: u64,
}

pub fn habit_list_context(page: Page<habit::Model>) -> HabitListContext {
    HabitListContext {
        habits: page.items,
        page: page.page,
        page_count: page.page_count,
        total: page.total,
    }
}

#[derive(Debug, Serialize)]
pub struct GoalDetailContext {
    pub goal: goal::Model,
    pub stages: Vec<goal_stage::Model>,
    pub commentaries: Vec<commentary::Model>,
}

pub fn goal_detail_context(detail: GoalDetail) -> GoalDetailContext {
    GoalDetailContext {
        goal: detail.goal,
        stages: detail.stages,
        commentaries: detail.commentaries,
    }
}

#[derive(Debug, Serialize)]
pub struct HabitDetailContext {
    pub habit: habit::Model,
    pub total_days: u64,
    pub completed_days: u64,
    pub not_completed_days: u64,
    pub ignored_days: u64,
    pub progress_percent: f64,
    /// Dates with a recorded outcome, as sorted `YYYY-MM-DD` strings.
    pub completion_dates: Vec<String>,
    pub today_outcome: Option<&'static str>,
    pub commentaries: Vec<commentary::Model>,
}

pub fn habit_detail_context(detail: HabitDetail) -> HabitDetailContext {
    let completion_dates = detail
        .completions
        .iter()
        .map(|row| row.complete_date.format("%Y-%m-%d").to_string())
        .collect();
    HabitDetailContext {
        habit: detail.habit,
        total_days: detail.progress.total_days,
        completed_days: detail.progress.completed_days,
        not_completed_days: detail.progress.not_completed_days,
        ignored_days: detail.progress.ignored_days,
        progress_percent: detail.progress.progress_percent,
        completion_dates,
        today_outcome: detail.today_outcome.map(|outcome| outcome.as_str()),
        commentaries: detail.commentaries,
    }
}
