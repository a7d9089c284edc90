pub mod commentary;
pub mod commentary_goal;
pub mod commentary_habit;
pub mod goal;
pub mod goal_stage;
pub mod habit;
pub mod habit_completion;
pub mod user;
