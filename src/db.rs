use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Schema, Statement};
use url::Url;

use crate::entities::{
    commentary, commentary_goal, commentary_habit, goal, goal_stage, habit, habit_completion, user,
};
use crate::error::AppError;

pub fn resolve_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("goaltrack.db")
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Advisory lock next to the database file so two server processes never
/// share one SQLite database.
pub fn open_lock(path: &Path) -> Result<fd_lock::RwLock<File>, AppError> {
    let lock_path = path.with_extension("lock");
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_path)?;
    Ok(fd_lock::RwLock::new(file))
}

pub async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::Validation(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    Ok(Database::connect(&sqlite_url).await?)
}

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), AppError> {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await?;

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_stmt = schema.create_table_from_entity(user::Entity);
    user_stmt.if_not_exists();
    db.execute(builder.build(&user_stmt)).await?;

    let mut goal_stmt = schema.create_table_from_entity(goal::Entity);
    goal_stmt.if_not_exists();
    db.execute(builder.build(&goal_stmt)).await?;

    let mut stage_stmt = schema.create_table_from_entity(goal_stage::Entity);
    stage_stmt.if_not_exists();
    db.execute(builder.build(&stage_stmt)).await?;

    let mut habit_stmt = schema.create_table_from_entity(habit::Entity);
    habit_stmt.if_not_exists();
    db.execute(builder.build(&habit_stmt)).await?;

    let mut completion_stmt = schema.create_table_from_entity(habit_completion::Entity);
    completion_stmt.if_not_exists();
    db.execute(builder.build(&completion_stmt)).await?;

    let mut commentary_stmt = schema.create_table_from_entity(commentary::Entity);
    commentary_stmt.if_not_exists();
    db.execute(builder.build(&commentary_stmt)).await?;

    let mut commentary_goal_stmt = schema.create_table_from_entity(commentary_goal::Entity);
    commentary_goal_stmt.if_not_exists();
    db.execute(builder.build(&commentary_goal_stmt)).await?;

    let mut commentary_habit_stmt = schema.create_table_from_entity(commentary_habit::Entity);
    commentary_habit_stmt.if_not_exists();
    db.execute(builder.build(&commentary_habit_stmt)).await?;

    let builder = db.get_database_backend();

    let mut username_index = Index::create()
        .name("idx_users_username")
        .table(user::Entity)
        .col(user::Column::Username)
        .unique()
        .to_owned();
    username_index.if_not_exists();
    db.execute(builder.build(&username_index)).await?;

    let mut goal_user_index = Index::create()
        .name("idx_goals_user")
        .table(goal::Entity)
        .col(goal::Column::UserId)
        .to_owned();
    goal_user_index.if_not_exists();
    db.execute(builder.build(&goal_user_index)).await?;

    let mut stage_goal_index = Index::create()
        .name("idx_goal_stages_goal")
        .table(goal_stage::Entity)
        .col(goal_stage::Column::GoalId)
        .to_owned();
    stage_goal_index.if_not_exists();
    db.execute(builder.build(&stage_goal_index)).await?;

    let mut habit_user_index = Index::create()
        .name("idx_habits_user")
        .table(habit::Entity)
        .col(habit::Column::UserId)
        .to_owned();
    habit_user_index.if_not_exists();
    db.execute(builder.build(&habit_user_index)).await?;

    // Enforces one outcome per habit per calendar date; recording twice for
    // one date must go through the upsert path.
    let mut completion_day_index = Index::create()
        .name("idx_habit_completions_day")
        .table(habit_completion::Entity)
        .col(habit_completion::Column::HabitId)
        .col(habit_completion::Column::CompleteDate)
        .unique()
        .to_owned();
    completion_day_index.if_not_exists();
    db.execute(builder.build(&completion_day_index)).await?;

    let mut commentary_goal_index = Index::create()
        .name("idx_commentary_goals_goal")
        .table(commentary_goal::Entity)
        .col(commentary_goal::Column::GoalId)
        .to_owned();
    commentary_goal_index.if_not_exists();
    db.execute(builder.build(&commentary_goal_index)).await?;

    let mut commentary_habit_index = Index::create()
        .name("idx_commentary_habits_habit")
        .table(commentary_habit::Entity)
        .col(commentary_habit::Column::HabitId)
        .to_owned();
    commentary_habit_index.if_not_exists();
    db.execute(builder.build(&commentary_habit_index)).await?;

    Ok(())
}
