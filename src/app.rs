use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::auth;
use crate::entities::{
    commentary, commentary_goal, commentary_habit, goal, goal_stage, habit, habit_completion, user,
};
use crate::error::AppError;
use crate::model::{
    CompletionOutcome, GoalChanges, GoalInput, GoalQuery, GoalStatus, HabitChanges, HabitInput,
    HabitQuery, Page, StageChanges, StageInput, StageStatus, PAGE_SIZE,
};
use crate::stats::{GoalBreakdown, HabitProgress};

/// Application core. Every owner-scoped operation takes the acting user id
/// explicitly; nothing here reads ambient identity.
pub struct App {
    db: DatabaseConnection,
}

pub struct GoalDetail {
    pub goal: goal::Model,
    pub stages: Vec<goal_stage::Model>,
    pub commentaries: Vec<commentary::Model>,
}

pub struct HabitDetail {
    pub habit: habit::Model,
    pub progress: HabitProgress,
    pub completions: Vec<habit_completion::Model>,
    pub today_outcome: Option<CompletionOutcome>,
    pub commentaries: Vec<commentary::Model>,
}

impl App {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // --- accounts ---

    pub async fn create_account(
        &self,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        ensure_non_empty("username", username)?;
        ensure_non_empty("password", password)?;
        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Validation(format!(
                "username {username} is already taken"
            )));
        }

        let display_name = if display_name.trim().is_empty() {
            username
        } else {
            display_name
        };
        let active = user::ActiveModel {
            username: Set(username.to_string()),
            display_name: Set(display_name.to_string()),
            password_hash: Set(auth::hash_password(password)?),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let insert = user::Entity::insert(active).exec(&self.db).await?;
        user::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found after insert".to_string()))
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        match found {
            Some(account) if auth::verify_password(password, &account.password_hash) => Ok(account),
            _ => Err(AppError::Unauthorized),
        }
    }

    pub async fn account_by_username(&self, username: &str) -> Result<user::Model, AppError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {username}")))
    }

    pub async fn get_account(&self, user_id: i64) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user id {user_id}")))
    }

    pub async fn delete_account(&self, user_id: i64) -> Result<(), AppError> {
        self.get_account(user_id).await?;
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            let goal_ids: Vec<i64> = goal::Entity::find()
                .filter(goal::Column::UserId.eq(user_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|row| row.id)
                .collect();
            let habit_ids: Vec<i64> = habit::Entity::find()
                .filter(habit::Column::UserId.eq(user_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|row| row.id)
                .collect();

            if !goal_ids.is_empty() {
                goal_stage::Entity::delete_many()
                    .filter(goal_stage::Column::GoalId.is_in(goal_ids.clone()))
                    .exec(&txn)
                    .await?;
                commentary_goal::Entity::delete_many()
                    .filter(commentary_goal::Column::GoalId.is_in(goal_ids.clone()))
                    .exec(&txn)
                    .await?;
                goal::Entity::delete_many()
                    .filter(goal::Column::Id.is_in(goal_ids))
                    .exec(&txn)
                    .await?;
            }
            if !habit_ids.is_empty() {
                habit_completion::Entity::delete_many()
                    .filter(habit_completion::Column::HabitId.is_in(habit_ids.clone()))
                    .exec(&txn)
                    .await?;
                commentary_habit::Entity::delete_many()
                    .filter(commentary_habit::Column::HabitId.is_in(habit_ids.clone()))
                    .exec(&txn)
                    .await?;
                habit::Entity::delete_many()
                    .filter(habit::Column::Id.is_in(habit_ids))
                    .exec(&txn)
                    .await?;
            }

            let commentary_ids: Vec<i64> = commentary::Entity::find()
                .filter(commentary::Column::UserId.eq(user_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|row| row.id)
                .collect();
            if !commentary_ids.is_empty() {
                commentary_goal::Entity::delete_many()
                    .filter(commentary_goal::Column::CommentaryId.is_in(commentary_ids.clone()))
                    .exec(&txn)
                    .await?;
                commentary_habit::Entity::delete_many()
                    .filter(commentary_habit::Column::CommentaryId.is_in(commentary_ids.clone()))
                    .exec(&txn)
                    .await?;
                commentary::Entity::delete_many()
                    .filter(commentary::Column::Id.is_in(commentary_ids))
                    .exec(&txn)
                    .await?;
            }

            user::Entity::delete_by_id(user_id).exec(&txn).await?;
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await
    }

    // --- goals ---

    pub async fn create_goal(&self, user_id: i64, input: GoalInput) -> Result<goal::Model, AppError> {
        ensure_non_empty("goal name", &input.name)?;
        let active = goal::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            description: Set(input.description),
            deadline: Set(input.deadline),
            status: Set(GoalStatus::Active.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let insert = goal::Entity::insert(active).exec(&self.db).await?;
        goal::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("goal not found after insert".to_string()))
    }

    pub async fn list_goals(
        &self,
        user_id: i64,
        query: &GoalQuery,
    ) -> Result<Page<goal::Model>, AppError> {
        let mut select = goal::Entity::find().filter(goal::Column::UserId.eq(user_id));
        if let Some(name) = query.name.as_deref() {
            if !name.trim().is_empty() {
                // SQLite LIKE is case-insensitive for ASCII, which is the
                // substring semantics the name search always had.
                select = select.filter(goal::Column::Name.contains(name));
            }
        }
        match query.status {
            Some(status) => {
                select = select.filter(goal::Column::Status.eq(status.as_str()));
            }
            None => {
                select = select.order_by_asc(goal::Column::CreatedAt);
            }
        }
        let select = select.order_by_asc(goal::Column::Id);

        let page = query.page.unwrap_or(1).max(1);
        let paginator = select.paginate(&self.db, PAGE_SIZE);
        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            page,
            page_count: counts.number_of_pages,
            total: counts.number_of_items,
        })
    }

    pub async fn get_goal(&self, user_id: i64, id: i64) -> Result<goal::Model, AppError> {
        goal::Entity::find_by_id(id)
            .filter(goal::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("goal id {id}")))
    }

    pub async fn goal_detail(&self, user_id: i64, id: i64) -> Result<GoalDetail, AppError> {
        let goal = self.get_goal(user_id, id).await?;
        let stages = self.stages_of(goal.id).await?;
        let commentaries = self.commentaries_of_goal(goal.id).await?;
        Ok(GoalDetail {
            goal,
            stages,
            commentaries,
        })
    }

    pub async fn update_goal(
        &self,
        user_id: i64,
        id: i64,
        changes: GoalChanges,
    ) -> Result<goal::Model, AppError> {
        if let Some(name) = changes.name.as_deref() {
            ensure_non_empty("goal name", name)?;
        }
        let existing = self.get_goal(user_id, id).await?;
        if changes.name.is_none()
            && changes.description.is_none()
            && changes.deadline.is_none()
            && changes.status.is_none()
        {
            return Ok(existing);
        }

        let mut active = goal::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(deadline) = changes.deadline {
            active.deadline = Set(deadline);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("goal id {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_goal(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        self.get_goal(user_id, id).await?;
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            goal_stage::Entity::delete_many()
                .filter(goal_stage::Column::GoalId.eq(id))
                .exec(&txn)
                .await?;
            commentary_goal::Entity::delete_many()
                .filter(commentary_goal::Column::GoalId.eq(id))
                .exec(&txn)
                .await?;
            let deleted = goal::Entity::delete_by_id(id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(AppError::NotFound(format!("goal id {id}")));
            }
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// "Mark completed" action: active goals complete, anything else
    /// (completed or abandoned) returns to active.
    pub async fn toggle_goal_completed(
        &self,
        user_id: i64,
        id: i64,
    ) -> Result<goal::Model, AppError> {
        let goal = self.get_goal(user_id, id).await?;
        let status = goal_status_of(&goal)?;
        self.store_goal_status(goal, status.toggle_completed()).await
    }

    /// "Abandon" action: abandoned goals revive to active, anything else
    /// becomes abandoned.
    pub async fn toggle_goal_abandoned(
        &self,
        user_id: i64,
        id: i64,
    ) -> Result<goal::Model, AppError> {
        let goal = self.get_goal(user_id, id).await?;
        let status = goal_status_of(&goal)?;
        self.store_goal_status(goal, status.toggle_abandoned()).await
    }

    async fn store_goal_status(
        &self,
        goal: goal::Model,
        status: GoalStatus,
    ) -> Result<goal::Model, AppError> {
        let mut active: goal::ActiveModel = goal.into();
        active.status = Set(status.as_str().to_string());
        Ok(active.update(&self.db).await?)
    }

    pub async fn goal_breakdown(&self, user_id: i64) -> Result<GoalBreakdown, AppError> {
        let active = self.count_goals_with_status(user_id, GoalStatus::Active).await?;
        let completed = self
            .count_goals_with_status(user_id, GoalStatus::Completed)
            .await?;
        let abandoned = self
            .count_goals_with_status(user_id, GoalStatus::Abandoned)
            .await?;
        Ok(GoalBreakdown::new(active, completed, abandoned))
    }

    async fn count_goals_with_status(
        &self,
        user_id: i64,
        status: GoalStatus,
    ) -> Result<u64, AppError> {
        Ok(goal::Entity::find()
            .filter(goal::Column::UserId.eq(user_id))
            .filter(goal::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?)
    }

    // --- goal stages ---

    pub async fn add_stage(
        &self,
        user_id: i64,
        goal_id: i64,
        input: StageInput,
    ) -> Result<goal_stage::Model, AppError> {
        ensure_non_empty("stage name", &input.stage_name)?;
        self.get_goal(user_id, goal_id).await?;
        let active = goal_stage::ActiveModel {
            goal_id: Set(goal_id),
            stage_name: Set(input.stage_name),
            description: Set(input.description),
            deadline: Set(input.deadline),
            status: Set(StageStatus::Active.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let insert = goal_stage::Entity::insert(active).exec(&self.db).await?;
        goal_stage::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("stage not found after insert".to_string()))
    }

    pub async fn get_stage(
        &self,
        user_id: i64,
        goal_id: i64,
        stage_id: i64,
    ) -> Result<goal_stage::Model, AppError> {
        self.get_goal(user_id, goal_id).await?;
        goal_stage::Entity::find_by_id(stage_id)
            .filter(goal_stage::Column::GoalId.eq(goal_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("stage id {stage_id}")))
    }

    pub async fn stages_for_goal(
        &self,
        user_id: i64,
        goal_id: i64,
    ) -> Result<Vec<goal_stage::Model>, AppError> {
        self.get_goal(user_id, goal_id).await?;
        self.stages_of(goal_id).await
    }

    async fn stages_of(&self, goal_id: i64) -> Result<Vec<goal_stage::Model>, AppError> {
        Ok(goal_stage::Entity::find()
            .filter(goal_stage::Column::GoalId.eq(goal_id))
            .order_by_desc(goal_stage::Column::Status)
            .order_by_asc(goal_stage::Column::Deadline)
            .order_by_asc(goal_stage::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn update_stage(
        &self,
        user_id: i64,
        goal_id: i64,
        stage_id: i64,
        changes: StageChanges,
    ) -> Result<goal_stage::Model, AppError> {
        if let Some(stage_name) = changes.stage_name.as_deref() {
            ensure_non_empty("stage name", stage_name)?;
        }
        let existing = self.get_stage(user_id, goal_id, stage_id).await?;
        if changes.stage_name.is_none()
            && changes.description.is_none()
            && changes.deadline.is_none()
            && changes.status.is_none()
        {
            return Ok(existing);
        }

        let mut active = goal_stage::ActiveModel {
            id: Set(stage_id),
            ..Default::default()
        };
        if let Some(stage_name) = changes.stage_name {
            active.stage_name = Set(stage_name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(deadline) = changes.deadline {
            active.deadline = Set(Some(deadline));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("stage id {stage_id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_stage(
        &self,
        user_id: i64,
        goal_id: i64,
        stage_id: i64,
    ) -> Result<(), AppError> {
        self.get_stage(user_id, goal_id, stage_id).await?;
        let deleted = goal_stage::Entity::delete_by_id(stage_id)
            .exec(&self.db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound(format!("stage id {stage_id}")));
        }
        Ok(())
    }

    pub async fn toggle_stage_completed(
        &self,
        user_id: i64,
        goal_id: i64,
        stage_id: i64,
    ) -> Result<goal_stage::Model, AppError> {
        let stage = self.get_stage(user_id, goal_id, stage_id).await?;
        let status = stage_status_of(&stage)?;
        self.store_stage_status(stage, status.toggle_completed())
            .await
    }

    pub async fn toggle_stage_abandoned(
        &self,
        user_id: i64,
        goal_id: i64,
        stage_id: i64,
    ) -> Result<goal_stage::Model, AppError> {
        let stage = self.get_stage(user_id, goal_id, stage_id).await?;
        let status = stage_status_of(&stage)?;
        self.store_stage_status(stage, status.toggle_abandoned())
            .await
    }

    async fn store_stage_status(
        &self,
        stage: goal_stage::Model,
        status: StageStatus,
    ) -> Result<goal_stage::Model, AppError> {
        let mut active: goal_stage::ActiveModel = stage.into();
        active.status = Set(status.as_str().to_string());
        Ok(active.update(&self.db).await?)
    }

    // --- habits ---

    pub async fn create_habit(
        &self,
        user_id: i64,
        input: HabitInput,
    ) -> Result<habit::Model, AppError> {
        ensure_non_empty("habit name", &input.name)?;
        let active = habit::ActiveModel {
            user_id: Set(user_id),
            name: Set(input.name),
            description: Set(input.description),
            month_goal: Set(input.month_goal),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let insert = habit::Entity::insert(active).exec(&self.db).await?;
        habit::Entity::find_by_id(insert.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("habit not found after insert".to_string()))
    }

    pub async fn list_habits(
        &self,
        user_id: i64,
        query: &HabitQuery,
    ) -> Result<Page<habit::Model>, AppError> {
        let mut select = habit::Entity::find().filter(habit::Column::UserId.eq(user_id));
        if let Some(name) = query.name.as_deref() {
            if !name.trim().is_empty() {
                select = select.filter(habit::Column::Name.contains(name));
            }
        }
        let select = select
            .order_by_asc(habit::Column::CreatedAt)
            .order_by_asc(habit::Column::Id);

        let page = query.page.unwrap_or(1).max(1);
        let paginator = select.paginate(&self.db, PAGE_SIZE);
        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            page,
            page_count: counts.number_of_pages,
            total: counts.number_of_items,
        })
    }

    /// All habits of one user, for the dashboard summary.
    pub async fn habits_for_user(&self, user_id: i64) -> Result<Vec<habit::Model>, AppError> {
        Ok(habit::Entity::find()
            .filter(habit::Column::UserId.eq(user_id))
            .order_by_asc(habit::Column::CreatedAt)
            .order_by_asc(habit::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_habit(&self, user_id: i64, id: i64) -> Result<habit::Model, AppError> {
        habit::Entity::find_by_id(id)
            .filter(habit::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("habit id {id}")))
    }

    pub async fn update_habit(
        &self,
        user_id: i64,
        id: i64,
        changes: HabitChanges,
    ) -> Result<habit::Model, AppError> {
        if let Some(name) = changes.name.as_deref() {
            ensure_non_empty("habit name", name)?;
        }
        let existing = self.get_habit(user_id, id).await?;
        if changes.name.is_none() && changes.description.is_none() && changes.month_goal.is_none() {
            return Ok(existing);
        }

        let mut active = habit::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(month_goal) = changes.month_goal {
            active.month_goal = Set(Some(month_goal));
        }

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("habit id {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_habit(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        self.get_habit(user_id, id).await?;
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            habit_completion::Entity::delete_many()
                .filter(habit_completion::Column::HabitId.eq(id))
                .exec(&txn)
                .await?;
            commentary_habit::Entity::delete_many()
                .filter(commentary_habit::Column::HabitId.eq(id))
                .exec(&txn)
                .await?;
            let deleted = habit::Entity::delete_by_id(id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(AppError::NotFound(format!("habit id {id}")));
            }
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Upsert of the single outcome row keyed by (habit, date). Submitting
    /// again for the same date overwrites the earlier outcome.
    pub async fn record_completion(
        &self,
        user_id: i64,
        habit_id: i64,
        date: NaiveDate,
        outcome: CompletionOutcome,
    ) -> Result<habit_completion::Model, AppError> {
        self.get_habit(user_id, habit_id).await?;
        let existing = habit_completion::Entity::find()
            .filter(habit_completion::Column::HabitId.eq(habit_id))
            .filter(habit_completion::Column::CompleteDate.eq(date))
            .one(&self.db)
            .await?;
        match existing {
            Some(model) => {
                let mut active: habit_completion::ActiveModel = model.into();
                active.outcome = Set(outcome.as_str().to_string());
                Ok(active.update(&self.db).await?)
            }
            None => {
                let active = habit_completion::ActiveModel {
                    habit_id: Set(habit_id),
                    complete_date: Set(date),
                    outcome: Set(outcome.as_str().to_string()),
                    ..Default::default()
                };
                let insert = habit_completion::Entity::insert(active).exec(&self.db).await?;
                habit_completion::Entity::find_by_id(insert.last_insert_id)
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("completion not found after insert".to_string())
                    })
            }
        }
    }

    pub async fn completions_for_habit(
        &self,
        user_id: i64,
        habit_id: i64,
    ) -> Result<Vec<habit_completion::Model>, AppError> {
        self.get_habit(user_id, habit_id).await?;
        self.completions_of(habit_id).await
    }

    async fn completions_of(
        &self,
        habit_id: i64,
    ) -> Result<Vec<habit_completion::Model>, AppError> {
        Ok(habit_completion::Entity::find()
            .filter(habit_completion::Column::HabitId.eq(habit_id))
            .order_by_asc(habit_completion::Column::CompleteDate)
            .all(&self.db)
            .await?)
    }

    pub async fn habit_detail(
        &self,
        user_id: i64,
        id: i64,
        today: NaiveDate,
    ) -> Result<HabitDetail, AppError> {
        let habit = self.get_habit(user_id, id).await?;
        let completions = self.completions_of(habit.id).await?;
        let completed = completions
            .iter()
            .filter(|row| row.outcome == CompletionOutcome::Completed.as_str())
            .count() as u64;
        let not_completed = completions
            .iter()
            .filter(|row| row.outcome == CompletionOutcome::NotCompleted.as_str())
            .count() as u64;
        let progress = HabitProgress::compute(
            habit.created_at.date_naive(),
            today,
            completed,
            not_completed,
        );
        let today_outcome = completions
            .iter()
            .find(|row| row.complete_date == today)
            .and_then(|row| CompletionOutcome::parse(&row.outcome));
        let commentaries = self.commentaries_of_habit(habit.id).await?;
        Ok(HabitDetail {
            habit,
            progress,
            completions,
            today_outcome,
            commentaries,
        })
    }

    // --- commentaries ---

    pub async fn add_goal_commentary(
        &self,
        user_id: i64,
        goal_id: i64,
        text: String,
    ) -> Result<commentary::Model, AppError> {
        ensure_non_empty("commentary text", &text)?;
        self.get_goal(user_id, goal_id).await?;
        let txn = self.db.begin().await?;
        let result: Result<commentary::Model, AppError> = async {
            let model = insert_commentary(&txn, user_id, text).await?;
            let link = commentary_goal::ActiveModel {
                commentary_id: Set(model.id),
                goal_id: Set(goal_id),
                ..Default::default()
            };
            commentary_goal::Entity::insert(link).exec(&txn).await?;
            Ok(model)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn add_habit_commentary(
        &self,
        user_id: i64,
        habit_id: i64,
        text: String,
    ) -> Result<commentary::Model, AppError> {
        ensure_non_empty("commentary text", &text)?;
        self.get_habit(user_id, habit_id).await?;
        let txn = self.db.begin().await?;
        let result: Result<commentary::Model, AppError> = async {
            let model = insert_commentary(&txn, user_id, text).await?;
            let link = commentary_habit::ActiveModel {
                commentary_id: Set(model.id),
                habit_id: Set(habit_id),
                ..Default::default()
            };
            commentary_habit::Entity::insert(link).exec(&txn).await?;
            Ok(model)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    async fn commentaries_of_goal(
        &self,
        goal_id: i64,
    ) -> Result<Vec<commentary::Model>, AppError> {
        let links = commentary_goal::Entity::find()
            .filter(commentary_goal::Column::GoalId.eq(goal_id))
            .all(&self.db)
            .await?;
        let ids: Vec<i64> = links.iter().map(|link| link.commentary_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(commentary::Entity::find()
            .filter(commentary::Column::Id.is_in(ids))
            .order_by_asc(commentary::Column::CreatedAt)
            .order_by_asc(commentary::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn commentaries_of_habit(
        &self,
        habit_id: i64,
    ) -> Result<Vec<commentary::Model>, AppError> {
        let links = commentary_habit::Entity::find()
            .filter(commentary_habit::Column::HabitId.eq(habit_id))
            .all(&self.db)
            .await?;
        let ids: Vec<i64> = links.iter().map(|link| link.commentary_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(commentary::Entity::find()
            .filter(commentary::Column::Id.is_in(ids))
            .order_by_asc(commentary::Column::CreatedAt)
            .order_by_asc(commentary::Column::Id)
            .all(&self.db)
            .await?)
    }
}

async fn insert_commentary(
    txn: &DatabaseTransaction,
    user_id: i64,
    text: String,
) -> Result<commentary::Model, AppError> {
    let active = commentary::ActiveModel {
        user_id: Set(user_id),
        text: Set(text),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let insert = commentary::Entity::insert(active).exec(txn).await?;
    commentary::Entity::find_by_id(insert.last_insert_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("commentary not found after insert".to_string()))
}

async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}

fn goal_status_of(goal: &goal::Model) -> Result<GoalStatus, AppError> {
    GoalStatus::parse(&goal.status)
        .ok_or_else(|| AppError::Internal(format!("unknown goal status {:?}", goal.status)))
}

fn stage_status_of(stage: &goal_stage::Model) -> Result<StageStatus, AppError> {
    StageStatus::parse(&stage.status)
        .ok_or_else(|| AppError::Internal(format!("unknown stage status {:?}", stage.status)))
}

fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{label} cannot be empty")));
    }
    Ok(())
}
