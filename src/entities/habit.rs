use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::{commentary, commentary_habit, habit_completion, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub month_goal: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Completions,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Self::Completions => Entity::has_many(habit_completion::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<habit_completion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl Related<commentary::Entity> for Entity {
    fn to() -> RelationDef {
        commentary_habit::Relation::Commentary.def()
    }

    fn via() -> Option<RelationDef> {
        Some(commentary_habit::Relation::Habit.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
