use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::{commentary_goal, commentary_habit, goal, habit, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "commentaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<goal::Entity> for Entity {
    fn to() -> RelationDef {
        commentary_goal::Relation::Goal.def()
    }

    fn via() -> Option<RelationDef> {
        Some(commentary_goal::Relation::Commentary.def().rev())
    }
}

impl Related<habit::Entity> for Entity {
    fn to() -> RelationDef {
        commentary_habit::Relation::Habit.def()
    }

    fn via() -> Option<RelationDef> {
        Some(commentary_habit::Relation::Commentary.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
