use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::{commentary, commentary_goal, goal_stage, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub deadline: DateTimeUtc,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Stages,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Self::Stages => Entity::has_many(goal_stage::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<goal_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl Related<commentary::Entity> for Entity {
    fn to() -> RelationDef {
        commentary_goal::Relation::Commentary.def()
    }

    fn via() -> Option<RelationDef> {
        Some(commentary_goal::Relation::Goal.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
