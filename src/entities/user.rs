use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::{commentary, goal, habit};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Goals,
    Habits,
    Commentaries,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Goals => Entity::has_many(goal::Entity).into(),
            Self::Habits => Entity::has_many(habit::Entity).into(),
            Self::Commentaries => Entity::has_many(commentary::Entity).into(),
        }
    }
}

impl Related<goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl Related<habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habits.def()
    }
}

impl Related<commentary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commentaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
