use sea_orm::entity::prelude::*;

use super::{commentary, habit};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "commentary_habits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub commentary_id: i64,
    pub habit_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Commentary,
    Habit,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Commentary => Entity::belongs_to(commentary::Entity)
                .from(Column::CommentaryId)
                .to(commentary::Column::Id)
                .into(),
            Self::Habit => Entity::belongs_to(habit::Entity)
                .from(Column::HabitId)
                .to(habit::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
