use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::habit;

/// One completion outcome per calendar date per habit. The unique
/// (habit_id, complete_date) index lives in `db::ensure_schema`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "habit_completions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub habit_id: i64,
    pub complete_date: Date,
    pub outcome: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Habit,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Habit => Entity::belongs_to(habit::Entity)
                .from(Column::HabitId)
                .to(habit::Column::Id)
                .into(),
        }
    }
}

impl Related<habit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
