use sea_orm::entity::prelude::*;

use super::{commentary, goal};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "commentary_goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub commentary_id: i64,
    pub goal_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Commentary,
    Goal,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Commentary => Entity::belongs_to(commentary::Entity)
                .from(Column::CommentaryId)
                .to(commentary::Column::Id)
                .into(),
            Self::Goal => Entity::belongs_to(goal::Entity)
                .from(Column::GoalId)
                .to(goal::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
