use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ledger::DatedEntry;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "exercise_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip_deserializing)]
    pub id: Uuid,
    pub user_id: i32,
    pub date: DateTimeWithTimeZone,
    pub activity: String,
    pub duration_minutes: i32,
    pub calories_burned: f64,
    pub gif_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl DatedEntry for Model {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn recorded_at(&self) -> chrono::DateTime<Utc> {
        self.date.with_timezone(&Utc)
    }
}
