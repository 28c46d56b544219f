use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub goal_weight_kg: f64,
    pub activity_level: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::food_entry::Entity")]
    FoodEntry,
    #[sea_orm(has_many = "super::exercise_entry::Entity")]
    ExerciseEntry,
    #[sea_orm(has_many = "super::weight_record::Entity")]
    WeightRecord,
    #[sea_orm(has_many = "super::water_intake::Entity")]
    WaterIntake,
}

impl Related<super::food_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodEntry.def()
    }
}

impl Related<super::exercise_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExerciseEntry.def()
    }
}

impl Related<super::weight_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeightRecord.def()
    }
}

impl Related<super::water_intake::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WaterIntake.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
