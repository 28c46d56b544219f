pub use super::exercise_entry::Entity as ExerciseEntry;
pub use super::food_entry::Entity as FoodEntry;
pub use super::user::Entity as User;
pub use super::water_intake::Entity as WaterIntake;
pub use super::weight_record::Entity as WeightRecord;
