pub mod prelude;

pub mod exercise_entry;
pub mod food_entry;
pub mod user;
pub mod water_intake;
pub mod weight_record;
