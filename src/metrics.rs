use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::prelude::{ExerciseEntry, FoodEntry, User};

/// Seeds the totals gauges from the database at boot.
pub async fn init_metrics(db: &DatabaseConnection) {
    let user_count = User::find().count(db).await.unwrap_or(0);
    metrics::gauge!("slimjourney_users_total").set(user_count as f64);

    let food_count = FoodEntry::find().count(db).await.unwrap_or(0);
    metrics::gauge!("slimjourney_food_entries_stored").set(food_count as f64);

    let exercise_count = ExerciseEntry::find().count(db).await.unwrap_or(0);
    metrics::gauge!("slimjourney_exercise_entries_stored").set(exercise_count as f64);

    tracing::info!(
        "Initialized metrics: Users={}, Food={}, Exercise={}",
        user_count,
        food_count,
        exercise_count
    );
}
