use std::sync::Arc;

use axum::extract::{Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::error::ApiError;
use super::user::find_user;
use super::water::WaterGoal;
use super::zone::Observer;
use crate::entities::weight_record;
use crate::ledger::DayBucket;
use crate::store;
use crate::summary::{self, DailySummary};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub name: String,
    pub summary: DailySummary,
    pub water_week: Vec<DayBucket>,
    pub weight_history: Vec<weight_record::Model>,
}

pub async fn dashboard(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    Extension(goal): Extension<WaterGoal>,
    observer: Observer,
) -> Result<Json<Dashboard>, ApiError> {
    let (user, journal) = futures::try_join!(
        find_user(&db, user_id),
        async {
            store::load_journal(&db, user_id, observer.day, &observer.zone)
                .await
                .map_err(ApiError::from)
        },
    )?;

    let summary = journal.summarize(
        observer.day,
        &observer.zone,
        Some(user.goal_weight_kg),
        goal.0,
    );
    let water_week = journal.water_week(observer.day, &observer.zone);

    tracing::Span::current()
        .record("table", "dashboard")
        .record("action", "view_dashboard");

    Ok(Json(Dashboard {
        name: user.name,
        summary,
        water_week,
        weight_history: journal.weights,
    }))
}

/// Today's calories in minus calories out for the observer's day.
pub async fn net_calories(
    db: &DatabaseConnection,
    user_id: i32,
    observer: &Observer,
) -> Result<f64, ApiError> {
    let journal = store::load_journal(db, user_id, observer.day, &observer.zone).await?;
    Ok(summary::calories_in(&journal.food) - summary::calories_out(&journal.exercise))
}
