use std::sync::Arc;

use axum::extract::{Extension, Json};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::zone::Observer;
use crate::entities::water_intake;
use crate::ledger::{self, DayBucket};
use crate::store;

/// Daily water target shared by the water and dashboard views.
#[derive(Debug, Clone, Copy)]
pub struct WaterGoal(pub i32);

#[derive(Deserialize)]
pub struct AddWaterRequest {
    /// Negative to take back an accidental glass.
    amount_ml: i32,
}

#[derive(Debug, Serialize)]
pub struct WaterView {
    pub day: NaiveDate,
    pub total_ml: i32,
    pub goal_ml: i32,
    pub week: Vec<DayBucket>,
}

impl WaterView {
    pub fn build(logs: &[water_intake::Model], observer: &Observer, goal: WaterGoal) -> Self {
        let total_ml = ledger::find_for_day(logs, observer.day, &observer.zone)
            .map(|w| w.amount_ml)
            .unwrap_or(0);
        let week = ledger::build_weekly_series(logs, observer.day, ledger::WEEK, &observer.zone, |w| {
            f64::from(w.amount_ml)
        });
        Self {
            day: observer.day,
            total_ml,
            goal_ml: goal.0,
            week,
        }
    }
}

pub async fn water_status(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    Extension(goal): Extension<WaterGoal>,
    observer: Observer,
) -> Result<Json<WaterView>, ApiError> {
    let logs = store::water_week(&db, user_id, observer.day, &observer.zone).await?;
    Ok(Json(WaterView::build(&logs, &observer, goal)))
}

pub async fn add_water(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    observer: Observer,
    Json(payload): Json<AddWaterRequest>,
) -> Result<Json<water_intake::Model>, ApiError> {
    if payload.amount_ml == 0 {
        return Err(ApiError::BadRequest("amount_ml must not be zero".to_string()));
    }

    let log = store::add_water(&db, user_id, payload.amount_ml, observer.now, &observer.zone).await?;

    tracing::Span::current()
        .record("table", "water_intake")
        .record("action", "add_water")
        .record("business_event", "Water intake updated");
    metrics::counter!("slimjourney_water_updates_total").increment(1);

    Ok(Json(log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use uuid::Uuid;

    fn log(date: &str, amount_ml: i32) -> water_intake::Model {
        water_intake::Model {
            id: Uuid::new_v4(),
            user_id: 1,
            date: DateTime::parse_from_rfc3339(date).unwrap(),
            amount_ml,
        }
    }

    #[test]
    fn view_uses_the_observers_local_day() {
        // 23:30 UTC on the 2nd is already the 3rd at UTC+2.
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = DateTime::parse_from_rfc3339("2026-03-02T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let observer = Observer::at(zone, now, None);
        let logs = vec![
            log("2026-03-02T10:00:00Z", 1250),
            log("2026-03-02T22:30:00Z", 250),
        ];

        let view = WaterView::build(&logs, &observer, WaterGoal(2000));
        assert_eq!(view.day, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(view.total_ml, 250);
        assert_eq!(view.goal_ml, 2000);
        assert_eq!(view.week.len(), 7);
        assert_eq!(view.week[5].amount, 1250.0);
        assert_eq!(view.week[6].amount, 250.0);
    }
}
