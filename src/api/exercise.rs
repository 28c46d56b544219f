use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use super::error::ApiError;
use super::zone::Observer;
use crate::catalog::{self, ExerciseIdea, EXERCISE_IDEAS};
use crate::entities::exercise_entry;
use crate::ledger;
use crate::store::{self, NewExercise};

const MIN_ACTIVITY_LEN: usize = 2;

#[derive(Deserialize)]
pub struct LogExerciseRequest {
    activity: String,
    duration_minutes: i32,
    calories_burned: f64,
}

impl LogExerciseRequest {
    fn validate(self) -> Result<NewExercise, ApiError> {
        let activity = self.activity.trim().to_string();
        if activity.chars().count() < MIN_ACTIVITY_LEN {
            return Err(ApiError::BadRequest(
                "Activity must be at least 2 characters.".to_string(),
            ));
        }
        ledger::at_least("duration_minutes", f64::from(self.duration_minutes), 1.0)?;
        Ok(NewExercise {
            activity,
            duration_minutes: self.duration_minutes,
            calories_burned: ledger::non_negative("calories_burned", self.calories_burned)?,
            gif_url: None,
        })
    }
}

/// Catalog activities keep their own animation; anything else gets a random one.
fn gif_for(activity: &str) -> Option<String> {
    EXERCISE_IDEAS
        .iter()
        .find(|idea| idea.activity.eq_ignore_ascii_case(activity))
        .copied()
        .or_else(|| catalog::random_exercise(&mut rand::thread_rng()))
        .map(|idea| idea.gif_url.to_string())
}

pub async fn list_exercise(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
) -> Result<Json<Vec<exercise_entry::Model>>, ApiError> {
    Ok(Json(store::exercise_log(&db, user_id).await?))
}

pub async fn log_exercise(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    observer: Observer,
    Json(payload): Json<LogExerciseRequest>,
) -> Result<Response, ApiError> {
    let mut exercise = payload.validate()?;
    exercise.gif_url = gif_for(&exercise.activity);

    let entry = store::log_exercise(&db, user_id, exercise, observer.now, &observer.zone).await?;

    tracing::Span::current()
        .record("table", "exercise_entries")
        .record("action", "log_exercise")
        .record("business_event", "Exercise logged");
    metrics::counter!("slimjourney_exercise_entries_total").increment(1);
    metrics::gauge!("slimjourney_exercise_entries_stored").increment(1.0);

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

pub async fn exercise_idea() -> Result<Json<ExerciseIdea>, ApiError> {
    catalog::random_exercise(&mut rand::thread_rng())
        .map(Json)
        .ok_or(ApiError::NotFound("Exercise idea"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(duration_minutes: i32, calories_burned: f64) -> LogExerciseRequest {
        named("Running", duration_minutes, calories_burned)
    }

    fn named(activity: &str, duration_minutes: i32, calories_burned: f64) -> LogExerciseRequest {
        LogExerciseRequest {
            activity: activity.to_string(),
            duration_minutes,
            calories_burned,
        }
    }

    #[test]
    fn duration_must_be_at_least_a_minute() {
        assert!(request(0, 100.0).validate().is_err());
        assert!(request(1, 0.0).validate().is_ok());
    }

    #[test]
    fn burned_calories_cannot_be_negative() {
        assert!(request(30, -5.0).validate().is_err());
    }

    #[test]
    fn activity_needs_two_characters() {
        assert!(named("R", 30, 100.0).validate().is_err());
        assert!(named("  ", 30, 100.0).validate().is_err());
        assert!(named("Yo", 30, 100.0).validate().is_ok());
    }

    #[test]
    fn catalog_activity_keeps_its_gif() {
        assert_eq!(
            gif_for("squats").as_deref(),
            Some("/media/exercises/squats.gif")
        );
        let other = gif_for("Rowing").unwrap();
        assert!(EXERCISE_IDEAS.iter().any(|idea| idea.gif_url == other));
    }
}
