use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::zone::Observer;
use crate::catalog;
use crate::entities::food_entry;
use crate::ledger;
use crate::store::{self, NewFood};

const MIN_DESCRIPTION_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

#[derive(Deserialize)]
pub struct LogFoodRequest {
    description: String,
    calories: f64,
    meal_type: MealType,
}

impl LogFoodRequest {
    fn validate(self) -> Result<NewFood, ApiError> {
        let description = self.description.trim().to_string();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(ApiError::BadRequest(
                "Description must be at least 2 characters.".to_string(),
            ));
        }
        Ok(NewFood {
            description,
            calories: ledger::non_negative("calories", self.calories)?,
            meal_type: self.meal_type.as_str().to_string(),
            image_url: None,
        })
    }
}

pub async fn list_food(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
) -> Result<Json<Vec<food_entry::Model>>, ApiError> {
    Ok(Json(store::food_log(&db, user_id).await?))
}

pub async fn log_food(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    observer: Observer,
    Json(payload): Json<LogFoodRequest>,
) -> Result<Response, ApiError> {
    let mut food = payload.validate()?;
    food.image_url =
        catalog::random_food_image(&mut rand::thread_rng()).map(|img| img.image_url.to_string());

    let entry = store::log_food(&db, user_id, food, observer.now, &observer.zone).await?;

    tracing::Span::current()
        .record("table", "food_entries")
        .record("action", "log_food")
        .record("business_event", "Food logged");
    metrics::counter!("slimjourney_food_entries_total", "meal_type" => entry.meal_type.clone())
        .increment(1);
    metrics::gauge!("slimjourney_food_entries_stored").increment(1.0);

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}
