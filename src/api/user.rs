use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use serde_json::json;
use tower_cookies::{Cookies, Key};

use super::error::ApiError;
use super::middleware::end_session;
use crate::entities::user;
use crate::ledger;
use crate::onboarding::{is_valid_email, ActivityLevel};

#[derive(serde::Deserialize)]
pub struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    goal_weight_kg: Option<f64>,
    activity_level: Option<ActivityLevel>,
}

pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

pub async fn get_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
) -> Result<Json<user::Model>, ApiError> {
    Ok(Json(find_user(&db, user_id).await?))
}

pub async fn update_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<user::Model>, ApiError> {
    let user = find_user(&db, user_id).await?;

    let mut active_user = user.into_active_model();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.chars().count() < 2 {
            return Err(ApiError::BadRequest(
                "Name must be at least 2 characters".to_string(),
            ));
        }
        active_user.name = Set(name);
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("Enter a valid email address".to_string()));
        }
        active_user.email = Set(email);
    }
    if let Some(goal) = payload.goal_weight_kg {
        active_user.goal_weight_kg = Set(ledger::positive("goal_weight_kg", goal)?);
    }
    if let Some(level) = payload.activity_level {
        active_user.activity_level = Set(Some(level.as_str().to_string()));
    }
    active_user.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active_user.update(&*db).await?;

    tracing::Span::current()
        .record("table", "users")
        .record("action", "update_user")
        .record("business_event", "Profile updated");

    Ok(Json(updated))
}

pub async fn delete_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    Extension(key): Extension<Key>,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    let res = user::Entity::delete_by_id(user_id).exec(&*db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::NotFound("User"));
    }

    end_session(&cookies, &key);

    tracing::Span::current()
        .record("table", "users")
        .record("action", "delete_user")
        .record("business_event", "User deleted");
    metrics::gauge!("slimjourney_users_total").decrement(1.0);

    Ok((StatusCode::OK, Json(json!({"message": "User deleted"}))).into_response())
}
