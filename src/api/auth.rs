use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_cookies::{Cookies, Key};

use super::error::ApiError;
use super::middleware::{end_session, start_session};
use super::zone::Observer;
use crate::onboarding::{Draft, OnboardingError, Step, Wizard};
use crate::store::{self, AccountError};

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal("Failed to hash password".to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| ApiError::Internal("Invalid password hash in DB".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Runs the submitted draft through the wizard, creates the account and signs the user in.
pub async fn onboard(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(key): Extension<Key>,
    cookies: Cookies,
    observer: Observer,
    Json(draft): Json<Draft>,
) -> Result<Response, ApiError> {
    let registration = Wizard::complete(draft)?;
    let password_hash = hash_password(&registration.password)?;

    let user = match store::create_account(
        &db,
        &registration,
        password_hash,
        observer.now,
        &observer.zone,
    )
    .await
    {
        Ok(user) => user,
        Err(AccountError::EmailTaken) => {
            tracing::Span::current()
                .record("table", "users")
                .record("action", "onboard_user_failed");
            return Err(OnboardingError::new(Step::Account, "Email already exists").into());
        }
        Err(AccountError::Database(e)) => return Err(e.into()),
    };

    start_session(&cookies, &key, user.id);

    tracing::Span::current()
        .record("table", "users")
        .record("action", "onboard_user")
        .record("user_id", user.id)
        .record("user_email", &user.email)
        .record("business_event", "User onboarded successfully");

    metrics::counter!("slimjourney_users_registered_total").increment(1);
    metrics::gauge!("slimjourney_users_total").increment(1.0);

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[derive(serde::Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(key): Extension<Key>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let Some(user) = store::find_user_by_email(&*db, &payload.email).await? else {
        tracing::Span::current()
            .record("table", "users")
            .record("action", "login_user_failed");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::Span::current()
            .record("table", "users")
            .record("action", "login_user_failed")
            .record("user_id", user.id);
        return Err(ApiError::InvalidCredentials);
    }

    start_session(&cookies, &key, user.id);

    tracing::Span::current()
        .record("table", "users")
        .record("action", "login_user")
        .record("user_id", user.id)
        .record("user_email", &user.email)
        .record("business_event", "User logged in successfully");

    Ok((StatusCode::OK, Json(json!({"message": "Login successful"}))).into_response())
}

pub async fn logout(Extension(key): Extension<Key>, cookies: Cookies) -> Response {
    end_session(&cookies, &key);
    tracing::Span::current()
        .record("table", "users")
        .record("action", "logout_user");
    (StatusCode::OK, Json(json!({"message": "Logged out"}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("hunter22", "not-a-phc-string").is_err());
    }
}
