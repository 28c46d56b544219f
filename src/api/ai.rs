use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Json},
};
use sea_orm::DatabaseConnection;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::dashboard::net_calories;
use super::error::ApiError;
use super::zone::Observer;
use crate::catalog::{self, Weather};
use crate::gemini::{parse_json_reply, TextGenerator};
use crate::ledger;
use crate::prompts::{Prompts, Tone};

const RECOMMENDATION_TEMPERATURE: f32 = 0.8;
const IDEA_TEMPERATURE: f32 = 0.7;
const DEFAULT_MEAL_CALORIES: u32 = 500;

pub const RECOMMENDATION_FALLBACK: &str =
    "Sorry, I couldn't generate a recommendation right now. Please try again later.";
pub const FALLBACK_ACTIVITY: &str = "Take a walk";
pub const FALLBACK_REASON: &str = "It's a great way to clear your mind!";

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    net_calories: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub net_calories: f64,
    pub tone: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MealIdeaRequest {
    calorie_target: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MealIdea {
    pub name: String,
    pub description: String,
    pub calories: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutdoorActivityRequest {
    weather: Option<Weather>,
}

#[derive(Debug, Deserialize)]
struct ActivityReply {
    activity: String,
    reason: String,
}

#[derive(Debug, Serialize)]
pub struct OutdoorActivity {
    pub weather: Weather,
    pub temperature: i32,
    pub activity: String,
    pub reason: String,
}

fn tone_name(tone: Tone) -> &'static str {
    match tone {
        Tone::Surplus => "surplus",
        Tone::Deficit => "deficit",
        Tone::Balanced => "balanced",
    }
}

/// Every field of these bodies is optional, so an empty request means defaults.
/// A body that is present must still parse.
fn optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))
}

fn render_failed(e: handlebars::RenderError) -> ApiError {
    ApiError::Internal(format!("failed to render prompt: {e}"))
}

pub async fn recommendation(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    Extension(generator): Extension<Arc<dyn TextGenerator>>,
    Extension(prompts): Extension<Arc<Prompts>>,
    observer: Observer,
    body: Bytes,
) -> Result<Json<Recommendation>, ApiError> {
    let payload: RecommendationRequest = optional_body(&body)?;
    let net = match payload.net_calories {
        Some(net) => ledger::finite("net_calories", net)?,
        None => net_calories(&db, user_id, &observer).await?,
    };

    let prompt = prompts.recommendation(net).map_err(render_failed)?;
    let message = match generator.generate(&prompt, RECOMMENDATION_TEMPERATURE).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "recommendation generation failed");
            RECOMMENDATION_FALLBACK.to_string()
        }
    };

    tracing::Span::current()
        .record("table", "ai")
        .record("action", "recommendation");
    metrics::counter!("slimjourney_ai_requests_total", "kind" => "recommendation").increment(1);

    Ok(Json(Recommendation {
        net_calories: net,
        tone: tone_name(Tone::from_net_calories(net)),
        message,
    }))
}

pub async fn meal_idea(
    Extension(generator): Extension<Arc<dyn TextGenerator>>,
    Extension(prompts): Extension<Arc<Prompts>>,
    body: Bytes,
) -> Result<Json<MealIdea>, ApiError> {
    let payload: MealIdeaRequest = optional_body(&body)?;
    let target = payload.calorie_target.unwrap_or(DEFAULT_MEAL_CALORIES);
    if target == 0 {
        return Err(ApiError::BadRequest("calorie_target must be greater than zero".to_string()));
    }

    let prompt = prompts.meal_idea(target).map_err(render_failed)?;
    let text = generator.generate(&prompt, IDEA_TEMPERATURE).await?;
    let idea: MealIdea = parse_json_reply(&text)?;

    tracing::Span::current()
        .record("table", "ai")
        .record("action", "meal_idea");
    metrics::counter!("slimjourney_ai_requests_total", "kind" => "meal_idea").increment(1);

    Ok(Json(idea))
}

pub async fn outdoor_activity(
    Extension(generator): Extension<Arc<dyn TextGenerator>>,
    Extension(prompts): Extension<Arc<Prompts>>,
    body: Bytes,
) -> Result<Json<OutdoorActivity>, ApiError> {
    let payload: OutdoorActivityRequest = optional_body(&body)?;
    let weather = payload
        .weather
        .unwrap_or_else(|| catalog::random_weather(&mut rand::thread_rng()));
    let temperature = weather.temperature_c();

    let prompt = prompts
        .outdoor_activity(weather, temperature)
        .map_err(render_failed)?;
    let reply = generator
        .generate(&prompt, IDEA_TEMPERATURE)
        .await
        .and_then(|text| parse_json_reply::<ActivityReply>(&text));
    let (activity, reason) = match reply {
        Ok(reply) => (reply.activity, reply.reason),
        Err(e) => {
            tracing::warn!(error = %e, weather = weather.as_str(), "outdoor activity generation failed");
            (FALLBACK_ACTIVITY.to_string(), FALLBACK_REASON.to_string())
        }
    };

    tracing::Span::current()
        .record("table", "ai")
        .record("action", "outdoor_activity");
    metrics::counter!("slimjourney_ai_requests_total", "kind" => "outdoor_activity").increment(1);

    Ok(Json(OutdoorActivity {
        weather,
        temperature,
        activity,
        reason,
    }))
}
