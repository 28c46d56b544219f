use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_cookies::{CookieManagerLayer, Key};

use crate::api::{self, water::WaterGoal, zone::UTC_OFFSET_HEADER};
use crate::gemini::TextGenerator;
use crate::prompts::Prompts;

/// Everything the handlers pull out of request extensions.
#[derive(Clone)]
pub struct Services {
    pub db: Arc<DatabaseConnection>,
    pub session_key: Key,
    pub generator: Arc<dyn TextGenerator>,
    pub prompts: Arc<Prompts>,
    pub water_goal: WaterGoal,
    pub cors_origin: HeaderValue,
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn build_app(
    services: Services,
    prometheus: Option<(PrometheusMetricLayer<'static>, PrometheusHandle)>,
) -> Router {
    let session_routes = Router::new()
        .route("/onboarding", post(api::auth::onboard))
        .route("/login", post(api::auth::login))
        .route("/logout", post(api::auth::logout));

    let protected_routes = Router::new()
        .route(
            "/users/me",
            get(api::user::get_user)
                .patch(api::user::update_user)
                .delete(api::user::delete_user),
        )
        .route("/food", get(api::food::list_food).post(api::food::log_food))
        .route(
            "/exercise",
            get(api::exercise::list_exercise).post(api::exercise::log_exercise),
        )
        .route("/exercise/idea", get(api::exercise::exercise_idea))
        .route(
            "/weight",
            get(api::weight::weight_history).post(api::weight::record_weight),
        )
        .route(
            "/water",
            get(api::water::water_status).post(api::water::add_water),
        )
        .route("/dashboard", get(api::dashboard::dashboard))
        .route("/ai/recommendation", post(api::ai::recommendation))
        .route("/ai/meal-idea", post(api::ai::meal_idea))
        .route("/ai/outdoor-activity", post(api::ai::outdoor_activity))
        .route_layer(axum::middleware::from_fn(api::middleware::auth_middleware));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(session_routes)
        .merge(protected_routes)
        .layer(Extension(services.db))
        .layer(Extension(services.session_key))
        .layer(Extension(services.generator))
        .layer(Extension(services.prompts))
        .layer(Extension(services.water_goal))
        .layer(CookieManagerLayer::new());

    let metric_handle = match prometheus {
        Some((layer, handle)) => {
            app = app.layer(layer);
            Some(handle)
        }
        None => None,
    };

    let app = app
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "METHOD /path", e.g. "POST /water"
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    let user_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        user_ip = user_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        user_email = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(services.cors_origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(UTC_OFFSET_HEADER),
                ])
                .allow_credentials(true),
        );

    match metric_handle {
        Some(handle) => app.route("/metrics", get(move || async move { handle.render() })),
        None => app,
    }
}
