use std::sync::Arc;

use axum::extract::{Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use super::error::ApiError;
use super::zone::Observer;
use crate::entities::weight_record;
use crate::ledger;
use crate::store;

#[derive(Deserialize)]
pub struct RecordWeightRequest {
    weight_kg: f64,
}

pub async fn weight_history(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
) -> Result<Json<Vec<weight_record::Model>>, ApiError> {
    Ok(Json(store::weight_history(&db, user_id).await?))
}

/// One reading per local day; logging again the same day overwrites it.
pub async fn record_weight(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user_id): Extension<i32>,
    observer: Observer,
    Json(payload): Json<RecordWeightRequest>,
) -> Result<Json<weight_record::Model>, ApiError> {
    let weight_kg = ledger::positive("weight_kg", payload.weight_kg)?;
    let record = store::record_weight(&db, user_id, weight_kg, observer.now, &observer.zone).await?;

    tracing::Span::current()
        .record("table", "weight_records")
        .record("action", "record_weight")
        .record("business_event", "Weight recorded");
    metrics::counter!("slimjourney_weight_records_total").increment(1);

    Ok(Json(record))
}
