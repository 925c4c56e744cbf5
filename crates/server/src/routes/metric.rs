use axum::extract::State;
use chrono::Utc;
use ironplan_domain::{self as domain, BodyMetricService};

use crate::{
    AppError, AppState, CurrentUser,
    extract::Json,
    model::{BodyMetric, BodyMetricInput},
};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<BodyMetric>>, AppError> {
    let metrics = state.service.get_body_metrics(user_id).await?;
    Ok(Json(metrics.into_iter().map(Into::into).collect()))
}

pub async fn record(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<BodyMetricInput>,
) -> Result<Json<BodyMetric>, AppError> {
    let service = &state.service;
    let metric = domain::BodyMetric {
        weight: service.validate_measurement(&input.weight)?,
        body_fat: service.validate_body_fat(&input.body_fat)?,
        chest: service.validate_measurement(&input.chest)?,
        waist: service.validate_measurement(&input.waist)?,
        hips: service.validate_measurement(&input.hips)?,
        left_arm: service.validate_measurement(&input.left_arm)?,
        right_arm: service.validate_measurement(&input.right_arm)?,
        left_thigh: service.validate_measurement(&input.left_thigh)?,
        right_thigh: service.validate_measurement(&input.right_thigh)?,
        left_calf: service.validate_measurement(&input.left_calf)?,
        right_calf: service.validate_measurement(&input.right_calf)?,
        notes: input.notes.trim().to_string(),
        ..domain::BodyMetric::new(
            user_id,
            input
                .recorded_at
                .unwrap_or_else(|| Utc::now().naive_utc()),
        )
    };
    let recorded = service.record_body_metric(user_id, metric).await?;
    Ok(Json(recorded.into()))
}
