use axum::extract::State;
use ironplan_domain::ReportService;
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{ExerciseDay, ExerciseStats, InstanceProgress, Summary},
};

pub async fn summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Summary>, AppError> {
    Ok(Json(state.service.get_summary(user_id).await?.into()))
}

pub async fn exercises(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ExerciseStats>>, AppError> {
    let stats = state.service.get_exercise_stats(user_id).await?;
    Ok(Json(stats.into_iter().map(Into::into).collect()))
}

pub async fn exercise_history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<Vec<ExerciseDay>>, AppError> {
    let history = state
        .service
        .get_exercise_history(user_id, exercise_id.into())
        .await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

pub async fn programs(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<InstanceProgress>>, AppError> {
    let history = state.service.get_program_history(user_id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
