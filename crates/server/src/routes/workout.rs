use axum::extract::State;
use ironplan_domain::WorkoutService;
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{
        CompleteWorkout, LoggedSet, OverallRpeInput, OverallRpeSaved, StandaloneWorkout,
        WorkoutSession, WorkoutSet,
    },
};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<WorkoutSession>>, AppError> {
    let sessions = state.service.get_workout_sessions(user_id).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutSession>, AppError> {
    let session = state
        .service
        .get_workout_session(user_id, id.into())
        .await?;
    Ok(Json(session.into()))
}

pub async fn start(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(scheduled_day_id): Path<Uuid>,
) -> Result<Json<WorkoutSession>, AppError> {
    let session = state
        .service
        .start_workout(user_id, scheduled_day_id.into())
        .await?;
    Ok(Json(session.into()))
}

pub async fn start_standalone(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(workout): Json<StandaloneWorkout>,
) -> Result<Json<WorkoutSession>, AppError> {
    let session = state
        .service
        .start_standalone_workout(user_id, workout.gym_id.map(Into::into))
        .await?;
    Ok(Json(session.into()))
}

pub async fn log_set(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(set): Json<LoggedSet>,
) -> Result<Json<WorkoutSet>, AppError> {
    let set = state.service.log_set(user_id, id.into(), set.into()).await?;
    Ok(Json(set.into()))
}

pub async fn save_overall_rpe(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<OverallRpeInput>,
) -> Result<Json<OverallRpeSaved>, AppError> {
    let overall_rpe = state.service.validate_overall_rpe(&input.overall_rpe)?;
    let updated_sets = state
        .service
        .save_overall_rpe(user_id, id.into(), input.exercise_id.into(), overall_rpe)
        .await?;
    Ok(Json(OverallRpeSaved {
        success: true,
        updated_sets,
    }))
}

pub async fn complete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CompleteWorkout>,
) -> Result<Json<WorkoutSession>, AppError> {
    let session = state
        .service
        .complete_workout(user_id, id.into(), input.notes)
        .await?;
    Ok(Json(session.into()))
}

pub async fn previous_sets(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(exercise_id): Path<Uuid>,
) -> Result<Json<Vec<WorkoutSet>>, AppError> {
    let sets = state
        .service
        .get_previous_sets(user_id, exercise_id.into())
        .await?;
    Ok(Json(sets.into_iter().map(Into::into).collect()))
}
