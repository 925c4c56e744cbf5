use axum::extract::State;
use ironplan_domain::{self as domain, CalendarService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{
        CalendarEvent, Deleted, InstanceExerciseWeight, MissingDay, MissingDayRequest,
        ProgramInstance, RescheduleRequest, RescheduleResponse, ScheduleRequest,
        ScheduleResponse, ScheduledDay, ScheduledDayDetails,
    },
};

pub async fn events(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let events = state.service.get_calendar_events(user_id).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

pub async fn scheduled_day(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledDayDetails>, AppError> {
    let details = state.service.get_scheduled_day(user_id, id.into()).await?;
    Ok(Json(details.into()))
}

pub async fn delete_scheduled_day(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_scheduled_day(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

/// Moves a scheduled day. An unresolved conflict is reported with `success: false` and leaves
/// the calendar unchanged.
pub async fn reschedule(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<RescheduleResponse>, AppError> {
    let Some(new_date) = request.new_date else {
        return Err(AppError::bad_request("Missing new date"));
    };
    let date = state.service.validate_date(&new_date)?;
    let outcome = state
        .service
        .reschedule(
            user_id,
            domain::RescheduleRequest {
                id: id.into(),
                date,
                resolution: request.action.map(Into::into),
                conflict_id: request.conflict_id.map(Into::into),
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn missing_days(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<MissingDay>>, AppError> {
    let days = state.service.get_missing_days(user_id).await?;
    Ok(Json(days.into_iter().map(Into::into).collect()))
}

pub async fn schedule(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse<ProgramInstance>>, AppError> {
    let mappings = request
        .mappings
        .iter()
        .map(|m| {
            Ok((
                domain::ProgramDayID::from(m.program_day_id),
                state.service.validate_date(&m.date)?,
            ))
        })
        .collect::<Result<Vec<_>, domain::ValidationError>>()?;
    let outcome = state
        .service
        .schedule_program(
            user_id,
            domain::ScheduleRequest {
                program_id: request.program_id.into(),
                name: request.name,
                gym_id: request.gym_id.map(Into::into),
                mappings,
                force: request.force,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn schedule_missing_day(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(instance_id): Path<Uuid>,
    Json(request): Json<MissingDayRequest>,
) -> Result<Json<ScheduleResponse<ScheduledDay>>, AppError> {
    let date = state.service.validate_date(&request.date)?;
    let outcome = state
        .service
        .schedule_missing_day(
            user_id,
            instance_id.into(),
            request.program_day_id.into(),
            date,
            request.force,
        )
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn instances(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ProgramInstance>>, AppError> {
    let instances = state.service.get_program_instances(user_id).await?;
    Ok(Json(instances.into_iter().map(Into::into).collect()))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state
        .service
        .delete_program_instance(user_id, id.into())
        .await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn replace_instance_weight(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(instance_id): Path<Uuid>,
    Json(weight): Json<InstanceExerciseWeight>,
) -> Result<Json<InstanceExerciseWeight>, AppError> {
    let weight = state
        .service
        .replace_instance_exercise_weight(user_id, instance_id.into(), weight.into())
        .await?;
    Ok(Json(weight.into()))
}
