use axum::extract::State;
use ironplan_domain::{self as domain, ProgramService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{
        DayUpdate, Deleted, MoveSeries, NewProgram, NewShare, Program, ProgramDay, ProgramPatch,
        ProgramSeries, ProgramShare, ProgramWeek, WeekUpdate,
    },
};

fn optional_name(name: Option<String>) -> Result<Option<domain::Name>, AppError> {
    Ok(name.map(|name| domain::Name::new(&name)).transpose()?)
}

fn series(series: ProgramSeries) -> Result<domain::ProgramSeries, AppError> {
    let series_type = series
        .series_type
        .parse::<domain::SeriesType>()
        .map_err(|_| AppError::bad_request("Invalid series type"))?;
    let series = series.into_domain(series_type);
    series.validate()?;
    Ok(series)
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Program>>, AppError> {
    let programs = state.service.get_programs(user_id).await?;
    Ok(Json(programs.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Program>, AppError> {
    Ok(Json(state.service.get_program(user_id, id.into()).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(program): Json<NewProgram>,
) -> Result<Json<Program>, AppError> {
    let name = domain::Name::new(&program.name)?;
    let duration_weeks = state
        .service
        .validate_duration_weeks(&program.duration_weeks)?;
    let days_per_week = state.service.validate_days_per_week(&program.days_per_week)?;
    let program = state
        .service
        .create_program(
            user_id,
            name,
            program.description.trim().to_string(),
            program.notes.trim().to_string(),
            duration_weeks,
            days_per_week,
            program.is_template,
        )
        .await?;
    Ok(Json(program.into()))
}

pub async fn modify(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProgramPatch>,
) -> Result<Json<Program>, AppError> {
    let program = state
        .service
        .modify_program(
            user_id,
            id.into(),
            optional_name(patch.name)?,
            patch.description,
            patch.notes,
            patch.is_template,
        )
        .await?;
    Ok(Json(program.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_program(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn duplicate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Program>, AppError> {
    let program = state.service.duplicate_program(user_id, id.into()).await?;
    Ok(Json(program.into()))
}

pub async fn shares(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProgramShare>>, AppError> {
    let shares = state.service.get_program_shares(user_id, id.into()).await?;
    Ok(Json(shares.into_iter().map(Into::into).collect()))
}

pub async fn share(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(share): Json<NewShare>,
) -> Result<Json<ProgramShare>, AppError> {
    let shared_with = domain::UserID::from(share.user_id);
    if shared_with == user_id {
        return Err(AppError::bad_request(
            "A program cannot be shared with its owner",
        ));
    }
    let share = state
        .service
        .share_program(user_id, id.into(), shared_with)
        .await?;
    Ok(Json(share.into()))
}

pub async fn unshare(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.unshare_program(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn modify_week(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(week): Json<WeekUpdate>,
) -> Result<Json<ProgramWeek>, AppError> {
    let week = state
        .service
        .modify_program_week(
            user_id,
            id.into(),
            week.name,
            week.is_deload,
            week.notes.trim().to_string(),
        )
        .await?;
    Ok(Json(week.into()))
}

pub async fn modify_day(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(day): Json<DayUpdate>,
) -> Result<Json<ProgramDay>, AppError> {
    let day = state
        .service
        .modify_program_day(user_id, id.into(), day.name, day.is_rest_day, day.notes)
        .await?;
    Ok(Json(day.into()))
}

pub async fn add_series(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(day_id): Path<Uuid>,
    Json(new_series): Json<ProgramSeries>,
) -> Result<Json<ProgramSeries>, AppError> {
    let created = state
        .service
        .add_series(user_id, day_id.into(), series(new_series)?)
        .await?;
    Ok(Json(created.into()))
}

pub async fn replace_series(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(new_series): Json<ProgramSeries>,
) -> Result<Json<ProgramSeries>, AppError> {
    let replaced = state
        .service
        .replace_series(
            user_id,
            domain::ProgramSeries {
                id: id.into(),
                ..series(new_series)?
            },
        )
        .await?;
    Ok(Json(replaced.into()))
}

pub async fn delete_series(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_series(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn move_series(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveSeries>,
) -> Result<Json<ProgramDay>, AppError> {
    let day = state
        .service
        .move_series(user_id, id.into(), request.direction.into())
        .await?;
    Ok(Json(day.into()))
}
