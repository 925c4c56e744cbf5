use axum::extract::State;
use ironplan_domain::{self as domain, BodyPatternService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{BodyPattern, Deleted, NewBodyPattern},
};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<BodyPattern>>, AppError> {
    let patterns = state.service.get_body_patterns(user_id).await?;
    Ok(Json(patterns.into_iter().map(Into::into).collect()))
}

/// Only administrators can create shared patterns.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(pattern): Json<NewBodyPattern>,
) -> Result<Json<BodyPattern>, AppError> {
    let name = domain::Name::new(&pattern.name)?;
    let days = state.service.validate_pattern_days(&pattern.days)?;
    let created = state
        .service
        .create_body_pattern(user_id, name, days, pattern.shared)
        .await?;
    Ok(Json(created.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_body_pattern(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}
