use axum::{extract::State, http::StatusCode};
use ironplan_domain::{self as domain, BodyMetricService, UserService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{Deleted, NewUser, Profile, ProfileInput, User, UserPatch},
};

async fn require_admin(state: &AppState, user_id: domain::UserID) -> Result<(), AppError> {
    if state.service.get_user(user_id).await?.is_admin {
        Ok(())
    } else {
        Err(AppError::new(
            StatusCode::FORBIDDEN,
            "Only administrators can manage users",
        ))
    }
}

fn measurement(
    state: &AppState,
    current: Option<f32>,
    input: Option<&str>,
) -> Result<Option<f32>, AppError> {
    match input {
        Some(value) => Ok(state.service.validate_measurement(value)?),
        None => Ok(current),
    }
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.service.get_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// The first user can be created without identification and becomes an administrator. Afterwards
/// only administrators can create users.
pub async fn create(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Json(user): Json<NewUser>,
) -> Result<Json<User>, AppError> {
    let users = state.service.get_users().await?;
    let is_admin = if users.is_empty() {
        true
    } else {
        let Some(CurrentUser(user_id)) = current_user else {
            return Err(AppError::new(StatusCode::UNAUTHORIZED, "Missing user"));
        };
        if !users.iter().any(|u| u.id == user_id && u.is_admin) {
            return Err(AppError::new(
                StatusCode::FORBIDDEN,
                "Only administrators can create users",
            ));
        }
        user.is_admin
    };
    let name = state
        .service
        .validate_user_name(&user.name, domain::UserID::nil())
        .await?;
    let created = state.service.create_user(name, is_admin).await?;
    Ok(Json(created.into()))
}

pub async fn modify(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, AppError> {
    require_admin(&state, user_id).await?;
    let id = domain::UserID::from(id);
    let name = match patch.name {
        Some(name) => Some(state.service.validate_user_name(&name, id).await?),
        None => None,
    };
    let user = state.service.modify_user(id, name, patch.is_admin).await?;
    Ok(Json(user.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    require_admin(&state, user_id).await?;
    let id = domain::UserID::from(id);
    if id == user_id {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }
    let id = state.service.delete_user(id).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.service.get_profile(user_id).await?.into()))
}

pub async fn replace_profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>, AppError> {
    let weight_unit = state.service.validate_weight_unit(&input.weight_unit)?;
    let profile = state.service.get_profile(user_id).await?;
    let current = profile.measurements;
    let measurements = domain::Measurements {
        chest: measurement(&state, current.chest, input.chest.as_deref())?,
        waist: measurement(&state, current.waist, input.waist.as_deref())?,
        hips: measurement(&state, current.hips, input.hips.as_deref())?,
        left_arm: measurement(&state, current.left_arm, input.left_arm.as_deref())?,
        right_arm: measurement(&state, current.right_arm, input.right_arm.as_deref())?,
        left_thigh: measurement(&state, current.left_thigh, input.left_thigh.as_deref())?,
        right_thigh: measurement(&state, current.right_thigh, input.right_thigh.as_deref())?,
        left_calf: measurement(&state, current.left_calf, input.left_calf.as_deref())?,
        right_calf: measurement(&state, current.right_calf, input.right_calf.as_deref())?,
    };
    let replaced = state
        .service
        .replace_profile(domain::Profile {
            weight_unit,
            measurements,
            ..profile
        })
        .await?;
    Ok(Json(replaced.into()))
}
