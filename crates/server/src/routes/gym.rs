use axum::extract::State;
use ironplan_domain::{self as domain, GymService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path},
    model::{
        Deleted, Gym, GymEquipment, GymEquipmentInput, GymExercise, GymExerciseInput, GymInput,
    },
};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Gym>>, AppError> {
    let gyms = state.service.get_gyms(user_id).await?;
    Ok(Json(gyms.into_iter().map(Into::into).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Gym>, AppError> {
    Ok(Json(state.service.get_gym(user_id, id.into()).await?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(gym): Json<GymInput>,
) -> Result<Json<Gym>, AppError> {
    let name = domain::Name::new(&gym.name)?;
    let created = state
        .service
        .create_gym(user_id, name, gym.address, gym.is_shared)
        .await?;
    Ok(Json(created.into()))
}

pub async fn replace(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(gym): Json<GymInput>,
) -> Result<Json<Gym>, AppError> {
    let replaced = state
        .service
        .replace_gym(
            user_id,
            domain::Gym {
                id: id.into(),
                user_id,
                name: domain::Name::new(&gym.name)?,
                address: gym
                    .address
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty()),
                is_shared: gym.is_shared,
                equipment: vec![],
            },
        )
        .await?;
    Ok(Json(state.service.get_gym(user_id, replaced.id).await?.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_gym(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn add_equipment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<GymEquipmentInput>,
) -> Result<Json<GymEquipment>, AppError> {
    let equipment = domain::GymEquipment {
        id: domain::GymEquipmentID::nil(),
        equipment_id: input.equipment_id.into(),
        quantity: input.quantity,
        progression_type: state
            .service
            .validate_progression_type(&input.progression_type)?,
        weight_value: input.weight_value,
        plate_sizes: state.service.validate_plate_sizes(&input.plate_sizes)?,
        stack_increment: input.stack_increment,
        notes: input.notes.trim().to_string(),
    };
    let added = state
        .service
        .add_gym_equipment(user_id, id.into(), equipment)
        .await?;
    Ok(Json(added.into()))
}

pub async fn remove_equipment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((id, equipment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Deleted>, AppError> {
    let id = state
        .service
        .remove_gym_equipment(user_id, id.into(), equipment_id.into())
        .await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn exercises(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GymExercise>>, AppError> {
    let exercises = state.service.get_gym_exercises(user_id, id.into()).await?;
    Ok(Json(exercises.into_iter().map(Into::into).collect()))
}

pub async fn replace_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((id, exercise_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<GymExerciseInput>,
) -> Result<Json<GymExercise>, AppError> {
    let replaced = state
        .service
        .replace_gym_exercise(
            user_id,
            domain::GymExercise {
                gym_id: id.into(),
                exercise_id: exercise_id.into(),
                notes: input.notes.trim().to_string(),
                is_favorite: input.is_favorite,
            },
        )
        .await?;
    Ok(Json(replaced.into()))
}
