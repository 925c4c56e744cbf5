use axum::extract::State;
use ironplan_domain::{self as domain, EquipmentService, ExerciseService};
use uuid::Uuid;

use crate::{
    AppError, AppState, CurrentUser,
    extract::{Json, Path, Query},
    model::{
        Deleted, Equipment, EquipmentInput, EquipmentQuery, Exercise, ExerciseInput,
        ExercisePreference, ExercisePreferenceInput, ExerciseQuery,
    },
};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn equipment(
    state: &AppState,
    id: Uuid,
    input: EquipmentInput,
) -> Result<domain::Equipment, AppError> {
    Ok(domain::Equipment {
        id: id.into(),
        name: domain::Name::new(&input.name)?,
        description: input.description.trim().to_string(),
        equipment_type: state.service.validate_equipment_type(&input.equipment_type)?,
        created_by: domain::UserID::nil(),
        variations: input
            .variations
            .into_iter()
            .map(|v| {
                Ok(domain::EquipmentVariation {
                    name: domain::Name::new(&v.name)?,
                    options: state.service.validate_variation_options(&v.options),
                })
            })
            .collect::<Result<Vec<_>, domain::NameError>>()?,
    })
}

fn exercise(
    state: &AppState,
    id: Uuid,
    input: ExerciseInput,
) -> Result<domain::Exercise, AppError> {
    Ok(domain::Exercise {
        id: id.into(),
        name: domain::Name::new(&input.name)?,
        description: input.description.trim().to_string(),
        category: state.service.validate_category(&input.category)?,
        primary_muscle: non_empty(input.primary_muscle)
            .map(|m| state.service.validate_muscle_group(&m))
            .transpose()?,
        secondary_muscles: input
            .secondary_muscles
            .iter()
            .map(|m| state.service.validate_muscle_group(m))
            .collect::<Result<Vec<_>, _>>()?,
        difficulty: non_empty(input.difficulty)
            .map(|d| state.service.validate_difficulty(&d))
            .transpose()?,
        equipment: input.equipment.into_iter().map(Into::into).collect(),
        created_by: domain::UserID::nil(),
    })
}

pub async fn list_equipment(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<EquipmentQuery>,
) -> Result<Json<Vec<Equipment>>, AppError> {
    let filter = domain::EquipmentFilter {
        search: query.search.unwrap_or_default(),
        equipment_type: non_empty(query.equipment_type)
            .map(|t| state.service.validate_equipment_type(&t))
            .transpose()?,
    };
    let equipment = state.service.get_equipment(&filter).await?;
    Ok(Json(equipment.into_iter().map(Into::into).collect()))
}

pub async fn create_equipment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<EquipmentInput>,
) -> Result<Json<Equipment>, AppError> {
    let equipment = equipment(&state, Uuid::nil(), input)?;
    let created = state.service.create_equipment(user_id, equipment).await?;
    Ok(Json(created.into()))
}

pub async fn replace_equipment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<EquipmentInput>,
) -> Result<Json<Equipment>, AppError> {
    let equipment = equipment(&state, id, input)?;
    let replaced = state.service.replace_equipment(user_id, equipment).await?;
    Ok(Json(replaced.into()))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_equipment(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}

pub async fn list_exercises(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<ExerciseQuery>,
) -> Result<Json<Vec<Exercise>>, AppError> {
    let filter = domain::ExerciseFilter {
        search: query.search.unwrap_or_default(),
        category: non_empty(query.category)
            .map(|c| state.service.validate_category(&c))
            .transpose()?,
    };
    let exercises = state.service.get_exercises(&filter).await?;
    Ok(Json(exercises.into_iter().map(Into::into).collect()))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Exercise>, AppError> {
    Ok(Json(state.service.get_exercise(id.into()).await?.into()))
}

pub async fn exercise_preference(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExercisePreference>, AppError> {
    let preference = state
        .service
        .get_exercise_preference(user_id, id.into())
        .await?;
    Ok(Json(preference.into()))
}

pub async fn replace_exercise_preference(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ExercisePreferenceInput>,
) -> Result<Json<ExercisePreference>, AppError> {
    let preference = domain::ExercisePreference {
        rating: state.service.validate_rating(&input.rating)?,
        notes: input.notes.trim().to_string(),
        ..domain::ExercisePreference::new(user_id, id.into())
    };
    let replaced = state
        .service
        .replace_exercise_preference(user_id, preference)
        .await?;
    Ok(Json(replaced.into()))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<ExerciseInput>,
) -> Result<Json<Exercise>, AppError> {
    let exercise = exercise(&state, Uuid::nil(), input)?;
    let created = state.service.create_exercise(user_id, exercise).await?;
    Ok(Json(created.into()))
}

pub async fn replace_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ExerciseInput>,
) -> Result<Json<Exercise>, AppError> {
    let exercise = exercise(&state, id, input)?;
    let replaced = state.service.replace_exercise(user_id, exercise).await?;
    Ok(Json(replaced.into()))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, AppError> {
    let id = state.service.delete_exercise(user_id, id.into()).await?;
    Ok(Json(Deleted::new(id)))
}
