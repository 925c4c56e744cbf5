use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub equipment_type: String,
    pub created_by: Uuid,
    pub variations: Vec<EquipmentVariation>,
}

impl From<domain::Equipment> for Equipment {
    fn from(value: domain::Equipment) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: value.description,
            equipment_type: value.equipment_type.as_ref().to_string(),
            created_by: *value.created_by,
            variations: value
                .variations
                .into_iter()
                .map(|v| EquipmentVariation {
                    name: v.name.to_string(),
                    options: v.options,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EquipmentVariation {
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub equipment_type: String,
    #[serde(default)]
    pub variations: Vec<VariationInput>,
}

/// Options are given one per line.
#[derive(Debug, Deserialize)]
pub struct VariationInput {
    pub name: String,
    #[serde(default)]
    pub options: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EquipmentQuery {
    pub search: Option<String>,
    pub equipment_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub primary_muscle: Option<String>,
    pub secondary_muscles: Vec<String>,
    pub difficulty: Option<String>,
    pub equipment: Vec<Uuid>,
    pub created_by: Uuid,
}

impl From<domain::Exercise> for Exercise {
    fn from(value: domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: value.description,
            category: value.category.as_ref().to_string(),
            primary_muscle: value.primary_muscle.map(|m| m.as_ref().to_string()),
            secondary_muscles: value
                .secondary_muscles
                .iter()
                .map(|m| m.as_ref().to_string())
                .collect(),
            difficulty: value.difficulty.map(|d| d.as_ref().to_string()),
            equipment: value.equipment.iter().map(|id| **id).collect(),
            created_by: *value.created_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExerciseInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub primary_muscle: Option<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub equipment: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExercisePreference {
    pub exercise_id: Uuid,
    pub rating: Option<u8>,
    pub notes: String,
}

impl From<domain::ExercisePreference> for ExercisePreference {
    fn from(value: domain::ExercisePreference) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            rating: value.rating,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExercisePreferenceInput {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BodyPattern {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub days: Vec<String>,
    pub is_shared: bool,
}

impl From<domain::BodyPattern> for BodyPattern {
    fn from(value: domain::BodyPattern) -> Self {
        Self {
            id: *value.id,
            user_id: value.user_id.map(|id| *id),
            name: value.name.to_string(),
            is_shared: value.is_shared(),
            days: value.days,
        }
    }
}

/// Day labels are given one per line.
#[derive(Debug, Deserialize)]
pub struct NewBodyPattern {
    pub name: String,
    pub days: String,
    #[serde(default)]
    pub shared: bool,
}

#[derive(Debug, Serialize)]
pub struct Gym {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub is_shared: bool,
    pub equipment: Vec<GymEquipment>,
}

impl From<domain::Gym> for Gym {
    fn from(value: domain::Gym) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            name: value.name.to_string(),
            address: value.address,
            is_shared: value.is_shared,
            equipment: value.equipment.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GymInput {
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Serialize)]
pub struct GymEquipment {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub quantity: u32,
    pub progression_type: String,
    pub weight_value: Option<f32>,
    pub plate_sizes: Vec<f32>,
    pub stack_increment: Option<f32>,
    pub notes: String,
}

impl From<domain::GymEquipment> for GymEquipment {
    fn from(value: domain::GymEquipment) -> Self {
        Self {
            id: *value.id,
            equipment_id: *value.equipment_id,
            quantity: value.quantity,
            progression_type: value.progression_type.as_ref().to_string(),
            weight_value: value.weight_value,
            plate_sizes: value.plate_sizes,
            stack_increment: value.stack_increment,
            notes: value.notes,
        }
    }
}

fn one() -> u32 {
    1
}

/// Plate sizes are given as a comma separated list.
#[derive(Debug, Deserialize)]
pub struct GymEquipmentInput {
    pub equipment_id: Uuid,
    #[serde(default = "one")]
    pub quantity: u32,
    pub progression_type: String,
    pub weight_value: Option<f32>,
    #[serde(default)]
    pub plate_sizes: String,
    pub stack_increment: Option<f32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct GymExercise {
    pub gym_id: Uuid,
    pub exercise_id: Uuid,
    pub notes: String,
    pub is_favorite: bool,
}

impl From<domain::GymExercise> for GymExercise {
    fn from(value: domain::GymExercise) -> Self {
        Self {
            gym_id: *value.gym_id,
            exercise_id: *value.exercise_id,
            notes: value.notes,
            is_favorite: value.is_favorite,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GymExerciseInput {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_favorite: bool,
}
