use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub is_admin: bool,
}

impl From<domain::User> for User {
    fn from(value: domain::User) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            is_admin: value.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub weight_unit: String,
    pub current_weight: Option<f32>,
    pub current_body_fat: Option<f32>,
    pub measurements: Measurements,
}

impl From<domain::Profile> for Profile {
    fn from(value: domain::Profile) -> Self {
        Self {
            weight_unit: value.weight_unit.as_ref().to_string(),
            current_weight: value.current_weight,
            current_body_fat: value.current_body_fat,
            measurements: value.measurements.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Measurements {
    pub chest: Option<f32>,
    pub waist: Option<f32>,
    pub hips: Option<f32>,
    pub left_arm: Option<f32>,
    pub right_arm: Option<f32>,
    pub left_thigh: Option<f32>,
    pub right_thigh: Option<f32>,
    pub left_calf: Option<f32>,
    pub right_calf: Option<f32>,
}

impl From<domain::Measurements> for Measurements {
    fn from(value: domain::Measurements) -> Self {
        Self {
            chest: value.chest,
            waist: value.waist,
            hips: value.hips,
            left_arm: value.left_arm,
            right_arm: value.right_arm,
            left_thigh: value.left_thigh,
            right_thigh: value.right_thigh,
            left_calf: value.left_calf,
            right_calf: value.right_calf,
        }
    }
}

/// Omitted measurements keep their stored value, empty ones clear it.
#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    pub weight_unit: String,
    pub chest: Option<String>,
    pub waist: Option<String>,
    pub hips: Option<String>,
    pub left_arm: Option<String>,
    pub right_arm: Option<String>,
    pub left_thigh: Option<String>,
    pub right_thigh: Option<String>,
    pub left_calf: Option<String>,
    pub right_calf: Option<String>,
}
