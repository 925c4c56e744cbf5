use chrono::{NaiveDate, NaiveDateTime};
use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkoutSet;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_workouts: usize,
    pub total_days: usize,
    pub completed_programs: usize,
    pub total_sets: usize,
    pub top_exercises: Vec<ExerciseProgress>,
    pub overall_progress: VolumeProgress,
    pub current_weight: Option<f32>,
    pub current_body_fat: Option<f32>,
    pub weight_unit: String,
    pub body_metric_change: Option<BodyMetricChange>,
}

impl From<domain::Summary> for Summary {
    fn from(value: domain::Summary) -> Self {
        Self {
            total_workouts: value.total_workouts,
            total_days: value.total_days,
            completed_programs: value.completed_programs,
            total_sets: value.total_sets,
            top_exercises: value.top_exercises.into_iter().map(Into::into).collect(),
            overall_progress: VolumeProgress {
                recent_volume: value.overall_progress.recent_volume,
                previous_volume: value.overall_progress.previous_volume,
                volume_change: value.overall_progress.volume_change,
                percent_change: value.overall_progress.percent_change,
            },
            current_weight: value.current_weight,
            current_body_fat: value.current_body_fat,
            weight_unit: value.weight_unit.as_ref().to_string(),
            body_metric_change: value.body_metric_change.map(|change| BodyMetricChange {
                first: change.first.into(),
                latest: change.latest.into(),
                weight_change: change.weight_change,
                body_fat_change: change.body_fat_change,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExerciseProgress {
    pub exercise_id: Uuid,
    pub name: String,
    pub total_volume: f32,
    pub set_count: usize,
    pub first_set: Option<WorkoutSet>,
    pub last_set: Option<WorkoutSet>,
    pub volume_change: f32,
    pub percent_change: f32,
}

impl From<domain::ExerciseProgress> for ExerciseProgress {
    fn from(value: domain::ExerciseProgress) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            name: value.name,
            total_volume: value.total_volume,
            set_count: value.set_count,
            first_set: value.first_set.map(Into::into),
            last_set: value.last_set.map(Into::into),
            volume_change: value.volume_change,
            percent_change: value.percent_change,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolumeProgress {
    pub recent_volume: f32,
    pub previous_volume: f32,
    pub volume_change: f32,
    pub percent_change: f32,
}

#[derive(Debug, Serialize)]
pub struct ExerciseDay {
    pub date: NaiveDate,
    pub max_weight: f32,
    pub total_volume: f32,
    pub sets: Vec<WorkoutSet>,
}

impl From<domain::ExerciseDay> for ExerciseDay {
    fn from(value: domain::ExerciseDay) -> Self {
        Self {
            date: value.date,
            max_weight: value.max_weight,
            total_volume: value.total_volume,
            sets: value.sets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExerciseStats {
    pub exercise_id: Uuid,
    pub name: String,
    pub category: String,
    pub session_count: usize,
    pub total_sets: usize,
    pub max_weight: Option<f32>,
    pub last_performed: NaiveDateTime,
}

impl From<domain::ExerciseStats> for ExerciseStats {
    fn from(value: domain::ExerciseStats) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            name: value.name,
            category: value.category.as_ref().to_string(),
            session_count: value.session_count,
            total_sets: value.total_sets,
            max_weight: value.max_weight,
            last_performed: value.last_performed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstanceProgress {
    pub instance_id: Uuid,
    pub name: String,
    pub program_name: String,
    pub gym_name: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub total_days: usize,
    pub completed_days: usize,
    pub completion_percentage: f32,
    pub is_completed: bool,
}

impl From<domain::InstanceProgress> for InstanceProgress {
    fn from(value: domain::InstanceProgress) -> Self {
        Self {
            is_completed: value.is_completed(),
            instance_id: *value.instance_id,
            name: value.name,
            program_name: value.program_name,
            gym_name: value.gym_name,
            scheduled_date: value.scheduled_date,
            start_date: value.start_date,
            end_date: value.end_date,
            total_days: value.total_days,
            completed_days: value.completed_days,
            completion_percentage: value.completion_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BodyMetricChange {
    pub first: BodyMetric,
    pub latest: BodyMetric,
    pub weight_change: f32,
    pub body_fat_change: f32,
}

#[derive(Debug, Serialize)]
pub struct BodyMetric {
    pub id: Uuid,
    pub recorded_at: NaiveDateTime,
    pub weight: Option<f32>,
    pub body_fat: Option<f32>,
    pub chest: Option<f32>,
    pub waist: Option<f32>,
    pub hips: Option<f32>,
    pub left_arm: Option<f32>,
    pub right_arm: Option<f32>,
    pub left_thigh: Option<f32>,
    pub right_thigh: Option<f32>,
    pub left_calf: Option<f32>,
    pub right_calf: Option<f32>,
    pub notes: String,
}

impl From<domain::BodyMetric> for BodyMetric {
    fn from(value: domain::BodyMetric) -> Self {
        Self {
            id: *value.id,
            recorded_at: value.recorded_at,
            weight: value.weight,
            body_fat: value.body_fat,
            chest: value.chest,
            waist: value.waist,
            hips: value.hips,
            left_arm: value.left_arm,
            right_arm: value.right_arm,
            left_thigh: value.left_thigh,
            right_thigh: value.right_thigh,
            left_calf: value.left_calf,
            right_calf: value.right_calf,
            notes: value.notes,
        }
    }
}

/// Measurements as entered, empty values are omitted. The time of recording defaults to now.
#[derive(Debug, Default, Deserialize)]
pub struct BodyMetricInput {
    pub recorded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub body_fat: String,
    #[serde(default)]
    pub chest: String,
    #[serde(default)]
    pub waist: String,
    #[serde(default)]
    pub hips: String,
    #[serde(default)]
    pub left_arm: String,
    #[serde(default)]
    pub right_arm: String,
    #[serde(default)]
    pub left_thigh: String,
    #[serde(default)]
    pub right_thigh: String,
    #[serde(default)]
    pub left_calf: String,
    #[serde(default)]
    pub right_calf: String,
    #[serde(default)]
    pub notes: String,
}
