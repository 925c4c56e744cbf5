use chrono::NaiveDateTime;
use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub scheduled_day_id: Option<Uuid>,
    pub gym_id: Option<Uuid>,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub is_completed: bool,
    pub notes: String,
    pub sets: Vec<WorkoutSet>,
}

impl From<domain::WorkoutSession> for WorkoutSession {
    fn from(value: domain::WorkoutSession) -> Self {
        Self {
            id: *value.id,
            scheduled_day_id: value.scheduled_day_id.map(|id| *id),
            gym_id: value.gym_id.map(|id| *id),
            started_at: value.started_at,
            completed_at: value.completed_at,
            is_completed: value.is_completed,
            notes: value.notes,
            sets: value.sets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rpe: Option<f32>,
    pub overall_rpe: Option<String>,
    pub notes: String,
    pub completed_at: NaiveDateTime,
}

impl From<domain::WorkoutSet> for WorkoutSet {
    fn from(value: domain::WorkoutSet) -> Self {
        Self {
            id: *value.id,
            exercise_id: *value.exercise_id,
            set_number: value.set_number,
            reps: value.reps,
            weight: value.weight,
            rpe: value.rpe,
            overall_rpe: value.overall_rpe.map(|rpe| rpe.as_ref().to_string()),
            notes: value.notes,
            completed_at: value.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggedSet {
    pub exercise_id: Uuid,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rpe: Option<f32>,
    #[serde(default)]
    pub notes: String,
}

impl From<LoggedSet> for domain::LoggedSet {
    fn from(value: LoggedSet) -> Self {
        Self {
            exercise_id: value.exercise_id.into(),
            set_number: value.set_number,
            reps: value.reps,
            weight: value.weight,
            rpe: value.rpe,
            notes: value.notes.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StandaloneWorkout {
    pub gym_id: Option<Uuid>,
}

/// Effort as `-`, `=` or `+`.
#[derive(Debug, Deserialize)]
pub struct OverallRpeInput {
    pub exercise_id: Uuid,
    pub overall_rpe: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OverallRpeSaved {
    pub success: bool,
    pub updated_sets: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteWorkout {
    #[serde(default)]
    pub notes: String,
}
