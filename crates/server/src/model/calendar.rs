use chrono::NaiveDate;
use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub is_completed: bool,
}

impl From<domain::CalendarEvent> for CalendarEvent {
    fn from(value: domain::CalendarEvent) -> Self {
        Self {
            id: *value.id,
            title: value.title,
            date: value.date,
            is_completed: value.is_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Swap,
    Shift,
}

impl From<Action> for domain::Resolution {
    fn from(value: Action) -> Self {
        match value {
            Action::Swap => domain::Resolution::Swap,
            Action::Shift => domain::Resolution::Shift,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub new_date: Option<String>,
    pub action: Option<Action>,
    pub conflict_id: Option<Uuid>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConflictDetails {
    pub conflict_id: Uuid,
    pub existing_day_name: String,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct RescheduleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_details: Option<ConflictDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shifted_to: Option<String>,
}

impl From<domain::RescheduleOutcome> for RescheduleResponse {
    fn from(value: domain::RescheduleOutcome) -> Self {
        match value {
            domain::RescheduleOutcome::Moved | domain::RescheduleOutcome::Swapped => Self {
                success: true,
                ..Self::default()
            },
            domain::RescheduleOutcome::Conflict {
                conflict_id,
                existing_day_name,
            } => Self {
                success: false,
                conflict: Some(true),
                conflict_details: Some(ConflictDetails {
                    conflict_id: *conflict_id,
                    existing_day_name,
                }),
                shifted_to: None,
            },
            domain::RescheduleOutcome::Shifted { date } => Self {
                success: true,
                shifted_to: Some(domain::format_long_date(date)),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MissingDay {
    pub instance_id: Uuid,
    pub program_day_id: Uuid,
    pub program_name: String,
    pub day_name: String,
    pub week_number: u32,
    pub gym_name: Option<String>,
}

impl From<domain::MissingDay> for MissingDay {
    fn from(value: domain::MissingDay) -> Self {
        Self {
            instance_id: *value.instance_id,
            program_day_id: *value.program_day_id,
            program_name: value.program_name,
            day_name: value.day_name,
            week_number: value.week_number,
            gym_name: value.gym_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayMapping {
    pub program_day_id: Uuid,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub program_id: Uuid,
    pub name: Option<String>,
    pub gym_id: Option<Uuid>,
    #[serde(default)]
    pub mappings: Vec<DayMapping>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct MissingDayRequest {
    pub program_day_id: Uuid,
    pub date: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub date: NaiveDate,
    pub existing_day: String,
    pub new_day: String,
}

impl From<domain::ScheduleConflict> for ScheduleConflict {
    fn from(value: domain::ScheduleConflict) -> Self {
        Self {
            date: value.date,
            existing_day: value.existing_day,
            new_day: value.new_day,
        }
    }
}

/// Either the scheduled entity or the conflicts that prevented scheduling.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ScheduleConflict>,
}

impl<D, T: From<D>> From<domain::ScheduleOutcome<D>> for ScheduleResponse<T> {
    fn from(value: domain::ScheduleOutcome<D>) -> Self {
        match value {
            domain::ScheduleOutcome::Scheduled(scheduled) => Self {
                success: true,
                scheduled: Some(scheduled.into()),
                conflicts: vec![],
            },
            domain::ScheduleOutcome::Conflicts(conflicts) => Self {
                success: false,
                scheduled: None,
                conflicts: conflicts.into_iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduledDay {
    pub id: Uuid,
    pub program_id: Uuid,
    pub program_day_id: Uuid,
    pub instance_id: Option<Uuid>,
    pub gym_id: Option<Uuid>,
    pub date: NaiveDate,
    pub is_completed: bool,
}

impl From<domain::ScheduledDay> for ScheduledDay {
    fn from(value: domain::ScheduledDay) -> Self {
        Self {
            id: *value.id,
            program_id: *value.program_id,
            program_day_id: *value.program_day_id,
            instance_id: value.instance_id.map(|id| *id),
            gym_id: value.gym_id.map(|id| *id),
            date: value.date,
            is_completed: value.is_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramInstance {
    pub id: Uuid,
    pub program_id: Uuid,
    pub gym_id: Option<Uuid>,
    pub name: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_days: Vec<Uuid>,
    pub custom_weights: Vec<InstanceExerciseWeight>,
}

impl From<domain::ProgramInstance> for ProgramInstance {
    fn from(value: domain::ProgramInstance) -> Self {
        Self {
            id: *value.id,
            program_id: *value.program_id,
            gym_id: value.gym_id.map(|id| *id),
            name: value.name,
            scheduled_date: value.scheduled_date,
            scheduled_days: value.scheduled_days.iter().map(|id| **id).collect(),
            custom_weights: value.custom_weights.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstanceExerciseWeight {
    pub program_exercise_id: Uuid,
    pub weights: Vec<f32>,
    #[serde(default)]
    pub notes: String,
}

impl From<domain::InstanceExerciseWeight> for InstanceExerciseWeight {
    fn from(value: domain::InstanceExerciseWeight) -> Self {
        Self {
            program_exercise_id: *value.program_exercise_id,
            weights: value.weights,
            notes: value.notes,
        }
    }
}

impl From<InstanceExerciseWeight> for domain::InstanceExerciseWeight {
    fn from(value: InstanceExerciseWeight) -> Self {
        Self {
            program_exercise_id: value.program_exercise_id.into(),
            weights: value.weights,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduledDayDetails {
    pub id: Uuid,
    pub program_id: Uuid,
    pub program_name: String,
    pub day_name: String,
    pub date: NaiveDate,
    pub formatted_date: String,
    pub is_completed: bool,
    pub series: Vec<ScheduledSeries>,
}

impl From<domain::ScheduledDayDetails> for ScheduledDayDetails {
    fn from(value: domain::ScheduledDayDetails) -> Self {
        Self {
            id: *value.id,
            program_id: *value.program_id,
            program_name: value.program_name,
            day_name: value.day_name,
            date: value.date,
            formatted_date: domain::format_long_date(value.date),
            is_completed: value.is_completed,
            series: value.series.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduledSeries {
    pub series_type: String,
    pub time_seconds: Option<u32>,
    pub notes: String,
    pub exercises: Vec<ScheduledExercise>,
}

impl From<domain::ScheduledSeries> for ScheduledSeries {
    fn from(value: domain::ScheduledSeries) -> Self {
        Self {
            series_type: value.series_type.as_ref().to_string(),
            time_seconds: value.time_seconds,
            notes: value.notes,
            exercises: value
                .exercises
                .into_iter()
                .map(|e| ScheduledExercise {
                    program_exercise_id: *e.program_exercise_id,
                    exercise_id: *e.exercise_id,
                    exercise_name: e.exercise_name,
                    sets: e.sets,
                    reps: e.reps,
                    weights: e.starting_weights,
                    rest_time_seconds: e.rest_time_seconds,
                    target_rpe: e.target_rpe,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduledExercise {
    pub program_exercise_id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: String,
    pub weights: Vec<f32>,
    pub rest_time_seconds: Option<u32>,
    pub target_rpe: Option<f32>,
}
