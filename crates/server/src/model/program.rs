use ironplan_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Program {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub duration_weeks: u32,
    pub days_per_week: u32,
    pub is_template: bool,
    pub weeks: Vec<ProgramWeek>,
    pub shares: Vec<ProgramShare>,
}

impl From<domain::Program> for Program {
    fn from(value: domain::Program) -> Self {
        Self {
            id: *value.id,
            user_id: *value.user_id,
            name: value.name.to_string(),
            description: value.description,
            notes: value.notes,
            duration_weeks: value.duration_weeks,
            days_per_week: value.days_per_week,
            is_template: value.is_template,
            weeks: value.weeks.into_iter().map(Into::into).collect(),
            shares: value.shares.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProgramShare {
    pub id: Uuid,
    pub program_id: Uuid,
    pub user_id: Uuid,
}

impl From<domain::ProgramShare> for ProgramShare {
    fn from(value: domain::ProgramShare) -> Self {
        Self {
            id: *value.id,
            program_id: *value.program_id,
            user_id: *value.user_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewShare {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProgramWeek {
    pub id: Uuid,
    pub week_number: u32,
    pub name: Option<String>,
    pub is_deload: bool,
    pub notes: String,
    pub days: Vec<ProgramDay>,
}

impl From<domain::ProgramWeek> for ProgramWeek {
    fn from(value: domain::ProgramWeek) -> Self {
        Self {
            id: *value.id,
            week_number: value.week_number,
            name: value.name,
            is_deload: value.is_deload,
            notes: value.notes,
            days: value.days.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramDay {
    pub id: Uuid,
    pub day_number: u32,
    pub name: Option<String>,
    pub label: String,
    pub is_rest_day: bool,
    pub notes: String,
    pub series: Vec<ProgramSeries>,
}

impl From<domain::ProgramDay> for ProgramDay {
    fn from(value: domain::ProgramDay) -> Self {
        let label = value.label();
        let mut series = value.series;
        series.sort_by_key(|s| s.order_index);
        Self {
            id: *value.id,
            day_number: value.day_number,
            label,
            name: value.name,
            is_rest_day: value.is_rest_day,
            notes: value.notes,
            series: series.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgramSeries {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub order_index: u32,
    pub series_type: String,
    pub time_seconds: Option<u32>,
    #[serde(default)]
    pub notes: String,
    pub exercises: Vec<ProgramExercise>,
}

impl From<domain::ProgramSeries> for ProgramSeries {
    fn from(value: domain::ProgramSeries) -> Self {
        Self {
            id: *value.id,
            order_index: value.order_index,
            series_type: value.series_type.as_ref().to_string(),
            time_seconds: value.time_seconds,
            notes: value.notes,
            exercises: value.exercises.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgramExercise {
    #[serde(default)]
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub sets: u32,
    pub reps: String,
    pub lift_time_seconds: Option<u32>,
    pub rest_time_seconds: Option<u32>,
    #[serde(default)]
    pub starting_weights: Vec<f32>,
    pub target_rpe: Option<f32>,
    #[serde(default)]
    pub notes: String,
}

impl From<domain::ProgramExercise> for ProgramExercise {
    fn from(value: domain::ProgramExercise) -> Self {
        Self {
            id: *value.id,
            exercise_id: *value.exercise_id,
            sets: value.sets,
            reps: value.reps,
            lift_time_seconds: value.lift_time_seconds,
            rest_time_seconds: value.rest_time_seconds,
            starting_weights: value.starting_weights,
            target_rpe: value.target_rpe,
            notes: value.notes,
        }
    }
}

impl ProgramSeries {
    /// Exercise positions follow the order of the given exercises.
    pub fn into_domain(self, series_type: domain::SeriesType) -> domain::ProgramSeries {
        domain::ProgramSeries {
            id: self.id.into(),
            order_index: self.order_index,
            series_type,
            time_seconds: self.time_seconds,
            notes: self.notes.trim().to_string(),
            exercises: self
                .exercises
                .into_iter()
                .zip(0..)
                .map(|(e, position)| domain::ProgramExercise {
                    id: e.id.into(),
                    exercise_id: e.exercise_id.into(),
                    position,
                    sets: e.sets,
                    reps: e.reps.trim().to_string(),
                    lift_time_seconds: e.lift_time_seconds,
                    rest_time_seconds: e.rest_time_seconds,
                    starting_weights: e.starting_weights,
                    target_rpe: e.target_rpe,
                    notes: e.notes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewProgram {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub duration_weeks: String,
    pub days_per_week: String,
    #[serde(default)]
    pub is_template: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_template: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct WeekUpdate {
    pub name: Option<String>,
    #[serde(default)]
    pub is_deload: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct DayUpdate {
    pub name: Option<String>,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for domain::Direction {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => domain::Direction::Up,
            Direction::Down => domain::Direction::Down,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveSeries {
    pub direction: Direction,
}
