use chrono::NaiveDateTime;
use strum::{AsRefStr, EnumString};

use crate::{
    BoxError, CreateError, ExerciseID, GymID, ReadError, ScheduledDayID, StorageError,
    UpdateError, UserID, ValidationError,
};

pub const PREVIOUS_SETS_LIMIT: usize = 5;

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workout_sessions(&self, user_id: UserID)
    -> Result<Vec<WorkoutSession>, ReadError>;
    async fn get_workout_session(
        &self,
        user_id: UserID,
        id: WorkoutSessionID,
    ) -> Result<WorkoutSession, ReadError>;
    /// Resumes the incomplete session of the scheduled day or starts a new one.
    async fn start_workout(
        &self,
        user_id: UserID,
        scheduled_day_id: ScheduledDayID,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn start_standalone_workout(
        &self,
        user_id: UserID,
        gym_id: Option<GymID>,
    ) -> Result<WorkoutSession, CreateError>;
    async fn log_set(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        set: LoggedSet,
    ) -> Result<WorkoutSet, WorkoutError>;
    /// Applies the overall RPE to all sets of the exercise and returns the number of sets.
    async fn save_overall_rpe(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        exercise_id: ExerciseID,
        overall_rpe: OverallRpe,
    ) -> Result<usize, WorkoutError>;
    async fn complete_workout(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        notes: String,
    ) -> Result<WorkoutSession, WorkoutError>;
    async fn get_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<WorkoutSet>, ReadError>;

    fn validate_overall_rpe(&self, overall_rpe: &str) -> Result<OverallRpe, ValidationError> {
        overall_rpe
            .trim()
            .parse::<OverallRpe>()
            .map_err(|_| ValidationError::Other("Invalid RPE value".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    /// Returns all sessions of the user including their sets, ordered by start time.
    async fn read_workout_sessions(
        &self,
        user_id: UserID,
    ) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn read_workout_session(
        &self,
        user_id: UserID,
        id: WorkoutSessionID,
    ) -> Result<WorkoutSession, ReadError>;
    /// The id of the given session is replaced by a newly generated one.
    async fn create_workout_session(
        &self,
        session: WorkoutSession,
    ) -> Result<WorkoutSession, CreateError>;
    /// Updates the set with the same exercise and set number or inserts a new one.
    async fn upsert_workout_set(
        &self,
        session_id: WorkoutSessionID,
        set: WorkoutSet,
    ) -> Result<WorkoutSet, UpdateError>;
    async fn set_overall_rpe(
        &self,
        session_id: WorkoutSessionID,
        exercise_id: ExerciseID,
        overall_rpe: OverallRpe,
    ) -> Result<usize, UpdateError>;
    /// Completes the session and its scheduled day in one transaction.
    async fn complete_workout_session(
        &self,
        user_id: UserID,
        id: WorkoutSessionID,
        notes: String,
        completed_at: NaiveDateTime,
    ) -> Result<WorkoutSession, UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutSessionID,
    pub user_id: UserID,
    pub scheduled_day_id: Option<ScheduledDayID>,
    pub gym_id: Option<GymID>,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub is_completed: bool,
    pub notes: String,
    pub sets: Vec<WorkoutSet>,
}

id!(WorkoutSessionID);

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    pub id: WorkoutSetID,
    pub exercise_id: ExerciseID,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rpe: Option<f32>,
    pub overall_rpe: Option<OverallRpe>,
    pub notes: String,
    pub completed_at: NaiveDateTime,
}

impl WorkoutSet {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn volume(&self) -> Option<f32> {
        Some(self.weight? * self.reps? as f32)
    }
}

id!(WorkoutSetID);

/// Set as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub exercise_id: ExerciseID,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rpe: Option<f32>,
    pub notes: String,
}

/// Overall effort of an exercise compared to the previous session.
#[derive(AsRefStr, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallRpe {
    #[strum(serialize = "-")]
    Easier,
    #[strum(serialize = "=")]
    Same,
    #[strum(serialize = "+")]
    Harder,
}

#[derive(thiserror::Error, Debug)]
pub enum WorkoutError {
    #[error("Workout session not found")]
    NotFound,
    #[error("Invalid set number")]
    InvalidSetNumber,
    #[error("Workout session is already completed")]
    Completed,
    #[error("No sets logged for this exercise yet")]
    NoSetsLogged,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl From<ReadError> for WorkoutError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => WorkoutError::NotFound,
            ReadError::Storage(storage) => WorkoutError::Storage(storage),
            ReadError::Other(other) => WorkoutError::Other(other),
        }
    }
}

impl From<CreateError> for WorkoutError {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::NotFound => WorkoutError::NotFound,
            CreateError::Storage(storage) => WorkoutError::Storage(storage),
            CreateError::Other(other) => WorkoutError::Other(other),
            CreateError::Conflict => WorkoutError::Other("conflict".into()),
        }
    }
}

impl From<UpdateError> for WorkoutError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => WorkoutError::NotFound,
            UpdateError::Storage(storage) => WorkoutError::Storage(storage),
            UpdateError::Other(other) => WorkoutError::Other(other),
            UpdateError::Conflict => WorkoutError::Other("conflict".into()),
        }
    }
}

/// Latest sets of an exercise from completed sessions, most recent first.
#[must_use]
pub fn previous_sets(
    sessions: &[WorkoutSession],
    exercise_id: ExerciseID,
    limit: usize,
) -> Vec<WorkoutSet> {
    let mut sets = sessions
        .iter()
        .filter(|s| s.is_completed)
        .flat_map(|s| s.sets.iter())
        .filter(|s| s.exercise_id == exercise_id)
        .cloned()
        .collect::<Vec<_>>();
    sets.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    sets.truncate(limit);
    sets
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn time(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn set(id: u128, exercise_id: u128, set_number: u32, completed_at: NaiveDateTime) -> WorkoutSet {
        WorkoutSet {
            id: id.into(),
            exercise_id: exercise_id.into(),
            set_number,
            reps: Some(10),
            weight: Some(50.0),
            rpe: None,
            overall_rpe: None,
            notes: String::new(),
            completed_at,
        }
    }

    fn session(id: u128, is_completed: bool, sets: Vec<WorkoutSet>) -> WorkoutSession {
        WorkoutSession {
            id: id.into(),
            user_id: 1.into(),
            scheduled_day_id: None,
            gym_id: None,
            started_at: time(1, 8),
            completed_at: None,
            is_completed,
            notes: String::new(),
            sets,
        }
    }

    #[rstest]
    #[case("-", Some(OverallRpe::Easier))]
    #[case("=", Some(OverallRpe::Same))]
    #[case("+", Some(OverallRpe::Harder))]
    #[case("++", None)]
    #[case("", None)]
    fn test_overall_rpe_from_str(#[case] value: &str, #[case] expected: Option<OverallRpe>) {
        assert_eq!(value.parse::<OverallRpe>().ok(), expected);
        if let Some(rpe) = expected {
            assert_eq!(rpe.as_ref(), value);
        }
    }

    #[rstest]
    #[case(Some(10), Some(50.0), Some(500.0))]
    #[case(None, Some(50.0), None)]
    #[case(Some(10), None, None)]
    fn test_workout_set_volume(
        #[case] reps: Option<u32>,
        #[case] weight: Option<f32>,
        #[case] expected: Option<f32>,
    ) {
        let set = WorkoutSet {
            reps,
            weight,
            ..set(1, 1, 1, time(1, 8))
        };
        assert_eq!(set.volume(), expected);
    }

    #[test]
    fn test_previous_sets() {
        let sessions = [
            session(1, true, vec![set(1, 1, 1, time(1, 8)), set(2, 1, 2, time(1, 9))]),
            session(2, false, vec![set(3, 1, 1, time(5, 8))]),
            session(
                3,
                true,
                vec![set(4, 2, 1, time(3, 8)), set(5, 1, 1, time(3, 9))],
            ),
        ];

        assert_eq!(
            previous_sets(&sessions, 1.into(), 2)
                .into_iter()
                .map(|s| s.id)
                .collect::<Vec<_>>(),
            vec![WorkoutSetID::from(5), WorkoutSetID::from(2)]
        );
    }
}
