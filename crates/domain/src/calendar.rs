use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};

use crate::{
    BoxError, CreateError, DeleteError, Exercise, ExerciseID, Gym, GymID, Program, ProgramDayID,
    ProgramExerciseID, ProgramID, ReadError, SeriesType, StorageError, UpdateError, UserID,
    ValidationError,
};

/// Number of days after the target date that are searched for a free date when shifting.
pub const MAX_SHIFT_DAYS: u32 = 365;

#[allow(async_fn_in_trait)]
pub trait CalendarService {
    async fn get_calendar_events(&self, user_id: UserID) -> Result<Vec<CalendarEvent>, ReadError>;
    async fn get_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayDetails, ReadError>;
    async fn delete_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayID, DeleteError>;
    async fn reschedule(
        &self,
        user_id: UserID,
        request: RescheduleRequest,
    ) -> Result<RescheduleOutcome, RescheduleError>;
    async fn get_missing_days(&self, user_id: UserID) -> Result<Vec<MissingDay>, ReadError>;
    async fn schedule_program(
        &self,
        user_id: UserID,
        request: ScheduleRequest,
    ) -> Result<ScheduleOutcome<ProgramInstance>, ScheduleError>;
    async fn schedule_missing_day(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        program_day_id: ProgramDayID,
        date: NaiveDate,
        force: bool,
    ) -> Result<ScheduleOutcome<ScheduledDay>, ScheduleError>;
    async fn get_program_instances(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ProgramInstance>, ReadError>;
    async fn delete_program_instance(
        &self,
        user_id: UserID,
        id: ProgramInstanceID,
    ) -> Result<ProgramInstanceID, DeleteError>;
    async fn replace_instance_exercise_weight(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        weight: InstanceExerciseWeight,
    ) -> Result<InstanceExerciseWeight, UpdateError>;

    fn validate_date(&self, date: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::Other("Invalid date".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait CalendarRepository {
    /// Returns all scheduled days of the user ordered by date.
    async fn read_scheduled_days(&self, user_id: UserID) -> Result<Vec<ScheduledDay>, ReadError>;
    /// Fails with not found if the day does not exist or belongs to another user.
    async fn read_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDay, ReadError>;
    /// Returns a scheduled day of the same user and program on the given date, if any.
    async fn find_conflict(
        &self,
        user_id: UserID,
        program_id: ProgramID,
        date: NaiveDate,
        excluding: Option<ScheduledDayID>,
    ) -> Result<Option<ScheduledDay>, ReadError>;
    /// Returns all dates in the inclusive range that hold a scheduled day of the user and program.
    async fn read_occupied_dates(
        &self,
        user_id: UserID,
        program_id: ProgramID,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, ReadError>;
    /// Moves all given days in one transaction. Fails with a conflict without changing anything
    /// if a target date is held by a day of the same program that is neither part of the moves
    /// nor one of the `present` days, which were already there when the move was decided.
    async fn move_scheduled_days(
        &self,
        user_id: UserID,
        moves: Vec<(ScheduledDayID, NaiveDate)>,
        present: BTreeSet<ScheduledDayID>,
    ) -> Result<(), UpdateError>;
    /// Fails with a conflict if the program day is already scheduled in the same instance.
    async fn create_scheduled_day(&self, day: ScheduledDay) -> Result<ScheduledDay, CreateError>;
    async fn delete_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayID, DeleteError>;
    async fn read_program_instances(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ProgramInstance>, ReadError>;
    /// Inserts the instance and its scheduled days in one transaction.
    async fn create_program_instance(
        &self,
        instance: ProgramInstance,
        days: Vec<ScheduledDay>,
    ) -> Result<ProgramInstance, CreateError>;
    async fn delete_program_instance(
        &self,
        user_id: UserID,
        id: ProgramInstanceID,
    ) -> Result<ProgramInstanceID, DeleteError>;
    async fn replace_instance_exercise_weight(
        &self,
        instance_id: ProgramInstanceID,
        weight: InstanceExerciseWeight,
    ) -> Result<InstanceExerciseWeight, UpdateError>;
}

/// Placement of a program day on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDay {
    pub id: ScheduledDayID,
    pub user_id: UserID,
    pub program_id: ProgramID,
    pub program_day_id: ProgramDayID,
    pub instance_id: Option<ProgramInstanceID>,
    pub gym_id: Option<GymID>,
    pub date: NaiveDate,
    pub is_completed: bool,
}

id!(ScheduledDayID);

/// Group of scheduled days created by scheduling a program once.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInstance {
    pub id: ProgramInstanceID,
    pub user_id: UserID,
    pub program_id: ProgramID,
    pub gym_id: Option<GymID>,
    pub name: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_days: Vec<ScheduledDayID>,
    pub custom_weights: Vec<InstanceExerciseWeight>,
}

id!(ProgramInstanceID);

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceExerciseWeight {
    pub program_exercise_id: ProgramExerciseID,
    pub weights: Vec<f32>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: ScheduledDayID,
    pub title: String,
    pub date: NaiveDate,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Swap,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescheduleRequest {
    pub id: ScheduledDayID,
    pub date: NaiveDate,
    pub resolution: Option<Resolution>,
    /// The conflicting day as previously reported to the caller.
    pub conflict_id: Option<ScheduledDayID>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
    Moved,
    Conflict {
        conflict_id: ScheduledDayID,
        existing_day_name: String,
    },
    Swapped,
    Shifted {
        date: NaiveDate,
    },
}

impl RescheduleOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, RescheduleOutcome::Conflict { .. })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RescheduleError {
    #[error("Scheduled day not found")]
    NotFound,
    #[error("Conflict day not found")]
    ConflictNotFound,
    #[error("Missing required data")]
    MissingData,
    #[error("Could not find available date")]
    NoAvailableDate,
    #[error("Schedule was changed concurrently, please try again")]
    Concurrent,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl From<ReadError> for RescheduleError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => RescheduleError::NotFound,
            ReadError::Storage(storage) => RescheduleError::Storage(storage),
            ReadError::Other(other) => RescheduleError::Other(other),
        }
    }
}

impl From<UpdateError> for RescheduleError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict => RescheduleError::Concurrent,
            UpdateError::NotFound => RescheduleError::NotFound,
            UpdateError::Storage(storage) => RescheduleError::Storage(storage),
            UpdateError::Other(other) => RescheduleError::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub program_id: ProgramID,
    /// Defaults to the name of the program.
    pub name: Option<String>,
    pub gym_id: Option<GymID>,
    pub mappings: Vec<(ProgramDayID, NaiveDate)>,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome<T> {
    Scheduled(T),
    Conflicts(Vec<ScheduleConflict>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub date: NaiveDate,
    pub existing_day: String,
    pub new_day: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    #[error("Missing required data")]
    MissingData,
    #[error("Program not found")]
    ProgramNotFound,
    #[error("Program instance not found")]
    InstanceNotFound,
    #[error("Gym not found")]
    GymNotFound,
    #[error("Program day does not belong to the program")]
    InvalidDay,
    #[error("Program day is mapped more than once")]
    DuplicateDay,
    #[error("Program day is already scheduled")]
    AlreadyScheduled,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl From<ReadError> for ScheduleError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => ScheduleError::ProgramNotFound,
            ReadError::Storage(storage) => ScheduleError::Storage(storage),
            ReadError::Other(other) => ScheduleError::Other(other),
        }
    }
}

impl From<CreateError> for ScheduleError {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::Conflict => ScheduleError::AlreadyScheduled,
            CreateError::NotFound => ScheduleError::ProgramNotFound,
            CreateError::Storage(storage) => ScheduleError::Storage(storage),
            CreateError::Other(other) => ScheduleError::Other(other),
        }
    }
}

/// Gap in a program instance: a program day without a scheduled day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDay {
    pub instance_id: ProgramInstanceID,
    pub program_day_id: ProgramDayID,
    pub program_name: String,
    pub day_name: String,
    pub week_number: u32,
    pub gym_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledDayDetails {
    pub id: ScheduledDayID,
    pub program_id: ProgramID,
    pub program_name: String,
    pub day_name: String,
    pub date: NaiveDate,
    pub is_completed: bool,
    pub series: Vec<ScheduledSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSeries {
    pub series_type: SeriesType,
    pub time_seconds: Option<u32>,
    pub notes: String,
    pub exercises: Vec<ScheduledExercise>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledExercise {
    pub program_exercise_id: ProgramExerciseID,
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: String,
    pub starting_weights: Vec<f32>,
    pub rest_time_seconds: Option<u32>,
    pub target_rpe: Option<f32>,
}

/// First date after the target that holds no scheduled day, searching at most
/// `MAX_SHIFT_DAYS` days.
#[must_use]
pub fn next_free_date(target: NaiveDate, occupied: &BTreeSet<NaiveDate>) -> Option<NaiveDate> {
    (1..=MAX_SHIFT_DAYS)
        .filter_map(|offset| target.checked_add_days(Days::new(offset.into())))
        .find(|date| !occupied.contains(date))
}

/// Last date that `next_free_date` may consider.
#[must_use]
pub fn shift_search_end(target: NaiveDate) -> NaiveDate {
    target
        .checked_add_days(Days::new(MAX_SHIFT_DAYS.into()))
        .unwrap_or(NaiveDate::MAX)
}

#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

/// Label of the program day a scheduled day refers to.
#[must_use]
pub fn day_label(programs: &[Program], day: &ScheduledDay) -> String {
    programs
        .iter()
        .find(|p| p.id == day.program_id)
        .and_then(|p| p.day(day.program_day_id))
        .map_or_else(|| "Unknown".to_string(), |(_, d)| d.label())
}

#[must_use]
pub fn calendar_events(days: &[ScheduledDay], programs: &[Program]) -> Vec<CalendarEvent> {
    let programs = programs
        .iter()
        .map(|p| (p.id, p))
        .collect::<BTreeMap<_, _>>();
    let mut events = days
        .iter()
        .filter_map(|day| {
            let program = programs.get(&day.program_id)?;
            let (_, program_day) = program.day(day.program_day_id)?;
            Some(CalendarEvent {
                id: day.id,
                title: format!("{} - {}", program.name, program_day.label()),
                date: day.date,
                is_completed: day.is_completed,
            })
        })
        .collect::<Vec<_>>();
    events.sort_by_key(|e| e.date);
    events
}

/// Program days of every instance that have no scheduled day in that instance, ordered by
/// instance date, week number and day number.
#[must_use]
pub fn missing_days(
    instances: &[ProgramInstance],
    scheduled_days: &[ScheduledDay],
    programs: &[Program],
    gyms: &[Gym],
) -> Vec<MissingDay> {
    let scheduled_days = scheduled_days
        .iter()
        .map(|d| (d.id, d))
        .collect::<BTreeMap<_, _>>();
    let mut instances = instances.iter().collect::<Vec<_>>();
    instances.sort_by_key(|i| i.scheduled_date);

    let mut result = vec![];

    for instance in instances {
        let Some(program) = programs.iter().find(|p| p.id == instance.program_id) else {
            continue;
        };
        let scheduled = instance
            .scheduled_days
            .iter()
            .filter_map(|id| scheduled_days.get(id))
            .map(|d| d.program_day_id)
            .collect::<BTreeSet<_>>();
        let gym_name = instance
            .gym_id
            .and_then(|id| gyms.iter().find(|g| g.id == id))
            .map(|g| g.name.to_string());

        let mut days = program
            .days()
            .filter(|(_, d)| !scheduled.contains(&d.id))
            .collect::<Vec<_>>();
        days.sort_by_key(|(w, d)| (w.week_number, d.day_number));

        result.extend(days.into_iter().map(|(week, day)| MissingDay {
            instance_id: instance.id,
            program_day_id: day.id,
            program_name: program.name.to_string(),
            day_name: day.label(),
            week_number: week.week_number,
            gym_name: gym_name.clone(),
        }));
    }

    result
}

/// Content of a scheduled day. Weights of the instance take precedence over the starting
/// weights of the program.
#[must_use]
pub fn scheduled_day_details(
    day: &ScheduledDay,
    program: &Program,
    instance: Option<&ProgramInstance>,
    exercises: &[Exercise],
) -> Option<ScheduledDayDetails> {
    let (_, program_day) = program.day(day.program_day_id)?;
    let exercise_names = exercises
        .iter()
        .map(|e| (e.id, e.name.to_string()))
        .collect::<BTreeMap<_, _>>();
    let custom_weights = instance
        .map(|i| {
            i.custom_weights
                .iter()
                .map(|w| (w.program_exercise_id, &w.weights))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    let mut series = program_day.series.iter().collect::<Vec<_>>();
    series.sort_by_key(|s| s.order_index);

    Some(ScheduledDayDetails {
        id: day.id,
        program_id: program.id,
        program_name: program.name.to_string(),
        day_name: program_day.label(),
        date: day.date,
        is_completed: day.is_completed,
        series: series
            .into_iter()
            .map(|s| {
                let mut program_exercises = s.exercises.iter().collect::<Vec<_>>();
                program_exercises.sort_by_key(|e| e.position);
                ScheduledSeries {
                    series_type: s.series_type,
                    time_seconds: s.time_seconds,
                    notes: s.notes.clone(),
                    exercises: program_exercises
                        .into_iter()
                        .map(|e| ScheduledExercise {
                            program_exercise_id: e.id,
                            exercise_id: e.exercise_id,
                            exercise_name: exercise_names
                                .get(&e.exercise_id)
                                .cloned()
                                .unwrap_or_default(),
                            sets: e.sets,
                            reps: e.reps.clone(),
                            starting_weights: custom_weights
                                .get(&e.id)
                                .map_or_else(|| e.starting_weights.clone(), |w| w.to_vec()),
                            rest_time_seconds: e.rest_time_seconds,
                            target_rpe: e.target_rpe,
                        })
                        .collect(),
                }
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        Category, Name, ProgramDay, ProgramExercise, ProgramSeries, ProgramSeriesID, ProgramWeek,
    };

    use super::*;

    static PROGRAM: LazyLock<Program> = LazyLock::new(|| Program {
        id: 1.into(),
        user_id: 1.into(),
        name: Name::new("PPL").unwrap(),
        description: String::new(),
        notes: String::new(),
        duration_weeks: 2,
        days_per_week: 3,
        is_template: false,
        weeks: vec![week(2, 2, [21, 22, 23]), week(1, 1, [11, 12, 13])],
        shares: vec![],
    });

    fn week(id: u128, week_number: u32, day_ids: [u128; 3]) -> ProgramWeek {
        ProgramWeek {
            id: id.into(),
            week_number,
            name: None,
            is_deload: false,
            notes: String::new(),
            days: ["Push", "Pull", "Legs"]
                .into_iter()
                .zip(day_ids)
                .enumerate()
                .map(|(i, (name, id))| ProgramDay {
                    id: id.into(),
                    day_number: u32::try_from(i).unwrap() + 1,
                    name: Some(name.to_string()),
                    is_rest_day: false,
                    notes: String::new(),
                    series: vec![],
                })
                .collect(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn scheduled_day(id: u128, program_day_id: u128, instance_id: u128, day: u32) -> ScheduledDay {
        ScheduledDay {
            id: id.into(),
            user_id: 1.into(),
            program_id: 1.into(),
            program_day_id: program_day_id.into(),
            instance_id: Some(instance_id.into()),
            gym_id: None,
            date: date(day),
            is_completed: false,
        }
    }

    fn instance(id: u128, day: u32, scheduled_days: &[u128]) -> ProgramInstance {
        ProgramInstance {
            id: id.into(),
            user_id: 1.into(),
            program_id: 1.into(),
            gym_id: None,
            name: "PPL".to_string(),
            scheduled_date: date(day),
            scheduled_days: scheduled_days.iter().copied().map(ScheduledDayID::from).collect(),
            custom_weights: vec![],
        }
    }

    #[test]
    fn test_next_free_date() {
        let occupied = [date(2), date(3), date(5)].into();
        assert_eq!(next_free_date(date(1), &occupied), Some(date(4)));
        assert_eq!(next_free_date(date(5), &occupied), Some(date(6)));
    }

    #[test]
    fn test_next_free_date_exhausted() {
        let target = date(1);
        let occupied = (1..=MAX_SHIFT_DAYS)
            .map(|offset| target + Days::new(offset.into()))
            .collect();
        assert_eq!(next_free_date(target, &occupied), None);
    }

    #[test]
    fn test_next_free_date_last_candidate() {
        let target = date(1);
        let occupied = (1..MAX_SHIFT_DAYS)
            .map(|offset| target + Days::new(offset.into()))
            .collect();
        assert_eq!(
            next_free_date(target, &occupied),
            Some(shift_search_end(target))
        );
    }

    #[test]
    fn test_shift_search_end() {
        assert_eq!(
            shift_search_end(date(1)),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(shift_search_end(NaiveDate::MAX), NaiveDate::MAX);
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), "Saturday, March 02, 2024")]
    #[case(NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(), "Wednesday, December 24, 2025")]
    fn test_format_long_date(#[case] date: NaiveDate, #[case] expected: &str) {
        assert_eq!(format_long_date(date), expected);
    }

    #[rstest]
    #[case(RescheduleOutcome::Moved, true)]
    #[case(RescheduleOutcome::Swapped, true)]
    #[case(RescheduleOutcome::Shifted { date: date(1) }, true)]
    #[case(RescheduleOutcome::Conflict { conflict_id: 1.into(), existing_day_name: "Push".into() }, false)]
    fn test_reschedule_outcome_is_success(#[case] outcome: RescheduleOutcome, #[case] expected: bool) {
        assert_eq!(outcome.is_success(), expected);
    }

    #[test]
    fn test_reschedule_error_from_update_error() {
        assert!(matches!(
            RescheduleError::from(UpdateError::Conflict),
            RescheduleError::Concurrent
        ));
        assert!(matches!(
            RescheduleError::from(UpdateError::NotFound),
            RescheduleError::NotFound
        ));
    }

    #[test]
    fn test_day_label() {
        let programs = [PROGRAM.clone()];
        assert_eq!(day_label(&programs, &scheduled_day(1, 12, 1, 1)), "Pull");
        assert_eq!(day_label(&programs, &scheduled_day(1, 99, 1, 1)), "Unknown");
    }

    #[test]
    fn test_calendar_events() {
        let days = [
            scheduled_day(2, 12, 1, 5),
            scheduled_day(1, 11, 1, 3),
            scheduled_day(3, 99, 1, 4),
        ];

        assert_eq!(
            calendar_events(&days, &[PROGRAM.clone()]),
            vec![
                CalendarEvent {
                    id: 1.into(),
                    title: "PPL - Push".to_string(),
                    date: date(3),
                    is_completed: false,
                },
                CalendarEvent {
                    id: 2.into(),
                    title: "PPL - Pull".to_string(),
                    date: date(5),
                    is_completed: false,
                },
            ]
        );
    }

    #[test]
    fn test_missing_days_complete_instance() {
        let days = [
            scheduled_day(1, 11, 1, 1),
            scheduled_day(2, 12, 1, 2),
            scheduled_day(3, 13, 1, 3),
            scheduled_day(4, 21, 1, 8),
            scheduled_day(5, 22, 1, 9),
            scheduled_day(6, 23, 1, 10),
        ];
        let instances = [instance(1, 1, &[1, 2, 3, 4, 5, 6])];

        assert_eq!(
            missing_days(&instances, &days, &[PROGRAM.clone()], &[]),
            vec![]
        );
    }

    #[test]
    fn test_missing_days() {
        let days = [
            scheduled_day(1, 11, 1, 1),
            scheduled_day(2, 13, 1, 3),
            scheduled_day(3, 21, 2, 8),
            scheduled_day(4, 22, 2, 9),
            scheduled_day(5, 23, 2, 10),
            scheduled_day(6, 11, 2, 1),
        ];
        let instances = [
            ProgramInstance {
                gym_id: Some(5.into()),
                ..instance(2, 4, &[3, 4, 5, 6])
            },
            instance(1, 1, &[1, 2]),
        ];
        let gyms = [Gym {
            id: 5.into(),
            user_id: 1.into(),
            name: Name::new("Home").unwrap(),
            address: None,
            is_shared: false,
            equipment: vec![],
        }];

        assert_eq!(
            missing_days(&instances, &days, &[PROGRAM.clone()], &gyms),
            vec![
                missing_day(1, 12, "Pull", 1, None),
                missing_day(1, 21, "Push", 2, None),
                missing_day(1, 22, "Pull", 2, None),
                missing_day(1, 23, "Legs", 2, None),
                missing_day(2, 12, "Pull", 1, Some("Home")),
                missing_day(2, 13, "Legs", 1, Some("Home")),
            ]
        );
    }

    #[test]
    fn test_missing_days_ignores_days_of_other_instances() {
        let days = [scheduled_day(1, 11, 2, 1)];
        let instances = [instance(1, 1, &[])];

        assert_eq!(
            missing_days(&instances, &days, &[PROGRAM.clone()], &[]).len(),
            6
        );
    }

    fn missing_day(
        instance_id: u128,
        program_day_id: u128,
        day_name: &str,
        week_number: u32,
        gym_name: Option<&str>,
    ) -> MissingDay {
        MissingDay {
            instance_id: instance_id.into(),
            program_day_id: program_day_id.into(),
            program_name: "PPL".to_string(),
            day_name: day_name.to_string(),
            week_number,
            gym_name: gym_name.map(ToString::to_string),
        }
    }

    #[test]
    fn test_scheduled_day_details() {
        let mut program = PROGRAM.clone();
        program.weeks[1].days[0].series = vec![
            ProgramSeries {
                id: 2.into(),
                order_index: 1,
                series_type: SeriesType::Single,
                time_seconds: None,
                notes: String::new(),
                exercises: vec![program_exercise(31, 41, vec![20.0])],
            },
            ProgramSeries {
                id: ProgramSeriesID::from(1),
                order_index: 0,
                series_type: SeriesType::Single,
                time_seconds: Some(60),
                notes: "Warm up first".to_string(),
                exercises: vec![program_exercise(32, 42, vec![60.0, 80.0])],
            },
        ];
        let instance = ProgramInstance {
            custom_weights: vec![InstanceExerciseWeight {
                program_exercise_id: 32.into(),
                weights: vec![70.0, 90.0],
                notes: String::new(),
            }],
            ..instance(1, 1, &[1])
        };
        let exercises = [exercise(41, "Curl"), exercise(42, "Bench Press")];

        let details =
            scheduled_day_details(&scheduled_day(1, 11, 1, 1), &program, Some(&instance), &exercises)
                .unwrap();

        assert_eq!(details.program_name, "PPL");
        assert_eq!(details.day_name, "Push");
        assert_eq!(
            details
                .series
                .iter()
                .map(|s| (
                    s.exercises[0].exercise_name.as_str(),
                    s.exercises[0].starting_weights.clone()
                ))
                .collect::<Vec<_>>(),
            vec![("Bench Press", vec![70.0, 90.0]), ("Curl", vec![20.0])]
        );
        assert_eq!(details.series[0].time_seconds, Some(60));
    }

    fn program_exercise(id: u128, exercise_id: u128, starting_weights: Vec<f32>) -> ProgramExercise {
        ProgramExercise {
            id: id.into(),
            exercise_id: exercise_id.into(),
            position: 1,
            sets: 3,
            reps: "8".to_string(),
            lift_time_seconds: None,
            rest_time_seconds: Some(90),
            starting_weights,
            target_rpe: None,
            notes: String::new(),
        }
    }

    fn exercise(id: u128, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            description: String::new(),
            category: Category::Strength,
            primary_muscle: None,
            secondary_muscles: vec![],
            difficulty: None,
            equipment: BTreeSet::new(),
            created_by: 1.into(),
        }
    }
}
