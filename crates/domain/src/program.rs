use std::collections::BTreeSet;

use strum::{AsRefStr, EnumString};

use crate::{
    CreateError, DeleteError, ExerciseID, Name, NameError, ReadError, UpdateError, UserID,
    ValidationError,
};

pub const MAX_SETS: u32 = 20;
pub const MAX_DURATION_WEEKS: u32 = 52;
pub const MAX_DAYS_PER_WEEK: u32 = 7;

#[allow(async_fn_in_trait)]
pub trait ProgramService {
    /// Returns the programs of the user and all templates.
    async fn get_programs(&self, user_id: UserID) -> Result<Vec<Program>, ReadError>;
    async fn get_program(&self, user_id: UserID, id: ProgramID) -> Result<Program, ReadError>;
    #[allow(clippy::too_many_arguments)]
    async fn create_program(
        &self,
        user_id: UserID,
        name: Name,
        description: String,
        notes: String,
        duration_weeks: u32,
        days_per_week: u32,
        is_template: bool,
    ) -> Result<Program, CreateError>;
    async fn create_program_from(
        &self,
        user_id: UserID,
        program: Program,
    ) -> Result<Program, CreateError>;
    async fn modify_program(
        &self,
        user_id: UserID,
        id: ProgramID,
        name: Option<Name>,
        description: Option<String>,
        notes: Option<String>,
        is_template: Option<bool>,
    ) -> Result<Program, UpdateError>;
    async fn delete_program(&self, user_id: UserID, id: ProgramID)
    -> Result<ProgramID, DeleteError>;
    async fn duplicate_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<Program, CreateError>;
    async fn modify_program_week(
        &self,
        user_id: UserID,
        id: ProgramWeekID,
        name: Option<String>,
        is_deload: bool,
        notes: String,
    ) -> Result<ProgramWeek, UpdateError>;
    async fn modify_program_day(
        &self,
        user_id: UserID,
        id: ProgramDayID,
        name: Option<String>,
        is_rest_day: bool,
        notes: String,
    ) -> Result<ProgramDay, UpdateError>;
    /// Only the owner of a program sees its shares.
    async fn get_program_shares(
        &self,
        user_id: UserID,
        program_id: ProgramID,
    ) -> Result<Vec<ProgramShare>, ReadError>;
    /// Makes the program visible to another user. Sharing twice with the same user is a conflict.
    async fn share_program(
        &self,
        user_id: UserID,
        program_id: ProgramID,
        shared_with: UserID,
    ) -> Result<ProgramShare, CreateError>;
    async fn unshare_program(
        &self,
        user_id: UserID,
        id: ProgramShareID,
    ) -> Result<ProgramShareID, DeleteError>;
    async fn add_series(
        &self,
        user_id: UserID,
        day_id: ProgramDayID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, CreateError>;
    async fn replace_series(
        &self,
        user_id: UserID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, UpdateError>;
    async fn delete_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
    ) -> Result<ProgramSeriesID, DeleteError>;
    async fn move_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
        direction: Direction,
    ) -> Result<ProgramDay, UpdateError>;

    fn validate_duration_weeks(&self, value: &str) -> Result<u32, ValidationError> {
        match value.trim().parse::<u32>() {
            Ok(weeks) if (1..=MAX_DURATION_WEEKS).contains(&weeks) => Ok(weeks),
            _ => Err(ValidationError::Other(
                "Duration must be between 1 and 52 weeks".into(),
            )),
        }
    }

    fn validate_days_per_week(&self, value: &str) -> Result<u32, ValidationError> {
        match value.trim().parse::<u32>() {
            Ok(days) if (1..=MAX_DAYS_PER_WEEK).contains(&days) => Ok(days),
            _ => Err(ValidationError::Other(
                "Days per week must be between 1 and 7".into(),
            )),
        }
    }

    fn validate_sets(&self, value: &str) -> Result<u32, ValidationError> {
        parse_sets(value)
    }

    fn validate_target_rpe(&self, value: &str) -> Result<Option<f32>, ValidationError> {
        parse_target_rpe(value)
    }
}

#[allow(async_fn_in_trait)]
pub trait ProgramRepository {
    /// Returns the programs of the user, the programs shared with the user and all templates.
    async fn read_programs(&self, user_id: UserID) -> Result<Vec<Program>, ReadError>;
    /// The ids of the given program and all its parts are replaced by newly generated ones.
    async fn create_program(&self, program: Program) -> Result<Program, CreateError>;
    async fn modify_program(
        &self,
        id: ProgramID,
        name: Option<Name>,
        description: Option<String>,
        notes: Option<String>,
        is_template: Option<bool>,
    ) -> Result<Program, UpdateError>;
    async fn delete_program(&self, id: ProgramID) -> Result<ProgramID, DeleteError>;
    async fn modify_program_week(
        &self,
        id: ProgramWeekID,
        name: Option<String>,
        is_deload: bool,
        notes: String,
    ) -> Result<ProgramWeek, UpdateError>;
    async fn modify_program_day(
        &self,
        id: ProgramDayID,
        name: Option<String>,
        is_rest_day: bool,
        notes: String,
    ) -> Result<ProgramDay, UpdateError>;
    /// Fails with a conflict if the program is already shared with the user.
    async fn create_program_share(&self, share: ProgramShare)
    -> Result<ProgramShare, CreateError>;
    async fn delete_program_share(&self, id: ProgramShareID)
    -> Result<ProgramShareID, DeleteError>;
    async fn create_series(
        &self,
        day_id: ProgramDayID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, CreateError>;
    /// Exercises with a nil id are added, exercises not contained anymore are removed.
    async fn replace_series(&self, series: ProgramSeries) -> Result<ProgramSeries, UpdateError>;
    async fn delete_series(&self, id: ProgramSeriesID) -> Result<ProgramSeriesID, DeleteError>;
    /// Exchanges the order of both series atomically.
    async fn swap_series_order(
        &self,
        a: ProgramSeriesID,
        b: ProgramSeriesID,
    ) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: ProgramID,
    pub user_id: UserID,
    pub name: Name,
    pub description: String,
    pub notes: String,
    pub duration_weeks: u32,
    pub days_per_week: u32,
    pub is_template: bool,
    pub weeks: Vec<ProgramWeek>,
    pub shares: Vec<ProgramShare>,
}

impl Program {
    /// Creates a program consisting of empty days only.
    #[must_use]
    pub fn with_empty_days(
        user_id: UserID,
        name: Name,
        description: String,
        notes: String,
        duration_weeks: u32,
        days_per_week: u32,
        is_template: bool,
    ) -> Self {
        Self {
            id: ProgramID::nil(),
            user_id,
            name,
            description,
            notes,
            duration_weeks,
            days_per_week,
            is_template,
            weeks: (1..=duration_weeks)
                .map(|week_number| ProgramWeek {
                    id: ProgramWeekID::nil(),
                    week_number,
                    name: None,
                    is_deload: false,
                    notes: String::new(),
                    days: (1..=days_per_week)
                        .map(|day_number| ProgramDay {
                            id: ProgramDayID::nil(),
                            day_number,
                            name: None,
                            is_rest_day: false,
                            notes: String::new(),
                            series: vec![],
                        })
                        .collect(),
                })
                .collect(),
            shares: vec![],
        }
    }

    #[must_use]
    pub fn is_visible_to(&self, user_id: UserID) -> bool {
        self.user_id == user_id || self.is_template || self.is_shared_with(user_id)
    }

    #[must_use]
    pub fn is_shared_with(&self, user_id: UserID) -> bool {
        self.shares.iter().any(|s| s.user_id == user_id)
    }

    #[must_use]
    pub fn week(&self, id: ProgramWeekID) -> Option<&ProgramWeek> {
        self.weeks.iter().find(|w| w.id == id)
    }

    pub fn days(&self) -> impl Iterator<Item = (&ProgramWeek, &ProgramDay)> {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter().map(move |d| (w, d)))
    }

    #[must_use]
    pub fn day(&self, id: ProgramDayID) -> Option<(&ProgramWeek, &ProgramDay)> {
        self.days().find(|(_, d)| d.id == id)
    }

    #[must_use]
    pub fn day_ids(&self) -> BTreeSet<ProgramDayID> {
        self.days().map(|(_, d)| d.id).collect()
    }

    #[must_use]
    pub fn series(&self, id: ProgramSeriesID) -> Option<(&ProgramDay, &ProgramSeries)> {
        self.days()
            .flat_map(|(_, d)| d.series.iter().map(move |s| (d, s)))
            .find(|(_, s)| s.id == id)
    }

    /// Copy owned by the given user. The copy is never a template, is not shared and all ids
    /// are nil.
    pub fn duplicate(&self, user_id: UserID) -> Result<Program, NameError> {
        let mut copy = self.clone();
        copy.id = ProgramID::nil();
        copy.user_id = user_id;
        copy.name = Name::new(&format!("{} (Copy)", self.name))?;
        copy.is_template = false;
        copy.shares = vec![];
        for week in &mut copy.weeks {
            week.id = ProgramWeekID::nil();
            for day in &mut week.days {
                day.id = ProgramDayID::nil();
                for series in &mut day.series {
                    series.id = ProgramSeriesID::nil();
                    for exercise in &mut series.exercises {
                        exercise.id = ProgramExerciseID::nil();
                    }
                }
            }
        }
        Ok(copy)
    }
}

id!(ProgramID);

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramWeek {
    pub id: ProgramWeekID,
    pub week_number: u32,
    pub name: Option<String>,
    pub is_deload: bool,
    pub notes: String,
    pub days: Vec<ProgramDay>,
}

id!(ProgramWeekID);

/// Read-only access of another user to a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramShare {
    pub id: ProgramShareID,
    pub program_id: ProgramID,
    pub user_id: UserID,
}

id!(ProgramShareID);

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDay {
    pub id: ProgramDayID,
    pub day_number: u32,
    pub name: Option<String>,
    pub is_rest_day: bool,
    pub notes: String,
    pub series: Vec<ProgramSeries>,
}

impl ProgramDay {
    /// The name of the day, or "Day N" if it has none.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Day {}", self.day_number),
        }
    }

    /// Series adjacent to the given one in the given direction.
    #[must_use]
    pub fn neighbour_series(
        &self,
        id: ProgramSeriesID,
        direction: Direction,
    ) -> Option<ProgramSeriesID> {
        let mut series = self.series.iter().collect::<Vec<_>>();
        series.sort_by_key(|s| s.order_index);
        let position = series.iter().position(|s| s.id == id)?;
        match direction {
            Direction::Up => position.checked_sub(1).map(|p| series[p].id),
            Direction::Down => series.get(position + 1).map(|s| s.id),
        }
    }

    #[must_use]
    pub fn next_order_index(&self) -> u32 {
        self.series
            .iter()
            .map(|s| s.order_index + 1)
            .max()
            .unwrap_or_default()
    }
}

id!(ProgramDayID);

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSeries {
    pub id: ProgramSeriesID,
    pub order_index: u32,
    pub series_type: SeriesType,
    pub time_seconds: Option<u32>,
    pub notes: String,
    pub exercises: Vec<ProgramExercise>,
}

impl ProgramSeries {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.series_type, self.exercises.len()) {
            (SeriesType::Single, 1) | (SeriesType::Superset, 2) => {}
            (SeriesType::Single, _) => {
                return Err(ValidationError::Other(
                    "A single series must contain exactly one exercise".into(),
                ));
            }
            (SeriesType::Superset, _) => {
                return Err(ValidationError::Other(
                    "A superset must contain exactly two exercises".into(),
                ));
            }
        }
        for exercise in &self.exercises {
            if !(1..=MAX_SETS).contains(&exercise.sets) {
                return Err(ValidationError::Other(
                    "Sets must be between 1 and 20".into(),
                ));
            }
            if exercise.reps.trim().is_empty() {
                return Err(ValidationError::Other("Reps must not be empty".into()));
            }
            if exercise
                .target_rpe
                .is_some_and(|rpe| !(1.0..=10.0).contains(&rpe))
            {
                return Err(ValidationError::Other(
                    "Target RPE must be between 1 and 10".into(),
                ));
            }
        }
        Ok(())
    }
}

id!(ProgramSeriesID);

#[derive(AsRefStr, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum SeriesType {
    #[default]
    Single,
    Superset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramExercise {
    pub id: ProgramExerciseID,
    pub exercise_id: ExerciseID,
    pub position: u32,
    pub sets: u32,
    pub reps: String,
    pub lift_time_seconds: Option<u32>,
    pub rest_time_seconds: Option<u32>,
    /// Weight per set, the last value applies to all further sets.
    pub starting_weights: Vec<f32>,
    pub target_rpe: Option<f32>,
    pub notes: String,
}

id!(ProgramExerciseID);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub fn parse_sets(value: &str) -> Result<u32, ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(sets) if (1..=MAX_SETS).contains(&sets) => Ok(sets),
        _ => Err(ValidationError::Other(
            "Sets must be between 1 and 20".into(),
        )),
    }
}

pub fn parse_target_rpe(value: &str) -> Result<Option<f32>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.replace(',', ".").parse::<f32>() {
        Ok(rpe) if (1.0..=10.0).contains(&rpe) => Ok(Some(rpe)),
        _ => Err(ValidationError::Other(
            "Target RPE must be between 1 and 10".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn program_exercise(sets: u32, reps: &str, target_rpe: Option<f32>) -> ProgramExercise {
        ProgramExercise {
            id: ProgramExerciseID::nil(),
            exercise_id: 1.into(),
            position: 1,
            sets,
            reps: reps.to_string(),
            lift_time_seconds: None,
            rest_time_seconds: None,
            starting_weights: vec![],
            target_rpe,
            notes: String::new(),
        }
    }

    fn series(id: u128, order_index: u32) -> ProgramSeries {
        ProgramSeries {
            id: id.into(),
            order_index,
            series_type: SeriesType::Single,
            time_seconds: None,
            notes: String::new(),
            exercises: vec![program_exercise(3, "8-12", None)],
        }
    }

    fn day(name: Option<&str>, day_number: u32) -> ProgramDay {
        ProgramDay {
            id: ProgramDayID::nil(),
            day_number,
            name: name.map(ToString::to_string),
            is_rest_day: false,
            notes: String::new(),
            series: vec![],
        }
    }

    #[test]
    fn test_program_with_empty_days() {
        let program = Program::with_empty_days(
            1.into(),
            Name::new("PPL").unwrap(),
            String::new(),
            String::new(),
            2,
            3,
            false,
        );

        assert_eq!(program.weeks.len(), 2);
        assert_eq!(
            program
                .days()
                .map(|(w, d)| (w.week_number, d.day_number))
                .collect::<Vec<_>>(),
            vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]
        );
        assert!(program.days().all(|(_, d)| d.series.is_empty()));
    }

    #[test]
    fn test_program_duplicate() {
        let mut program = Program::with_empty_days(
            1.into(),
            Name::new("PPL").unwrap(),
            "Push Pull Legs".to_string(),
            String::new(),
            1,
            1,
            true,
        );
        program.id = 7.into();
        program.weeks[0].id = 8.into();
        program.weeks[0].days[0].id = 9.into();
        program.weeks[0].days[0].series = vec![series(10, 0)];
        program.shares = vec![ProgramShare {
            id: 11.into(),
            program_id: 7.into(),
            user_id: 3.into(),
        }];

        let copy = program.duplicate(2.into()).unwrap();

        assert_eq!(copy.name.as_ref(), "PPL (Copy)");
        assert_eq!(copy.user_id, 2.into());
        assert_eq!(copy.description, "Push Pull Legs");
        assert!(!copy.is_template);
        assert!(copy.id.is_nil());
        assert!(copy.weeks[0].id.is_nil());
        assert!(copy.weeks[0].days[0].id.is_nil());
        assert!(copy.weeks[0].days[0].series[0].id.is_nil());
        assert_eq!(copy.weeks[0].days[0].series[0].exercises.len(), 1);
        assert_eq!(copy.shares, vec![]);
    }

    #[test]
    fn test_program_is_visible_to() {
        let mut program = Program::with_empty_days(
            1.into(),
            Name::new("PPL").unwrap(),
            String::new(),
            String::new(),
            1,
            1,
            false,
        );
        program.shares = vec![ProgramShare {
            id: 5.into(),
            program_id: program.id,
            user_id: 2.into(),
        }];

        assert!(program.is_visible_to(1.into()));
        assert!(program.is_visible_to(2.into()));
        assert!(!program.is_visible_to(3.into()));

        program.is_template = true;
        assert!(program.is_visible_to(3.into()));
    }

    #[test]
    fn test_program_duplicate_name_too_long() {
        let program = Program::with_empty_days(
            1.into(),
            Name::new(&"A".repeat(45)).unwrap(),
            String::new(),
            String::new(),
            1,
            1,
            false,
        );

        assert_eq!(program.duplicate(1.into()), Err(NameError::TooLong(52)));
    }

    #[rstest]
    #[case(Some("Push"), 1, "Push")]
    #[case(None, 2, "Day 2")]
    #[case(Some(" "), 3, "Day 3")]
    fn test_program_day_label(
        #[case] name: Option<&str>,
        #[case] day_number: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(day(name, day_number).label(), expected);
    }

    #[rstest]
    #[case(2, Direction::Up, Some(1))]
    #[case(2, Direction::Down, Some(3))]
    #[case(1, Direction::Up, None)]
    #[case(3, Direction::Down, None)]
    #[case(4, Direction::Up, None)]
    fn test_program_day_neighbour_series(
        #[case] id: u128,
        #[case] direction: Direction,
        #[case] expected: Option<u128>,
    ) {
        let mut day = day(None, 1);
        day.series = vec![series(3, 5), series(1, 0), series(2, 2)];

        assert_eq!(
            day.neighbour_series(id.into(), direction),
            expected.map(ProgramSeriesID::from)
        );
    }

    #[test]
    fn test_program_day_next_order_index() {
        let mut day = day(None, 1);
        assert_eq!(day.next_order_index(), 0);
        day.series = vec![series(1, 0), series(2, 4)];
        assert_eq!(day.next_order_index(), 5);
    }

    #[rstest]
    #[case::single(SeriesType::Single, vec![program_exercise(3, "10", None)], true)]
    #[case::superset(
        SeriesType::Superset,
        vec![program_exercise(3, "10", None), program_exercise(3, "12", Some(8.0))],
        true
    )]
    #[case::single_with_two(
        SeriesType::Single,
        vec![program_exercise(3, "10", None), program_exercise(3, "10", None)],
        false
    )]
    #[case::superset_with_one(SeriesType::Superset, vec![program_exercise(3, "10", None)], false)]
    #[case::no_sets(SeriesType::Single, vec![program_exercise(0, "10", None)], false)]
    #[case::too_many_sets(SeriesType::Single, vec![program_exercise(21, "10", None)], false)]
    #[case::max_sets(SeriesType::Single, vec![program_exercise(20, "10", None)], true)]
    #[case::empty_reps(SeriesType::Single, vec![program_exercise(3, " ", None)], false)]
    #[case::rpe_too_high(SeriesType::Single, vec![program_exercise(3, "5", Some(10.5))], false)]
    fn test_program_series_validate(
        #[case] series_type: SeriesType,
        #[case] exercises: Vec<ProgramExercise>,
        #[case] valid: bool,
    ) {
        let series = ProgramSeries {
            id: ProgramSeriesID::nil(),
            order_index: 0,
            series_type,
            time_seconds: None,
            notes: String::new(),
            exercises,
        };

        assert_eq!(series.validate().is_ok(), valid);
    }

    #[rstest]
    #[case("1", Some(1))]
    #[case(" 20 ", Some(20))]
    #[case("0", None)]
    #[case("21", None)]
    #[case("three", None)]
    fn test_parse_sets(#[case] value: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_sets(value).ok(), expected);
    }

    #[rstest]
    #[case("", Some(None))]
    #[case("8", Some(Some(8.0)))]
    #[case("7,5", Some(Some(7.5)))]
    #[case("0.5", None)]
    #[case("11", None)]
    fn test_parse_target_rpe(#[case] value: &str, #[case] expected: Option<Option<f32>>) {
        assert_eq!(parse_target_rpe(value).ok(), expected);
    }
}
