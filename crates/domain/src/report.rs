use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{
    BodyMetric, BodyMetricChange, Category, Exercise, ExerciseID, Gym, Profile, Program,
    ProgramInstance, ProgramInstanceID, ReadError, ScheduledDay, UserID, WeightUnit,
    WorkoutSession, WorkoutSet, body_metric_change,
};

pub const TOP_EXERCISES: usize = 5;

#[allow(async_fn_in_trait)]
pub trait ReportService {
    async fn get_summary(&self, user_id: UserID) -> Result<Summary, ReadError>;
    async fn get_exercise_history(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<ExerciseDay>, ReadError>;
    async fn get_exercise_stats(&self, user_id: UserID) -> Result<Vec<ExerciseStats>, ReadError>;
    async fn get_program_history(
        &self,
        user_id: UserID,
    ) -> Result<Vec<InstanceProgress>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_workouts: usize,
    pub total_days: usize,
    pub completed_programs: usize,
    pub total_sets: usize,
    pub top_exercises: Vec<ExerciseProgress>,
    pub overall_progress: VolumeProgress,
    pub current_weight: Option<f32>,
    pub current_body_fat: Option<f32>,
    pub weight_unit: WeightUnit,
    pub body_metric_change: Option<BodyMetricChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseProgress {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub total_volume: f32,
    pub set_count: usize,
    pub first_set: Option<WorkoutSet>,
    pub last_set: Option<WorkoutSet>,
    pub volume_change: f32,
    pub percent_change: f32,
}

/// Volume of the last 30 days compared to the 30 days before.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProgress {
    pub recent_volume: f32,
    pub previous_volume: f32,
    pub volume_change: f32,
    pub percent_change: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDay {
    pub date: NaiveDate,
    pub max_weight: f32,
    pub total_volume: f32,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStats {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub category: Category,
    pub session_count: usize,
    pub total_sets: usize,
    pub max_weight: Option<f32>,
    pub last_performed: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceProgress {
    pub instance_id: ProgramInstanceID,
    pub name: String,
    pub program_name: String,
    pub gym_name: Option<String>,
    pub scheduled_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub total_days: usize,
    pub completed_days: usize,
    /// Rounded to one decimal place.
    pub completion_percentage: f32,
}

impl InstanceProgress {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.total_days > 0 && self.completed_days == self.total_days
    }
}

fn completed_sets(sessions: &[WorkoutSession]) -> impl Iterator<Item = &WorkoutSet> {
    sessions
        .iter()
        .filter(|s| s.is_completed)
        .flat_map(|s| s.sets.iter())
}

fn percent_change(previous: f32, current: f32) -> f32 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn summary(
    sessions: &[WorkoutSession],
    scheduled_days: &[ScheduledDay],
    instances: &[ProgramInstance],
    programs: &[Program],
    gyms: &[Gym],
    exercises: &[Exercise],
    metrics: &[BodyMetric],
    profile: &Profile,
    now: NaiveDateTime,
) -> Summary {
    Summary {
        total_workouts: sessions.iter().filter(|s| s.is_completed).count(),
        total_days: scheduled_days.iter().filter(|d| d.is_completed).count(),
        completed_programs: instance_progress(instances, scheduled_days, programs, gyms)
            .iter()
            .filter(|i| i.is_completed())
            .count(),
        total_sets: completed_sets(sessions).count(),
        top_exercises: top_exercises(sessions, exercises, TOP_EXERCISES),
        overall_progress: volume_progress(sessions, now),
        current_weight: profile.current_weight,
        current_body_fat: profile.current_body_fat,
        weight_unit: profile.weight_unit,
        body_metric_change: body_metric_change(metrics),
    }
}

/// Exercises with the highest volume in completed sessions. First and last set refer to the
/// earliest and latest set with both weight and reps.
#[must_use]
pub fn top_exercises(
    sessions: &[WorkoutSession],
    exercises: &[Exercise],
    limit: usize,
) -> Vec<ExerciseProgress> {
    let mut sets_by_exercise: BTreeMap<ExerciseID, Vec<&WorkoutSet>> = BTreeMap::new();
    for set in completed_sets(sessions).filter(|s| s.volume().is_some()) {
        sets_by_exercise.entry(set.exercise_id).or_default().push(set);
    }

    let mut progress = sets_by_exercise
        .into_iter()
        .map(|(exercise_id, mut sets)| {
            sets.sort_by_key(|s| s.completed_at);
            let first_set = sets.first().map(|s| (*s).clone());
            let last_set = sets.last().map(|s| (*s).clone());
            let first_volume = first_set.as_ref().and_then(WorkoutSet::volume).unwrap_or_default();
            let last_volume = last_set.as_ref().and_then(WorkoutSet::volume).unwrap_or_default();
            ExerciseProgress {
                exercise_id,
                name: exercises
                    .iter()
                    .find(|e| e.id == exercise_id)
                    .map(|e| e.name.to_string())
                    .unwrap_or_default(),
                total_volume: sets.iter().filter_map(|s| s.volume()).sum(),
                set_count: sets.len(),
                first_set,
                last_set,
                volume_change: last_volume - first_volume,
                percent_change: percent_change(first_volume, last_volume),
            }
        })
        .collect::<Vec<_>>();

    progress.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));
    progress.truncate(limit);
    progress
}

#[must_use]
pub fn volume_progress(sessions: &[WorkoutSession], now: NaiveDateTime) -> VolumeProgress {
    let thirty_days_ago = now - Duration::days(30);
    let sixty_days_ago = now - Duration::days(60);
    let volume = |from: NaiveDateTime, to: Option<NaiveDateTime>| -> f32 {
        sessions
            .iter()
            .filter(|s| s.is_completed)
            .filter(|s| {
                s.completed_at
                    .is_some_and(|c| c >= from && to.is_none_or(|to| c < to))
            })
            .flat_map(|s| s.sets.iter())
            .filter_map(WorkoutSet::volume)
            .sum()
    };
    let recent_volume = volume(thirty_days_ago, None);
    let previous_volume = volume(sixty_days_ago, Some(thirty_days_ago));

    VolumeProgress {
        recent_volume,
        previous_volume,
        volume_change: recent_volume - previous_volume,
        percent_change: percent_change(previous_volume, recent_volume),
    }
}

/// Sets of an exercise in completed sessions grouped by day.
#[must_use]
pub fn exercise_history(sessions: &[WorkoutSession], exercise_id: ExerciseID) -> Vec<ExerciseDay> {
    let mut sets = completed_sets(sessions)
        .filter(|s| s.exercise_id == exercise_id && s.volume().is_some())
        .collect::<Vec<_>>();
    sets.sort_by_key(|s| s.completed_at);

    let mut days: BTreeMap<NaiveDate, ExerciseDay> = BTreeMap::new();
    for set in sets {
        let date = set.completed_at.date();
        let day = days.entry(date).or_insert_with(|| ExerciseDay {
            date,
            max_weight: 0.0,
            total_volume: 0.0,
            sets: vec![],
        });
        day.max_weight = day.max_weight.max(set.weight.unwrap_or_default());
        day.total_volume += set.volume().unwrap_or_default();
        day.sets.push(set.clone());
    }

    days.into_values().collect()
}

/// Statistics of every exercise performed in completed sessions, most recently performed first.
#[must_use]
pub fn exercise_stats(sessions: &[WorkoutSession], exercises: &[Exercise]) -> Vec<ExerciseStats> {
    let mut stats = exercises
        .iter()
        .filter_map(|exercise| {
            let performed = sessions
                .iter()
                .filter(|s| s.is_completed && s.sets.iter().any(|set| set.exercise_id == exercise.id))
                .collect::<Vec<_>>();
            let sets = performed
                .iter()
                .flat_map(|s| s.sets.iter())
                .filter(|set| set.exercise_id == exercise.id)
                .collect::<Vec<_>>();
            Some(ExerciseStats {
                exercise_id: exercise.id,
                name: exercise.name.to_string(),
                category: exercise.category,
                session_count: performed.len(),
                total_sets: sets.len(),
                max_weight: sets
                    .iter()
                    .filter_map(|s| s.weight)
                    .max_by(f32::total_cmp),
                last_performed: sets.iter().map(|s| s.completed_at).max()?,
            })
        })
        .collect::<Vec<_>>();

    stats.sort_by(|a, b| b.last_performed.cmp(&a.last_performed));
    stats
}

/// Progress of every instance, most recently scheduled first.
#[must_use]
pub fn instance_progress(
    instances: &[ProgramInstance],
    scheduled_days: &[ScheduledDay],
    programs: &[Program],
    gyms: &[Gym],
) -> Vec<InstanceProgress> {
    let mut progress = instances
        .iter()
        .map(|instance| {
            let days = scheduled_days
                .iter()
                .filter(|d| d.instance_id == Some(instance.id))
                .collect::<Vec<_>>();
            let total_days = days.len();
            let completed_days = days.iter().filter(|d| d.is_completed).count();
            #[allow(clippy::cast_precision_loss)]
            let completion_percentage = if total_days > 0 {
                (completed_days as f32 / total_days as f32 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            InstanceProgress {
                instance_id: instance.id,
                name: instance.name.clone(),
                program_name: programs
                    .iter()
                    .find(|p| p.id == instance.program_id)
                    .map(|p| p.name.to_string())
                    .unwrap_or_default(),
                gym_name: instance
                    .gym_id
                    .and_then(|id| gyms.iter().find(|g| g.id == id))
                    .map(|g| g.name.to_string()),
                scheduled_date: instance.scheduled_date,
                start_date: days
                    .iter()
                    .map(|d| d.date)
                    .min()
                    .unwrap_or(instance.scheduled_date),
                end_date: days.iter().map(|d| d.date).max(),
                total_days,
                completed_days,
                completion_percentage,
            }
        })
        .collect::<Vec<_>>();

    progress.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
    progress
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Name, WorkoutSetID};

    use super::*;

    fn time(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn set(exercise_id: u128, reps: u32, weight: f32, day: u32) -> WorkoutSet {
        WorkoutSet {
            id: WorkoutSetID::nil(),
            exercise_id: exercise_id.into(),
            set_number: 1,
            reps: Some(reps),
            weight: Some(weight),
            rpe: None,
            overall_rpe: None,
            notes: String::new(),
            completed_at: time(day),
        }
    }

    fn session(id: u128, is_completed: bool, day: u32, sets: Vec<WorkoutSet>) -> WorkoutSession {
        WorkoutSession {
            id: id.into(),
            user_id: 1.into(),
            scheduled_day_id: None,
            gym_id: None,
            started_at: time(day),
            completed_at: is_completed.then(|| time(day)),
            is_completed,
            notes: String::new(),
            sets,
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

    fn scheduled_day(instance_id: u128, day: u32, is_completed: bool) -> ScheduledDay {
        ScheduledDay {
            id: (u128::from(day) + 100).into(),
            user_id: 1.into(),
            program_id: 1.into(),
            program_day_id: 1.into(),
            instance_id: Some(instance_id.into()),
            gym_id: None,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            is_completed,
        }
    }

    fn instance(id: u128, day: u32) -> ProgramInstance {
        ProgramInstance {
            id: id.into(),
            user_id: 1.into(),
            program_id: 1.into(),
            gym_id: None,
            name: format!("Instance {id}"),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            scheduled_days: vec![],
            custom_weights: vec![],
        }
    }

    #[test]
    fn test_top_exercises() {
        let sessions = [
            session(1, true, 1, vec![set(1, 10, 100.0, 1), set(2, 10, 20.0, 1)]),
            session(2, true, 8, vec![set(1, 8, 110.0, 8), set(3, 5, 500.0, 8)]),
            session(3, false, 9, vec![set(2, 100, 100.0, 9)]),
        ];
        let exercises = [exercise(1, "Squat"), exercise(2, "Curl"), exercise(3, "Leg Press")];

        let top = top_exercises(&sessions, &exercises, 2);

        assert_eq!(
            top.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["Leg Press", "Squat"]
        );
        assert_approx_eq!(top[1].total_volume, 1880.0);
        assert_eq!(top[1].set_count, 2);
        assert_approx_eq!(top[1].volume_change, -120.0);
        assert_approx_eq!(top[1].percent_change, -12.0);
        assert_approx_eq!(top[0].percent_change, 0.0);
    }

    #[test]
    fn test_volume_progress() {
        let sessions = [
            session(1, true, 1, vec![set(1, 10, 100.0, 1)]),
            session(2, true, 20, vec![set(1, 10, 50.0, 20)]),
            session(3, true, 29, vec![set(1, 10, 100.0, 29)]),
            session(4, false, 30, vec![set(1, 10, 1000.0, 30)]),
        ];

        let progress = volume_progress(&sessions, time(31) + Duration::days(14));

        assert_approx_eq!(progress.recent_volume, 1500.0);
        assert_approx_eq!(progress.previous_volume, 1000.0);
        assert_approx_eq!(progress.volume_change, 500.0);
        assert_approx_eq!(progress.percent_change, 50.0);
    }

    #[test]
    fn test_exercise_history() {
        let sessions = [
            session(1, true, 1, vec![set(1, 10, 100.0, 1), set(1, 8, 110.0, 1)]),
            session(2, true, 3, vec![set(1, 5, 120.0, 3), set(2, 5, 200.0, 3)]),
            session(3, false, 4, vec![set(1, 5, 130.0, 4)]),
        ];

        let history = exercise_history(&sessions, 1.into());

        assert_eq!(
            history
                .iter()
                .map(|d| (d.date.to_string(), d.max_weight, d.total_volume, d.sets.len()))
                .collect::<Vec<_>>(),
            vec![
                ("2024-03-01".to_string(), 110.0, 1880.0, 2),
                ("2024-03-03".to_string(), 120.0, 600.0, 1),
            ]
        );
    }

    #[test]
    fn test_exercise_stats() {
        let sessions = [
            session(1, true, 1, vec![set(1, 10, 100.0, 1), set(1, 8, 110.0, 1)]),
            session(2, true, 3, vec![set(2, 5, 20.0, 3), set(1, 5, 90.0, 3)]),
            session(3, false, 5, vec![set(3, 5, 20.0, 5)]),
        ];
        let exercises = [exercise(1, "Squat"), exercise(2, "Curl"), exercise(3, "Row")];

        let stats = exercise_stats(&sessions, &exercises);

        assert_eq!(
            stats
                .iter()
                .map(|s| (s.name.as_str(), s.session_count, s.total_sets, s.max_weight))
                .collect::<Vec<_>>(),
            vec![("Squat", 2, 3, Some(110.0)), ("Curl", 1, 1, Some(20.0))]
        );
    }

    #[rstest]
    #[case(&[], 0, 0, 0.0)]
    #[case(&[true, false, false], 3, 1, 33.3)]
    #[case(&[true, true, false], 3, 2, 66.7)]
    #[case(&[true, true], 2, 2, 100.0)]
    fn test_instance_progress(
        #[case] completed: &[bool],
        #[case] total_days: usize,
        #[case] completed_days: usize,
        #[case] completion_percentage: f32,
    ) {
        let days = completed
            .iter()
            .zip(5..)
            .map(|(c, day)| scheduled_day(1, day, *c))
            .collect::<Vec<_>>();

        let progress = instance_progress(&[instance(1, 1)], &days, &[], &[]);

        assert_eq!(progress[0].total_days, total_days);
        assert_eq!(progress[0].completed_days, completed_days);
        assert_approx_eq!(progress[0].completion_percentage, completion_percentage);
        assert_eq!(
            progress[0].is_completed(),
            total_days > 0 && total_days == completed_days
        );
        if total_days == 0 {
            assert_eq!(progress[0].start_date, progress[0].scheduled_date);
            assert_eq!(progress[0].end_date, None);
        } else {
            assert_eq!(progress[0].start_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        }
    }

    #[test]
    fn test_summary() {
        let sessions = [
            session(1, true, 1, vec![set(1, 10, 100.0, 1), set(1, 8, 110.0, 1)]),
            session(2, false, 2, vec![set(1, 5, 120.0, 2)]),
        ];
        let days = [
            scheduled_day(1, 1, true),
            scheduled_day(2, 2, true),
            scheduled_day(2, 3, false),
        ];
        let instances = [instance(1, 1), instance(2, 2), instance(3, 3)];
        let profile = Profile {
            current_weight: Some(80.0),
            weight_unit: WeightUnit::Kg,
            ..Profile::new(1.into())
        };

        let summary = summary(
            &sessions,
            &days,
            &instances,
            &[],
            &[],
            &[exercise(1, "Squat")],
            &[],
            &profile,
            time(2),
        );

        assert_eq!(summary.total_workouts, 1);
        assert_eq!(summary.total_days, 2);
        assert_eq!(summary.completed_programs, 1);
        assert_eq!(summary.total_sets, 2);
        assert_eq!(summary.top_exercises.len(), 1);
        assert_eq!(summary.current_weight, Some(80.0));
        assert_eq!(summary.weight_unit, WeightUnit::Kg);
        assert_eq!(summary.body_metric_change, None);
    }
}
