use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::{debug, error};

use crate::{
    BodyMetric, BodyMetricRepository, BodyMetricService, BodyPattern, BodyPatternID,
    BodyPatternRepository, BodyPatternService, CalendarEvent, CalendarRepository,
    CalendarService, CreateError, DeleteError, Direction, Equipment, EquipmentFilter,
    EquipmentID, EquipmentRepository, EquipmentService, Exercise, ExerciseDay, ExerciseFilter,
    ExerciseID, ExercisePreference, ExerciseRepository, ExerciseService, ExerciseStats, Gym,
    GymEquipment, GymEquipmentID, GymExercise, GymExerciseSync, GymID, GymRepository,
    GymService, InstanceExerciseWeight, InstanceProgress, LoggedSet, MissingDay, Name,
    OverallRpe, PREVIOUS_SETS_LIMIT, Profile, ProfileRepository, Program, ProgramDay,
    ProgramDayID, ProgramID, ProgramInstance, ProgramInstanceID, ProgramRepository,
    ProgramSeries, ProgramSeriesID, ProgramService, ProgramShare, ProgramShareID, ProgramWeek,
    ProgramWeekID, ReadError, ReportService, RescheduleError, RescheduleOutcome,
    RescheduleRequest, Resolution, ScheduleConflict, ScheduleError, ScheduleOutcome,
    ScheduleRequest, ScheduledDay, ScheduledDayDetails, ScheduledDayID, Summary, UpdateError,
    User, UserID, UserRepository, UserService, WorkoutError, WorkoutRepository, WorkoutService,
    WorkoutSession, WorkoutSessionID, WorkoutSet, WorkoutSetID, calendar_events, day_label,
    exercise_history, exercise_stats, instance_progress, missing_days, next_free_date,
    previous_sets, scheduled_day_details, shift_search_end, summary, sync_exercise, sync_gym,
    visible_body_patterns,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::Busy) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                $error::Storage(_) | $error::Other(_) => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl<R: UserRepository + ProfileRepository> UserService for Service<R> {
    async fn get_users(&self) -> Result<Vec<User>, ReadError> {
        log_on_error!(self.repository.read_users(), ReadError, "get", "users")
    }

    async fn get_user(&self, id: UserID) -> Result<User, ReadError> {
        log_on_error!(self.repository.read_user(id), ReadError, "get", "user")
    }

    async fn create_user(&self, name: Name, is_admin: bool) -> Result<User, CreateError> {
        log_on_error!(
            self.repository.create_user(name, is_admin),
            CreateError,
            "create",
            "user"
        )
    }

    async fn get_profile(&self, user_id: UserID) -> Result<Profile, ReadError> {
        log_on_error!(
            self.repository.read_profile(user_id),
            ReadError,
            "get",
            "profile"
        )
    }

    async fn modify_user(
        &self,
        id: UserID,
        name: Option<Name>,
        is_admin: Option<bool>,
    ) -> Result<User, UpdateError> {
        log_on_error!(
            self.repository.modify_user(id, name, is_admin),
            UpdateError,
            "modify",
            "user"
        )
    }

    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError> {
        log_on_error!(self.repository.delete_user(id), DeleteError, "delete", "user")
    }

    async fn replace_profile(&self, profile: Profile) -> Result<Profile, UpdateError> {
        log_on_error!(
            self.repository.replace_profile(profile),
            UpdateError,
            "replace",
            "profile"
        )
    }
}

impl<R: GymRepository + ExerciseRepository> Service<R> {
    async fn apply_gym_exercise_sync(&self, sync: GymExerciseSync) -> Result<(), UpdateError> {
        if sync.is_empty() {
            return Ok(());
        }
        debug!(
            "syncing gym exercises: {} added, {} removed",
            sync.insert.len(),
            sync.remove.len()
        );
        self.repository.sync_gym_exercises(sync).await
    }

    async fn sync_gym_exercises_of_gym(&self, gym_id: GymID) -> Result<(), UpdateError> {
        let gym = self
            .repository
            .read_gyms()
            .await?
            .into_iter()
            .find(|g| g.id == gym_id)
            .ok_or(UpdateError::NotFound)?;
        let exercises = self.repository.read_exercises().await?;
        let gym_exercises = self.repository.read_gym_exercises().await?;
        self.apply_gym_exercise_sync(sync_gym(&gym, &exercises, &gym_exercises))
            .await
    }

    async fn sync_gym_exercises_of_exercise(&self, exercise: &Exercise) -> Result<(), UpdateError> {
        let gyms = self.repository.read_gyms().await?;
        let gym_exercises = self.repository.read_gym_exercises().await?;
        self.apply_gym_exercise_sync(sync_exercise(exercise, &gyms, &gym_exercises))
            .await
    }

    async fn sync_all_gym_exercises(&self) -> Result<(), UpdateError> {
        let gyms = self.repository.read_gyms().await?;
        let exercises = self.repository.read_exercises().await?;
        let gym_exercises = self.repository.read_gym_exercises().await?;
        let mut sync = GymExerciseSync::default();
        for gym in &gyms {
            let gym_sync = sync_gym(gym, &exercises, &gym_exercises);
            sync.insert.extend(gym_sync.insert);
            sync.remove.extend(gym_sync.remove);
        }
        self.apply_gym_exercise_sync(sync).await
    }
}

impl<R: EquipmentRepository + GymRepository + ExerciseRepository> Service<R> {
    async fn filtered_equipment(
        &self,
        filter: &EquipmentFilter,
    ) -> Result<Vec<Equipment>, ReadError> {
        let equipment = self.repository.read_equipment().await?;
        Ok(filter
            .equipment(equipment.iter())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn own_equipment(&self, user_id: UserID, id: EquipmentID) -> Result<Equipment, ReadError> {
        self.repository
            .read_equipment()
            .await?
            .into_iter()
            .find(|e| e.id == id && e.created_by == user_id)
            .ok_or(ReadError::NotFound)
    }

    async fn replace_own_equipment(
        &self,
        user_id: UserID,
        equipment: Equipment,
    ) -> Result<Equipment, UpdateError> {
        self.own_equipment(user_id, equipment.id).await?;
        self.repository
            .replace_equipment(Equipment {
                created_by: user_id,
                ..equipment
            })
            .await
    }

    async fn delete_own_equipment(
        &self,
        user_id: UserID,
        id: EquipmentID,
    ) -> Result<EquipmentID, DeleteError> {
        self.own_equipment(user_id, id).await?;
        let id = self.repository.delete_equipment(id).await?;
        self.sync_all_gym_exercises().await?;
        Ok(id)
    }
}

impl<R: EquipmentRepository + GymRepository + ExerciseRepository> EquipmentService for Service<R> {
    async fn get_equipment(&self, filter: &EquipmentFilter) -> Result<Vec<Equipment>, ReadError> {
        log_on_error!(
            self.filtered_equipment(filter),
            ReadError,
            "get",
            "equipment"
        )
    }

    async fn create_equipment(
        &self,
        user_id: UserID,
        equipment: Equipment,
    ) -> Result<Equipment, CreateError> {
        log_on_error!(
            self.repository.create_equipment(Equipment {
                created_by: user_id,
                ..equipment
            }),
            CreateError,
            "create",
            "equipment"
        )
    }

    async fn replace_equipment(
        &self,
        user_id: UserID,
        equipment: Equipment,
    ) -> Result<Equipment, UpdateError> {
        log_on_error!(
            self.replace_own_equipment(user_id, equipment),
            UpdateError,
            "replace",
            "equipment"
        )
    }

    async fn delete_equipment(
        &self,
        user_id: UserID,
        id: EquipmentID,
    ) -> Result<EquipmentID, DeleteError> {
        log_on_error!(
            self.delete_own_equipment(user_id, id),
            DeleteError,
            "delete",
            "equipment"
        )
    }
}

impl<R: ExerciseRepository + GymRepository> Service<R> {
    async fn filtered_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ReadError> {
        let exercises = self.repository.read_exercises().await?;
        Ok(filter
            .exercises(exercises.iter())
            .into_iter()
            .cloned()
            .collect())
    }

    async fn exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        self.repository
            .read_exercises()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or(ReadError::NotFound)
    }

    async fn own_exercise(&self, user_id: UserID, id: ExerciseID) -> Result<Exercise, ReadError> {
        let exercise = self.exercise(id).await?;
        if exercise.created_by != user_id {
            return Err(ReadError::NotFound);
        }
        Ok(exercise)
    }

    async fn create_and_sync_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, CreateError> {
        let exercise = self
            .repository
            .create_exercise(Exercise {
                created_by: user_id,
                ..exercise
            })
            .await?;
        self.sync_gym_exercises_of_exercise(&exercise).await?;
        Ok(exercise)
    }

    async fn replace_and_sync_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, UpdateError> {
        self.own_exercise(user_id, exercise.id).await?;
        let exercise = self
            .repository
            .replace_exercise(Exercise {
                created_by: user_id,
                ..exercise
            })
            .await?;
        self.sync_gym_exercises_of_exercise(&exercise).await?;
        Ok(exercise)
    }

    async fn delete_own_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
    ) -> Result<ExerciseID, DeleteError> {
        self.own_exercise(user_id, id).await?;
        self.repository.delete_exercise(id).await
    }

    async fn exercise_preference(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ExercisePreference, ReadError> {
        self.exercise(exercise_id).await?;
        Ok(self
            .repository
            .read_exercise_preferences(user_id)
            .await?
            .into_iter()
            .find(|p| p.exercise_id == exercise_id)
            .unwrap_or_else(|| ExercisePreference::new(user_id, exercise_id)))
    }

    async fn replace_own_exercise_preference(
        &self,
        user_id: UserID,
        preference: ExercisePreference,
    ) -> Result<ExercisePreference, UpdateError> {
        self.exercise(preference.exercise_id).await?;
        self.repository
            .replace_exercise_preference(ExercisePreference {
                user_id,
                ..preference
            })
            .await
    }
}

impl<R: ExerciseRepository + GymRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.filtered_exercises(filter),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(self.exercise(id), ReadError, "get", "exercise")
    }

    async fn create_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.create_and_sync_exercise(user_id, exercise),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            self.replace_and_sync_exercise(user_id, exercise),
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
    ) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.delete_own_exercise(user_id, id),
            DeleteError,
            "delete",
            "exercise"
        )
    }

    async fn get_exercise_preference(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ExercisePreference, ReadError> {
        log_on_error!(
            self.exercise_preference(user_id, exercise_id),
            ReadError,
            "get",
            "exercise preference"
        )
    }

    async fn replace_exercise_preference(
        &self,
        user_id: UserID,
        preference: ExercisePreference,
    ) -> Result<ExercisePreference, UpdateError> {
        log_on_error!(
            self.replace_own_exercise_preference(user_id, preference),
            UpdateError,
            "replace",
            "exercise preference"
        )
    }
}

impl<R: GymRepository + ExerciseRepository> Service<R> {
    async fn own_gyms(&self, user_id: UserID) -> Result<Vec<Gym>, ReadError> {
        Ok(self
            .repository
            .read_gyms()
            .await?
            .into_iter()
            .filter(|g| g.user_id == user_id)
            .collect())
    }

    async fn visible_gym(&self, user_id: UserID, id: GymID) -> Result<Gym, ReadError> {
        self.repository
            .read_gyms()
            .await?
            .into_iter()
            .find(|g| g.id == id && g.is_visible_to(user_id))
            .ok_or(ReadError::NotFound)
    }

    async fn own_gym(&self, user_id: UserID, id: GymID) -> Result<Gym, ReadError> {
        self.own_gyms(user_id)
            .await?
            .into_iter()
            .find(|g| g.id == id)
            .ok_or(ReadError::NotFound)
    }

    async fn create_and_sync_gym(
        &self,
        user_id: UserID,
        name: Name,
        address: Option<String>,
        is_shared: bool,
    ) -> Result<Gym, CreateError> {
        let gym = self
            .repository
            .create_gym(Gym {
                id: GymID::nil(),
                user_id,
                name,
                address: address.filter(|a| !a.trim().is_empty()),
                is_shared,
                equipment: vec![],
            })
            .await?;
        self.sync_gym_exercises_of_gym(gym.id).await?;
        Ok(gym)
    }

    async fn replace_own_gym(&self, user_id: UserID, gym: Gym) -> Result<Gym, UpdateError> {
        self.own_gym(user_id, gym.id).await?;
        self.repository.replace_gym(Gym { user_id, ..gym }).await
    }

    async fn delete_own_gym(&self, user_id: UserID, id: GymID) -> Result<GymID, DeleteError> {
        self.own_gym(user_id, id).await?;
        self.repository.delete_gym(id).await
    }

    async fn add_and_sync_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        equipment: GymEquipment,
    ) -> Result<GymEquipment, CreateError> {
        self.own_gym(user_id, gym_id).await?;
        let equipment = self
            .repository
            .create_gym_equipment(gym_id, equipment)
            .await?;
        self.sync_gym_exercises_of_gym(gym_id).await?;
        Ok(equipment)
    }

    async fn remove_and_sync_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        id: GymEquipmentID,
    ) -> Result<GymEquipmentID, DeleteError> {
        let gym = self.own_gym(user_id, gym_id).await?;
        if !gym.equipment.iter().any(|e| e.id == id) {
            return Err(DeleteError::NotFound);
        }
        let id = self.repository.delete_gym_equipment(id).await?;
        self.sync_gym_exercises_of_gym(gym_id).await?;
        Ok(id)
    }

    async fn gym_exercises(
        &self,
        user_id: UserID,
        gym_id: GymID,
    ) -> Result<Vec<GymExercise>, ReadError> {
        self.visible_gym(user_id, gym_id).await?;
        Ok(self
            .repository
            .read_gym_exercises()
            .await?
            .into_iter()
            .filter(|ge| ge.gym_id == gym_id)
            .collect())
    }

    async fn replace_own_gym_exercise(
        &self,
        user_id: UserID,
        gym_exercise: GymExercise,
    ) -> Result<GymExercise, UpdateError> {
        self.own_gym(user_id, gym_exercise.gym_id).await?;
        self.repository.replace_gym_exercise(gym_exercise).await
    }
}

impl<R: GymRepository + ExerciseRepository> GymService for Service<R> {
    async fn get_gyms(&self, user_id: UserID) -> Result<Vec<Gym>, ReadError> {
        log_on_error!(self.own_gyms(user_id), ReadError, "get", "gyms")
    }

    async fn get_gym(&self, user_id: UserID, id: GymID) -> Result<Gym, ReadError> {
        log_on_error!(self.visible_gym(user_id, id), ReadError, "get", "gym")
    }

    async fn create_gym(
        &self,
        user_id: UserID,
        name: Name,
        address: Option<String>,
        is_shared: bool,
    ) -> Result<Gym, CreateError> {
        log_on_error!(
            self.create_and_sync_gym(user_id, name, address, is_shared),
            CreateError,
            "create",
            "gym"
        )
    }

    async fn replace_gym(&self, user_id: UserID, gym: Gym) -> Result<Gym, UpdateError> {
        log_on_error!(
            self.replace_own_gym(user_id, gym),
            UpdateError,
            "replace",
            "gym"
        )
    }

    async fn delete_gym(&self, user_id: UserID, id: GymID) -> Result<GymID, DeleteError> {
        log_on_error!(self.delete_own_gym(user_id, id), DeleteError, "delete", "gym")
    }

    async fn add_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        equipment: GymEquipment,
    ) -> Result<GymEquipment, CreateError> {
        log_on_error!(
            self.add_and_sync_gym_equipment(user_id, gym_id, equipment),
            CreateError,
            "add",
            "gym equipment"
        )
    }

    async fn remove_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        id: GymEquipmentID,
    ) -> Result<GymEquipmentID, DeleteError> {
        log_on_error!(
            self.remove_and_sync_gym_equipment(user_id, gym_id, id),
            DeleteError,
            "remove",
            "gym equipment"
        )
    }

    async fn get_gym_exercises(
        &self,
        user_id: UserID,
        gym_id: GymID,
    ) -> Result<Vec<GymExercise>, ReadError> {
        log_on_error!(
            self.gym_exercises(user_id, gym_id),
            ReadError,
            "get",
            "gym exercises"
        )
    }

    async fn replace_gym_exercise(
        &self,
        user_id: UserID,
        gym_exercise: GymExercise,
    ) -> Result<GymExercise, UpdateError> {
        log_on_error!(
            self.replace_own_gym_exercise(user_id, gym_exercise),
            UpdateError,
            "replace",
            "gym exercise"
        )
    }
}

impl<R: ProgramRepository + UserRepository> Service<R> {
    async fn is_admin(&self, user_id: UserID) -> Result<bool, ReadError> {
        Ok(self.repository.read_user(user_id).await?.is_admin)
    }

    async fn visible_program(&self, user_id: UserID, id: ProgramID) -> Result<Program, ReadError> {
        self.repository
            .read_programs(user_id)
            .await?
            .into_iter()
            .find(|p| p.id == id && p.is_visible_to(user_id))
            .ok_or(ReadError::NotFound)
    }

    async fn own_program(
        &self,
        user_id: UserID,
        predicate: impl Fn(&Program) -> bool,
    ) -> Result<Program, ReadError> {
        self.repository
            .read_programs(user_id)
            .await?
            .into_iter()
            .find(|p| p.user_id == user_id && predicate(p))
            .ok_or(ReadError::NotFound)
    }

    async fn create_own_program(
        &self,
        user_id: UserID,
        program: Program,
    ) -> Result<Program, CreateError> {
        for (_, day) in program.days() {
            for series in &day.series {
                series
                    .validate()
                    .map_err(|err| CreateError::Other(err.into()))?;
            }
        }
        let is_template = program.is_template && self.is_admin(user_id).await?;
        self.repository
            .create_program(Program {
                user_id,
                is_template,
                ..program
            })
            .await
    }

    async fn modify_own_program(
        &self,
        user_id: UserID,
        id: ProgramID,
        name: Option<Name>,
        description: Option<String>,
        notes: Option<String>,
        is_template: Option<bool>,
    ) -> Result<Program, UpdateError> {
        self.own_program(user_id, |p| p.id == id).await?;
        let is_template = if self.is_admin(user_id).await? {
            is_template
        } else {
            None
        };
        self.repository
            .modify_program(id, name, description, notes, is_template)
            .await
    }

    async fn delete_own_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<ProgramID, DeleteError> {
        self.own_program(user_id, |p| p.id == id).await?;
        self.repository.delete_program(id).await
    }

    async fn duplicate_visible_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<Program, CreateError> {
        let copy = self
            .visible_program(user_id, id)
            .await?
            .duplicate(user_id)
            .map_err(|err| CreateError::Other(err.into()))?;
        self.repository.create_program(copy).await
    }

    async fn modify_own_program_day(
        &self,
        user_id: UserID,
        id: ProgramDayID,
        name: Option<String>,
        is_rest_day: bool,
        notes: String,
    ) -> Result<ProgramDay, UpdateError> {
        self.own_program(user_id, |p| p.day(id).is_some()).await?;
        self.repository
            .modify_program_day(
                id,
                name.filter(|n| !n.trim().is_empty()),
                is_rest_day,
                notes,
            )
            .await
    }

    async fn modify_own_program_week(
        &self,
        user_id: UserID,
        id: ProgramWeekID,
        name: Option<String>,
        is_deload: bool,
        notes: String,
    ) -> Result<ProgramWeek, UpdateError> {
        self.own_program(user_id, |p| p.week(id).is_some()).await?;
        self.repository
            .modify_program_week(id, name.filter(|n| !n.trim().is_empty()), is_deload, notes)
            .await
    }

    async fn own_program_shares(
        &self,
        user_id: UserID,
        program_id: ProgramID,
    ) -> Result<Vec<ProgramShare>, ReadError> {
        Ok(self
            .own_program(user_id, |p| p.id == program_id)
            .await?
            .shares)
    }

    async fn share_own_program(
        &self,
        user_id: UserID,
        program_id: ProgramID,
        shared_with: UserID,
    ) -> Result<ProgramShare, CreateError> {
        self.own_program(user_id, |p| p.id == program_id).await?;
        if shared_with == user_id {
            return Err(CreateError::Other(
                "A program cannot be shared with its owner".into(),
            ));
        }
        self.repository.read_user(shared_with).await?;
        self.repository
            .create_program_share(ProgramShare {
                id: ProgramShareID::nil(),
                program_id,
                user_id: shared_with,
            })
            .await
    }

    async fn unshare_own_program(
        &self,
        user_id: UserID,
        id: ProgramShareID,
    ) -> Result<ProgramShareID, DeleteError> {
        self.own_program(user_id, |p| p.shares.iter().any(|s| s.id == id))
            .await?;
        self.repository.delete_program_share(id).await
    }

    async fn add_own_series(
        &self,
        user_id: UserID,
        day_id: ProgramDayID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, CreateError> {
        series
            .validate()
            .map_err(|err| CreateError::Other(err.into()))?;
        let program = self.own_program(user_id, |p| p.day(day_id).is_some()).await?;
        let order_index = program
            .day(day_id)
            .map(|(_, d)| d.next_order_index())
            .unwrap_or_default();
        self.repository
            .create_series(
                day_id,
                ProgramSeries {
                    order_index,
                    ..series
                },
            )
            .await
    }

    async fn replace_own_series(
        &self,
        user_id: UserID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, UpdateError> {
        series
            .validate()
            .map_err(|err| UpdateError::Other(err.into()))?;
        let program = self
            .own_program(user_id, |p| p.series(series.id).is_some())
            .await?;
        let order_index = program
            .series(series.id)
            .map(|(_, s)| s.order_index)
            .unwrap_or(series.order_index);
        self.repository
            .replace_series(ProgramSeries {
                order_index,
                ..series
            })
            .await
    }

    async fn delete_own_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
    ) -> Result<ProgramSeriesID, DeleteError> {
        self.own_program(user_id, |p| p.series(id).is_some()).await?;
        self.repository.delete_series(id).await
    }

    async fn move_own_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
        direction: Direction,
    ) -> Result<ProgramDay, UpdateError> {
        let program = self.own_program(user_id, |p| p.series(id).is_some()).await?;
        let Some((day, _)) = program.series(id) else {
            return Err(UpdateError::NotFound);
        };
        let day_id = day.id;
        if let Some(neighbour) = day.neighbour_series(id, direction) {
            self.repository.swap_series_order(id, neighbour).await?;
        }
        let program = self.own_program(user_id, |p| p.id == program.id).await?;
        program
            .day(day_id)
            .map(|(_, d)| d.clone())
            .ok_or(UpdateError::NotFound)
    }
}

impl<R: ProgramRepository + UserRepository> ProgramService for Service<R> {
    async fn get_programs(&self, user_id: UserID) -> Result<Vec<Program>, ReadError> {
        log_on_error!(
            self.repository.read_programs(user_id),
            ReadError,
            "get",
            "programs"
        )
    }

    async fn get_program(&self, user_id: UserID, id: ProgramID) -> Result<Program, ReadError> {
        log_on_error!(
            self.visible_program(user_id, id),
            ReadError,
            "get",
            "program"
        )
    }

    async fn create_program(
        &self,
        user_id: UserID,
        name: Name,
        description: String,
        notes: String,
        duration_weeks: u32,
        days_per_week: u32,
        is_template: bool,
    ) -> Result<Program, CreateError> {
        log_on_error!(
            self.create_own_program(
                user_id,
                Program::with_empty_days(
                    user_id,
                    name,
                    description,
                    notes,
                    duration_weeks,
                    days_per_week,
                    is_template,
                ),
            ),
            CreateError,
            "create",
            "program"
        )
    }

    async fn create_program_from(
        &self,
        user_id: UserID,
        program: Program,
    ) -> Result<Program, CreateError> {
        log_on_error!(
            self.create_own_program(user_id, program),
            CreateError,
            "create",
            "program"
        )
    }

    async fn modify_program(
        &self,
        user_id: UserID,
        id: ProgramID,
        name: Option<Name>,
        description: Option<String>,
        notes: Option<String>,
        is_template: Option<bool>,
    ) -> Result<Program, UpdateError> {
        log_on_error!(
            self.modify_own_program(user_id, id, name, description, notes, is_template),
            UpdateError,
            "modify",
            "program"
        )
    }

    async fn delete_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<ProgramID, DeleteError> {
        log_on_error!(
            self.delete_own_program(user_id, id),
            DeleteError,
            "delete",
            "program"
        )
    }

    async fn duplicate_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<Program, CreateError> {
        log_on_error!(
            self.duplicate_visible_program(user_id, id),
            CreateError,
            "duplicate",
            "program"
        )
    }

    async fn modify_program_day(
        &self,
        user_id: UserID,
        id: ProgramDayID,
        name: Option<String>,
        is_rest_day: bool,
        notes: String,
    ) -> Result<ProgramDay, UpdateError> {
        log_on_error!(
            self.modify_own_program_day(user_id, id, name, is_rest_day, notes),
            UpdateError,
            "modify",
            "program day"
        )
    }

    async fn modify_program_week(
        &self,
        user_id: UserID,
        id: ProgramWeekID,
        name: Option<String>,
        is_deload: bool,
        notes: String,
    ) -> Result<ProgramWeek, UpdateError> {
        log_on_error!(
            self.modify_own_program_week(user_id, id, name, is_deload, notes),
            UpdateError,
            "modify",
            "program week"
        )
    }

    async fn get_program_shares(
        &self,
        user_id: UserID,
        program_id: ProgramID,
    ) -> Result<Vec<ProgramShare>, ReadError> {
        log_on_error!(
            self.own_program_shares(user_id, program_id),
            ReadError,
            "get",
            "program shares"
        )
    }

    async fn share_program(
        &self,
        user_id: UserID,
        program_id: ProgramID,
        shared_with: UserID,
    ) -> Result<ProgramShare, CreateError> {
        log_on_error!(
            self.share_own_program(user_id, program_id, shared_with),
            CreateError,
            "share",
            "program"
        )
    }

    async fn unshare_program(
        &self,
        user_id: UserID,
        id: ProgramShareID,
    ) -> Result<ProgramShareID, DeleteError> {
        log_on_error!(
            self.unshare_own_program(user_id, id),
            DeleteError,
            "unshare",
            "program"
        )
    }

    async fn add_series(
        &self,
        user_id: UserID,
        day_id: ProgramDayID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, CreateError> {
        log_on_error!(
            self.add_own_series(user_id, day_id, series),
            CreateError,
            "add",
            "series"
        )
    }

    async fn replace_series(
        &self,
        user_id: UserID,
        series: ProgramSeries,
    ) -> Result<ProgramSeries, UpdateError> {
        log_on_error!(
            self.replace_own_series(user_id, series),
            UpdateError,
            "replace",
            "series"
        )
    }

    async fn delete_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
    ) -> Result<ProgramSeriesID, DeleteError> {
        log_on_error!(
            self.delete_own_series(user_id, id),
            DeleteError,
            "delete",
            "series"
        )
    }

    async fn move_series(
        &self,
        user_id: UserID,
        id: ProgramSeriesID,
        direction: Direction,
    ) -> Result<ProgramDay, UpdateError> {
        log_on_error!(
            self.move_own_series(user_id, id, direction),
            UpdateError,
            "move",
            "series"
        )
    }
}

impl<R: CalendarRepository + ProgramRepository + GymRepository + ExerciseRepository> Service<R> {
    async fn own_calendar_events(&self, user_id: UserID) -> Result<Vec<CalendarEvent>, ReadError> {
        let days = self.repository.read_scheduled_days(user_id).await?;
        let programs = self.repository.read_programs(user_id).await?;
        Ok(calendar_events(&days, &programs))
    }

    async fn own_scheduled_day_details(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayDetails, ReadError> {
        let day = self.repository.read_scheduled_day(user_id, id).await?;
        let program = self
            .repository
            .read_programs(user_id)
            .await?
            .into_iter()
            .find(|p| p.id == day.program_id)
            .ok_or(ReadError::NotFound)?;
        let instance = match day.instance_id {
            Some(instance_id) => self
                .repository
                .read_program_instances(user_id)
                .await?
                .into_iter()
                .find(|i| i.id == instance_id),
            None => None,
        };
        let exercises = self.repository.read_exercises().await?;
        scheduled_day_details(&day, &program, instance.as_ref(), &exercises)
            .ok_or(ReadError::NotFound)
    }

    /// Days of the program already placed on a target date are tolerated by the move, so dates
    /// double-booked by forced scheduling can still take part in a swap or shift.
    async fn move_days(
        &self,
        user_id: UserID,
        day: &ScheduledDay,
        moves: Vec<(ScheduledDayID, NaiveDate)>,
    ) -> Result<(), UpdateError> {
        let present = self
            .repository
            .read_scheduled_days(user_id)
            .await?
            .into_iter()
            .filter(|d| {
                d.program_id == day.program_id
                    && moves.iter().all(|(id, _)| *id != d.id)
                    && moves.iter().any(|(_, date)| *date == d.date)
            })
            .map(|d| d.id)
            .collect::<BTreeSet<_>>();
        self.repository
            .move_scheduled_days(user_id, moves, present)
            .await
    }

    async fn reschedule_day(
        &self,
        user_id: UserID,
        request: RescheduleRequest,
    ) -> Result<RescheduleOutcome, RescheduleError> {
        let day = self
            .repository
            .read_scheduled_day(user_id, request.id)
            .await?;

        let Some(conflict) = self
            .repository
            .find_conflict(user_id, day.program_id, request.date, Some(day.id))
            .await?
        else {
            self.move_days(user_id, &day, vec![(day.id, request.date)])
                .await?;
            return Ok(RescheduleOutcome::Moved);
        };

        let Some(resolution) = request.resolution else {
            let programs = self.repository.read_programs(user_id).await?;
            return Ok(RescheduleOutcome::Conflict {
                conflict_id: conflict.id,
                existing_day_name: day_label(&programs, &conflict),
            });
        };

        let conflict_id = request.conflict_id.ok_or(RescheduleError::MissingData)?;
        let named = match self
            .repository
            .read_scheduled_day(user_id, conflict_id)
            .await
        {
            Ok(named) => named,
            Err(ReadError::NotFound) => return Err(RescheduleError::ConflictNotFound),
            Err(err) => return Err(err.into()),
        };

        match resolution {
            Resolution::Swap => {
                self.move_days(
                    user_id,
                    &day,
                    vec![(day.id, request.date), (named.id, day.date)],
                )
                .await?;
                Ok(RescheduleOutcome::Swapped)
            }
            Resolution::Shift => {
                let Some(from) = request.date.succ_opt() else {
                    return Err(RescheduleError::NoAvailableDate);
                };
                let occupied = self
                    .repository
                    .read_occupied_dates(
                        user_id,
                        day.program_id,
                        from,
                        shift_search_end(request.date),
                    )
                    .await?;
                let date = next_free_date(request.date, &occupied)
                    .ok_or(RescheduleError::NoAvailableDate)?;
                self.move_days(user_id, &day, vec![(day.id, request.date), (named.id, date)])
                    .await?;
                Ok(RescheduleOutcome::Shifted { date })
            }
        }
    }

    async fn own_missing_days(&self, user_id: UserID) -> Result<Vec<MissingDay>, ReadError> {
        let instances = self.repository.read_program_instances(user_id).await?;
        let days = self.repository.read_scheduled_days(user_id).await?;
        let programs = self.repository.read_programs(user_id).await?;
        let gyms = self.repository.read_gyms().await?;
        Ok(missing_days(&instances, &days, &programs, &gyms))
    }

    async fn own_schedulable_program(
        &self,
        user_id: UserID,
        id: ProgramID,
    ) -> Result<Program, ScheduleError> {
        self.repository
            .read_programs(user_id)
            .await?
            .into_iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .ok_or(ScheduleError::ProgramNotFound)
    }

    async fn schedule_conflicts(
        &self,
        user_id: UserID,
        program: &Program,
        mappings: &[(ProgramDayID, NaiveDate)],
    ) -> Result<Vec<ScheduleConflict>, ScheduleError> {
        let mut conflicts = vec![];
        for (day_id, date) in mappings {
            if let Some(existing) = self
                .repository
                .find_conflict(user_id, program.id, *date, None)
                .await?
            {
                conflicts.push(ScheduleConflict {
                    date: *date,
                    existing_day: day_label(std::slice::from_ref(program), &existing),
                    new_day: program
                        .day(*day_id)
                        .map_or_else(|| "Unknown".to_string(), |(_, d)| d.label()),
                });
            }
        }
        Ok(conflicts)
    }

    async fn schedule_own_program(
        &self,
        user_id: UserID,
        request: ScheduleRequest,
    ) -> Result<ScheduleOutcome<ProgramInstance>, ScheduleError> {
        let Some(scheduled_date) = request.mappings.iter().map(|(_, date)| *date).min() else {
            return Err(ScheduleError::MissingData);
        };
        let program = self
            .own_schedulable_program(user_id, request.program_id)
            .await?;
        if let Some(gym_id) = request.gym_id {
            let gyms = self.repository.read_gyms().await?;
            if !gyms.iter().any(|g| g.id == gym_id && g.is_visible_to(user_id)) {
                return Err(ScheduleError::GymNotFound);
            }
        }

        let day_ids = program.day_ids();
        let mut mapped = BTreeSet::new();
        for (day_id, _) in &request.mappings {
            if !day_ids.contains(day_id) {
                return Err(ScheduleError::InvalidDay);
            }
            if !mapped.insert(*day_id) {
                return Err(ScheduleError::DuplicateDay);
            }
        }

        if !request.force {
            let conflicts = self
                .schedule_conflicts(user_id, &program, &request.mappings)
                .await?;
            if !conflicts.is_empty() {
                debug!("{} conflicts when scheduling program", conflicts.len());
                return Ok(ScheduleOutcome::Conflicts(conflicts));
            }
        }

        let instance = ProgramInstance {
            id: ProgramInstanceID::nil(),
            user_id,
            program_id: program.id,
            gym_id: request.gym_id,
            name: request
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| program.name.to_string()),
            scheduled_date,
            scheduled_days: vec![],
            custom_weights: vec![],
        };
        let days = request
            .mappings
            .iter()
            .map(|(day_id, date)| ScheduledDay {
                id: ScheduledDayID::nil(),
                user_id,
                program_id: program.id,
                program_day_id: *day_id,
                instance_id: None,
                gym_id: request.gym_id,
                date: *date,
                is_completed: false,
            })
            .collect();

        Ok(ScheduleOutcome::Scheduled(
            self.repository
                .create_program_instance(instance, days)
                .await?,
        ))
    }

    async fn schedule_own_missing_day(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        program_day_id: ProgramDayID,
        date: NaiveDate,
        force: bool,
    ) -> Result<ScheduleOutcome<ScheduledDay>, ScheduleError> {
        let instance = self
            .repository
            .read_program_instances(user_id)
            .await?
            .into_iter()
            .find(|i| i.id == instance_id)
            .ok_or(ScheduleError::InstanceNotFound)?;
        let program = self
            .own_schedulable_program(user_id, instance.program_id)
            .await?;
        let Some((_, program_day)) = program.day(program_day_id) else {
            return Err(ScheduleError::InvalidDay);
        };

        let days = self.repository.read_scheduled_days(user_id).await?;
        if days
            .iter()
            .any(|d| d.instance_id == Some(instance.id) && d.program_day_id == program_day_id)
        {
            return Err(ScheduleError::AlreadyScheduled);
        }

        if !force {
            if let Some(existing) = self
                .repository
                .find_conflict(user_id, program.id, date, None)
                .await?
            {
                return Ok(ScheduleOutcome::Conflicts(vec![ScheduleConflict {
                    date,
                    existing_day: day_label(std::slice::from_ref(&program), &existing),
                    new_day: program_day.label(),
                }]));
            }
        }

        Ok(ScheduleOutcome::Scheduled(
            self.repository
                .create_scheduled_day(ScheduledDay {
                    id: ScheduledDayID::nil(),
                    user_id,
                    program_id: program.id,
                    program_day_id,
                    instance_id: Some(instance.id),
                    gym_id: instance.gym_id,
                    date,
                    is_completed: false,
                })
                .await?,
        ))
    }

    async fn replace_own_instance_exercise_weight(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        weight: InstanceExerciseWeight,
    ) -> Result<InstanceExerciseWeight, UpdateError> {
        let instance = self
            .repository
            .read_program_instances(user_id)
            .await?
            .into_iter()
            .find(|i| i.id == instance_id)
            .ok_or(UpdateError::NotFound)?;
        let program = self
            .repository
            .read_programs(user_id)
            .await?
            .into_iter()
            .find(|p| p.id == instance.program_id)
            .ok_or(UpdateError::NotFound)?;
        if !program
            .days()
            .flat_map(|(_, d)| d.series.iter())
            .flat_map(|s| s.exercises.iter())
            .any(|e| e.id == weight.program_exercise_id)
        {
            return Err(UpdateError::NotFound);
        }
        self.repository
            .replace_instance_exercise_weight(instance_id, weight)
            .await
    }
}

impl<R: CalendarRepository + ProgramRepository + GymRepository + ExerciseRepository>
    CalendarService for Service<R>
{
    async fn get_calendar_events(&self, user_id: UserID) -> Result<Vec<CalendarEvent>, ReadError> {
        log_on_error!(
            self.own_calendar_events(user_id),
            ReadError,
            "get",
            "calendar events"
        )
    }

    async fn get_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayDetails, ReadError> {
        log_on_error!(
            self.own_scheduled_day_details(user_id, id),
            ReadError,
            "get",
            "scheduled day"
        )
    }

    async fn delete_scheduled_day(
        &self,
        user_id: UserID,
        id: ScheduledDayID,
    ) -> Result<ScheduledDayID, DeleteError> {
        log_on_error!(
            self.repository.delete_scheduled_day(user_id, id),
            DeleteError,
            "delete",
            "scheduled day"
        )
    }

    async fn reschedule(
        &self,
        user_id: UserID,
        request: RescheduleRequest,
    ) -> Result<RescheduleOutcome, RescheduleError> {
        log_on_error!(
            self.reschedule_day(user_id, request),
            RescheduleError,
            "reschedule",
            "scheduled day"
        )
    }

    async fn get_missing_days(&self, user_id: UserID) -> Result<Vec<MissingDay>, ReadError> {
        log_on_error!(
            self.own_missing_days(user_id),
            ReadError,
            "get",
            "missing days"
        )
    }

    async fn schedule_program(
        &self,
        user_id: UserID,
        request: ScheduleRequest,
    ) -> Result<ScheduleOutcome<ProgramInstance>, ScheduleError> {
        log_on_error!(
            self.schedule_own_program(user_id, request),
            ScheduleError,
            "schedule",
            "program"
        )
    }

    async fn schedule_missing_day(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        program_day_id: ProgramDayID,
        date: NaiveDate,
        force: bool,
    ) -> Result<ScheduleOutcome<ScheduledDay>, ScheduleError> {
        log_on_error!(
            self.schedule_own_missing_day(user_id, instance_id, program_day_id, date, force),
            ScheduleError,
            "schedule",
            "missing day"
        )
    }

    async fn get_program_instances(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ProgramInstance>, ReadError> {
        log_on_error!(
            self.repository.read_program_instances(user_id),
            ReadError,
            "get",
            "program instances"
        )
    }

    async fn delete_program_instance(
        &self,
        user_id: UserID,
        id: ProgramInstanceID,
    ) -> Result<ProgramInstanceID, DeleteError> {
        log_on_error!(
            self.repository.delete_program_instance(user_id, id),
            DeleteError,
            "delete",
            "program instance"
        )
    }

    async fn replace_instance_exercise_weight(
        &self,
        user_id: UserID,
        instance_id: ProgramInstanceID,
        weight: InstanceExerciseWeight,
    ) -> Result<InstanceExerciseWeight, UpdateError> {
        log_on_error!(
            self.replace_own_instance_exercise_weight(user_id, instance_id, weight),
            UpdateError,
            "replace",
            "instance exercise weight"
        )
    }
}

impl<R: WorkoutRepository + CalendarRepository> Service<R> {
    async fn start_or_resume_workout(
        &self,
        user_id: UserID,
        scheduled_day_id: ScheduledDayID,
    ) -> Result<WorkoutSession, WorkoutError> {
        let day = self
            .repository
            .read_scheduled_day(user_id, scheduled_day_id)
            .await?;
        if let Some(session) = self
            .repository
            .read_workout_sessions(user_id)
            .await?
            .into_iter()
            .find(|s| s.scheduled_day_id == Some(day.id) && !s.is_completed)
        {
            debug!("resuming workout session {}", session.id);
            return Ok(session);
        }
        Ok(self
            .repository
            .create_workout_session(WorkoutSession {
                id: WorkoutSessionID::nil(),
                user_id,
                scheduled_day_id: Some(day.id),
                gym_id: day.gym_id,
                started_at: now(),
                completed_at: None,
                is_completed: false,
                notes: String::new(),
                sets: vec![],
            })
            .await?)
    }

    async fn log_own_set(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        set: LoggedSet,
    ) -> Result<WorkoutSet, WorkoutError> {
        if set.set_number == 0 {
            return Err(WorkoutError::InvalidSetNumber);
        }
        let session = self
            .repository
            .read_workout_session(user_id, session_id)
            .await?;
        if session.is_completed {
            return Err(WorkoutError::Completed);
        }
        Ok(self
            .repository
            .upsert_workout_set(
                session.id,
                WorkoutSet {
                    id: WorkoutSetID::nil(),
                    exercise_id: set.exercise_id,
                    set_number: set.set_number,
                    reps: set.reps,
                    weight: set.weight,
                    rpe: set.rpe,
                    overall_rpe: None,
                    notes: set.notes,
                    completed_at: now(),
                },
            )
            .await?)
    }

    async fn save_own_overall_rpe(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        exercise_id: ExerciseID,
        overall_rpe: OverallRpe,
    ) -> Result<usize, WorkoutError> {
        let session = self
            .repository
            .read_workout_session(user_id, session_id)
            .await?;
        if !session.sets.iter().any(|s| s.exercise_id == exercise_id) {
            return Err(WorkoutError::NoSetsLogged);
        }
        Ok(self
            .repository
            .set_overall_rpe(session.id, exercise_id, overall_rpe)
            .await?)
    }

    async fn complete_own_workout(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        notes: String,
    ) -> Result<WorkoutSession, WorkoutError> {
        Ok(self
            .repository
            .complete_workout_session(user_id, session_id, notes.trim().to_string(), now())
            .await?)
    }

    async fn own_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<WorkoutSet>, ReadError> {
        let sessions = self.repository.read_workout_sessions(user_id).await?;
        Ok(previous_sets(&sessions, exercise_id, PREVIOUS_SETS_LIMIT))
    }
}

impl<R: WorkoutRepository + CalendarRepository> WorkoutService for Service<R> {
    async fn get_workout_sessions(
        &self,
        user_id: UserID,
    ) -> Result<Vec<WorkoutSession>, ReadError> {
        log_on_error!(
            self.repository.read_workout_sessions(user_id),
            ReadError,
            "get",
            "workout sessions"
        )
    }

    async fn get_workout_session(
        &self,
        user_id: UserID,
        id: WorkoutSessionID,
    ) -> Result<WorkoutSession, ReadError> {
        log_on_error!(
            self.repository.read_workout_session(user_id, id),
            ReadError,
            "get",
            "workout session"
        )
    }

    async fn start_workout(
        &self,
        user_id: UserID,
        scheduled_day_id: ScheduledDayID,
    ) -> Result<WorkoutSession, WorkoutError> {
        log_on_error!(
            self.start_or_resume_workout(user_id, scheduled_day_id),
            WorkoutError,
            "start",
            "workout"
        )
    }

    async fn start_standalone_workout(
        &self,
        user_id: UserID,
        gym_id: Option<GymID>,
    ) -> Result<WorkoutSession, CreateError> {
        log_on_error!(
            self.repository.create_workout_session(WorkoutSession {
                id: WorkoutSessionID::nil(),
                user_id,
                scheduled_day_id: None,
                gym_id,
                started_at: now(),
                completed_at: None,
                is_completed: false,
                notes: String::new(),
                sets: vec![],
            }),
            CreateError,
            "start",
            "standalone workout"
        )
    }

    async fn log_set(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        set: LoggedSet,
    ) -> Result<WorkoutSet, WorkoutError> {
        log_on_error!(
            self.log_own_set(user_id, session_id, set),
            WorkoutError,
            "log",
            "set"
        )
    }

    async fn save_overall_rpe(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        exercise_id: ExerciseID,
        overall_rpe: OverallRpe,
    ) -> Result<usize, WorkoutError> {
        log_on_error!(
            self.save_own_overall_rpe(user_id, session_id, exercise_id, overall_rpe),
            WorkoutError,
            "save",
            "overall RPE"
        )
    }

    async fn complete_workout(
        &self,
        user_id: UserID,
        session_id: WorkoutSessionID,
        notes: String,
    ) -> Result<WorkoutSession, WorkoutError> {
        log_on_error!(
            self.complete_own_workout(user_id, session_id, notes),
            WorkoutError,
            "complete",
            "workout"
        )
    }

    async fn get_previous_sets(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<WorkoutSet>, ReadError> {
        log_on_error!(
            self.own_previous_sets(user_id, exercise_id),
            ReadError,
            "get",
            "previous sets"
        )
    }
}

impl<R: BodyMetricRepository + ProfileRepository> Service<R> {
    async fn record_and_apply_body_metric(
        &self,
        user_id: UserID,
        metric: BodyMetric,
    ) -> Result<BodyMetric, CreateError> {
        let metric = self
            .repository
            .create_body_metric(BodyMetric { user_id, ..metric })
            .await?;
        let mut profile = self.repository.read_profile(user_id).await?;
        let previous = profile.clone();
        profile.update_from(&metric);
        if profile != previous {
            self.repository.replace_profile(profile).await?;
        }
        Ok(metric)
    }
}

impl<R: BodyMetricRepository + ProfileRepository> BodyMetricService for Service<R> {
    async fn get_body_metrics(&self, user_id: UserID) -> Result<Vec<BodyMetric>, ReadError> {
        log_on_error!(
            self.repository.read_body_metrics(user_id),
            ReadError,
            "get",
            "body metrics"
        )
    }

    async fn record_body_metric(
        &self,
        user_id: UserID,
        metric: BodyMetric,
    ) -> Result<BodyMetric, CreateError> {
        log_on_error!(
            self.record_and_apply_body_metric(user_id, metric),
            CreateError,
            "record",
            "body metric"
        )
    }
}

impl<R: BodyPatternRepository + UserRepository> Service<R> {
    async fn visible_patterns(&self, user_id: UserID) -> Result<Vec<BodyPattern>, ReadError> {
        let patterns = self.repository.read_body_patterns().await?;
        Ok(visible_body_patterns(patterns, user_id))
    }

    async fn create_own_body_pattern(
        &self,
        user_id: UserID,
        name: Name,
        days: Vec<String>,
        shared: bool,
    ) -> Result<BodyPattern, CreateError> {
        if days.is_empty() {
            return Err(CreateError::Other(
                "A body pattern needs at least one day".into(),
            ));
        }
        let shared = shared && self.repository.read_user(user_id).await?.is_admin;
        self.repository
            .create_body_pattern(BodyPattern {
                id: BodyPatternID::nil(),
                user_id: (!shared).then_some(user_id),
                name,
                days,
            })
            .await
    }

    async fn delete_permitted_body_pattern(
        &self,
        user_id: UserID,
        id: BodyPatternID,
    ) -> Result<BodyPatternID, DeleteError> {
        let pattern = self
            .repository
            .read_body_patterns()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(DeleteError::NotFound)?;
        if pattern.user_id != Some(user_id) && !self.repository.read_user(user_id).await?.is_admin
        {
            return Err(DeleteError::NotFound);
        }
        self.repository.delete_body_pattern(id).await
    }
}

impl<R: BodyPatternRepository + UserRepository> BodyPatternService for Service<R> {
    async fn get_body_patterns(&self, user_id: UserID) -> Result<Vec<BodyPattern>, ReadError> {
        log_on_error!(
            self.visible_patterns(user_id),
            ReadError,
            "get",
            "body patterns"
        )
    }

    async fn create_body_pattern(
        &self,
        user_id: UserID,
        name: Name,
        days: Vec<String>,
        shared: bool,
    ) -> Result<BodyPattern, CreateError> {
        log_on_error!(
            self.create_own_body_pattern(user_id, name, days, shared),
            CreateError,
            "create",
            "body pattern"
        )
    }

    async fn delete_body_pattern(
        &self,
        user_id: UserID,
        id: BodyPatternID,
    ) -> Result<BodyPatternID, DeleteError> {
        log_on_error!(
            self.delete_permitted_body_pattern(user_id, id),
            DeleteError,
            "delete",
            "body pattern"
        )
    }
}

impl<R> Service<R>
where
    R: WorkoutRepository
        + CalendarRepository
        + ProgramRepository
        + GymRepository
        + ExerciseRepository
        + BodyMetricRepository
        + ProfileRepository,
{
    async fn own_summary(&self, user_id: UserID) -> Result<Summary, ReadError> {
        let sessions = self.repository.read_workout_sessions(user_id).await?;
        let days = self.repository.read_scheduled_days(user_id).await?;
        let instances = self.repository.read_program_instances(user_id).await?;
        let programs = self.repository.read_programs(user_id).await?;
        let gyms = self.repository.read_gyms().await?;
        let exercises = self.repository.read_exercises().await?;
        let metrics = self.repository.read_body_metrics(user_id).await?;
        let profile = self.repository.read_profile(user_id).await?;
        Ok(summary(
            &sessions, &days, &instances, &programs, &gyms, &exercises, &metrics, &profile,
            now(),
        ))
    }

    async fn own_exercise_history(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<ExerciseDay>, ReadError> {
        let sessions = self.repository.read_workout_sessions(user_id).await?;
        Ok(exercise_history(&sessions, exercise_id))
    }

    async fn own_exercise_stats(&self, user_id: UserID) -> Result<Vec<ExerciseStats>, ReadError> {
        let sessions = self.repository.read_workout_sessions(user_id).await?;
        let exercises = self.repository.read_exercises().await?;
        Ok(exercise_stats(&sessions, &exercises))
    }

    async fn own_program_history(
        &self,
        user_id: UserID,
    ) -> Result<Vec<InstanceProgress>, ReadError> {
        let instances = self.repository.read_program_instances(user_id).await?;
        let days = self.repository.read_scheduled_days(user_id).await?;
        let programs = self.repository.read_programs(user_id).await?;
        let gyms = self.repository.read_gyms().await?;
        Ok(instance_progress(&instances, &days, &programs, &gyms))
    }
}

impl<R> ReportService for Service<R>
where
    R: WorkoutRepository
        + CalendarRepository
        + ProgramRepository
        + GymRepository
        + ExerciseRepository
        + BodyMetricRepository
        + ProfileRepository,
{
    async fn get_summary(&self, user_id: UserID) -> Result<Summary, ReadError> {
        log_on_error!(self.own_summary(user_id), ReadError, "get", "summary")
    }

    async fn get_exercise_history(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<ExerciseDay>, ReadError> {
        log_on_error!(
            self.own_exercise_history(user_id, exercise_id),
            ReadError,
            "get",
            "exercise history"
        )
    }

    async fn get_exercise_stats(&self, user_id: UserID) -> Result<Vec<ExerciseStats>, ReadError> {
        log_on_error!(
            self.own_exercise_stats(user_id),
            ReadError,
            "get",
            "exercise stats"
        )
    }

    async fn get_program_history(
        &self,
        user_id: UserID,
    ) -> Result<Vec<InstanceProgress>, ReadError> {
        log_on_error!(
            self.own_program_history(user_id),
            ReadError,
            "get",
            "program history"
        )
    }
}
