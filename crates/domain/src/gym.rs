use std::collections::BTreeSet;

use strum::{AsRefStr, EnumIter, EnumString};

use crate::{
    CreateError, DeleteError, EquipmentID, Exercise, ExerciseID, Name, ReadError, UpdateError,
    UserID, ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait GymService {
    async fn get_gyms(&self, user_id: UserID) -> Result<Vec<Gym>, ReadError>;
    async fn get_gym(&self, user_id: UserID, id: GymID) -> Result<Gym, ReadError>;
    async fn create_gym(
        &self,
        user_id: UserID,
        name: Name,
        address: Option<String>,
        is_shared: bool,
    ) -> Result<Gym, CreateError>;
    async fn replace_gym(&self, user_id: UserID, gym: Gym) -> Result<Gym, UpdateError>;
    async fn delete_gym(&self, user_id: UserID, id: GymID) -> Result<GymID, DeleteError>;
    async fn add_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        equipment: GymEquipment,
    ) -> Result<GymEquipment, CreateError>;
    async fn remove_gym_equipment(
        &self,
        user_id: UserID,
        gym_id: GymID,
        id: GymEquipmentID,
    ) -> Result<GymEquipmentID, DeleteError>;
    async fn get_gym_exercises(
        &self,
        user_id: UserID,
        gym_id: GymID,
    ) -> Result<Vec<GymExercise>, ReadError>;
    async fn replace_gym_exercise(
        &self,
        user_id: UserID,
        gym_exercise: GymExercise,
    ) -> Result<GymExercise, UpdateError>;

    fn validate_plate_sizes(&self, plate_sizes: &str) -> Result<Vec<f32>, ValidationError> {
        parse_plate_sizes(plate_sizes)
    }

    fn validate_progression_type(
        &self,
        progression_type: &str,
    ) -> Result<ProgressionType, ValidationError> {
        progression_type
            .parse::<ProgressionType>()
            .map_err(|_| ValidationError::Other("Invalid progression type".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait GymRepository {
    /// Returns the gyms of all users.
    async fn read_gyms(&self) -> Result<Vec<Gym>, ReadError>;
    /// The ids of the given gym and its equipment are replaced by newly generated ones.
    async fn create_gym(&self, gym: Gym) -> Result<Gym, CreateError>;
    /// Replaces name, address and sharing state. Equipment is left unchanged.
    async fn replace_gym(&self, gym: Gym) -> Result<Gym, UpdateError>;
    async fn delete_gym(&self, id: GymID) -> Result<GymID, DeleteError>;
    /// Fails with a conflict if the equipment is already part of the gym.
    async fn create_gym_equipment(
        &self,
        gym_id: GymID,
        equipment: GymEquipment,
    ) -> Result<GymEquipment, CreateError>;
    async fn delete_gym_equipment(&self, id: GymEquipmentID)
    -> Result<GymEquipmentID, DeleteError>;
    async fn read_gym_exercises(&self) -> Result<Vec<GymExercise>, ReadError>;
    async fn replace_gym_exercise(
        &self,
        gym_exercise: GymExercise,
    ) -> Result<GymExercise, UpdateError>;
    /// Applies all insertions and removals atomically. Existing rows are kept as they are.
    async fn sync_gym_exercises(&self, sync: GymExerciseSync) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gym {
    pub id: GymID,
    pub user_id: UserID,
    pub name: Name,
    pub address: Option<String>,
    pub is_shared: bool,
    pub equipment: Vec<GymEquipment>,
}

impl Gym {
    #[must_use]
    pub fn equipment_ids(&self) -> BTreeSet<EquipmentID> {
        self.equipment.iter().map(|e| e.equipment_id).collect()
    }

    #[must_use]
    pub fn is_visible_to(&self, user_id: UserID) -> bool {
        self.user_id == user_id || self.is_shared
    }
}

id!(GymID);

#[derive(Debug, Clone, PartialEq)]
pub struct GymEquipment {
    pub id: GymEquipmentID,
    pub equipment_id: EquipmentID,
    pub quantity: u32,
    pub progression_type: ProgressionType,
    pub weight_value: Option<f32>,
    pub plate_sizes: Vec<f32>,
    pub stack_increment: Option<f32>,
    pub notes: String,
}

id!(GymEquipmentID);

#[derive(AsRefStr, EnumString, EnumIter, Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ProgressionType {
    #[default]
    Plates,
    Stack,
    Increments,
    Percentage,
    Time,
    Reps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GymExercise {
    pub gym_id: GymID,
    pub exercise_id: ExerciseID,
    pub notes: String,
    pub is_favorite: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GymExerciseSync {
    pub insert: BTreeSet<(GymID, ExerciseID)>,
    pub remove: BTreeSet<(GymID, ExerciseID)>,
}

impl GymExerciseSync {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.remove.is_empty()
    }
}

/// Parses a comma separated list of positive plate weights.
pub fn parse_plate_sizes(plate_sizes: &str) -> Result<Vec<f32>, ValidationError> {
    plate_sizes
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<f32>() {
            Ok(size) if size > 0.0 => Ok(size),
            _ => Err(ValidationError::Other(
                "Plate sizes must be positive decimal numbers".into(),
            )),
        })
        .collect()
}

/// An exercise is available at a gym if the gym provides every piece of required equipment.
/// Exercises without required equipment are available everywhere.
#[must_use]
pub fn is_exercise_available(exercise: &Exercise, gym_equipment: &BTreeSet<EquipmentID>) -> bool {
    exercise.equipment.is_subset(gym_equipment)
}

/// Determines the gym exercise rows to insert and remove after the equipment of a gym changed.
#[must_use]
pub fn sync_gym(
    gym: &Gym,
    exercises: &[Exercise],
    gym_exercises: &[GymExercise],
) -> GymExerciseSync {
    let equipment = gym.equipment_ids();
    let associated = gym_exercises
        .iter()
        .filter(|ge| ge.gym_id == gym.id)
        .map(|ge| ge.exercise_id)
        .collect::<BTreeSet<_>>();
    let mut sync = GymExerciseSync::default();

    for exercise in exercises {
        let available = is_exercise_available(exercise, &equipment);
        let present = associated.contains(&exercise.id);
        if available && !present {
            sync.insert.insert((gym.id, exercise.id));
        } else if !available && present {
            sync.remove.insert((gym.id, exercise.id));
        }
    }

    sync
}

/// Determines the gym exercise rows to insert and remove after the required equipment of an
/// exercise changed.
#[must_use]
pub fn sync_exercise(
    exercise: &Exercise,
    gyms: &[Gym],
    gym_exercises: &[GymExercise],
) -> GymExerciseSync {
    let associated = gym_exercises
        .iter()
        .filter(|ge| ge.exercise_id == exercise.id)
        .map(|ge| ge.gym_id)
        .collect::<BTreeSet<_>>();
    let mut sync = GymExerciseSync::default();

    for gym in gyms {
        let available = is_exercise_available(exercise, &gym.equipment_ids());
        let present = associated.contains(&gym.id);
        if available && !present {
            sync.insert.insert((gym.id, exercise.id));
        } else if !available && present {
            sync.remove.insert((gym.id, exercise.id));
        }
    }

    sync
}
