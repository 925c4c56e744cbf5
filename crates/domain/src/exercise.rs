use std::collections::BTreeSet;

use strum::{AsRefStr, EnumIter, EnumString};

use crate::{
    CreateError, DeleteError, EquipmentID, Name, ReadError, UpdateError, UserID, ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, CreateError>;
    async fn replace_exercise(
        &self,
        user_id: UserID,
        exercise: Exercise,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(
        &self,
        user_id: UserID,
        id: ExerciseID,
    ) -> Result<ExerciseID, DeleteError>;
    /// Returns an empty preference if the user has not rated the exercise yet.
    async fn get_exercise_preference(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ExercisePreference, ReadError>;
    async fn replace_exercise_preference(
        &self,
        user_id: UserID,
        preference: ExercisePreference,
    ) -> Result<ExercisePreference, UpdateError>;

    fn validate_rating(&self, rating: &str) -> Result<Option<u8>, ValidationError> {
        parse_rating(rating)
    }

    fn validate_category(&self, category: &str) -> Result<Category, ValidationError> {
        category
            .parse::<Category>()
            .map_err(|_| ValidationError::Other("Invalid category".into()))
    }

    fn validate_muscle_group(&self, muscle_group: &str) -> Result<MuscleGroup, ValidationError> {
        muscle_group
            .parse::<MuscleGroup>()
            .map_err(|_| ValidationError::Other("Invalid muscle group".into()))
    }

    fn validate_difficulty(&self, difficulty: &str) -> Result<Difficulty, ValidationError> {
        difficulty
            .to_lowercase()
            .parse::<Difficulty>()
            .map_err(|_| ValidationError::Other("Invalid difficulty".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    /// The id of the given exercise is replaced by a newly generated one.
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
    async fn read_exercise_preferences(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ExercisePreference>, ReadError>;
    /// Inserts the preference or overwrites the stored one of the same user and exercise.
    async fn replace_exercise_preference(
        &self,
        preference: ExercisePreference,
    ) -> Result<ExercisePreference, UpdateError>;
}

pub const MAX_RATING: u8 = 5;

/// An empty rating clears it.
pub fn parse_rating(rating: &str) -> Result<Option<u8>, ValidationError> {
    let rating = rating.trim();
    if rating.is_empty() {
        return Ok(None);
    }
    match rating.parse::<u8>() {
        Ok(value) if (1..=MAX_RATING).contains(&value) => Ok(Some(value)),
        _ => Err(ValidationError::Other(
            "Rating must be between 1 and 5".into(),
        )),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub description: String,
    pub category: Category,
    pub primary_muscle: Option<MuscleGroup>,
    pub secondary_muscles: Vec<MuscleGroup>,
    pub difficulty: Option<Difficulty>,
    /// Equipment that a gym must provide for the exercise to be available there.
    pub equipment: BTreeSet<EquipmentID>,
    pub created_by: UserID,
}

id!(ExerciseID);

/// Personal rating and notes of a user for an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExercisePreference {
    pub user_id: UserID,
    pub exercise_id: ExerciseID,
    pub rating: Option<u8>,
    pub notes: String,
}

impl ExercisePreference {
    #[must_use]
    pub fn new(user_id: UserID, exercise_id: ExerciseID) -> Self {
        Self {
            user_id,
            exercise_id,
            rating: None,
            notes: String::new(),
        }
    }
}

#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Category {
    Strength,
    Cardio,
    Stretch,
    Resistance,
    Bodyweight,
}

#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    #[strum(serialize = "Full Body")]
    FullBody,
    Cardio,
}

#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseFilter {
    pub search: String,
    pub category: Option<Category>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        let search = self.search.trim().to_lowercase();
        exercises
            .filter(|e| {
                (search.is_empty()
                    || e.name.as_ref().to_lowercase().contains(&search)
                    || e.description.to_lowercase().contains(&search))
                    && self.category.is_none_or(|c| c == e.category)
            })
            .collect()
    }
}
