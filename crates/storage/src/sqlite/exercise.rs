use std::collections::{BTreeMap, BTreeSet};

use ironplan_domain as domain;
use log::warn;
use rusqlite::{Row, Transaction, params};

use super::{Error, Sqlite, encode_list, id, list, name, new_id, optional_text, text};

/// Unknown muscle groups are dropped.
fn secondary_muscles(row: &Row, idx: usize) -> rusqlite::Result<Vec<domain::MuscleGroup>> {
    Ok(list::<String>(row, idx, "secondary_muscles")?
        .into_iter()
        .filter_map(|muscle| {
            muscle
                .parse::<domain::MuscleGroup>()
                .inspect_err(|_| warn!("ignoring unknown muscle group {muscle:?}"))
                .ok()
        })
        .collect())
}

fn insert_equipment(transaction: &Transaction, exercise: &domain::Exercise) -> Result<(), Error> {
    let mut statement = transaction.prepare(
        "INSERT INTO exercise_equipment (exercise_id, equipment_id) VALUES (?1, ?2)",
    )?;
    for equipment_id in &exercise.equipment {
        statement.execute(params![*exercise.id, **equipment_id])?;
    }
    Ok(())
}

fn muscle_names(exercise: &domain::Exercise) -> Result<String, Error> {
    encode_list(
        &exercise
            .secondary_muscles
            .iter()
            .map(AsRef::<str>::as_ref)
            .collect::<Vec<_>>(),
    )
}

impl domain::ExerciseRepository for Sqlite {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut equipment = BTreeMap::<domain::ExerciseID, BTreeSet<_>>::new();
                let mut statement =
                    connection.prepare("SELECT exercise_id, equipment_id FROM exercise_equipment")?;
                let rows = statement.query_map([], |row| {
                    Ok((
                        id::<domain::ExerciseID>(row, 0)?,
                        id::<domain::EquipmentID>(row, 1)?,
                    ))
                })?;
                for row in rows {
                    let (exercise_id, equipment_id) = row?;
                    equipment.entry(exercise_id).or_default().insert(equipment_id);
                }

                let mut statement = connection.prepare(
                    "SELECT id, name, description, category, primary_muscle, secondary_muscles,
                        difficulty, created_by
                    FROM exercises ORDER BY name",
                )?;
                let exercises = statement
                    .query_map([], |row| {
                        let exercise_id = id(row, 0)?;
                        Ok(domain::Exercise {
                            id: exercise_id,
                            name: name(row, 1)?,
                            description: row.get(2)?,
                            category: text(row, 3)?,
                            primary_muscle: optional_text(row, 4)?,
                            secondary_muscles: secondary_muscles(row, 5)?,
                            difficulty: optional_text(row, 6)?,
                            equipment: equipment.remove(&exercise_id).unwrap_or_default(),
                            created_by: id(row, 7)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(exercises)
            })
            .await?)
    }

    async fn create_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let exercise = domain::Exercise {
                    id: new_id().into(),
                    ..exercise
                };
                let transaction = connection.transaction()?;
                transaction.execute(
                    "INSERT INTO exercises (id, name, description, category, primary_muscle,
                        secondary_muscles, difficulty, created_by)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        *exercise.id,
                        exercise.name.as_ref(),
                        exercise.description,
                        exercise.category.as_ref(),
                        exercise.primary_muscle.map(|m| m.as_ref().to_string()),
                        muscle_names(&exercise)?,
                        exercise.difficulty.map(|d| d.as_ref().to_string()),
                        *exercise.created_by
                    ],
                )?;
                insert_equipment(&transaction, &exercise)?;
                transaction.commit()?;
                Ok(exercise)
            })
            .await?)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let updated = transaction.execute(
                    "UPDATE exercises SET name = ?2, description = ?3, category = ?4,
                        primary_muscle = ?5, secondary_muscles = ?6, difficulty = ?7
                    WHERE id = ?1",
                    params![
                        *exercise.id,
                        exercise.name.as_ref(),
                        exercise.description,
                        exercise.category.as_ref(),
                        exercise.primary_muscle.map(|m| m.as_ref().to_string()),
                        muscle_names(&exercise)?,
                        exercise.difficulty.map(|d| d.as_ref().to_string())
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                transaction.execute(
                    "DELETE FROM exercise_equipment WHERE exercise_id = ?1",
                    params![*exercise.id],
                )?;
                insert_equipment(&transaction, &exercise)?;
                transaction.commit()?;
                Ok(exercise)
            })
            .await?)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM exercises WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn read_exercise_preferences(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::ExercisePreference>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT exercise_id, rating, notes FROM exercise_preferences
                    WHERE user_id = ?1",
                )?;
                let preferences = statement
                    .query_map(params![*user_id], |row| {
                        Ok(domain::ExercisePreference {
                            user_id,
                            exercise_id: id(row, 0)?,
                            rating: row.get(1)?,
                            notes: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(preferences)
            })
            .await?)
    }

    async fn replace_exercise_preference(
        &self,
        preference: domain::ExercisePreference,
    ) -> Result<domain::ExercisePreference, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                connection.execute(
                    "INSERT INTO exercise_preferences (user_id, exercise_id, rating, notes)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT (user_id, exercise_id) DO UPDATE SET
                        rating = excluded.rating,
                        notes = excluded.notes",
                    params![
                        *preference.user_id,
                        *preference.exercise_id,
                        preference.rating,
                        preference.notes
                    ],
                )?;
                Ok(preference)
            })
            .await?)
    }
}
