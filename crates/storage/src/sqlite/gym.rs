use std::collections::BTreeMap;

use ironplan_domain as domain;
use rusqlite::{Connection, Row, TransactionBehavior, params};

use super::{Error, Sqlite, encode_list, id, list, name, new_id, text};

fn gym_equipment(row: &Row) -> rusqlite::Result<(domain::GymID, domain::GymEquipment)> {
    Ok((
        id(row, 0)?,
        domain::GymEquipment {
            id: id(row, 1)?,
            equipment_id: id(row, 2)?,
            quantity: row.get(3)?,
            progression_type: text(row, 4)?,
            weight_value: row.get(5)?,
            plate_sizes: list(row, 6, "plate_sizes")?,
            stack_increment: row.get(7)?,
            notes: row.get(8)?,
        },
    ))
}

fn insert_gym_equipment(
    connection: &Connection,
    gym_id: domain::GymID,
    equipment: &domain::GymEquipment,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO gym_equipment (id, gym_id, equipment_id, quantity, progression_type,
            weight_value, plate_sizes, stack_increment, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            *equipment.id,
            *gym_id,
            *equipment.equipment_id,
            equipment.quantity,
            equipment.progression_type.as_ref(),
            equipment.weight_value,
            encode_list(&equipment.plate_sizes)?,
            equipment.stack_increment,
            equipment.notes
        ],
    )?;
    Ok(())
}

impl domain::GymRepository for Sqlite {
    async fn read_gyms(&self) -> Result<Vec<domain::Gym>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut equipment = BTreeMap::<domain::GymID, Vec<_>>::new();
                let mut statement = connection.prepare(
                    "SELECT gym_id, id, equipment_id, quantity, progression_type, weight_value,
                        plate_sizes, stack_increment, notes
                    FROM gym_equipment ORDER BY rowid",
                )?;
                for row in statement.query_map([], gym_equipment)? {
                    let (gym_id, gym_equipment) = row?;
                    equipment.entry(gym_id).or_default().push(gym_equipment);
                }

                let mut statement = connection
                    .prepare("SELECT id, user_id, name, address, is_shared FROM gyms ORDER BY name")?;
                let gyms = statement
                    .query_map([], |row| {
                        let gym_id = id(row, 0)?;
                        Ok(domain::Gym {
                            id: gym_id,
                            user_id: id(row, 1)?,
                            name: name(row, 2)?,
                            address: row.get(3)?,
                            is_shared: row.get(4)?,
                            equipment: equipment.remove(&gym_id).unwrap_or_default(),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(gyms)
            })
            .await?)
    }

    async fn create_gym(&self, gym: domain::Gym) -> Result<domain::Gym, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let gym = domain::Gym {
                    id: new_id().into(),
                    equipment: gym
                        .equipment
                        .into_iter()
                        .map(|e| domain::GymEquipment {
                            id: new_id().into(),
                            ..e
                        })
                        .collect(),
                    ..gym
                };
                let transaction = connection.transaction()?;
                transaction.execute(
                    "INSERT INTO gyms (id, user_id, name, address, is_shared)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        *gym.id,
                        *gym.user_id,
                        gym.name.as_ref(),
                        gym.address,
                        gym.is_shared
                    ],
                )?;
                for equipment in &gym.equipment {
                    insert_gym_equipment(&transaction, gym.id, equipment)?;
                }
                transaction.commit()?;
                Ok(gym)
            })
            .await?)
    }

    async fn replace_gym(&self, gym: domain::Gym) -> Result<domain::Gym, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let updated = connection.execute(
                    "UPDATE gyms SET name = ?2, address = ?3, is_shared = ?4 WHERE id = ?1",
                    params![*gym.id, gym.name.as_ref(), gym.address, gym.is_shared],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                Ok(gym)
            })
            .await?)
    }

    async fn delete_gym(&self, id: domain::GymID) -> Result<domain::GymID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM gyms WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn create_gym_equipment(
        &self,
        gym_id: domain::GymID,
        equipment: domain::GymEquipment,
    ) -> Result<domain::GymEquipment, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let equipment = domain::GymEquipment {
                    id: new_id().into(),
                    ..equipment
                };
                insert_gym_equipment(connection, gym_id, &equipment)?;
                Ok(equipment)
            })
            .await?)
    }

    async fn delete_gym_equipment(
        &self,
        id: domain::GymEquipmentID,
    ) -> Result<domain::GymEquipmentID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM gym_equipment WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn read_gym_exercises(&self) -> Result<Vec<domain::GymExercise>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT gym_id, exercise_id, notes, is_favorite FROM gym_exercises
                    ORDER BY rowid",
                )?;
                let gym_exercises = statement
                    .query_map([], |row| {
                        Ok(domain::GymExercise {
                            gym_id: id(row, 0)?,
                            exercise_id: id(row, 1)?,
                            notes: row.get(2)?,
                            is_favorite: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(gym_exercises)
            })
            .await?)
    }

    async fn replace_gym_exercise(
        &self,
        gym_exercise: domain::GymExercise,
    ) -> Result<domain::GymExercise, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let updated = connection.execute(
                    "UPDATE gym_exercises SET notes = ?3, is_favorite = ?4
                    WHERE gym_id = ?1 AND exercise_id = ?2",
                    params![
                        *gym_exercise.gym_id,
                        *gym_exercise.exercise_id,
                        gym_exercise.notes,
                        gym_exercise.is_favorite
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                Ok(gym_exercise)
            })
            .await?)
    }

    async fn sync_gym_exercises(
        &self,
        sync: domain::GymExerciseSync,
    ) -> Result<(), domain::UpdateError> {
        if sync.is_empty() {
            return Ok(());
        }
        Ok(self
            .with_connection(move |connection| {
                let transaction =
                    connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
                {
                    let mut insert = transaction.prepare(
                        "INSERT OR IGNORE INTO gym_exercises (gym_id, exercise_id) VALUES (?1, ?2)",
                    )?;
                    for (gym_id, exercise_id) in &sync.insert {
                        insert.execute(params![**gym_id, **exercise_id])?;
                    }
                    let mut remove = transaction
                        .prepare("DELETE FROM gym_exercises WHERE gym_id = ?1 AND exercise_id = ?2")?;
                    for (gym_id, exercise_id) in &sync.remove {
                        remove.execute(params![**gym_id, **exercise_id])?;
                    }
                }
                transaction.commit()?;
                Ok(())
            })
            .await?)
    }
}
