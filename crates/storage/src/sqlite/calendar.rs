use std::collections::BTreeSet;

use chrono::NaiveDate;
use ironplan_domain as domain;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Error, Sqlite, encode_list, id, list, new_id, optional_id};

const SCHEDULED_DAY_COLUMNS: &str =
    "id, user_id, program_id, program_day_id, instance_id, gym_id, date, is_completed";

fn scheduled_day(row: &Row) -> rusqlite::Result<domain::ScheduledDay> {
    Ok(domain::ScheduledDay {
        id: id(row, 0)?,
        user_id: id(row, 1)?,
        program_id: id(row, 2)?,
        program_day_id: id(row, 3)?,
        instance_id: optional_id(row, 4)?,
        gym_id: optional_id(row, 5)?,
        date: row.get(6)?,
        is_completed: row.get(7)?,
    })
}

#[derive(Serialize, Deserialize)]
struct StoredWeight {
    program_exercise_id: Uuid,
    weights: Vec<f32>,
    #[serde(default)]
    notes: String,
}

impl From<StoredWeight> for domain::InstanceExerciseWeight {
    fn from(value: StoredWeight) -> Self {
        Self {
            program_exercise_id: value.program_exercise_id.into(),
            weights: value.weights,
            notes: value.notes,
        }
    }
}

impl From<&domain::InstanceExerciseWeight> for StoredWeight {
    fn from(value: &domain::InstanceExerciseWeight) -> Self {
        Self {
            program_exercise_id: *value.program_exercise_id,
            weights: value.weights.clone(),
            notes: value.notes.clone(),
        }
    }
}

fn custom_weights(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Vec<domain::InstanceExerciseWeight>> {
    Ok(list::<StoredWeight>(row, idx, "custom_weights")?
        .into_iter()
        .map(Into::into)
        .collect())
}

fn encode_custom_weights(weights: &[domain::InstanceExerciseWeight]) -> Result<String, Error> {
    encode_list(&weights.iter().map(StoredWeight::from).collect::<Vec<_>>())
}

fn insert_scheduled_day(
    connection: &Connection,
    day: domain::ScheduledDay,
) -> Result<domain::ScheduledDay, Error> {
    let day = domain::ScheduledDay {
        id: new_id().into(),
        ..day
    };
    connection.execute(
        &format!(
            "INSERT INTO scheduled_days ({SCHEDULED_DAY_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            *day.id,
            *day.user_id,
            *day.program_id,
            *day.program_day_id,
            day.instance_id.map(|id| *id),
            day.gym_id.map(|id| *id),
            day.date,
            day.is_completed
        ],
    )?;
    Ok(day)
}

fn instance_days(
    connection: &Connection,
    instance_id: domain::ProgramInstanceID,
) -> Result<Vec<domain::ScheduledDayID>, Error> {
    let mut statement = connection.prepare(
        "SELECT id FROM scheduled_days WHERE instance_id = ?1 ORDER BY date, rowid",
    )?;
    let ids = statement
        .query_map(params![*instance_id], |row| id(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

impl domain::CalendarRepository for Sqlite {
    async fn read_scheduled_days(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::ScheduledDay>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(&format!(
                    "SELECT {SCHEDULED_DAY_COLUMNS} FROM scheduled_days
                    WHERE user_id = ?1 ORDER BY date, rowid"
                ))?;
                let days = statement
                    .query_map(params![*user_id], scheduled_day)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(days)
            })
            .await?)
    }

    async fn read_scheduled_day(
        &self,
        user_id: domain::UserID,
        id: domain::ScheduledDayID,
    ) -> Result<domain::ScheduledDay, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                Ok(connection.query_row(
                    &format!(
                        "SELECT {SCHEDULED_DAY_COLUMNS} FROM scheduled_days
                        WHERE id = ?1 AND user_id = ?2"
                    ),
                    params![*id, *user_id],
                    scheduled_day,
                )?)
            })
            .await?)
    }

    async fn find_conflict(
        &self,
        user_id: domain::UserID,
        program_id: domain::ProgramID,
        date: NaiveDate,
        excluding: Option<domain::ScheduledDayID>,
    ) -> Result<Option<domain::ScheduledDay>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                Ok(connection
                    .query_row(
                        &format!(
                            "SELECT {SCHEDULED_DAY_COLUMNS} FROM scheduled_days
                            WHERE user_id = ?1 AND program_id = ?2 AND date = ?3
                                AND (?4 IS NULL OR id != ?4)
                            ORDER BY rowid LIMIT 1"
                        ),
                        params![*user_id, *program_id, date, excluding.map(|id| *id)],
                        scheduled_day,
                    )
                    .optional()?)
            })
            .await?)
    }

    async fn read_occupied_dates(
        &self,
        user_id: domain::UserID,
        program_id: domain::ProgramID,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT DISTINCT date FROM scheduled_days
                    WHERE user_id = ?1 AND program_id = ?2 AND date BETWEEN ?3 AND ?4",
                )?;
                let dates = statement
                    .query_map(params![*user_id, *program_id, from, to], |row| {
                        row.get::<_, NaiveDate>(0)
                    })?
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok(dates)
            })
            .await?)
    }

    async fn move_scheduled_days(
        &self,
        user_id: domain::UserID,
        moves: Vec<(domain::ScheduledDayID, NaiveDate)>,
        present: BTreeSet<domain::ScheduledDayID>,
    ) -> Result<(), domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction =
                    connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let moving = moves.iter().map(|(id, _)| *id).collect::<BTreeSet<_>>();
                {
                    let mut program = transaction.prepare(
                        "SELECT program_id FROM scheduled_days WHERE id = ?1 AND user_id = ?2",
                    )?;
                    let mut occupants = transaction.prepare(
                        "SELECT id FROM scheduled_days
                        WHERE user_id = ?1 AND program_id = ?2 AND date = ?3",
                    )?;
                    for (id, date) in &moves {
                        let program_id = program
                            .query_row(params![**id, *user_id], |row| {
                                super::id::<domain::ProgramID>(row, 0)
                            })
                            .optional()?
                            .ok_or(Error::NotFound)?;
                        let occupied = occupants
                            .query_map(params![*user_id, *program_id, date], |row| {
                                super::id::<domain::ScheduledDayID>(row, 0)
                            })?
                            .collect::<Result<Vec<_>, _>>()?;
                        if occupied
                            .iter()
                            .any(|o| !moving.contains(o) && !present.contains(o))
                        {
                            return Err(Error::Conflict);
                        }
                    }
                    let mut update =
                        transaction.prepare("UPDATE scheduled_days SET date = ?2 WHERE id = ?1")?;
                    for (id, date) in &moves {
                        update.execute(params![**id, date])?;
                    }
                }
                transaction.commit()?;
                Ok(())
            })
            .await?)
    }

    async fn create_scheduled_day(
        &self,
        day: domain::ScheduledDay,
    ) -> Result<domain::ScheduledDay, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| insert_scheduled_day(connection, day))
            .await?)
    }

    async fn delete_scheduled_day(
        &self,
        user_id: domain::UserID,
        id: domain::ScheduledDayID,
    ) -> Result<domain::ScheduledDayID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute(
                "DELETE FROM scheduled_days WHERE id = ?1 AND user_id = ?2",
                params![*id, *user_id],
            )? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn read_program_instances(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::ProgramInstance>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT id, user_id, program_id, gym_id, name, scheduled_date, custom_weights
                    FROM program_instances WHERE user_id = ?1 ORDER BY scheduled_date, rowid",
                )?;
                let mut instances = statement
                    .query_map(params![*user_id], |row| {
                        Ok(domain::ProgramInstance {
                            id: id(row, 0)?,
                            user_id: id(row, 1)?,
                            program_id: id(row, 2)?,
                            gym_id: optional_id(row, 3)?,
                            name: row.get(4)?,
                            scheduled_date: row.get(5)?,
                            scheduled_days: vec![],
                            custom_weights: custom_weights(row, 6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                for instance in &mut instances {
                    instance.scheduled_days = instance_days(connection, instance.id)?;
                }
                Ok(instances)
            })
            .await?)
    }

    async fn create_program_instance(
        &self,
        instance: domain::ProgramInstance,
        days: Vec<domain::ScheduledDay>,
    ) -> Result<domain::ProgramInstance, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let instance_id: domain::ProgramInstanceID = new_id().into();
                transaction.execute(
                    "INSERT INTO program_instances (id, user_id, program_id, gym_id, name,
                        scheduled_date, custom_weights)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        *instance_id,
                        *instance.user_id,
                        *instance.program_id,
                        instance.gym_id.map(|id| *id),
                        instance.name,
                        instance.scheduled_date,
                        encode_custom_weights(&instance.custom_weights)?
                    ],
                )?;
                for day in days {
                    insert_scheduled_day(
                        &transaction,
                        domain::ScheduledDay {
                            instance_id: Some(instance_id),
                            ..day
                        },
                    )?;
                }
                let scheduled_days = instance_days(&transaction, instance_id)?;
                transaction.commit()?;
                Ok(domain::ProgramInstance {
                    id: instance_id,
                    scheduled_days,
                    ..instance
                })
            })
            .await?)
    }

    async fn delete_program_instance(
        &self,
        user_id: domain::UserID,
        id: domain::ProgramInstanceID,
    ) -> Result<domain::ProgramInstanceID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute(
                "DELETE FROM program_instances WHERE id = ?1 AND user_id = ?2",
                params![*id, *user_id],
            )? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn replace_instance_exercise_weight(
        &self,
        instance_id: domain::ProgramInstanceID,
        weight: domain::InstanceExerciseWeight,
    ) -> Result<domain::InstanceExerciseWeight, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction =
                    connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let mut weights = transaction.query_row(
                    "SELECT custom_weights FROM program_instances WHERE id = ?1",
                    params![*instance_id],
                    |row| custom_weights(row, 0),
                )?;
                match weights
                    .iter_mut()
                    .find(|w| w.program_exercise_id == weight.program_exercise_id)
                {
                    Some(existing) => existing.clone_from(&weight),
                    None => weights.push(weight.clone()),
                }
                transaction.execute(
                    "UPDATE program_instances SET custom_weights = ?2 WHERE id = ?1",
                    params![*instance_id, encode_custom_weights(&weights)?],
                )?;
                transaction.commit()?;
                Ok(weight)
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ironplan_domain::{CalendarRepository, ProgramRepository};
    use pretty_assertions::assert_eq;

    use crate::tests::data::{USER, USER_2, ppl, scheduled_day, sqlite};

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn schedule(
        db: &Sqlite,
        program: &domain::Program,
        dates: &[u32],
    ) -> Vec<domain::ScheduledDay> {
        let mut days = vec![];
        for ((_, day), d) in program.days().zip(dates) {
            days.push(
                db.create_scheduled_day(scheduled_day(program, day.id, date(*d)))
                    .await
                    .unwrap(),
            );
        }
        days
    }

    #[tokio::test]
    async fn test_read_scheduled_days() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[3, 1, 2]).await;

        assert_eq!(
            db.read_scheduled_days(USER.id).await.unwrap(),
            vec![days[1].clone(), days[2].clone(), days[0].clone()]
        );
        assert_eq!(db.read_scheduled_days(USER_2.id).await.unwrap(), vec![]);
        assert_eq!(
            db.read_scheduled_day(USER.id, days[0].id).await.unwrap(),
            days[0]
        );
        assert!(matches!(
            db.read_scheduled_day(USER_2.id, days[0].id).await,
            Err(domain::ReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_find_conflict() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let other = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[1, 2]).await;
        schedule(&db, &other, &[3]).await;

        assert_eq!(
            db.find_conflict(USER.id, program.id, date(2), None)
                .await
                .unwrap(),
            Some(days[1].clone())
        );
        assert_eq!(
            db.find_conflict(USER.id, program.id, date(2), Some(days[1].id))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            db.find_conflict(USER.id, program.id, date(3), None)
                .await
                .unwrap(),
            None,
            "days of other programs do not conflict"
        );
        assert_eq!(
            db.find_conflict(USER_2.id, program.id, date(1), None)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_read_occupied_dates() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        schedule(&db, &program, &[1, 5, 20]).await;

        assert_eq!(
            db.read_occupied_dates(USER.id, program.id, date(2), date(20))
                .await
                .unwrap(),
            BTreeSet::from([date(5), date(20)])
        );
    }

    #[tokio::test]
    async fn test_move_scheduled_days() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[1, 2]).await;

        db.move_scheduled_days(
            USER.id,
            vec![(days[0].id, date(2)), (days[1].id, date(1))],
            BTreeSet::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            db.read_scheduled_days(USER.id)
                .await
                .unwrap()
                .into_iter()
                .map(|d| (d.id, d.date))
                .collect::<Vec<_>>(),
            vec![(days[1].id, date(1)), (days[0].id, date(2))]
        );
    }

    #[tokio::test]
    async fn test_move_scheduled_days_conflict() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[1, 2, 3]).await;

        assert!(matches!(
            db.move_scheduled_days(
                USER.id,
                vec![(days[0].id, date(4)), (days[1].id, date(3))],
                BTreeSet::new(),
            )
            .await,
            Err(domain::UpdateError::Conflict)
        ));
        assert_eq!(
            db.read_scheduled_days(USER.id).await.unwrap(),
            days,
            "nothing is moved"
        );
    }

    #[tokio::test]
    async fn test_move_scheduled_days_present_occupant() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[1, 1, 2]).await;

        assert!(matches!(
            db.move_scheduled_days(
                USER.id,
                vec![(days[2].id, date(1)), (days[0].id, date(2))],
                BTreeSet::new(),
            )
            .await,
            Err(domain::UpdateError::Conflict)
        ));

        db.move_scheduled_days(
            USER.id,
            vec![(days[2].id, date(1)), (days[0].id, date(2))],
            BTreeSet::from([days[1].id]),
        )
        .await
        .unwrap();

        assert_eq!(
            db.read_scheduled_days(USER.id)
                .await
                .unwrap()
                .into_iter()
                .map(|d| (d.id, d.date))
                .collect::<BTreeSet<_>>(),
            BTreeSet::from([
                (days[0].id, date(2)),
                (days[1].id, date(1)),
                (days[2].id, date(1))
            ])
        );
    }

    #[tokio::test]
    async fn test_move_scheduled_days_foreign_day() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let days = schedule(&db, &program, &[1]).await;

        assert!(matches!(
            db.move_scheduled_days(USER_2.id, vec![(days[0].id, date(4))], BTreeSet::new())
                .await,
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_program_instance() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let day_ids = program.days().map(|(_, d)| d.id).collect::<Vec<_>>();

        let instance = db
            .create_program_instance(
                domain::ProgramInstance {
                    id: domain::ProgramInstanceID::nil(),
                    user_id: USER.id,
                    program_id: program.id,
                    gym_id: None,
                    name: "Spring".into(),
                    scheduled_date: date(1),
                    scheduled_days: vec![],
                    custom_weights: vec![],
                },
                vec![
                    scheduled_day(&program, day_ids[1], date(2)),
                    scheduled_day(&program, day_ids[0], date(1)),
                ],
            )
            .await
            .unwrap();

        let days = db.read_scheduled_days(USER.id).await.unwrap();
        assert_eq!(
            instance.scheduled_days,
            days.iter().map(|d| d.id).collect::<Vec<_>>()
        );
        assert!(days.iter().all(|d| d.instance_id == Some(instance.id)));
        assert_eq!(
            db.read_program_instances(USER.id).await.unwrap(),
            vec![instance.clone()]
        );

        assert!(matches!(
            db.create_scheduled_day(domain::ScheduledDay {
                instance_id: Some(instance.id),
                ..scheduled_day(&program, day_ids[0], date(9))
            })
            .await,
            Err(domain::CreateError::Conflict)
        ));

        assert!(matches!(
            db.delete_program_instance(USER_2.id, instance.id).await,
            Err(domain::DeleteError::NotFound)
        ));
        db.delete_program_instance(USER.id, instance.id)
            .await
            .unwrap();
        assert_eq!(db.read_program_instances(USER.id).await.unwrap(), vec![]);
        assert_eq!(db.read_scheduled_days(USER.id).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_replace_instance_exercise_weight() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let instance = db
            .create_program_instance(
                domain::ProgramInstance {
                    id: domain::ProgramInstanceID::nil(),
                    user_id: USER.id,
                    program_id: program.id,
                    gym_id: None,
                    name: "PPL".into(),
                    scheduled_date: date(1),
                    scheduled_days: vec![],
                    custom_weights: vec![],
                },
                vec![],
            )
            .await
            .unwrap();
        let weight = domain::InstanceExerciseWeight {
            program_exercise_id: 7.into(),
            weights: vec![60.0, 62.5],
            notes: String::new(),
        };

        db.replace_instance_exercise_weight(instance.id, weight.clone())
            .await
            .unwrap();
        let weight = domain::InstanceExerciseWeight {
            weights: vec![65.0],
            ..weight
        };
        db.replace_instance_exercise_weight(instance.id, weight.clone())
            .await
            .unwrap();

        assert_eq!(
            db.read_program_instances(USER.id).await.unwrap()[0].custom_weights,
            vec![weight]
        );
    }

    #[tokio::test]
    async fn test_read_program_instances_malformed_weights() {
        let db = sqlite().await;
        let program = db.create_program(ppl(USER.id)).await.unwrap();
        let program_id = program.id;
        db.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO program_instances (id, user_id, program_id, name, scheduled_date,
                    custom_weights)
                VALUES (?1, ?2, ?3, 'PPL', '2024-03-01', '{60, 65}')",
                params![new_id(), *USER.id, *program_id],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let instances = db.read_program_instances(USER.id).await.unwrap();

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].custom_weights, vec![]);
    }
}
