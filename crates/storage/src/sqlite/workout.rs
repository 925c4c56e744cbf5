use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use ironplan_domain as domain;
use rusqlite::{Connection, Row, params};

use super::{Error, Sqlite, id, new_id, optional_id, optional_text};

const SESSION_COLUMNS: &str =
    "id, user_id, scheduled_day_id, gym_id, started_at, completed_at, is_completed, notes";

fn workout_session(row: &Row) -> rusqlite::Result<domain::WorkoutSession> {
    Ok(domain::WorkoutSession {
        id: id(row, 0)?,
        user_id: id(row, 1)?,
        scheduled_day_id: optional_id(row, 2)?,
        gym_id: optional_id(row, 3)?,
        started_at: row.get(4)?,
        completed_at: row.get(5)?,
        is_completed: row.get(6)?,
        notes: row.get(7)?,
        sets: vec![],
    })
}

fn workout_set(row: &Row) -> rusqlite::Result<(domain::WorkoutSessionID, domain::WorkoutSet)> {
    Ok((
        id(row, 0)?,
        domain::WorkoutSet {
            id: id(row, 1)?,
            exercise_id: id(row, 2)?,
            set_number: row.get(3)?,
            reps: row.get(4)?,
            weight: row.get(5)?,
            rpe: row.get(6)?,
            overall_rpe: optional_text(row, 7)?,
            notes: row.get(8)?,
            completed_at: row.get(9)?,
        },
    ))
}

fn read_sessions(
    connection: &Connection,
    user_id: domain::UserID,
    id: Option<domain::WorkoutSessionID>,
) -> Result<Vec<domain::WorkoutSession>, Error> {
    let mut sets = BTreeMap::<domain::WorkoutSessionID, Vec<_>>::new();
    let mut statement = connection.prepare(
        "SELECT ws.session_id, ws.id, ws.exercise_id, ws.set_number, ws.reps, ws.weight, ws.rpe,
            ws.overall_rpe, ws.notes, ws.completed_at
        FROM workout_sets ws JOIN workout_sessions s ON s.id = ws.session_id
        WHERE s.user_id = ?1 AND (?2 IS NULL OR s.id = ?2)
        ORDER BY ws.exercise_id, ws.set_number",
    )?;
    for row in statement.query_map(params![*user_id, id.map(|id| *id)], workout_set)? {
        let (session_id, set) = row?;
        sets.entry(session_id).or_default().push(set);
    }

    let mut statement = connection.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM workout_sessions
        WHERE user_id = ?1 AND (?2 IS NULL OR id = ?2)
        ORDER BY started_at, rowid"
    ))?;
    let sessions = statement
        .query_map(params![*user_id, id.map(|id| *id)], |row| {
            let mut session = workout_session(row)?;
            session.sets = sets.remove(&session.id).unwrap_or_default();
            Ok(session)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

fn read_session(
    connection: &Connection,
    user_id: domain::UserID,
    id: domain::WorkoutSessionID,
) -> Result<domain::WorkoutSession, Error> {
    read_sessions(connection, user_id, Some(id))?
        .pop()
        .ok_or(Error::NotFound)
}

impl domain::WorkoutRepository for Sqlite {
    async fn read_workout_sessions(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| read_sessions(connection, user_id, None))
            .await?)
    }

    async fn read_workout_session(
        &self,
        user_id: domain::UserID,
        id: domain::WorkoutSessionID,
    ) -> Result<domain::WorkoutSession, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| read_session(connection, user_id, id))
            .await?)
    }

    async fn create_workout_session(
        &self,
        session: domain::WorkoutSession,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let session = domain::WorkoutSession {
                    id: new_id().into(),
                    sets: vec![],
                    ..session
                };
                connection.execute(
                    &format!(
                        "INSERT INTO workout_sessions ({SESSION_COLUMNS})
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                    ),
                    params![
                        *session.id,
                        *session.user_id,
                        session.scheduled_day_id.map(|id| *id),
                        session.gym_id.map(|id| *id),
                        session.started_at,
                        session.completed_at,
                        session.is_completed,
                        session.notes
                    ],
                )?;
                Ok(session)
            })
            .await?)
    }

    async fn upsert_workout_set(
        &self,
        session_id: domain::WorkoutSessionID,
        set: domain::WorkoutSet,
    ) -> Result<domain::WorkoutSet, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let (set_id, overall_rpe) = connection.query_row(
                    "INSERT INTO workout_sets (id, session_id, exercise_id, set_number, reps, weight,
                        rpe, notes, completed_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT (session_id, exercise_id, set_number) DO UPDATE SET
                        reps = excluded.reps,
                        weight = excluded.weight,
                        rpe = excluded.rpe,
                        notes = excluded.notes,
                        completed_at = excluded.completed_at
                    RETURNING id, overall_rpe",
                    params![
                        new_id(),
                        *session_id,
                        *set.exercise_id,
                        set.set_number,
                        set.reps,
                        set.weight,
                        set.rpe,
                        set.notes,
                        set.completed_at
                    ],
                    |row| {
                        Ok((
                            id::<domain::WorkoutSetID>(row, 0)?,
                            optional_text::<domain::OverallRpe>(row, 1)?,
                        ))
                    },
                )?;
                Ok(domain::WorkoutSet {
                    id: set_id,
                    overall_rpe,
                    ..set
                })
            })
            .await?)
    }

    async fn set_overall_rpe(
        &self,
        session_id: domain::WorkoutSessionID,
        exercise_id: domain::ExerciseID,
        overall_rpe: domain::OverallRpe,
    ) -> Result<usize, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                Ok(connection.execute(
                    "UPDATE workout_sets SET overall_rpe = ?3 WHERE session_id = ?1 AND exercise_id = ?2",
                    params![*session_id, *exercise_id, overall_rpe.as_ref()],
                )?)
            })
            .await?)
    }

    async fn complete_workout_session(
        &self,
        user_id: domain::UserID,
        id: domain::WorkoutSessionID,
        notes: String,
        completed_at: NaiveDateTime,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let updated = transaction.execute(
                    "UPDATE workout_sessions SET is_completed = 1, completed_at = ?3, notes = ?4
                    WHERE id = ?1 AND user_id = ?2",
                    params![*id, *user_id, completed_at, notes],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                transaction.execute(
                    "UPDATE scheduled_days SET is_completed = 1
                    WHERE id = (SELECT scheduled_day_id FROM workout_sessions WHERE id = ?1)",
                    params![*id],
                )?;
                let session = read_session(&transaction, user_id, id)?;
                transaction.commit()?;
                Ok(session)
            })
            .await?)
    }
}
