use ironplan_domain as domain;
use rusqlite::{Connection, Row, TransactionBehavior, params};

use super::{Error, Sqlite, encode_list, id, list, name, new_id, text};

const PROGRAM_COLUMNS: &str = "id, user_id, name, description, notes, duration_weeks, \
    days_per_week, is_template";

fn program(row: &Row) -> rusqlite::Result<domain::Program> {
    Ok(domain::Program {
        id: id(row, 0)?,
        user_id: id(row, 1)?,
        name: name(row, 2)?,
        description: row.get(3)?,
        notes: row.get(4)?,
        duration_weeks: row.get(5)?,
        days_per_week: row.get(6)?,
        is_template: row.get(7)?,
        weeks: vec![],
        shares: vec![],
    })
}

fn read_shares(
    connection: &Connection,
    program_id: domain::ProgramID,
) -> Result<Vec<domain::ProgramShare>, Error> {
    let mut statement = connection.prepare(
        "SELECT program_shares.id, program_shares.user_id FROM program_shares
        JOIN users ON users.id = program_shares.user_id
        WHERE program_id = ?1 ORDER BY users.name",
    )?;
    let shares = statement
        .query_map(params![*program_id], |row| {
            Ok(domain::ProgramShare {
                id: id(row, 0)?,
                program_id,
                user_id: id(row, 1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(shares)
}

fn program_exercise(row: &Row) -> rusqlite::Result<domain::ProgramExercise> {
    Ok(domain::ProgramExercise {
        id: id(row, 0)?,
        exercise_id: id(row, 1)?,
        position: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
        lift_time_seconds: row.get(5)?,
        rest_time_seconds: row.get(6)?,
        starting_weights: list(row, 7, "starting_weights")?,
        target_rpe: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn program_week(row: &Row) -> rusqlite::Result<domain::ProgramWeek> {
    Ok(domain::ProgramWeek {
        id: id(row, 0)?,
        week_number: row.get(1)?,
        name: row.get(2)?,
        is_deload: row.get(3)?,
        notes: row.get(4)?,
        days: vec![],
    })
}

fn read_weeks(
    connection: &Connection,
    program_id: domain::ProgramID,
) -> Result<Vec<domain::ProgramWeek>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, week_number, name, is_deload, notes FROM program_weeks
        WHERE program_id = ?1 ORDER BY week_number",
    )?;
    let mut weeks = statement
        .query_map(params![*program_id], program_week)?
        .collect::<Result<Vec<_>, _>>()?;
    for week in &mut weeks {
        week.days = read_days(connection, week.id)?;
    }
    Ok(weeks)
}

fn read_days(
    connection: &Connection,
    week_id: domain::ProgramWeekID,
) -> Result<Vec<domain::ProgramDay>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, day_number, name, is_rest_day, notes FROM program_days
        WHERE week_id = ?1 ORDER BY day_number",
    )?;
    let mut days = statement
        .query_map(params![*week_id], program_day)?
        .collect::<Result<Vec<_>, _>>()?;
    for day in &mut days {
        day.series = read_series(connection, day.id)?;
    }
    Ok(days)
}

fn program_day(row: &Row) -> rusqlite::Result<domain::ProgramDay> {
    Ok(domain::ProgramDay {
        id: id(row, 0)?,
        day_number: row.get(1)?,
        name: row.get(2)?,
        is_rest_day: row.get(3)?,
        notes: row.get(4)?,
        series: vec![],
    })
}

fn read_day(
    connection: &Connection,
    id: domain::ProgramDayID,
) -> Result<domain::ProgramDay, Error> {
    let mut day = connection.query_row(
        "SELECT id, day_number, name, is_rest_day, notes FROM program_days WHERE id = ?1",
        params![*id],
        program_day,
    )?;
    day.series = read_series(connection, day.id)?;
    Ok(day)
}

fn read_series(
    connection: &Connection,
    day_id: domain::ProgramDayID,
) -> Result<Vec<domain::ProgramSeries>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, order_index, series_type, time_seconds, notes FROM program_series
        WHERE day_id = ?1 ORDER BY order_index",
    )?;
    let mut series = statement
        .query_map(params![*day_id], |row| {
            Ok(domain::ProgramSeries {
                id: id(row, 0)?,
                order_index: row.get(1)?,
                series_type: text(row, 2)?,
                time_seconds: row.get(3)?,
                notes: row.get(4)?,
                exercises: vec![],
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for s in &mut series {
        s.exercises = read_program_exercises(connection, s.id)?;
    }
    Ok(series)
}

fn read_program_exercises(
    connection: &Connection,
    series_id: domain::ProgramSeriesID,
) -> Result<Vec<domain::ProgramExercise>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, exercise_id, position, sets, reps, lift_time_seconds, rest_time_seconds,
            starting_weights, target_rpe, notes
        FROM program_exercises WHERE series_id = ?1 ORDER BY position",
    )?;
    let exercises = statement
        .query_map(params![*series_id], program_exercise)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(exercises)
}

fn read_program(
    connection: &Connection,
    id: domain::ProgramID,
) -> Result<domain::Program, Error> {
    let mut program = connection.query_row(
        &format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = ?1"),
        params![*id],
        program,
    )?;
    program.weeks = read_weeks(connection, program.id)?;
    program.shares = read_shares(connection, program.id)?;
    Ok(program)
}

fn insert_series(
    connection: &Connection,
    day_id: domain::ProgramDayID,
    series: domain::ProgramSeries,
) -> Result<domain::ProgramSeries, Error> {
    let series = domain::ProgramSeries {
        id: new_id().into(),
        ..series
    };
    connection.execute(
        "INSERT INTO program_series (id, day_id, order_index, series_type, time_seconds, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            *series.id,
            *day_id,
            series.order_index,
            series.series_type.as_ref(),
            series.time_seconds,
            series.notes
        ],
    )?;
    let exercises = series
        .exercises
        .into_iter()
        .map(|exercise| insert_program_exercise(connection, series.id, exercise))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(domain::ProgramSeries { exercises, ..series })
}

fn insert_program_exercise(
    connection: &Connection,
    series_id: domain::ProgramSeriesID,
    exercise: domain::ProgramExercise,
) -> Result<domain::ProgramExercise, Error> {
    let exercise = domain::ProgramExercise {
        id: new_id().into(),
        ..exercise
    };
    connection.execute(
        "INSERT INTO program_exercises (id, series_id, exercise_id, position, sets, reps,
            lift_time_seconds, rest_time_seconds, starting_weights, target_rpe, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            *exercise.id,
            *series_id,
            *exercise.exercise_id,
            exercise.position,
            exercise.sets,
            exercise.reps,
            exercise.lift_time_seconds,
            exercise.rest_time_seconds,
            encode_list(&exercise.starting_weights)?,
            exercise.target_rpe,
            exercise.notes
        ],
    )?;
    Ok(exercise)
}

fn update_program_exercise(
    connection: &Connection,
    series_id: domain::ProgramSeriesID,
    exercise: &domain::ProgramExercise,
) -> Result<(), Error> {
    let updated = connection.execute(
        "UPDATE program_exercises SET exercise_id = ?3, position = ?4, sets = ?5, reps = ?6,
            lift_time_seconds = ?7, rest_time_seconds = ?8, starting_weights = ?9,
            target_rpe = ?10, notes = ?11
        WHERE id = ?1 AND series_id = ?2",
        params![
            *exercise.id,
            *series_id,
            *exercise.exercise_id,
            exercise.position,
            exercise.sets,
            exercise.reps,
            exercise.lift_time_seconds,
            exercise.rest_time_seconds,
            encode_list(&exercise.starting_weights)?,
            exercise.target_rpe,
            exercise.notes
        ],
    )?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    Ok(())
}

impl domain::ProgramRepository for Sqlite {
    async fn read_programs(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::Program>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(&format!(
                    "SELECT {PROGRAM_COLUMNS} FROM programs
                    WHERE user_id = ?1
                        OR is_template = 1
                        OR id IN (SELECT program_id FROM program_shares WHERE user_id = ?1)
                    ORDER BY name"
                ))?;
                let mut programs = statement
                    .query_map(params![*user_id], program)?
                    .collect::<Result<Vec<_>, _>>()?;
                for program in &mut programs {
                    program.weeks = read_weeks(connection, program.id)?;
                    program.shares = read_shares(connection, program.id)?;
                }
                Ok(programs)
            })
            .await?)
    }

    async fn create_program(
        &self,
        program: domain::Program,
    ) -> Result<domain::Program, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let program_id: domain::ProgramID = new_id().into();
                transaction.execute(
                    "INSERT INTO programs (id, user_id, name, description, notes, duration_weeks,
                        days_per_week, is_template)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        *program_id,
                        *program.user_id,
                        program.name.as_ref(),
                        program.description,
                        program.notes,
                        program.duration_weeks,
                        program.days_per_week,
                        program.is_template
                    ],
                )?;
                let mut weeks = Vec::with_capacity(program.weeks.len());
                for week in program.weeks {
                    let week_id: domain::ProgramWeekID = new_id().into();
                    transaction.execute(
                        "INSERT INTO program_weeks (id, program_id, week_number, name, is_deload,
                            notes)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            *week_id,
                            *program_id,
                            week.week_number,
                            week.name,
                            week.is_deload,
                            week.notes
                        ],
                    )?;
                    let mut days = Vec::with_capacity(week.days.len());
                    for day in week.days {
                        let day_id: domain::ProgramDayID = new_id().into();
                        transaction.execute(
                            "INSERT INTO program_days (id, week_id, day_number, name, is_rest_day,
                                notes)
                            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                            params![
                                *day_id,
                                *week_id,
                                day.day_number,
                                day.name,
                                day.is_rest_day,
                                day.notes
                            ],
                        )?;
                        let series = day
                            .series
                            .into_iter()
                            .map(|s| insert_series(&transaction, day_id, s))
                            .collect::<Result<Vec<_>, _>>()?;
                        days.push(domain::ProgramDay {
                            id: day_id,
                            series,
                            ..day
                        });
                    }
                    weeks.push(domain::ProgramWeek {
                        id: week_id,
                        days,
                        ..week
                    });
                }
                transaction.commit()?;
                Ok(domain::Program {
                    id: program_id,
                    weeks,
                    shares: vec![],
                    ..program
                })
            })
            .await?)
    }

    async fn modify_program(
        &self,
        id: domain::ProgramID,
        name: Option<domain::Name>,
        description: Option<String>,
        notes: Option<String>,
        is_template: Option<bool>,
    ) -> Result<domain::Program, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let updated = transaction.execute(
                    "UPDATE programs SET
                        name = COALESCE(?2, name),
                        description = COALESCE(?3, description),
                        notes = COALESCE(?4, notes),
                        is_template = COALESCE(?5, is_template)
                    WHERE id = ?1",
                    params![
                        *id,
                        name.as_ref().map(AsRef::<String>::as_ref),
                        description,
                        notes,
                        is_template
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                let program = read_program(&transaction, id)?;
                transaction.commit()?;
                Ok(program)
            })
            .await?)
    }

    async fn delete_program(
        &self,
        id: domain::ProgramID,
    ) -> Result<domain::ProgramID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM programs WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn modify_program_week(
        &self,
        id: domain::ProgramWeekID,
        name: Option<String>,
        is_deload: bool,
        notes: String,
    ) -> Result<domain::ProgramWeek, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let updated = connection.execute(
                    "UPDATE program_weeks SET name = ?2, is_deload = ?3, notes = ?4 WHERE id = ?1",
                    params![*id, name, is_deload, notes],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                let mut week = connection.query_row(
                    "SELECT id, week_number, name, is_deload, notes FROM program_weeks
                    WHERE id = ?1",
                    params![*id],
                    program_week,
                )?;
                week.days = read_days(connection, week.id)?;
                Ok(week)
            })
            .await?)
    }

    async fn modify_program_day(
        &self,
        id: domain::ProgramDayID,
        name: Option<String>,
        is_rest_day: bool,
        notes: String,
    ) -> Result<domain::ProgramDay, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let updated = connection.execute(
                    "UPDATE program_days SET name = ?2, is_rest_day = ?3, notes = ?4 WHERE id = ?1",
                    params![*id, name, is_rest_day, notes],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }
                read_day(connection, id)
            })
            .await?)
    }

    async fn create_program_share(
        &self,
        share: domain::ProgramShare,
    ) -> Result<domain::ProgramShare, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let share = domain::ProgramShare {
                    id: new_id().into(),
                    ..share
                };
                connection.execute(
                    "INSERT INTO program_shares (id, program_id, user_id) VALUES (?1, ?2, ?3)",
                    params![*share.id, *share.program_id, *share.user_id],
                )?;
                Ok(share)
            })
            .await?)
    }

    async fn delete_program_share(
        &self,
        id: domain::ProgramShareID,
    ) -> Result<domain::ProgramShareID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM program_shares WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn create_series(
        &self,
        day_id: domain::ProgramDayID,
        series: domain::ProgramSeries,
    ) -> Result<domain::ProgramSeries, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let series = insert_series(&transaction, day_id, series)?;
                transaction.commit()?;
                Ok(series)
            })
            .await?)
    }

    async fn replace_series(
        &self,
        series: domain::ProgramSeries,
    ) -> Result<domain::ProgramSeries, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction = connection.transaction()?;
                let updated = transaction.execute(
                    "UPDATE program_series SET order_index = ?2, series_type = ?3, time_seconds = ?4,
                        notes = ?5
                    WHERE id = ?1",
                    params![
                        *series.id,
                        series.order_index,
                        series.series_type.as_ref(),
                        series.time_seconds,
                        series.notes
                    ],
                )?;
                if updated == 0 {
                    return Err(Error::NotFound);
                }

                let kept = series
                    .exercises
                    .iter()
                    .filter(|e| !e.id.is_nil())
                    .map(|e| e.id)
                    .collect::<Vec<_>>();
                for existing in read_program_exercises(&transaction, series.id)? {
                    if !kept.contains(&existing.id) {
                        transaction.execute(
                            "DELETE FROM program_exercises WHERE id = ?1",
                            params![*existing.id],
                        )?;
                    }
                }

                let mut exercises = Vec::with_capacity(series.exercises.len());
                for exercise in series.exercises {
                    if exercise.id.is_nil() {
                        exercises.push(insert_program_exercise(&transaction, series.id, exercise)?);
                    } else {
                        update_program_exercise(&transaction, series.id, &exercise)?;
                        exercises.push(exercise);
                    }
                }
                transaction.commit()?;
                Ok(domain::ProgramSeries {
                    exercises,
                    ..series
                })
            })
            .await?)
    }

    async fn delete_series(
        &self,
        id: domain::ProgramSeriesID,
    ) -> Result<domain::ProgramSeriesID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM program_series WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }

    async fn swap_series_order(
        &self,
        a: domain::ProgramSeriesID,
        b: domain::ProgramSeriesID,
    ) -> Result<(), domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let transaction =
                    connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let order_index = |id: domain::ProgramSeriesID| {
                    transaction.query_row(
                        "SELECT order_index FROM program_series WHERE id = ?1",
                        params![*id],
                        |row| row.get::<_, u32>(0),
                    )
                };
                let (index_a, index_b) = (order_index(a)?, order_index(b)?);
                let mut update = transaction
                    .prepare("UPDATE program_series SET order_index = ?2 WHERE id = ?1")?;
                update.execute(params![*a, index_b])?;
                update.execute(params![*b, index_a])?;
                drop(update);
                transaction.commit()?;
                Ok(())
            })
            .await?)
    }
}
