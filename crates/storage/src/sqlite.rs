#![allow(clippy::missing_errors_doc)]

use std::{path::Path, str::FromStr, time::Duration};

use deadpool_sqlite::{Config, InteractError, Pool, PoolConfig, Runtime};
use ironplan_domain as domain;
use log::{debug, warn};
use rusqlite::{Connection, ErrorCode, Row, ffi, types::Type};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

mod body_metric;
mod body_pattern;
mod calendar;
mod equipment;
mod exercise;
mod gym;
mod program;
mod user;
mod workout;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const SCHEMA_VERSION: i64 = 2;

pub struct Sqlite {
    pool: Pool,
}

impl Sqlite {
    pub async fn open(path: &Path) -> Result<Self, Error> {
        debug!("opening database {}", path.display());
        Self::new(Config::new(path)).await
    }

    /// Every connection of an in-memory database sees its own data, so the pool holds only one.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Self::new(Config {
            pool: Some(PoolConfig::new(1)),
            ..Config::new(":memory:")
        })
        .await
    }

    async fn new(config: Config) -> Result<Self, Error> {
        let db = Self {
            pool: config.create_pool(Runtime::Tokio1)?,
        };
        db.with_connection(migrate).await?;
        Ok(db)
    }

    /// Runs the closure on a pooled connection outside of the async executor.
    pub(crate) async fn with_connection<T, F>(&self, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
    {
        let connection = self.pool.get().await?;
        connection
            .interact(move |connection| {
                connection.pragma_update(None, "foreign_keys", true)?;
                connection.busy_timeout(BUSY_TIMEOUT)?;
                f(connection)
            })
            .await
            .map_err(Error::from)?
    }
}

#[allow(clippy::too_many_lines)]
fn migrate(connection: &mut Connection) -> Result<(), Error> {
    let version: i64 = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        debug!("creating database schema");
        connection.execute_batch(
            "CREATE TABLE users (
                id BLOB PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                is_admin INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE profiles (
                user_id BLOB PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                weight_unit TEXT NOT NULL,
                current_weight REAL,
                current_body_fat REAL
            );

            CREATE TABLE body_metrics (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recorded_at TEXT NOT NULL,
                weight REAL,
                body_fat REAL,
                chest REAL,
                waist REAL,
                hips REAL,
                left_arm REAL,
                right_arm REAL,
                left_thigh REAL,
                right_thigh REAL,
                left_calf REAL,
                right_calf REAL,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE equipment (
                id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                equipment_type TEXT NOT NULL,
                created_by BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE equipment_variations (
                equipment_id BLOB NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                options TEXT NOT NULL DEFAULT '[]',
                PRIMARY KEY (equipment_id, position)
            );

            CREATE TABLE exercises (
                id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL,
                primary_muscle TEXT,
                secondary_muscles TEXT NOT NULL DEFAULT '[]',
                difficulty TEXT,
                created_by BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE exercise_equipment (
                exercise_id BLOB NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                equipment_id BLOB NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
                PRIMARY KEY (exercise_id, equipment_id)
            );

            CREATE TABLE gyms (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                address TEXT,
                is_shared INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE gym_equipment (
                id BLOB PRIMARY KEY,
                gym_id BLOB NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                equipment_id BLOB NOT NULL REFERENCES equipment(id) ON DELETE CASCADE,
                quantity INTEGER NOT NULL DEFAULT 1,
                progression_type TEXT NOT NULL,
                weight_value REAL,
                plate_sizes TEXT NOT NULL DEFAULT '[]',
                stack_increment REAL,
                notes TEXT NOT NULL DEFAULT '',
                UNIQUE (gym_id, equipment_id)
            );

            CREATE TABLE gym_exercises (
                gym_id BLOB NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
                exercise_id BLOB NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                notes TEXT NOT NULL DEFAULT '',
                is_favorite INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (gym_id, exercise_id)
            );

            CREATE TABLE programs (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                duration_weeks INTEGER NOT NULL,
                days_per_week INTEGER NOT NULL,
                is_template INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE program_weeks (
                id BLOB PRIMARY KEY,
                program_id BLOB NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                week_number INTEGER NOT NULL,
                name TEXT,
                is_deload INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE program_days (
                id BLOB PRIMARY KEY,
                week_id BLOB NOT NULL REFERENCES program_weeks(id) ON DELETE CASCADE,
                day_number INTEGER NOT NULL,
                name TEXT,
                is_rest_day INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE program_series (
                id BLOB PRIMARY KEY,
                day_id BLOB NOT NULL REFERENCES program_days(id) ON DELETE CASCADE,
                order_index INTEGER NOT NULL,
                series_type TEXT NOT NULL,
                time_seconds INTEGER,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE program_exercises (
                id BLOB PRIMARY KEY,
                series_id BLOB NOT NULL REFERENCES program_series(id) ON DELETE CASCADE,
                exercise_id BLOB NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                sets INTEGER NOT NULL,
                reps TEXT NOT NULL,
                lift_time_seconds INTEGER,
                rest_time_seconds INTEGER,
                starting_weights TEXT NOT NULL DEFAULT '[]',
                target_rpe REAL,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE program_instances (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                program_id BLOB NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                gym_id BLOB REFERENCES gyms(id) ON DELETE SET NULL,
                name TEXT NOT NULL,
                scheduled_date TEXT NOT NULL,
                custom_weights TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE scheduled_days (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                program_id BLOB NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                program_day_id BLOB NOT NULL REFERENCES program_days(id) ON DELETE CASCADE,
                instance_id BLOB REFERENCES program_instances(id) ON DELETE CASCADE,
                gym_id BLOB REFERENCES gyms(id) ON DELETE SET NULL,
                date TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_scheduled_days_program_date
                ON scheduled_days(user_id, program_id, date);
            CREATE UNIQUE INDEX idx_scheduled_days_instance_day
                ON scheduled_days(instance_id, program_day_id)
                WHERE instance_id IS NOT NULL;

            CREATE TABLE workout_sessions (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                scheduled_day_id BLOB REFERENCES scheduled_days(id) ON DELETE SET NULL,
                gym_id BLOB REFERENCES gyms(id) ON DELETE SET NULL,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                is_completed INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE workout_sets (
                id BLOB PRIMARY KEY,
                session_id BLOB NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
                exercise_id BLOB NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                set_number INTEGER NOT NULL,
                reps INTEGER,
                weight REAL,
                rpe REAL,
                overall_rpe TEXT,
                notes TEXT NOT NULL DEFAULT '',
                completed_at TEXT NOT NULL,
                UNIQUE (session_id, exercise_id, set_number)
            );

            PRAGMA user_version = 1;",
        )?;
    }

    if version < 2 {
        debug!("migrating database schema to version 2");
        connection.execute_batch(
            "ALTER TABLE profiles ADD COLUMN chest REAL;
            ALTER TABLE profiles ADD COLUMN waist REAL;
            ALTER TABLE profiles ADD COLUMN hips REAL;
            ALTER TABLE profiles ADD COLUMN left_arm REAL;
            ALTER TABLE profiles ADD COLUMN right_arm REAL;
            ALTER TABLE profiles ADD COLUMN left_thigh REAL;
            ALTER TABLE profiles ADD COLUMN right_thigh REAL;
            ALTER TABLE profiles ADD COLUMN left_calf REAL;
            ALTER TABLE profiles ADD COLUMN right_calf REAL;

            CREATE TABLE program_shares (
                id BLOB PRIMARY KEY,
                program_id BLOB NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE (program_id, user_id)
            );

            CREATE TABLE exercise_preferences (
                user_id BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                exercise_id BLOB NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                rating INTEGER,
                notes TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (user_id, exercise_id)
            );

            CREATE TABLE body_patterns (
                id BLOB PRIMARY KEY,
                user_id BLOB REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                days TEXT NOT NULL DEFAULT '[]'
            );

            PRAGMA user_version = 2;",
        )?;
    }

    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    CreatePool(#[from] deadpool_sqlite::CreatePoolError),
    #[error(transparent)]
    Pool(#[from] deadpool_sqlite::PoolError),
    #[error("database interaction failed: {0}")]
    Interact(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl From<InteractError> for Error {
    fn from(value: InteractError) -> Self {
        Error::Interact(value.to_string())
    }
}

impl Error {
    fn constraint(&self) -> Option<i32> {
        match self {
            Error::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Some(err.extended_code)
            }
            _ => None,
        }
    }

    fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict)
            || matches!(
                self.constraint(),
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
            )
    }

    fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound | Error::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        ) || self.constraint() == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }
}

impl From<Error> for domain::StorageError {
    fn from(value: Error) -> Self {
        match value {
            Error::Sqlite(rusqlite::Error::SqliteFailure(ref err, _))
                if matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                domain::StorageError::Busy
            }
            err => domain::StorageError::Other(Box::new(err)),
        }
    }
}

impl From<Error> for domain::ReadError {
    fn from(value: Error) -> Self {
        if value.is_not_found() {
            domain::ReadError::NotFound
        } else {
            domain::ReadError::Storage(value.into())
        }
    }
}

impl From<Error> for domain::CreateError {
    fn from(value: Error) -> Self {
        if value.is_conflict() {
            domain::CreateError::Conflict
        } else if value.is_not_found() {
            domain::CreateError::NotFound
        } else {
            domain::CreateError::Storage(value.into())
        }
    }
}

impl From<Error> for domain::UpdateError {
    fn from(value: Error) -> Self {
        if value.is_conflict() {
            domain::UpdateError::Conflict
        } else if value.is_not_found() {
            domain::UpdateError::NotFound
        } else {
            domain::UpdateError::Storage(value.into())
        }
    }
}

impl From<Error> for domain::DeleteError {
    fn from(value: Error) -> Self {
        if value.is_not_found() {
            domain::DeleteError::NotFound
        } else {
            domain::DeleteError::Storage(value.into())
        }
    }
}

/// A stored list column that could not be decoded.
#[derive(thiserror::Error, Debug)]
#[error("failed to decode {column}: {source}")]
pub struct DecodeError {
    column: &'static str,
    source: serde_json::Error,
}

fn decode_list<T: DeserializeOwned>(
    column: &'static str,
    value: &str,
) -> Result<Vec<T>, DecodeError> {
    serde_json::from_str(value).map_err(|source| DecodeError { column, source })
}

fn encode_list<T: Serialize>(values: &[T]) -> Result<String, Error> {
    Ok(serde_json::to_string(values)?)
}

/// Malformed values are logged and replaced by an empty list.
fn list<T: DeserializeOwned>(row: &Row, idx: usize, column: &'static str) -> rusqlite::Result<Vec<T>> {
    let Some(value) = row.get::<_, Option<String>>(idx)? else {
        return Ok(vec![]);
    };
    Ok(decode_list(column, &value).unwrap_or_else(|err| {
        warn!("{err}");
        vec![]
    }))
}

fn id<T: From<Uuid>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    Ok(T::from(row.get::<_, Uuid>(idx)?))
}

fn optional_id<T: From<Uuid>>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>> {
    Ok(row.get::<_, Option<Uuid>>(idx)?.map(T::from))
}

fn parse_text<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn text<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_text(idx, &row.get::<_, String>(idx)?)
}

fn optional_text<T>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    row.get::<_, Option<String>>(idx)?
        .map(|value| parse_text(idx, &value))
        .transpose()
}

fn name(row: &Row, idx: usize) -> rusqlite::Result<domain::Name> {
    domain::Name::new(&row.get::<_, String>(idx)?)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn new_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("[2.5, 5, 10]", Some(vec![2.5, 5.0, 10.0]))]
    #[case("[]", Some(vec![]))]
    #[case("2.5,5", None)]
    #[case("[\"a\"]", None)]
    #[case("", None)]
    fn test_decode_list(#[case] value: &str, #[case] expected: Option<Vec<f32>>) {
        assert_eq!(decode_list::<f32>("plate_sizes", value).ok(), expected);
    }

    #[test]
    fn test_decode_error_display() {
        let err = decode_list::<f32>("plate_sizes", "{").unwrap_err();
        assert!(err.to_string().starts_with("failed to decode plate_sizes: "));
    }

    #[test]
    fn test_encode_list() {
        assert_eq!(encode_list(&[2.5f32, 5.0]).unwrap(), "[2.5,5.0]");
        assert_eq!(encode_list::<String>(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut connection = Connection::open_in_memory().unwrap();
        migrate(&mut connection).unwrap();
        migrate(&mut connection).unwrap();
        let version: i64 = connection
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_from_version_1() {
        let mut connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE users (id BLOB PRIMARY KEY, name TEXT NOT NULL UNIQUE,
                    is_admin INTEGER NOT NULL DEFAULT 0);
                CREATE TABLE profiles (user_id BLOB PRIMARY KEY, weight_unit TEXT NOT NULL,
                    current_weight REAL, current_body_fat REAL);
                CREATE TABLE programs (id BLOB PRIMARY KEY);
                CREATE TABLE exercises (id BLOB PRIMARY KEY);
                INSERT INTO profiles VALUES (x'01', 'kg', 80.0, NULL);
                PRAGMA user_version = 1;",
            )
            .unwrap();

        migrate(&mut connection).unwrap();

        let (unit, chest): (String, Option<f32>) = connection
            .query_row("SELECT weight_unit, chest FROM profiles", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(unit, "kg");
        assert_eq!(chest, None);
    }

    #[test]
    fn test_interact_error() {
        assert!(matches!(
            Error::from(InteractError::Aborted),
            Error::Interact(_)
        ));
    }

    #[test]
    fn test_error_conversion() {
        assert!(matches!(
            domain::ReadError::from(Error::NotFound),
            domain::ReadError::NotFound
        ));
        assert!(matches!(
            domain::ReadError::from(Error::Sqlite(rusqlite::Error::QueryReturnedNoRows)),
            domain::ReadError::NotFound
        ));
        assert!(matches!(
            domain::CreateError::from(Error::Conflict),
            domain::CreateError::Conflict
        ));
        assert!(matches!(
            domain::UpdateError::from(Error::Conflict),
            domain::UpdateError::Conflict
        ));
        assert!(matches!(
            domain::DeleteError::from(Error::Interact("aborted".into())),
            domain::DeleteError::Storage(domain::StorageError::Other(_))
        ));
    }
}
