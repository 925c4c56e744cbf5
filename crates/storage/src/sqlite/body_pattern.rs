use ironplan_domain as domain;
use rusqlite::params;

use super::{Error, Sqlite, encode_list, id, list, name, new_id, optional_id};

impl domain::BodyPatternRepository for Sqlite {
    async fn read_body_patterns(&self) -> Result<Vec<domain::BodyPattern>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement =
                    connection.prepare("SELECT id, user_id, name, days FROM body_patterns")?;
                let patterns = statement
                    .query_map([], |row| {
                        Ok(domain::BodyPattern {
                            id: id(row, 0)?,
                            user_id: optional_id(row, 1)?,
                            name: name(row, 2)?,
                            days: list(row, 3, "days")?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(patterns)
            })
            .await?)
    }

    async fn create_body_pattern(
        &self,
        pattern: domain::BodyPattern,
    ) -> Result<domain::BodyPattern, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let pattern = domain::BodyPattern {
                    id: new_id().into(),
                    ..pattern
                };
                connection.execute(
                    "INSERT INTO body_patterns (id, user_id, name, days) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        *pattern.id,
                        pattern.user_id.map(|id| *id),
                        pattern.name.as_ref(),
                        encode_list(&pattern.days)?
                    ],
                )?;
                Ok(pattern)
            })
            .await?)
    }

    async fn delete_body_pattern(
        &self,
        id: domain::BodyPatternID,
    ) -> Result<domain::BodyPatternID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM body_patterns WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }
}
