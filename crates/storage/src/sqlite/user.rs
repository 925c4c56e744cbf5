use ironplan_domain as domain;
use rusqlite::{OptionalExtension, Row, params};

use super::{Error, Sqlite, id, name, new_id, text};

const PROFILE_COLUMNS: &str = "weight_unit, current_weight, current_body_fat, chest, waist, hips,
    left_arm, right_arm, left_thigh, right_thigh, left_calf, right_calf";

fn user(row: &Row) -> rusqlite::Result<domain::User> {
    Ok(domain::User {
        id: id(row, 0)?,
        name: name(row, 1)?,
        is_admin: row.get(2)?,
    })
}

fn profile(user_id: domain::UserID, row: &Row) -> rusqlite::Result<domain::Profile> {
    Ok(domain::Profile {
        user_id,
        weight_unit: text(row, 0)?,
        current_weight: row.get(1)?,
        current_body_fat: row.get(2)?,
        measurements: domain::Measurements {
            chest: row.get(3)?,
            waist: row.get(4)?,
            hips: row.get(5)?,
            left_arm: row.get(6)?,
            right_arm: row.get(7)?,
            left_thigh: row.get(8)?,
            right_thigh: row.get(9)?,
            left_calf: row.get(10)?,
            right_calf: row.get(11)?,
        },
    })
}

impl domain::UserRepository for Sqlite {
    async fn read_users(&self) -> Result<Vec<domain::User>, domain::ReadError> {
        Ok(self
            .with_connection(|connection| {
                let mut statement =
                    connection.prepare("SELECT id, name, is_admin FROM users ORDER BY name")?;
                let users = statement
                    .query_map([], user)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(users)
            })
            .await?)
    }

    async fn read_user(&self, id: domain::UserID) -> Result<domain::User, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                Ok(connection.query_row(
                    "SELECT id, name, is_admin FROM users WHERE id = ?1",
                    params![*id],
                    user,
                )?)
            })
            .await?)
    }

    async fn create_user(
        &self,
        name: domain::Name,
        is_admin: bool,
    ) -> Result<domain::User, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let id = new_id();
                connection.execute(
                    "INSERT INTO users (id, name, is_admin) VALUES (?1, ?2, ?3)",
                    params![id, name.as_ref(), is_admin],
                )?;
                Ok(domain::User {
                    id: id.into(),
                    name,
                    is_admin,
                })
            })
            .await?)
    }

    async fn modify_user(
        &self,
        id: domain::UserID,
        name: Option<domain::Name>,
        is_admin: Option<bool>,
    ) -> Result<domain::User, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let changed = connection.execute(
                    "UPDATE users SET
                        name = COALESCE(?2, name),
                        is_admin = COALESCE(?3, is_admin)
                    WHERE id = ?1",
                    params![*id, name.as_ref().map(ToString::to_string), is_admin],
                )?;
                if changed == 0 {
                    return Err(Error::NotFound);
                }
                Ok(connection.query_row(
                    "SELECT id, name, is_admin FROM users WHERE id = ?1",
                    params![*id],
                    user,
                )?)
            })
            .await?)
    }

    async fn delete_user(
        &self,
        id: domain::UserID,
    ) -> Result<domain::UserID, domain::DeleteError> {
        self.with_connection(move |connection| {
            match connection.execute("DELETE FROM users WHERE id = ?1", params![*id])? {
                0 => Err(Error::NotFound),
                _ => Ok(()),
            }
        })
        .await?;
        Ok(id)
    }
}

impl domain::ProfileRepository for Sqlite {
    async fn read_profile(
        &self,
        user_id: domain::UserID,
    ) -> Result<domain::Profile, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let profile = connection
                    .query_row(
                        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
                        params![*user_id],
                        |row| profile(user_id, row),
                    )
                    .optional()?;
                Ok(profile.unwrap_or_else(|| domain::Profile::new(user_id)))
            })
            .await?)
    }

    async fn replace_profile(
        &self,
        profile: domain::Profile,
    ) -> Result<domain::Profile, domain::UpdateError> {
        Ok(self
            .with_connection(move |connection| {
                let m = &profile.measurements;
                connection.execute(
                    &format!(
                        "INSERT INTO profiles (user_id, {PROFILE_COLUMNS})
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                        ON CONFLICT (user_id) DO UPDATE SET
                            weight_unit = excluded.weight_unit,
                            current_weight = excluded.current_weight,
                            current_body_fat = excluded.current_body_fat,
                            chest = excluded.chest,
                            waist = excluded.waist,
                            hips = excluded.hips,
                            left_arm = excluded.left_arm,
                            right_arm = excluded.right_arm,
                            left_thigh = excluded.left_thigh,
                            right_thigh = excluded.right_thigh,
                            left_calf = excluded.left_calf,
                            right_calf = excluded.right_calf"
                    ),
                    params![
                        *profile.user_id,
                        profile.weight_unit.as_ref(),
                        profile.current_weight,
                        profile.current_body_fat,
                        m.chest,
                        m.waist,
                        m.hips,
                        m.left_arm,
                        m.right_arm,
                        m.left_thigh,
                        m.right_thigh,
                        m.left_calf,
                        m.right_calf
                    ],
                )?;
                Ok(profile)
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use ironplan_domain::{ProfileRepository, UserRepository};
    use pretty_assertions::assert_eq;

    use crate::tests::data::{USER, USER_2, sqlite};

    use super::*;

    #[tokio::test]
    async fn test_read_users() {
        let db = sqlite().await;

        assert_eq!(
            db.read_users().await.unwrap(),
            vec![USER.clone(), USER_2.clone()]
        );
    }

    #[tokio::test]
    async fn test_read_user_not_found() {
        let db = sqlite().await;

        assert!(matches!(
            db.read_user(99.into()).await,
            Err(domain::ReadError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let db = sqlite().await;

        assert!(matches!(
            db.create_user(USER.name.clone(), false).await,
            Err(domain::CreateError::Conflict)
        ));
    }

    #[tokio::test]
    async fn test_modify_user() {
        let db = sqlite().await;

        assert_eq!(
            db.modify_user(USER_2.id, None, Some(true)).await.unwrap(),
            domain::User {
                is_admin: true,
                ..USER_2.clone()
            }
        );
        let name = domain::Name::new("Carol").unwrap();
        assert_eq!(
            db.modify_user(USER_2.id, Some(name.clone()), None)
                .await
                .unwrap(),
            domain::User {
                id: USER_2.id,
                name,
                is_admin: true,
            }
        );
        assert!(matches!(
            db.modify_user(USER_2.id, Some(USER.name.clone()), None)
                .await,
            Err(domain::UpdateError::Conflict)
        ));
        assert!(matches!(
            db.modify_user(99.into(), None, Some(false)).await,
            Err(domain::UpdateError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = sqlite().await;
        db.replace_profile(domain::Profile::new(USER_2.id))
            .await
            .unwrap();

        assert_eq!(db.delete_user(USER_2.id).await.unwrap(), USER_2.id);
        assert_eq!(db.read_users().await.unwrap(), vec![USER.clone()]);
        assert!(matches!(
            db.delete_user(USER_2.id).await,
            Err(domain::DeleteError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile() {
        let db = sqlite().await;

        assert_eq!(
            db.read_profile(USER.id).await.unwrap(),
            domain::Profile::new(USER.id)
        );

        let profile = domain::Profile {
            weight_unit: domain::WeightUnit::Kg,
            current_weight: Some(81.5),
            ..domain::Profile::new(USER.id)
        };
        db.replace_profile(profile.clone()).await.unwrap();
        assert_eq!(db.read_profile(USER.id).await.unwrap(), profile);

        let profile = domain::Profile {
            current_body_fat: Some(15.0),
            measurements: domain::Measurements {
                chest: Some(102.0),
                right_calf: Some(39.5),
                ..domain::Measurements::default()
            },
            ..profile
        };
        db.replace_profile(profile.clone()).await.unwrap();
        assert_eq!(db.read_profile(USER.id).await.unwrap(), profile);
    }
}
