use strum::{AsRefStr, EnumString};

use crate::{BodyMetric, CreateError, DeleteError, Name, ReadError, UpdateError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn get_users(&self) -> Result<Vec<User>, ReadError>;
    async fn get_user(&self, id: UserID) -> Result<User, ReadError>;
    async fn create_user(&self, name: Name, is_admin: bool) -> Result<User, CreateError>;
    async fn modify_user(
        &self,
        id: UserID,
        name: Option<Name>,
        is_admin: Option<bool>,
    ) -> Result<User, UpdateError>;
    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError>;
    async fn get_profile(&self, user_id: UserID) -> Result<Profile, ReadError>;
    async fn replace_profile(&self, profile: Profile) -> Result<Profile, UpdateError>;

    async fn validate_user_name(&self, name: &str, id: UserID) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_users().await {
                Ok(users) => {
                    if users.iter().all(|u| u.id == id || u.name != name) {
                        Ok(name)
                    } else {
                        Err(ValidationError::Conflict("name".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }

    fn validate_weight_unit(&self, unit: &str) -> Result<WeightUnit, ValidationError> {
        unit.trim()
            .to_lowercase()
            .parse::<WeightUnit>()
            .map_err(|_| ValidationError::Other("Weight unit must be lbs or kg".into()))
    }
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_users(&self) -> Result<Vec<User>, ReadError>;
    async fn read_user(&self, id: UserID) -> Result<User, ReadError>;
    async fn create_user(&self, name: Name, is_admin: bool) -> Result<User, CreateError>;
    async fn modify_user(
        &self,
        id: UserID,
        name: Option<Name>,
        is_admin: Option<bool>,
    ) -> Result<User, UpdateError>;
    /// Deletes the user together with everything the user owns.
    async fn delete_user(&self, id: UserID) -> Result<UserID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ProfileRepository {
    /// Returns the default profile if none has been stored yet.
    async fn read_profile(&self, user_id: UserID) -> Result<Profile, ReadError>;
    async fn replace_profile(&self, profile: Profile) -> Result<Profile, UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub name: Name,
    pub is_admin: bool,
}

id!(UserID);

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    pub weight_unit: WeightUnit,
    pub current_weight: Option<f32>,
    pub current_body_fat: Option<f32>,
    pub measurements: Measurements,
}

impl Profile {
    #[must_use]
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            weight_unit: WeightUnit::default(),
            current_weight: None,
            current_body_fat: None,
            measurements: Measurements::default(),
        }
    }

    /// Takes over every value present in the metric and keeps the others.
    pub fn update_from(&mut self, metric: &BodyMetric) {
        self.current_weight = metric.weight.or(self.current_weight);
        self.current_body_fat = metric.body_fat.or(self.current_body_fat);
        let m = &mut self.measurements;
        for (current, recorded) in [
            (&mut m.chest, metric.chest),
            (&mut m.waist, metric.waist),
            (&mut m.hips, metric.hips),
            (&mut m.left_arm, metric.left_arm),
            (&mut m.right_arm, metric.right_arm),
            (&mut m.left_thigh, metric.left_thigh),
            (&mut m.right_thigh, metric.right_thigh),
            (&mut m.left_calf, metric.left_calf),
            (&mut m.right_calf, metric.right_calf),
        ] {
            if recorded.is_some() {
                *current = recorded;
            }
        }
    }
}

/// Latest body measurements in the unit of the profile.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Measurements {
    pub chest: Option<f32>,
    pub waist: Option<f32>,
    pub hips: Option<f32>,
    pub left_arm: Option<f32>,
    pub right_arm: Option<f32>,
    pub left_thigh: Option<f32>,
    pub right_thigh: Option<f32>,
    pub left_calf: Option<f32>,
    pub right_calf: Option<f32>,
}

#[derive(AsRefStr, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
    }

    #[test]
    fn test_user_id_from_u128() {
        assert_eq!(
            UserID::from(1).to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[rstest]
    #[case(WeightUnit::Lbs, "lbs")]
    #[case(WeightUnit::Kg, "kg")]
    fn test_weight_unit_as_ref(#[case] unit: WeightUnit, #[case] string: &str) {
        assert_eq!(unit.as_ref(), string);
        assert_eq!(string.parse::<WeightUnit>(), Ok(unit));
    }

    #[test]
    fn test_profile_new() {
        assert_eq!(
            Profile::new(1.into()),
            Profile {
                user_id: 1.into(),
                weight_unit: WeightUnit::Lbs,
                current_weight: None,
                current_body_fat: None,
                measurements: Measurements::default(),
            }
        );
    }

    #[test]
    fn test_profile_update_from() {
        let mut profile = Profile {
            current_weight: Some(82.0),
            current_body_fat: Some(18.0),
            measurements: Measurements {
                chest: Some(100.0),
                waist: Some(85.0),
                ..Measurements::default()
            },
            ..Profile::new(1.into())
        };
        let metric = BodyMetric {
            weight: Some(81.0),
            waist: Some(84.0),
            left_calf: Some(38.5),
            ..BodyMetric::new(
                1.into(),
                chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(7, 0, 0)
                    .unwrap(),
            )
        };

        profile.update_from(&metric);

        assert_eq!(profile.current_weight, Some(81.0));
        assert_eq!(profile.current_body_fat, Some(18.0));
        assert_eq!(
            profile.measurements,
            Measurements {
                chest: Some(100.0),
                waist: Some(84.0),
                left_calf: Some(38.5),
                ..Measurements::default()
            }
        );
    }
}
