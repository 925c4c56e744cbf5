use crate::{CreateError, DeleteError, Name, ReadError, UserID, ValidationError};

#[allow(async_fn_in_trait)]
pub trait BodyPatternService {
    /// Returns the patterns of the user followed by the shared patterns, each ordered by name.
    async fn get_body_patterns(&self, user_id: UserID) -> Result<Vec<BodyPattern>, ReadError>;
    /// Shared patterns can only be created by admins, for other users the pattern stays private.
    async fn create_body_pattern(
        &self,
        user_id: UserID,
        name: Name,
        days: Vec<String>,
        shared: bool,
    ) -> Result<BodyPattern, CreateError>;
    /// Patterns can be deleted by their owner. Admins can delete every pattern.
    async fn delete_body_pattern(
        &self,
        user_id: UserID,
        id: BodyPatternID,
    ) -> Result<BodyPatternID, DeleteError>;

    fn validate_pattern_days(&self, days: &str) -> Result<Vec<String>, ValidationError> {
        let days = pattern_days(days);
        if days.is_empty() {
            return Err(ValidationError::Other(
                "Please enter at least one day label".into(),
            ));
        }
        Ok(days)
    }
}

#[allow(async_fn_in_trait)]
pub trait BodyPatternRepository {
    async fn read_body_patterns(&self) -> Result<Vec<BodyPattern>, ReadError>;
    /// The id of the given pattern is replaced by a newly generated one.
    async fn create_body_pattern(&self, pattern: BodyPattern) -> Result<BodyPattern, CreateError>;
    async fn delete_body_pattern(&self, id: BodyPatternID) -> Result<BodyPatternID, DeleteError>;
}

/// Repeating sequence of day labels, e.g. push, pull, legs and rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPattern {
    pub id: BodyPatternID,
    /// Shared patterns have no owner.
    pub user_id: Option<UserID>,
    pub name: Name,
    pub days: Vec<String>,
}

impl BodyPattern {
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.user_id.is_none()
    }
}

id!(BodyPatternID);

/// One label per line, blank lines are skipped.
#[must_use]
pub fn pattern_days(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Own patterns first, then shared ones.
#[must_use]
pub fn visible_body_patterns(patterns: Vec<BodyPattern>, user_id: UserID) -> Vec<BodyPattern> {
    let (mut own, mut shared): (Vec<_>, Vec<_>) = patterns
        .into_iter()
        .filter(|p| p.user_id.is_none_or(|id| id == user_id))
        .partition(|p| p.user_id.is_some());
    own.sort_by(|a, b| a.name.cmp(&b.name));
    shared.sort_by(|a, b| a.name.cmp(&b.name));
    own.extend(shared);
    own
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn pattern(id: u128, user_id: Option<u128>, name: &str) -> BodyPattern {
        BodyPattern {
            id: id.into(),
            user_id: user_id.map(UserID::from),
            name: Name::new(name).unwrap(),
            days: vec!["Push".into()],
        }
    }

    #[rstest]
    #[case("Push\nPull\nLegs", vec!["Push", "Pull", "Legs"])]
    #[case(" Upper \r\n\n Lower\n", vec!["Upper", "Lower"])]
    #[case("\n \n", vec![])]
    fn test_pattern_days(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(pattern_days(text), expected);
    }

    #[test]
    fn test_visible_body_patterns() {
        let patterns = vec![
            pattern(1, None, "PPL"),
            pattern(2, Some(1), "Upper Lower"),
            pattern(3, Some(2), "Bro Split"),
            pattern(4, Some(1), "Full Body"),
            pattern(5, None, "Arnold"),
        ];

        assert_eq!(
            visible_body_patterns(patterns, 1.into())
                .into_iter()
                .map(|p| p.id)
                .collect::<Vec<_>>(),
            vec![4.into(), 2.into(), 5.into(), 1.into()]
        );
    }
}
