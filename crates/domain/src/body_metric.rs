use chrono::NaiveDateTime;

use crate::{CreateError, ReadError, UserID, ValidationError};

#[allow(async_fn_in_trait)]
pub trait BodyMetricService {
    async fn get_body_metrics(&self, user_id: UserID) -> Result<Vec<BodyMetric>, ReadError>;
    /// Stores the metric and updates the current weight and body fat of the profile.
    async fn record_body_metric(
        &self,
        user_id: UserID,
        metric: BodyMetric,
    ) -> Result<BodyMetric, CreateError>;

    fn validate_measurement(&self, value: &str) -> Result<Option<f32>, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        match value.replace(',', ".").parse::<f32>() {
            Ok(parsed) => {
                if parsed > 0.0 {
                    Ok(Some(parsed))
                } else {
                    Err(ValidationError::Other(
                        "Measurement must be a positive decimal number".into(),
                    ))
                }
            }
            Err(_) => Err(ValidationError::Other(
                "Measurement must be a decimal number".into(),
            )),
        }
    }

    fn validate_body_fat(&self, value: &str) -> Result<Option<f32>, ValidationError> {
        match self.validate_measurement(value)? {
            Some(body_fat) if body_fat >= 100.0 => Err(ValidationError::Other(
                "Body fat must be below 100 %".into(),
            )),
            body_fat => Ok(body_fat),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait BodyMetricRepository {
    /// Returns all metrics of the user ordered by recording time.
    async fn read_body_metrics(&self, user_id: UserID) -> Result<Vec<BodyMetric>, ReadError>;
    /// The id of the given metric is replaced by a newly generated one.
    async fn create_body_metric(&self, metric: BodyMetric) -> Result<BodyMetric, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyMetric {
    pub id: BodyMetricID,
    pub user_id: UserID,
    pub recorded_at: NaiveDateTime,
    pub weight: Option<f32>,
    pub body_fat: Option<f32>,
    pub chest: Option<f32>,
    pub waist: Option<f32>,
    pub hips: Option<f32>,
    pub left_arm: Option<f32>,
    pub right_arm: Option<f32>,
    pub left_thigh: Option<f32>,
    pub right_thigh: Option<f32>,
    pub left_calf: Option<f32>,
    pub right_calf: Option<f32>,
    pub notes: String,
}

impl BodyMetric {
    #[must_use]
    pub fn new(user_id: UserID, recorded_at: NaiveDateTime) -> Self {
        Self {
            id: BodyMetricID::nil(),
            user_id,
            recorded_at,
            weight: None,
            body_fat: None,
            chest: None,
            waist: None,
            hips: None,
            left_arm: None,
            right_arm: None,
            left_thigh: None,
            right_thigh: None,
            left_calf: None,
            right_calf: None,
            notes: String::new(),
        }
    }
}

id!(BodyMetricID);

/// Change between the oldest and the latest recorded metric.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMetricChange {
    pub first: BodyMetric,
    pub latest: BodyMetric,
    pub weight_change: f32,
    pub body_fat_change: f32,
}

/// Requires at least two metrics. Missing values count as zero.
#[must_use]
pub fn body_metric_change(metrics: &[BodyMetric]) -> Option<BodyMetricChange> {
    let first = metrics.iter().min_by_key(|m| m.recorded_at)?;
    let latest = metrics.iter().max_by_key(|m| m.recorded_at)?;

    if first.id == latest.id {
        return None;
    }

    Some(BodyMetricChange {
        first: first.clone(),
        latest: latest.clone(),
        weight_change: latest.weight.unwrap_or_default() - first.weight.unwrap_or_default(),
        body_fat_change: latest.body_fat.unwrap_or_default() - first.body_fat.unwrap_or_default(),
    })
}
