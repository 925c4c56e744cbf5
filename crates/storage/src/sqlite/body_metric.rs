use ironplan_domain as domain;
use rusqlite::params;

use super::{Sqlite, id, new_id};

impl domain::BodyMetricRepository for Sqlite {
    async fn read_body_metrics(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::BodyMetric>, domain::ReadError> {
        Ok(self
            .with_connection(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT id, user_id, recorded_at, weight, body_fat, chest, waist, hips, left_arm,
                        right_arm, left_thigh, right_thigh, left_calf, right_calf, notes
                    FROM body_metrics WHERE user_id = ?1 ORDER BY recorded_at",
                )?;
                let metrics = statement
                    .query_map(params![*user_id], |row| {
                        Ok(domain::BodyMetric {
                            id: id(row, 0)?,
                            user_id: id(row, 1)?,
                            recorded_at: row.get(2)?,
                            weight: row.get(3)?,
                            body_fat: row.get(4)?,
                            chest: row.get(5)?,
                            waist: row.get(6)?,
                            hips: row.get(7)?,
                            left_arm: row.get(8)?,
                            right_arm: row.get(9)?,
                            left_thigh: row.get(10)?,
                            right_thigh: row.get(11)?,
                            left_calf: row.get(12)?,
                            right_calf: row.get(13)?,
                            notes: row.get(14)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(metrics)
            })
            .await?)
    }

    async fn create_body_metric(
        &self,
        metric: domain::BodyMetric,
    ) -> Result<domain::BodyMetric, domain::CreateError> {
        Ok(self
            .with_connection(move |connection| {
                let metric = domain::BodyMetric {
                    id: new_id().into(),
                    ..metric
                };
                connection.execute(
                    "INSERT INTO body_metrics (id, user_id, recorded_at, weight, body_fat, chest, waist,
                        hips, left_arm, right_arm, left_thigh, right_thigh, left_calf, right_calf, notes)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    params![
                        *metric.id,
                        *metric.user_id,
                        metric.recorded_at,
                        metric.weight,
                        metric.body_fat,
                        metric.chest,
                        metric.waist,
                        metric.hips,
                        metric.left_arm,
                        metric.right_arm,
                        metric.left_thigh,
                        metric.right_thigh,
                        metric.left_calf,
                        metric.right_calf,
                        metric.notes
                    ],
                )?;
                Ok(metric)
            })
            .await?)
    }
}
