use sqlx::error::Error;

use crate::model::{Notification_Log, NotificationCategory, Table};

impl Table<Notification_Log> {
    /// Records that `category` was sent for `event_id` on `day`.
    /// Returns false when the marker already existed.
    pub async fn mark_sent(
        &self,
        event_id: i64,
        category: NotificationCategory,
        day: &str,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO notification_log (event_id, category, day)
            VALUES(?, ?, ?)
            "#,
        )
        .bind(event_id)
        .bind(category.to_string())
        .bind(day)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_sent(
        &self,
        event_id: i64,
        category: NotificationCategory,
        day: &str,
    ) -> Result<bool, Error> {
        let (value,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM notification_log
            WHERE event_id = ? AND category = ? AND day = ?
            "#,
        )
        .bind(event_id)
        .bind(category.to_string())
        .bind(day)
        .persistent(true)
        .fetch_one(&self.pool)
        .await?;

        Ok(value > 0)
    }

    /// Drops markers older than `day`; they can never match again.
    pub async fn delete_before(&self, day: &str) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM notification_log WHERE day < ?
            "#,
        )
        .bind(day)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
