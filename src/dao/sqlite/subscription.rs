use sqlx::error::Error;

use super::QueryResult;
use crate::model::{Subscription, Table};

impl Table<Subscription> {
    /// Fails with a unique violation when the endpoint is already stored.
    pub async fn insert(
        &self,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
    ) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (endpoint, p256dh, auth)
            VALUES(?, ?, ?)
            "#,
        )
        .bind(endpoint)
        .bind(p256dh)
        .bind(auth)
        .execute(&self.pool)
        .await
    }

    pub async fn get_all(&self) -> Result<Vec<Subscription>, Error> {
        sqlx::query_as(
            r#"
            SELECT id, endpoint, p256dh, auth FROM subscriptions ORDER BY id
            "#,
        )
        .persistent(true)
        .fetch_all(&self.pool)
        .await
    }

    /// Deleting an endpoint that is not stored is a no-op.
    pub async fn delete_by_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions WHERE endpoint = ?
            "#,
        )
        .bind(endpoint)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (value,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM subscriptions
            "#,
        )
        .persistent(true)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }
}
