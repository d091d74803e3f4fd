use sqlx::error::Error;

use crate::model::{Event, NewEvent, Table};

impl Table<Event> {
    pub async fn insert(&self, event: NewEvent) -> Result<i64, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (date, title, user, time)
            VALUES(?, ?, ?, ?)
            "#,
        )
        .bind(&event.date)
        .bind(&event.title)
        .bind(&event.user)
        .bind(&event.time)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Both bounds inclusive, `YYYY-MM-DD`.
    pub async fn get_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<Event>, Error> {
        sqlx::query_as(
            r#"
            SELECT id, date, title, user, time
            FROM events
            WHERE date BETWEEN ? AND ?
            ORDER BY date, time, id
            "#,
        )
        .bind(from)
        .bind(to)
        .persistent(true)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_by_date(&self, date: &str) -> Result<Vec<Event>, Error> {
        sqlx::query_as(
            r#"
            SELECT id, date, title, user, time
            FROM events
            WHERE date = ?
            ORDER BY time, id
            "#,
        )
        .bind(date)
        .persistent(true)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_timed_by_date(
        &self,
        date: &str,
    ) -> Result<Vec<Event>, Error> {
        sqlx::query_as(
            r#"
            SELECT id, date, title, user, time
            FROM events
            WHERE date = ? AND time IS NOT NULL
            ORDER BY time, id
            "#,
        )
        .bind(date)
        .persistent(true)
        .fetch_all(&self.pool)
        .await
    }

    /// Events strictly after `after` and on or before `until`.
    pub async fn get_upcoming(
        &self,
        after: &str,
        until: &str,
    ) -> Result<Vec<Event>, Error> {
        sqlx::query_as(
            r#"
            SELECT id, date, title, user, time
            FROM events
            WHERE date > ? AND date <= ?
            ORDER BY date, time, id
            "#,
        )
        .bind(after)
        .bind(until)
        .persistent(true)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
