use sqlx::{
    sqlite::{SqlitePoolOptions, SqliteQueryResult},
    SqlitePool,
};

pub type PoolType = SqlitePool;
pub type PoolOption = SqlitePoolOptions;
pub type QueryResult = SqliteQueryResult;

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.is_unique_violation(),
        _ => false,
    }
}
