use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;

use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{Event, Notification_Log, Subscription, Table},
};

#[derive(Debug, Clone)]
pub struct DatabasePool {
    pub events: Table<Event>,
    pub subscription: Table<Subscription>,
    pub notification_log: Table<Notification_Log>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true);

        let pool = PoolOption::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(DatabasePool::from_pool(pool))
    }

    pub fn from_pool(pool: PoolType) -> DatabasePool {
        DatabasePool {
            events: Table::new(pool.clone()),
            subscription: Table::new(pool.clone()),
            notification_log: Table::new(pool.clone()),
            pool,
        }
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
