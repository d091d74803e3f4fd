pub use self::types::{is_unique_violation, PoolOption, PoolType, QueryResult};

mod event;
mod notification_log;
mod subscription;
mod types;
