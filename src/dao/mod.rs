mod sqlite;

pub use sqlite::{is_unique_violation, PoolOption, PoolType, QueryResult};
