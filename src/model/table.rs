use std::marker::PhantomData;

use crate::dao::PoolType;

/// Typed handle over one table. Queries are added per row type with
/// `impl Table<Row>` blocks under `dao`.
#[derive(Debug)]
pub struct Table<T> {
    pub pool: PoolType,
    _row: PhantomData<T>,
}

impl<T> Table<T> {
    pub fn new(pool: PoolType) -> Table<T> {
        Table {
            pool,
            _row: PhantomData,
        }
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Table<T> {
        Table::new(self.pool.clone())
    }
}
