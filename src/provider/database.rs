use crate::{
    configuration::Config,
    dao::{PoolOption, PoolType},
    error::Error,
    model::{PriceSnapshot, Table},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub price_snapshot: Table<PriceSnapshot>,
    pub pool: PoolType,
}

impl DatabasePool {
    /// The pool opens connections on first use, not here; the process comes
    /// up even when the store is down and every query site handles failure.
    pub fn new(config: &Config) -> Result<DatabasePool, Error> {
        let pool = PoolOption::new()
            .max_connections(20)
            .connect_lazy(config.database_url.as_str())?;

        Ok(DatabasePool {
            price_snapshot: Table::new(pool.clone()),
            pool,
        })
    }

    pub fn get_pool(&self) -> &PoolType {
        &self.pool
    }
}
