pub use self::{
    path::get_path,
    types::{PoolOption, PoolType, QueryResult},
};

mod path;
mod price_snapshot;
mod types;
