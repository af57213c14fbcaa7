//! Database models module

mod models;
mod table;

pub use models::PriceSnapshot;
pub use table::Table;
