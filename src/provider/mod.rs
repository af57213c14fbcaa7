mod database;
mod http;

pub use database::DatabasePool;
pub use http::CoinMarketCap;
