use actix_web::{get, web, Responder, Result};
use chrono::Utc;
use serde::Serialize;

use crate::error::Error;

#[get("/info")]
async fn index() -> Result<impl Responder, Error> {
    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

    Ok(web::Json(Response {
        app_name: "Coindash Market Analytics",
        version: VERSION,
        description: "Market data backend with CoinMarketCap integration",
        features: vec![
            "Live cryptocurrency data",
            "Postgres snapshot storage",
            "Automatic background synchronization",
            "Search",
            "Analytics dashboard",
            "Portfolio calculation",
        ],
        endpoints: vec![
            "/api/crypto/health",
            "/api/crypto/popular",
            "/api/crypto/search?q=bitcoin",
            "/api/crypto/price/{symbol}",
            "/api/crypto/analytics/{symbol}",
            "/api/crypto/sync",
        ],
        timestamp: Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub app_name: &'static str,
    pub version: Option<&'static str>,
    pub description: &'static str,
    pub features: Vec<&'static str>,
    pub endpoints: Vec<&'static str>,
    pub timestamp: i64,
}
