use actix_web::{get, web, Responder, Result};
use chrono::Utc;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/health")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let status = state.market.status().await;

    Ok(web::Json(Response {
        status: "healthy",
        database: DatabaseStatus {
            available: status.snapshot_count.is_some(),
            cryptocurrencies: status.snapshot_count.unwrap_or(0),
        },
        api: ApiStatus {
            configured: status.source_configured,
        },
        cache: CacheStatus {
            enabled: status.cache_enabled,
        },
        timestamp: Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub status: &'static str,
    pub database: DatabaseStatus,
    pub api: ApiStatus,
    pub cache: CacheStatus,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub available: bool,
    pub cryptocurrencies: i64,
}

#[derive(Debug, Serialize)]
pub struct ApiStatus {
    pub configured: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub enabled: bool,
}
