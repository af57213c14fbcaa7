use actix_web::{get, web, Responder, Result};
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

/// Current tunables plus dependency status, for diagnostics.
#[get("/config")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let status = state.market.status().await;
    let config = &state.config;

    Ok(web::Json(Response {
        max_results: config.max_results,
        quote_currency: config.quote_currency.to_owned(),
        cache_enabled: config.cache_enabled,
        sync_interval_in_sec: config.sync_interval,
        request_timeout_in_sec: config.request_timeout,
        retention_days: config.retention_days,
        source_configured: status.source_configured,
        database_available: status.snapshot_count.is_some(),
        snapshot_count: status.snapshot_count.unwrap_or(0),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub max_results: i64,
    pub quote_currency: String,
    pub cache_enabled: bool,
    pub sync_interval_in_sec: u64,
    pub request_timeout_in_sec: u64,
    pub retention_days: i64,
    pub source_configured: bool,
    pub database_available: bool,
    pub snapshot_count: i64,
}
