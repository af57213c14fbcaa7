use actix_web::{get, post, web, Responder, Result};
use chrono::Utc;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/sync")]
async fn get_index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    perform_sync(state).await
}

#[post("/sync")]
async fn post_index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    perform_sync(state).await
}

async fn perform_sync(
    state: web::Data<AppState<State>>,
) -> Result<web::Json<Response>, Error> {
    let outcome = state.market.refresh().await?;

    Ok(web::Json(Response {
        status: if outcome.performed { "success" } else { "skipped" },
        message: outcome.message,
        received: outcome.received,
        inserted: outcome.inserted,
        timestamp: Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
    pub received: usize,
    pub inserted: usize,
    pub timestamp: i64,
}
