use actix_web::{get, web, Responder, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/analytics/{symbol}")]
async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let symbol = path.into_inner();

    let analytics =
        state.analytics.compute(&symbol).await?.ok_or_else(|| {
            Error::NotFound(format!("no history for symbol {}", symbol))
        })?;

    Ok(web::Json(analytics))
}
