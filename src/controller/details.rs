use actix_web::{get, web, Responder, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/details/{symbol}")]
async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let symbol = path.into_inner();

    let asset = state
        .market
        .search(&symbol)
        .await
        .into_iter()
        .next()
        .ok_or_else(|| {
            Error::NotFound(format!("no asset matching {}", symbol))
        })?;

    Ok(web::Json(asset))
}
