use actix_web::{get, web, Responder, Result};
use chrono::Utc;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers,
};

#[get("/price/{symbol}")]
async fn index(
    state: web::Data<AppState<State>>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let symbol = helpers::normalize_symbol(&path.into_inner());

    let price = state.market.get_price(&symbol).await.ok_or_else(|| {
        Error::NotFound(format!("no price for symbol {}", symbol))
    })?;

    Ok(web::Json(Response {
        symbol,
        price,
        currency: state.config.quote_currency.to_owned(),
        timestamp: Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub timestamp: i64,
}
