use actix_web::{post, web, Responder, Result};
use chrono::Utc;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[post("/portfolio/value")]
async fn index(
    state: web::Data<AppState<State>>,
    symbols: web::Json<Vec<String>>,
) -> Result<impl Responder, Error> {
    let symbols = symbols.into_inner();
    let total_value = state.market.portfolio_value(&symbols).await;

    Ok(web::Json(Response {
        symbols,
        total_value,
        currency: state.config.quote_currency.to_owned(),
        timestamp: Utc::now().timestamp_millis(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub symbols: Vec<String>,
    pub total_value: f64,
    pub currency: String,
    pub timestamp: i64,
}
