use actix_web::{get, web, Responder, Result};
use serde::Deserialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/search")]
async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<impl Responder, Error> {
    let term = data.q.as_deref().unwrap_or("");
    let assets = state.market.search(term).await;

    Ok(web::Json(assets))
}

#[derive(Debug, Deserialize)]
pub struct Query {
    q: Option<String>,
}
