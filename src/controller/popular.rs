use actix_web::{get, web, Responder, Result};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

#[get("/popular")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let assets = state.market.get_popular_assets(None).await;

    Ok(web::Json(assets))
}

/// Forces a sync before answering, bypassing whatever the store held.
#[get("/popular-fresh")]
async fn fresh(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    state.market.refresh().await?;
    let assets = state.market.get_popular_assets(None).await;

    Ok(web::Json(assets))
}

#[get("/top5")]
async fn top5(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let assets = state.market.get_popular_assets(Some(5)).await;

    Ok(web::Json(assets))
}
