// src/api.rs
use crate::error::ApiError;
use crate::metrics::{compute_metrics, position_summaries, PortfolioMetrics, PositionSummary};
use crate::models::{PositionId, PositionInput};
use crate::quote::QuoteSource;
use crate::store::PortfolioStore;
use crate::trading::TradingDesk;
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::Mutex;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub type SharedDesk = Arc<Mutex<TradingDesk>>;

#[derive(Serialize)]
struct MetricsView {
    #[serde(flatten)]
    metrics: PortfolioMetrics,
    positions: Vec<PositionSummary>,
}

pub fn routes<Q>(
    store: PortfolioStore,
    desk: SharedDesk,
    quotes: Arc<Q>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone
where
    Q: QuoteSource + 'static,
{
    let snapshot = warp::path!("portfolio")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(snapshot_handler);

    let metrics = warp::path!("portfolio" / "metrics")
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(metrics_handler);

    let add = warp::path!("portfolio" / "positions")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and(warp::body::json())
        .and_then(add_position_handler);

    let update = warp::path!("portfolio" / "positions" / u64)
        .and(warp::put())
        .and(with_store(store.clone()))
        .and(warp::body::json())
        .and_then(update_position_handler);

    let delete = warp::path!("portfolio" / "positions" / u64)
        .and(warp::delete())
        .and(with_store(store))
        .and_then(delete_position_handler);

    let desk_state = warp::path!("trading")
        .and(warp::get())
        .and(with_desk(desk.clone()))
        .and_then(desk_handler);

    let search = warp::path!("trading" / "search" / String)
        .and(warp::post())
        .and(with_desk(desk.clone()))
        .and(with_quotes(quotes))
        .and_then(search_handler::<Q>);

    let buy = warp::path!("trading" / "buy")
        .and(warp::post())
        .and(with_desk(desk.clone()))
        .and_then(buy_handler);

    let sell = warp::path!("trading" / "sell")
        .and(warp::post())
        .and(with_desk(desk))
        .and_then(sell_handler);

    snapshot
        .or(metrics)
        .or(add)
        .or(update)
        .or(delete)
        .or(desk_state)
        .or(search)
        .or(buy)
        .or(sell)
}

fn with_store(
    store: PortfolioStore,
) -> impl Filter<Extract = (PortfolioStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn with_desk(desk: SharedDesk) -> impl Filter<Extract = (SharedDesk,), Error = Infallible> + Clone {
    warp::any().map(move || desk.clone())
}

fn with_quotes<Q>(quotes: Arc<Q>) -> impl Filter<Extract = (Arc<Q>,), Error = Infallible> + Clone
where
    Q: QuoteSource + 'static,
{
    warp::any().map(move || quotes.clone())
}

async fn snapshot_handler(store: PortfolioStore) -> Result<impl Reply, Rejection> {
    let snapshot = store.snapshot();
    Ok(warp::reply::json(snapshot.as_ref()))
}

async fn metrics_handler(store: PortfolioStore) -> Result<impl Reply, Rejection> {
    let snapshot = store.snapshot();
    Ok(warp::reply::json(&MetricsView {
        metrics: compute_metrics(&snapshot.positions),
        positions: position_summaries(&snapshot.positions),
    }))
}

async fn add_position_handler(
    store: PortfolioStore,
    input: PositionInput,
) -> Result<impl Reply, Rejection> {
    match store.add_position(input).await {
        Ok(id) => {
            info!("Position {} added.", id);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "id": id })),
                StatusCode::CREATED,
            ))
        }
        Err(e) => {
            error!("Failed to add position: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

async fn update_position_handler(
    id: u64,
    store: PortfolioStore,
    input: PositionInput,
) -> Result<impl Reply, Rejection> {
    let id = PositionId(id);
    match store.update_position(id, input).await {
        Ok(()) => {
            info!("Position {} updated.", id);
            Ok(warp::reply::json(&json!({ "id": id })))
        }
        Err(e) => {
            error!("Failed to update position {}: {}", id, e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

async fn delete_position_handler(id: u64, store: PortfolioStore) -> Result<impl Reply, Rejection> {
    let id = PositionId(id);
    match store.delete_position(id).await {
        Ok(()) => {
            info!("Position {} deleted.", id);
            Ok(warp::reply::json(&json!({ "id": id })))
        }
        Err(e) => {
            error!("Failed to delete position {}: {}", id, e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

async fn desk_handler(desk: SharedDesk) -> Result<impl Reply, Rejection> {
    let desk = desk.lock().await;
    Ok(warp::reply::json(&*desk))
}

async fn search_handler<Q: QuoteSource>(
    symbol: String,
    desk: SharedDesk,
    quotes: Arc<Q>,
) -> Result<impl Reply, Rejection> {
    let mut desk = desk.lock().await;
    match desk.search(quotes.as_ref(), &symbol).await {
        Ok(selected) => Ok(warp::reply::json(&selected)),
        Err(e) => {
            error!("Quote lookup failed: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}

async fn buy_handler(desk: SharedDesk) -> Result<impl Reply, Rejection> {
    let mut desk = desk.lock().await;
    match desk.buy() {
        Ok(holding) => Ok(warp::reply::json(holding)),
        Err(e) => Err(warp::reject::custom(ApiError::from(e))),
    }
}

async fn sell_handler(desk: SharedDesk) -> Result<impl Reply, Rejection> {
    let mut desk = desk.lock().await;
    match desk.sell() {
        Ok(shares) => Ok(warp::reply::json(&json!({ "shares": shares }))),
        Err(e) => Err(warp::reject::custom(ApiError::from(e))),
    }
}

/// Renders every rejection as `{"message": ..}` with a matching status.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) = err.find::<ApiError>() {
        (e.status, e.message.clone())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "message": message })),
        status,
    ))
}
