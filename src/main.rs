// src/main.rs
use env_logger::Builder;
use log::{error, info, LevelFilter};
use portfolio_tracker::api;
use portfolio_tracker::config::Settings;
use portfolio_tracker::models::seed_positions;
use portfolio_tracker::quote::AlphaVantageClient;
use portfolio_tracker::store::PortfolioStore;
use portfolio_tracker::trading::TradingDesk;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use warp::Filter;

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let level = settings
        .as_ref()
        .map(|s| s.log_level)
        .unwrap_or(LevelFilter::Info);
    Builder::new()
        .filter_level(level)
        .format_timestamp_secs()
        .init();

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    info!("Starting the portfolio tracker...");
    let (store, store_task) = PortfolioStore::spawn(seed_positions(), settings.queue_depth);
    let desk = Arc::new(Mutex::new(TradingDesk::new()));
    let quotes = Arc::new(AlphaVantageClient::new(Client::new(), settings.api_key.clone()));

    let api = api::routes(store.clone(), desk, quotes).recover(api::handle_rejection);

    let server = warp::serve(api).try_bind_with_graceful_shutdown(settings.bind, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    });
    match server {
        Ok((addr, running)) => {
            info!("Server running on http://{}", addr);
            running.await;
            info!("Shutting down...");
        }
        Err(e) => error!("Failed to bind {}: {}", settings.bind, e),
    }

    drop(store);
    store_task.shutdown().await;
}
