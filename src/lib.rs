// src/lib.rs
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod quote;
pub mod reducer;
pub mod store;
pub mod trading;
