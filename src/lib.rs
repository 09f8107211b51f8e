//! Mercedes me vehicle telemetry exporter
//!
//! Polls the vehicle-data API on a fixed interval and republishes each
//! resource as a Prometheus metric.

pub mod app;
pub mod auth;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod poller;
pub mod utils;
pub mod vehicle;
pub mod web;
