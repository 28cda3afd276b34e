pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod input;
pub mod request;
pub mod request_state;
mod routes;
pub mod stats;
pub mod ui;
