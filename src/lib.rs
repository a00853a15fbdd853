#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod detail;
pub mod fetch;
pub mod formats;
pub mod html;
pub mod listing;
pub mod logging;
pub mod record_store;
pub mod render;
pub mod scrape;
