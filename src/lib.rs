pub mod args;
pub mod config;
pub mod constants;
pub mod infrastructure;
pub mod models;
pub mod performance;
pub mod processor;
pub mod repository;
pub mod utils;
