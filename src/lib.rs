pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod drive;
pub mod error;
pub mod export;
pub mod extract;
pub mod generate;
pub mod ids;
pub mod output;
pub mod record;
pub mod schema;
pub mod sheets;
