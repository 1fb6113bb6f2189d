pub mod app_context;
pub mod common;
pub mod config;
pub mod database;
pub mod errors;
pub mod flow;
pub mod services;

pub use app_context::AppContext;
pub use config::AppConfig;
