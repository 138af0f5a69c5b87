pub mod config;
pub mod error;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
