pub mod app;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod swagger;
pub mod utils;

pub use app::AppServices;
pub use config::Config;
pub use error::{AppError, AppResult};
