pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod services;

pub use config::Config;
pub use services::{AuthService, TimeClockService};

pub struct AppState {
    pub auth_service: AuthService,
}
