pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod posts;
pub mod state;
pub mod users;
pub mod votes;

pub use app::build_app;
pub use config::AppConfig;
pub use state::AppState;
