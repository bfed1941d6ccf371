mod routes;

pub mod app;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod sales;
pub mod server;
pub mod session_pool;
pub mod telemetry;
pub mod vision;

pub use app::start_app;
