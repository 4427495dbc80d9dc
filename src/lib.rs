pub mod chat;
pub mod config;
pub mod context;
pub mod db;
pub mod gemini;
pub mod generator;
pub mod history;
pub mod intent;
pub mod models;
pub mod ollama;
pub mod policy;
pub mod scoring;
pub mod seed;
pub mod server;
pub mod store;

pub use config::AppConfig;
pub use server::run_server;
