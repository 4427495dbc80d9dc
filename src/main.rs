use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use chatbot::chat::ChatService;
use chatbot::db::Database;
use chatbot::generator;
use chatbot::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let db = Database::new(&config).await?;

    let counts = db.counts().await?;
    if counts.faqs == 0 && counts.courses == 0 {
        tracing::warn!("fact tables are empty; run the seed binary to load the department data");
    }

    if !config.generator_configured() {
        tracing::warn!("no generator configured; set GEMINI_API_KEY or OLLAMA_BASE_URL");
    }
    let generator = generator::from_config(&config);

    let chat = ChatService::new(&config, Arc::new(db.clone()), generator);

    run_server(config, db, chat).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
