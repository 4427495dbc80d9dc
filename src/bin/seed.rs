use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatbot::config::AppConfig;
use chatbot::db::Database;
use chatbot::seed::SeedData;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Create the SQLite schema and load the department dataset")]
struct Cli {
    /// Print what would be loaded without touching the database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let data = SeedData::department();
    if cli.dry_run {
        println!(
            "Would load faqs={} courses={} assignments={}",
            data.faqs.len(),
            data.courses.len(),
            data.assignments.len()
        );
        return Ok(());
    }

    let config = AppConfig::from_env();
    let db = Database::new(&config).await?;
    let counts = db.seed(&data).await?;

    tracing::info!(dsn = %config.sqlite_dsn(), "seed complete");
    println!(
        "Seed complete. faqs={} courses={} assignments={}",
        counts.faqs, counts.courses, counts.assignments
    );

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
