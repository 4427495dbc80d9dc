use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use chatbot::chat::ChatService;
use chatbot::config::AppConfig;
use chatbot::db::Database;
use chatbot::generator;
use chatbot::models::Intent;
use chatbot::store::{FactStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "eval")]
#[command(about = "Run a local intent/answer evaluation set")]
struct Cli {
    #[arg(long, default_value = "eval/prompts.jsonl")]
    file: String,
    /// Use the built-in dataset instead of the SQLite file.
    #[arg(long, default_value_t = false)]
    memory: bool,
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct EvalPrompt {
    id: String,
    question: String,
    #[serde(default)]
    expect_intent: Option<String>,
    #[serde(default)]
    expect_contains: Vec<String>,
    #[serde(default)]
    context_contains: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let store: Arc<dyn FactStore> = if cli.memory {
        Arc::new(MemoryStore::seeded())
    } else {
        Arc::new(Database::new(&config).await?)
    };
    let chat = ChatService::new(&config, store, generator::from_config(&config));

    let prompts = load_prompts(&cli.file)?;
    if prompts.is_empty() {
        anyhow::bail!("no prompts found in {}", cli.file);
    }

    let mut total = 0usize;
    let mut intent_expectations = 0usize;
    let mut intent_hits = 0usize;
    let mut pass_contains = 0usize;
    let mut pass_context = 0usize;

    for prompt in prompts {
        total += 1;
        let session_id = format!("eval-{}", uuid::Uuid::new_v4());

        let retrieval = chat.retrieve(&prompt.question).await;
        let response = chat.respond(&prompt.question, &session_id).await;

        if let Some(label) = &prompt.expect_intent {
            intent_expectations += 1;
            let expected = Intent::from_label(label)
                .with_context(|| format!("unknown intent {label:?} in prompt {}", prompt.id))?;
            if expected == response.intent {
                intent_hits += 1;
            }
        }

        if contains_all(&response.response, &prompt.expect_contains) {
            pass_contains += 1;
        }
        if contains_all(&retrieval.context, &prompt.context_contains) {
            pass_context += 1;
        }

        if cli.verbose {
            println!("--- {} ---", prompt.id);
            println!("Q: {}", prompt.question);
            println!(
                "Intent: {} ({:.2}) {:?}",
                response.intent.as_str(),
                response.confidence,
                response.entities
            );
            if let Some(top) = retrieval.scored.first() {
                println!("Top score: {:.1}", top.score);
            }
            println!("A: {}", response.response.replace('\n', " "));
            println!();
        }
    }

    println!("Eval prompts: {}", total);
    println!("Chat mode: {}", chat.mode().as_str());
    if intent_expectations > 0 {
        println!(
            "Intent accuracy: {:.1}% ({}/{})",
            ratio(intent_hits, intent_expectations) * 100.0,
            intent_hits,
            intent_expectations
        );
    }
    println!("Contains/expected accuracy: {:.1}%", ratio(pass_contains, total) * 100.0);
    println!("Context coverage: {:.1}%", ratio(pass_context, total) * 100.0);

    Ok(())
}

fn load_prompts(path: &str) -> Result<Vec<EvalPrompt>> {
    let file = File::open(path).with_context(|| format!("failed opening {}", path))?;
    let reader = BufReader::new(file);
    let mut prompts = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed: EvalPrompt = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON at {} line {}", path, idx + 1))?;
        prompts.push(parsed);
    }

    Ok(prompts)
}

fn contains_all(haystack: &str, needles: &[String]) -> bool {
    let lower = haystack.to_lowercase();
    needles
        .iter()
        .all(|needle| lower.contains(&needle.to_lowercase()))
}

fn ratio(n: usize, d: usize) -> f32 {
    if d == 0 {
        return 0.0;
    }
    n as f32 / d as f32
}
