use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::config::{AppConfig, GeneratorBackend};
use crate::gemini::GeminiClient;
use crate::ollama::OllamaClient;

/// A text-generation backend. One call per user turn: the pipeline never
/// retries, so any retry or timeout policy belongs to the implementation.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct Throttled {
    inner: Arc<dyn Generator>,
    permits: Arc<Semaphore>,
}

impl Throttled {
    pub fn new(inner: Arc<dyn Generator>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }
}

#[async_trait]
impl Generator for Throttled {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let _permit = self.permits.acquire().await?;
        self.inner.generate(prompt).await
    }
}

pub fn from_config(config: &AppConfig) -> Option<Arc<dyn Generator>> {
    let settings = &config.generator;
    let backend: Arc<dyn Generator> = match &settings.backend {
        GeneratorBackend::Gemini { api_key, base_url } => Arc::new(GeminiClient::new(
            base_url.clone(),
            api_key.clone(),
            settings.model.clone(),
            settings.max_output_tokens,
            settings.temperature,
        )),
        GeneratorBackend::Ollama { base_url } => Arc::new(OllamaClient::new(
            base_url.clone(),
            settings.model.clone(),
            settings.max_output_tokens,
            settings.temperature,
        )),
        GeneratorBackend::Disabled => return None,
    };
    tracing::info!(
        backend = backend.name(),
        model = %settings.model,
        max_in_flight = settings.max_concurrency,
        "generator configured"
    );
    Some(Arc::new(Throttled::new(backend, settings.max_concurrency)))
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedGenerator;
    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> AppConfig {
        AppConfig::from_vars(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn no_backend_without_credentials() {
        let config = config_with(&[]);
        assert!(!config.generator_configured());
        assert!(from_config(&config).is_none());
    }

    #[test]
    fn backend_follows_configuration() {
        let config = config_with(&[("OLLAMA_BASE_URL", "http://127.0.0.1:11434")]);
        assert!(config.generator_configured());
        let ollama = from_config(&config);
        assert_eq!(ollama.map(|g| g.name().to_string()).as_deref(), Some("ollama"));

        let gemini = from_config(&config_with(&[("GEMINI_API_KEY", "k")]));
        assert_eq!(gemini.map(|g| g.name().to_string()).as_deref(), Some("gemini"));
    }

    #[tokio::test]
    async fn throttled_passes_calls_through() {
        let inner = Arc::new(ScriptedGenerator::replying("ok"));
        let throttled = Throttled::new(inner.clone(), 0);
        assert_eq!(throttled.generate("p").await.unwrap(), "ok");
        assert_eq!(throttled.generate("q").await.unwrap(), "ok");
        assert_eq!(inner.calls(), 2);
        assert_eq!(throttled.name(), "scripted");
    }
}
