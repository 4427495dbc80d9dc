use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::gemini::DEFAULT_GEMINI_BASE_URL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatMode {
    Simple,
    Grounded,
}

impl ChatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatMode::Simple => "simple",
            ChatMode::Grounded => "grounded",
        }
    }
}

impl FromStr for ChatMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ChatMode::Simple),
            "grounded" => Ok(ChatMode::Grounded),
            other => Err(format!("unknown chat mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GeneratorBackend {
    Gemini { api_key: String, base_url: String },
    Ollama { base_url: String },
    Disabled,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackend,
    pub model: String,
    pub max_output_tokens: usize,
    pub temperature: f32,
    pub max_concurrency: usize,
}

#[derive(Clone, Debug)]
pub struct RetrievalConfig {
    pub relevance_threshold: f64,
    pub thin_context_chars: usize,
    pub top_k: usize,
    pub category_limit: usize,
    pub assignment_limit: usize,
    pub fallback_course_limit: usize,
    pub history_capacity: usize,
    pub prompt_history_turns: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 15.0,
            thin_context_chars: 50,
            top_k: 3,
            category_limit: 3,
            assignment_limit: 10,
            fallback_course_limit: 5,
            history_capacity: 10,
            prompt_history_turns: 3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub chat_mode: ChatMode,
    pub generator: GeneratorConfig,
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let (backend, model) = if let Some(api_key) = non_empty("GEMINI_API_KEY") {
            (
                GeneratorBackend::Gemini {
                    api_key,
                    base_url: non_empty("GEMINI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                },
                non_empty("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            )
        } else if let Some(base_url) = non_empty("OLLAMA_BASE_URL") {
            (
                GeneratorBackend::Ollama { base_url },
                non_empty("ANSWER_MODEL").unwrap_or_else(|| "qwen2.5:7b-instruct".to_string()),
            )
        } else {
            (GeneratorBackend::Disabled, String::new())
        };

        let defaults = RetrievalConfig::default();

        Self {
            bind_addr: non_empty("CHATBOT_BIND").unwrap_or_else(|| "127.0.0.1:8000".to_string()),
            data_dir: non_empty("CHATBOT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            chat_mode: parse_var(&var, "CHAT_MODE").unwrap_or(ChatMode::Grounded),
            generator: GeneratorConfig {
                backend,
                model,
                max_output_tokens: parse_var(&var, "MAX_OUTPUT_TOKENS").unwrap_or(500),
                temperature: parse_var(&var, "GENERATION_TEMPERATURE").unwrap_or(0.3),
                max_concurrency: parse_var(&var, "GENERATION_CONCURRENCY")
                    .filter(|n: &usize| *n > 0)
                    .unwrap_or(4),
            },
            retrieval: RetrievalConfig {
                relevance_threshold: parse_var(&var, "RELEVANCE_THRESHOLD")
                    .unwrap_or(defaults.relevance_threshold),
                thin_context_chars: parse_var(&var, "THIN_CONTEXT_CHARS")
                    .unwrap_or(defaults.thin_context_chars),
                top_k: parse_var(&var, "SCORE_TOP_K").unwrap_or(defaults.top_k),
                category_limit: parse_var(&var, "CATEGORY_FAQ_LIMIT")
                    .unwrap_or(defaults.category_limit),
                assignment_limit: parse_var(&var, "ASSIGNMENT_LIMIT")
                    .unwrap_or(defaults.assignment_limit),
                fallback_course_limit: parse_var(&var, "FALLBACK_COURSE_LIMIT")
                    .unwrap_or(defaults.fallback_course_limit),
                history_capacity: parse_var(&var, "HISTORY_CAPACITY")
                    .unwrap_or(defaults.history_capacity),
                prompt_history_turns: parse_var(&var, "PROMPT_HISTORY_TURNS")
                    .unwrap_or(defaults.prompt_history_turns),
            },
        }
    }

    pub fn generator_configured(&self) -> bool {
        self.generator.backend != GeneratorBackend::Disabled
    }

    pub fn sqlite_dsn(&self) -> String {
        format!(
            "sqlite://{}",
            self.data_dir.join("academic.sqlite3").display()
        )
    }
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.chat_mode, ChatMode::Grounded);
        assert_eq!(config.generator.backend, GeneratorBackend::Disabled);
        assert!(!config.generator_configured());
        assert_eq!(config.retrieval.relevance_threshold, 15.0);
        assert_eq!(config.retrieval.thin_context_chars, 50);
        assert_eq!(config.generator.max_concurrency, 4);
        assert!(config.sqlite_dsn().ends_with("academic.sqlite3"));
    }

    #[test]
    fn gemini_key_takes_precedence_over_ollama() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "k"),
            ("OLLAMA_BASE_URL", "http://localhost:11434"),
        ]);
        assert!(matches!(
            config.generator.backend,
            GeneratorBackend::Gemini { .. }
        ));
        assert_eq!(config.generator.model, "gemini-2.5-flash");
    }

    #[test]
    fn ollama_selected_when_only_base_url_set() {
        let config = config_from(&[("OLLAMA_BASE_URL", "http://localhost:11434")]);
        assert_eq!(
            config.generator.backend,
            GeneratorBackend::Ollama {
                base_url: "http://localhost:11434".to_string()
            }
        );
    }

    #[test]
    fn blank_key_means_no_backend() {
        let config = config_from(&[("GEMINI_API_KEY", "  ")]);
        assert!(!config.generator_configured());
    }

    #[test]
    fn tuning_values_parse_or_fall_back() {
        let config = config_from(&[
            ("RELEVANCE_THRESHOLD", "22.5"),
            ("THIN_CONTEXT_CHARS", "not-a-number"),
            ("CHAT_MODE", "Simple"),
            ("GENERATION_CONCURRENCY", "0"),
        ]);
        assert_eq!(config.retrieval.relevance_threshold, 22.5);
        assert_eq!(config.retrieval.thin_context_chars, 50);
        assert_eq!(config.chat_mode, ChatMode::Simple);
        assert_eq!(config.generator.max_concurrency, 4);
    }
}
