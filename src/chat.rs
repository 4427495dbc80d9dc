use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::config::{AppConfig, ChatMode, RetrievalConfig};
use crate::context::ContextAssembler;
use crate::generator::Generator;
use crate::history::ConversationHistory;
use crate::intent::{classify_intent, extract_entities};
use crate::models::{ChatResponse, Entities, Intent, ScoredRecord};
use crate::policy::{ResponsePolicy, Turn};
use crate::scoring::rank_records;
use crate::store::FactStore;

#[derive(Debug, Clone)]
pub struct Retrieval {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
    pub scored: Vec<ScoredRecord>,
    pub context: String,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn FactStore>,
    generator: Option<Arc<dyn Generator>>,
    history: ConversationHistory,
    policy: ResponsePolicy,
    settings: RetrievalConfig,
}

impl ChatService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn FactStore>,
        generator: Option<Arc<dyn Generator>>,
    ) -> Self {
        Self {
            store,
            generator,
            history: ConversationHistory::new(config.retrieval.history_capacity),
            policy: ResponsePolicy::new(config.chat_mode, config.retrieval.thin_context_chars),
            settings: config.retrieval.clone(),
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.policy.mode()
    }

    pub fn generator_available(&self) -> bool {
        self.generator.is_some()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn clear_session(&self, session_id: &str) -> bool {
        self.history.clear(session_id)
    }

    pub async fn retrieve(&self, message: &str) -> Retrieval {
        let (intent, confidence) = classify_intent(message);
        let entities = extract_entities(message, intent);

        let assembler = ContextAssembler::new(self.store.as_ref(), &self.settings);
        let candidates = assembler.candidates().await;
        let scored = rank_records(message, &candidates, self.settings.top_k);
        let context = assembler.assemble(&scored, intent, &entities, message).await;

        Retrieval {
            intent,
            confidence,
            entities,
            scored,
            context,
        }
    }

    pub async fn respond(&self, message: &str, session_id: &str) -> ChatResponse {
        let started = Instant::now();

        let (intent, confidence, entities, context) = match self.policy.mode() {
            ChatMode::Grounded => {
                let retrieval = self.retrieve(message).await;
                (
                    retrieval.intent,
                    retrieval.confidence,
                    retrieval.entities,
                    retrieval.context,
                )
            }
            ChatMode::Simple => {
                let (intent, confidence) = classify_intent(message);
                (intent, confidence, extract_entities(message, intent), String::new())
            }
        };
        tracing::debug!(
            session_id,
            intent = intent.as_str(),
            confidence,
            ?entities,
            "classified message"
        );

        let history = self
            .history
            .recent(session_id, self.settings.prompt_history_turns);
        let turn = Turn {
            message,
            intent,
            entities: &entities,
            history: &history,
        };
        let reply = self
            .policy
            .respond(&turn, &context, self.generator.as_deref())
            .await;

        let text = reply.text();
        if reply.records_turn() {
            self.history.record(session_id, message, &text);
        }

        tracing::info!(
            session_id,
            intent = intent.as_str(),
            recorded = reply.records_turn(),
            latency_ms = started.elapsed().as_millis() as u64,
            "chat turn complete"
        );

        ChatResponse {
            response: text,
            intent,
            confidence,
            entities,
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
        }
    }
}
