use regex::Regex;

use crate::config::ChatMode;
use crate::context::NO_DATA_MARKER;
use crate::generator::Generator;
use crate::models::{ConversationTurn, Entities, Intent};

pub const DEGRADED_SERVICE_MESSAGE: &str = "⚠️ AI service is currently unavailable. Please ensure GEMINI_API_KEY or OLLAMA_BASE_URL is configured correctly.";

pub const GENERIC_FALLBACK: &str = "I can help you with:\n• Class timetables 📅\n• Course information 📚\n• Exam schedules 📝\n• Faculty details 👨‍🏫\n• Assignment deadlines ⏰\n\nWhat would you like to know?";

const ACADEMIC_PREAMBLE: &str = "You are an AI assistant for Global Academy of Technology, Department of Artificial Intelligence and Machine Learning.
Academic Year: 2025-2026, Semester VII

COURSES (7th Semester):
1. 22AML71 - Natural Language Processing (Prof. Vasugi I)
2. 22AML72 - Quantum Computing (Dr. Roopa B S - HOD)
3. 22AML73 - Business Intelligence (Prof. Prasanna N)
4. 22AML74A - Data Mining & Data Warehousing (Prof. Vani)
5. 22AML76 - Major Project Phase-II

FACULTY:
- HOD: Dr. Roopa B S
- Class Teacher: Prof. Prasanna N
- Coordinator: Prof. Vani
- NLP Faculty: Prof. Vasugi I

IMPORTANT DATES:
- IA1: Oct 6-8, 2025
- IA2: Nov 20-22, 2025
- Lab Exams: Nov 24-29, 2025
- Last Working Day: Dec 4, 2025

POLICIES:
- Minimum 85% attendance mandatory
- CIE: Best 2 of 3 tests
- SEE: 3 hours, answer 5 of 10 questions

Provide accurate, helpful, and concise responses.";

const ASSISTANT_ROLE: &str =
    "You are an AI assistant for Global Academy of Technology, Department of AI & ML, 7th Semester.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    Preamble,
    Grounded,
    KnowledgeGap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Canned(String),
    Generated(String),
    Unavailable,
    Failed(String),
}

impl Reply {
    pub fn text(&self) -> String {
        match self {
            Reply::Canned(text) | Reply::Generated(text) => text.clone(),
            Reply::Unavailable => DEGRADED_SERVICE_MESSAGE.to_string(),
            Reply::Failed(reason) => format!("⚠️ Error communicating with AI service: {reason}"),
        }
    }

    pub fn records_turn(&self) -> bool {
        matches!(self, Reply::Canned(_) | Reply::Generated(_))
    }
}

pub struct Turn<'a> {
    pub message: &'a str,
    pub intent: Intent,
    pub entities: &'a Entities,
    pub history: &'a [ConversationTurn],
}

#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    mode: ChatMode,
    thin_context_chars: usize,
}

impl ResponsePolicy {
    pub fn new(mode: ChatMode, thin_context_chars: usize) -> Self {
        Self {
            mode,
            thin_context_chars,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn is_thin(&self, context: &str) -> bool {
        context.trim().chars().count() < self.thin_context_chars || context.contains(NO_DATA_MARKER)
    }

    pub fn variant_for(&self, context: &str) -> PromptVariant {
        if self.is_thin(context) {
            PromptVariant::KnowledgeGap
        } else {
            PromptVariant::Grounded
        }
    }

    pub async fn respond(
        &self,
        turn: &Turn<'_>,
        context: &str,
        generator: Option<&dyn Generator>,
    ) -> Reply {
        match self.mode {
            ChatMode::Simple => self.simple_reply(turn, generator).await,
            ChatMode::Grounded => self.grounded_reply(turn, context, generator).await,
        }
    }

    async fn simple_reply(&self, turn: &Turn<'_>, generator: Option<&dyn Generator>) -> Reply {
        if let Some(canned) = canned_answer(turn.intent, turn.entities) {
            return Reply::Canned(canned.to_string());
        }

        let Some(generator) = generator else {
            return Reply::Canned(GENERIC_FALLBACK.to_string());
        };

        let prompt = build_prompt(PromptVariant::Preamble, turn.message, "", turn.history);
        match generator.generate(&prompt).await.map(|text| sanitize_model_output(&text)) {
            Ok(text) if !text.is_empty() => Reply::Generated(text),
            Ok(_) => Reply::Canned(GENERIC_FALLBACK.to_string()),
            Err(err) => {
                tracing::error!(backend = generator.name(), error = %err, "generation failed");
                Reply::Canned(GENERIC_FALLBACK.to_string())
            }
        }
    }

    async fn grounded_reply(
        &self,
        turn: &Turn<'_>,
        context: &str,
        generator: Option<&dyn Generator>,
    ) -> Reply {
        let Some(generator) = generator else {
            return Reply::Unavailable;
        };

        let variant = self.variant_for(context);
        let prompt = build_prompt(variant, turn.message, context, turn.history);
        tracing::debug!(?variant, prompt_chars = prompt.len(), "calling generator");

        match generator.generate(&prompt).await {
            Ok(text) => {
                let text = sanitize_model_output(&text);
                if text.is_empty() {
                    let canned = canned_answer(turn.intent, turn.entities);
                    Reply::Canned(canned.unwrap_or(GENERIC_FALLBACK).to_string())
                } else {
                    Reply::Generated(text)
                }
            }
            Err(err) => {
                tracing::error!(backend = generator.name(), error = %err, "generation failed");
                Reply::Failed(format!("{err:#}"))
            }
        }
    }
}

pub fn canned_answer(intent: Intent, entities: &Entities) -> Option<&'static str> {
    let text = match intent {
        Intent::Greeting => "Hello! I'm your AIML Academic Assistant 🎓\n\nI can help you with:\n• Class timetables 📅\n• Course information 📚\n• Exam schedules 📝\n• Faculty details 👨‍🏫\n• Assignment deadlines ⏰\n\nWhat would you like to know?",
        Intent::Farewell => "You're welcome! Feel free to ask anytime. Good luck with your studies! 📚",
        Intent::Timetable => timetable_for(entities.day.as_deref()),
        Intent::Faculty => "**Faculty Information:**\n\n• **HOD**: Dr. Roopa B S - Quantum Computing\n• **Class Teacher**: Prof. Prasanna N - Business Intelligence\n• **Coordinator**: Prof. Vani - Data Mining\n• **NLP Faculty**: Prof. Vasugi I\n• **Project Coordinators**: Prof. C Christlin Shanuja, Prof. Vasugi I",
        Intent::Exam => "**Important Exam Dates:**\n\n📅 **IA1**: October 6-8, 2025\n📅 **IA2**: November 20-22, 2025\n📅 **Lab Exams**: November 24-29, 2025\n📅 **CIE Freeze**: December 1, 2025\n\n**Evaluation:**\n• CIE: 50 marks (Best 2 of 3 tests)\n• SEE: 50 marks (3 hours)",
        Intent::Course => "**7th Semester Courses:**\n\n1. **22AML71** - Natural Language Processing (4 credits)\n2. **22AML72** - Quantum Computing (4 credits)\n3. **22AML73** - Business Intelligence (4 credits)\n4. **22AML74A** - Data Mining & Data Warehousing (3 credits)\n5. **22AML76** - Major Project Phase-II (6 credits)",
        Intent::Attendance => "**Academic Policies:**\n\n📊 **Attendance**: Minimum 85% mandatory\n📊 **CIE**: Best 2 of 3 tests (30+30 marks)\n📊 **SEE**: 3 hours, answer 5 of 10 questions\n📊 **Total Credits**: 21 credits this semester",
        Intent::Assignment => "**Assignment Information:**\n\n📝 **Seminar 1**: Mid-October (10 marks)\n📝 **Term Papers**: Mid-November (10 marks)\n📝 **Mini Projects**: End of semester (20 marks)\n\nCheck with your course instructors for specific deadlines!",
        Intent::General => return None,
    };
    Some(text)
}

fn timetable_for(day: Option<&str>) -> &'static str {
    match day {
        Some("monday") => "**Monday Schedule:**\n• 8:30-9:30: NLP (AIB-401)\n• 9:30-10:30: Data Mining (AIB-401)\n• 11:00-12:00: Open Elective\n• 12:00-1:00: Quantum Computing (AIB-402)\n• 2:00-4:00: Major Project",
        Some("tuesday") => "**Tuesday Schedule:**\n• 8:30-9:30: Business Intelligence (AIB-402)\n• 9:30-1:00: Major Project\n• 2:00-3:00: Data Mining (AIB-402)\n• 3:00-4:00: Quantum Computing Lab",
        Some("wednesday") => "**Wednesday Schedule:**\n• 8:30-9:30: NLP (AIB-402)\n• 9:30-10:30: Data Mining (AIB-402)\n• 11:00-12:00: Quantum Computing (AIB-402)\n• 12:00-1:00: Business Intelligence (AIB-402)\n• 2:00-3:00: NLP (AIB-402)",
        Some("thursday") => "**Thursday Schedule:**\n• 8:30-9:30: Business Intelligence Tutorial\n• 9:30-10:30: Business Intelligence\n• 11:00-12:00: Open Elective\n• 12:00-1:00: NLP\n• 2:00-4:00: Major Project",
        Some("friday") => "**Friday Schedule:**\n• 8:30-1:00: Skill Lab / Upskill\n• 2:00-4:00: Major Project",
        _ => "Please specify which day's timetable you'd like to see (Monday to Friday).",
    }
}

pub fn format_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return "No previous conversation".to_string();
    }
    turns
        .iter()
        .map(|turn| format!("User: {}\nBot: {}", turn.user, turn.bot))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(
    variant: PromptVariant,
    message: &str,
    context: &str,
    history: &[ConversationTurn],
) -> String {
    let history_text = format_history(history);

    match variant {
        PromptVariant::Preamble => format!(
            "{ACADEMIC_PREAMBLE}\n\nPrevious Conversation:\n{history_text}\n\nStudent Question: \"{message}\"\n\nProvide a helpful, accurate, and concise response (2-4 sentences)."
        ),
        PromptVariant::KnowledgeGap => format!(
            "{ASSISTANT_ROLE}

**Context:** The specific information requested is not available in the department database.

**Previous Conversation:**
{history_text}

**Student Question:** \"{message}\"

**Instructions:**
- Say plainly that the specific details are not in the department database
- Do not invent names, dates, course codes, or deadlines
- Offer general academic guidance only where it is clearly general
- Suggest contacting the department office for the specific information
- Keep the response helpful and professional

**Response:**"
        ),
        PromptVariant::Grounded => format!(
            "{ASSISTANT_ROLE}

**Database Information:**
{context}

**Previous Conversation:**
{history_text}

**Student Question:** \"{message}\"

**Instructions:**
- You MUST use the database information provided above to answer questions
- Provide specific details from the database (course codes, faculty names, dates, deadlines, etc.)
- Be helpful, friendly, and professional
- Format responses with bullet points or lists when showing multiple items
- Keep responses concise but informative (2-5 sentences for simple queries, more for complex ones)

**Response:**"
        ),
    }
}

pub fn sanitize_model_output(answer: &str) -> String {
    let mut text = answer.trim().to_string();
    if text.starts_with("```") {
        let fenced = Regex::new(r"(?s)^```[a-zA-Z]*\n(.*)\n```$")
            .ok()
            .and_then(|re| re.captures(&text).and_then(|caps| caps.get(1)))
            .map(|body| body.as_str().trim().to_string());
        text = match fenced {
            Some(body) => body,
            None => text.replace("```", "").trim().to_string(),
        };
    }
    text
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use chrono::Utc;

    use super::*;
    use crate::generator::fakes::ScriptedGenerator;

    fn turn<'a>(message: &'a str, intent: Intent, entities: &'a Entities) -> Turn<'a> {
        Turn {
            message,
            intent,
            entities,
            history: &[],
        }
    }

    fn grounded() -> ResponsePolicy {
        ResponsePolicy::new(ChatMode::Grounded, 50)
    }

    #[test]
    fn greeting_fallback_lists_capabilities() {
        let text = canned_answer(Intent::Greeting, &Entities::default()).unwrap();
        assert!(text.contains("Hello"));
        assert!(text.matches('•').count() >= 5);
    }

    #[test]
    fn timetable_fallback_depends_on_day() {
        let monday = Entities {
            day: Some("monday".to_string()),
            course: None,
        };
        let text = canned_answer(Intent::Timetable, &monday).unwrap();
        assert!(text.contains("Monday"));
        assert!(text.contains("8:30-9:30: NLP"));

        let text = canned_answer(Intent::Timetable, &Entities::default()).unwrap();
        assert!(text.starts_with("Please specify"));
    }

    #[test]
    fn general_intent_has_no_canned_answer() {
        assert!(canned_answer(Intent::General, &Entities::default()).is_none());
    }

    #[test]
    fn short_or_marker_context_is_knowledge_gap() {
        let policy = grounded();
        assert_eq!(policy.variant_for("tiny"), PromptVariant::KnowledgeGap);
        assert_eq!(policy.variant_for(&"x".repeat(49)), PromptVariant::KnowledgeGap);
        assert_eq!(policy.variant_for(NO_DATA_MARKER), PromptVariant::KnowledgeGap);
        assert_eq!(policy.variant_for(&"x".repeat(50)), PromptVariant::Grounded);
    }

    #[test]
    fn threshold_is_configurable() {
        let policy = ResponsePolicy::new(ChatMode::Grounded, 5);
        assert_eq!(policy.variant_for("tiny!"), PromptVariant::Grounded);
    }

    #[test]
    fn prompts_carry_context_history_and_question() {
        let history = vec![ConversationTurn {
            user: "hi".to_string(),
            bot: "hello".to_string(),
            timestamp: Utc::now(),
        }];
        let grounded = build_prompt(
            PromptVariant::Grounded,
            "who teaches nlp",
            "- 22AML71: Natural Language Processing",
            &history,
        );
        assert!(grounded.contains("**Database Information:**\n- 22AML71"));
        assert!(grounded.contains("User: hi\nBot: hello"));
        assert!(grounded.contains("\"who teaches nlp\""));

        let gap = build_prompt(PromptVariant::KnowledgeGap, "parking?", "", &[]);
        assert!(gap.contains("not in the department database"));
        assert!(gap.contains("contacting the department"));
        assert!(gap.contains("No previous conversation"));
        assert!(!gap.contains("**Database Information:**"));

        let preamble = build_prompt(PromptVariant::Preamble, "q", "", &[]);
        assert!(preamble.starts_with("You are an AI assistant"));
        assert!(preamble.contains("Minimum 85% attendance"));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(sanitize_model_output("```markdown\nHi there\n```"), "Hi there");
        assert_eq!(sanitize_model_output("```Hi```"), "Hi");
        assert_eq!(sanitize_model_output("  plain  "), "plain");
    }

    #[test]
    fn reply_text_and_recording() {
        assert_eq!(Reply::Unavailable.text(), DEGRADED_SERVICE_MESSAGE);
        assert!(!Reply::Unavailable.records_turn());
        let failed = Reply::Failed("timeout".to_string());
        assert_eq!(failed.text(), "⚠️ Error communicating with AI service: timeout");
        assert!(!failed.records_turn());
        assert!(Reply::Canned("x".to_string()).records_turn());
        assert!(Reply::Generated("x".to_string()).records_turn());
    }

    #[tokio::test]
    async fn grounded_without_backend_is_unavailable() {
        let entities = Entities::default();
        let reply = grounded()
            .respond(&turn("Hello", Intent::Greeting, &entities), "ctx", None)
            .await;
        assert_eq!(reply, Reply::Unavailable);
    }

    #[tokio::test]
    async fn thin_context_never_uses_grounded_prompt() {
        let generator = ScriptedGenerator::replying("Not in our records; please ask the office.");
        let entities = Entities::default();
        let reply = grounded()
            .respond(
                &turn("where do I park", Intent::General, &entities),
                "- 22AML71: NLP",
                Some(&generator),
            )
            .await;
        assert!(matches!(reply, Reply::Generated(_)));
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("not in the department database"));
        assert!(!prompt.contains("**Database Information:**"));
    }

    #[tokio::test]
    async fn grounded_failure_is_reported_once() {
        let generator = ScriptedGenerator::failing("quota exceeded");
        let entities = Entities::default();
        let reply = grounded()
            .respond(
                &turn("exam dates", Intent::Exam, &entities),
                &"exam line ".repeat(10),
                Some(&generator),
            )
            .await;
        assert_eq!(reply, Reply::Failed("quota exceeded".to_string()));
        assert_eq!(generator.calls(), 1);
    }

    struct UnreachableBackend;

    #[async_trait::async_trait]
    impl Generator for UnreachableBackend {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("connection refused"))
                .context("failed to call ollama generate endpoint")
        }
    }

    #[tokio::test]
    async fn failure_text_carries_the_underlying_cause() {
        let entities = Entities::default();
        let reply = grounded()
            .respond(
                &turn("exam dates", Intent::Exam, &entities),
                &"exam line ".repeat(10),
                Some(&UnreachableBackend),
            )
            .await;
        let text = reply.text();
        assert!(text.starts_with("⚠️ Error communicating with AI service: "));
        assert!(text.ends_with("failed to call ollama generate endpoint: connection refused"));
    }

    #[tokio::test]
    async fn empty_generation_falls_back_to_canned_text() {
        let generator = ScriptedGenerator::replying("   ");
        let entities = Entities::default();
        let reply = grounded()
            .respond(
                &turn("attendance?", Intent::Attendance, &entities),
                &"policy line ".repeat(10),
                Some(&generator),
            )
            .await;
        let Reply::Canned(text) = reply else {
            panic!("expected canned reply");
        };
        assert!(text.contains("85%"));
    }

    #[tokio::test]
    async fn simple_mode_prefers_canned_answers() {
        let policy = ResponsePolicy::new(ChatMode::Simple, 50);
        let generator = ScriptedGenerator::replying("generated");
        let entities = Entities::default();

        let reply = policy
            .respond(&turn("Hello", Intent::Greeting, &entities), "", Some(&generator))
            .await;
        assert!(matches!(reply, Reply::Canned(ref t) if t.starts_with("Hello")));
        assert_eq!(generator.calls(), 0);

        let reply = policy
            .respond(&turn("tell me a joke", Intent::General, &entities), "", Some(&generator))
            .await;
        assert_eq!(reply, Reply::Generated("generated".to_string()));
        assert!(generator.last_prompt().unwrap().contains("Semester VII"));
    }

    #[tokio::test]
    async fn simple_mode_blank_generation_serves_generic_list() {
        let policy = ResponsePolicy::new(ChatMode::Simple, 50);
        let generator = ScriptedGenerator::replying("```\n  \n```");
        let entities = Entities::default();

        let reply = policy
            .respond(&turn("tell me a joke", Intent::General, &entities), "", Some(&generator))
            .await;
        assert_eq!(reply, Reply::Canned(GENERIC_FALLBACK.to_string()));
        assert_eq!(generator.calls(), 1);

        let generator = ScriptedGenerator::replying("```markdown\nHere is one.\n```");
        let reply = policy
            .respond(&turn("tell me a joke", Intent::General, &entities), "", Some(&generator))
            .await;
        assert_eq!(reply, Reply::Generated("Here is one.".to_string()));
    }

    #[tokio::test]
    async fn simple_mode_without_backend_serves_generic_list() {
        let policy = ResponsePolicy::new(ChatMode::Simple, 50);
        let entities = Entities::default();
        let reply = policy
            .respond(&turn("tell me a joke", Intent::General, &entities), "", None)
            .await;
        assert_eq!(reply, Reply::Canned(GENERIC_FALLBACK.to_string()));
    }
}
