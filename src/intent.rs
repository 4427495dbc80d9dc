use crate::models::{Entities, Intent};

const FALLBACK_CONFIDENCE: f32 = 0.70;

struct IntentRule {
    intent: Intent,
    confidence: f32,
    keywords: &'static [&'static str],
}

// Evaluated top to bottom; the first rule with a keyword present wins.
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Greeting,
        confidence: 0.95,
        keywords: &["hello", "hi", "hey", "greetings"],
    },
    IntentRule {
        intent: Intent::Farewell,
        confidence: 0.95,
        keywords: &["bye", "goodbye", "thanks", "thank you"],
    },
    IntentRule {
        intent: Intent::Timetable,
        confidence: 0.90,
        keywords: &["timetable", "schedule", "class"],
    },
    IntentRule {
        intent: Intent::Faculty,
        confidence: 0.90,
        keywords: &["faculty", "teacher", "professor", "hod"],
    },
    IntentRule {
        intent: Intent::Exam,
        confidence: 0.90,
        keywords: &["exam", "test", "ia", "assessment"],
    },
    IntentRule {
        intent: Intent::Assignment,
        confidence: 0.90,
        keywords: &["assignment", "deadline", "seminar", "term paper"],
    },
    IntentRule {
        intent: Intent::Course,
        confidence: 0.90,
        keywords: &["course", "subject", "syllabus"],
    },
    IntentRule {
        intent: Intent::Attendance,
        confidence: 0.90,
        keywords: &["attendance", "policy"],
    },
];

const WEEKDAYS: [&str; 5] = ["monday", "tuesday", "wednesday", "thursday", "friday"];

// Alias -> canonical course code, first match wins.
const COURSE_ALIASES: &[(&str, &str)] = &[
    ("nlp", "22AML71"),
    ("natural language", "22AML71"),
    ("quantum", "22AML72"),
    ("business intelligence", "22AML73"),
    ("business", "22AML73"),
    ("bi", "22AML73"),
    ("data mining", "22AML74A"),
    ("dmdw", "22AML74A"),
];

// Keyword matching is plain substring search over the lower-cased message,
// so short keywords such as "hi" also fire inside longer words.
pub fn classify_intent(message: &str) -> (Intent, f32) {
    let lower = message.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| (rule.intent, rule.confidence))
        .unwrap_or((Intent::General, FALLBACK_CONFIDENCE))
}

// The intent is not consulted yet; day and course rules apply to every intent.
pub fn extract_entities(message: &str, _intent: Intent) -> Entities {
    let lower = message.to_lowercase();

    let day = WEEKDAYS
        .iter()
        .find(|day| lower.contains(*day))
        .map(|day| day.to_string());

    let course = COURSE_ALIASES
        .iter()
        .find(|(alias, _)| lower.contains(alias))
        .map(|(_, code)| code.to_string());

    Entities { day, course }
}
