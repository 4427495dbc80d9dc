use std::borrow::Cow;
use std::cmp::Ordering;

use crate::models::{FactRecord, ScoredRecord};

const PRIMARY_TEXT_WEIGHT: f64 = 30.0;
const KEYWORD_WEIGHT: f64 = 20.0;
const IDENTIFIER_WEIGHT: f64 = 25.0;
const SIMILARITY_WEIGHT: f64 = 15.0;
const SUBJECT_BONUS: f64 = 40.0;
const DETAIL_BONUS: f64 = 35.0;

const SUBJECT_TERMS: [&str; 6] = [
    "nlp",
    "quantum",
    "business",
    "data mining",
    "robotics",
    "project",
];

const DETAIL_TERMS: [&str; 7] = [
    "module",
    "clo",
    "syllabus",
    "textbook",
    "reference",
    "detailed",
    "complete",
];

pub trait Scorable {
    fn identifier(&self) -> Cow<'_, str>;
    fn primary_text(&self) -> &str;
    fn keywords(&self) -> Vec<&str>;
}

impl Scorable for FactRecord {
    fn identifier(&self) -> Cow<'_, str> {
        match self {
            FactRecord::Faq(faq) => Cow::Borrowed(&faq.faq_id),
            FactRecord::Course(course) => Cow::Borrowed(&course.course_code),
            FactRecord::Assignment(assignment) => {
                Cow::Owned(format!("{}-{}", assignment.course_code, assignment.id))
            }
        }
    }

    fn primary_text(&self) -> &str {
        match self {
            FactRecord::Faq(faq) => &faq.question,
            FactRecord::Course(course) => &course.course_name,
            FactRecord::Assignment(assignment) => &assignment.title,
        }
    }

    fn keywords(&self) -> Vec<&str> {
        match self {
            FactRecord::Faq(faq) => faq.keywords.iter().map(String::as_str).collect(),
            FactRecord::Course(course) => {
                let mut out = vec![course.course_type.as_str(), course.faculty_theory.as_str()];
                if let Some(lab) = course.faculty_lab.as_deref() {
                    out.push(lab);
                }
                out
            }
            FactRecord::Assignment(assignment) => vec![assignment.assignment_type.as_str()],
        }
    }
}

pub fn rank_records(query: &str, records: &[FactRecord], top_k: usize) -> Vec<ScoredRecord> {
    let query_lower = query.to_lowercase();
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();

    let mut scored: Vec<ScoredRecord> = records
        .iter()
        .filter_map(|record| {
            let score = score_record(&query_lower, &tokens, record);
            (score > 0.0).then(|| ScoredRecord {
                record: record.clone(),
                score,
            })
        })
        .collect();

    // Vec::sort_by is stable, which gives the tie-break on store order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

pub fn score_record(query_lower: &str, tokens: &[&str], record: &impl Scorable) -> f64 {
    let primary = record.primary_text().to_lowercase();
    let identifier = record.identifier().to_lowercase();
    let keywords = record.keywords().join(" ").to_lowercase();

    let mut score = 0.0;

    if tokens.iter().any(|token| primary.contains(token)) {
        score += PRIMARY_TEXT_WEIGHT;
    }

    if !keywords.is_empty() {
        let hits = tokens
            .iter()
            .filter(|token| keywords.contains(*token))
            .count();
        score += KEYWORD_WEIGHT * hits as f64;
    }

    if tokens.iter().any(|token| identifier.contains(token)) {
        score += IDENTIFIER_WEIGHT;
    }

    score += SIMILARITY_WEIGHT * similarity_ratio(query_lower, &primary);

    for subject in SUBJECT_TERMS {
        if query_lower.contains(subject) && identifier.contains(subject) {
            score += SUBJECT_BONUS;
        }
    }

    let wants_detail = DETAIL_TERMS.iter().any(|term| query_lower.contains(term));
    if wants_detail && DETAIL_TERMS.iter().any(|term| identifier.contains(term)) {
        score += DETAIL_BONUS;
    }

    score
}

pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_block(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

// Earliest longest common block inside a[alo..ahi] x b[blo..bhi].
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            cur[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            let run = cur[col];
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Faq};

    fn faq(id: &str, question: &str, keywords: &[&str]) -> FactRecord {
        FactRecord::Faq(Faq {
            faq_id: id.to_string(),
            question: question.to_string(),
            answer: format!("answer for {id}"),
            category: "general".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            confidence_level: 1.0,
        })
    }

    fn quantum_course() -> FactRecord {
        FactRecord::Course(Course {
            course_code: "22AML72".to_string(),
            course_name: "Quantum Computing".to_string(),
            course_type: "IPC".to_string(),
            credits: 4,
            faculty_theory: "Dr. Roopa B S".to_string(),
            faculty_lab: None,
            semester: 7,
            cie_marks: 50,
            see_marks: 50,
            hours_per_week: "4L + 2P".to_string(),
        })
    }

    fn score_of(query: &str, record: &FactRecord) -> f64 {
        let lower = query.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        score_record(&lower, &tokens, record)
    }

    #[test]
    fn similarity_matches_reference_values() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
        assert_eq!(similarity_ratio("abcd", "abcd"), 1.0);
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
        assert_eq!(similarity_ratio("xyz", "abc"), 0.0);
    }

    #[test]
    fn similarity_is_bounded() {
        let ratio = similarity_ratio("who teaches quantum computing", "quantum computing");
        assert!(ratio > 0.0 && ratio <= 1.0);
    }

    #[test]
    fn keyword_hits_are_counted_per_token() {
        let record = faq("X1", "zzzz", &["alpha", "beta"]);
        let one = score_of("alpha", &record);
        let two = score_of("alpha beta", &record);
        assert!(one >= 20.0);
        assert!(two - one >= 20.0 - SIMILARITY_WEIGHT);
    }

    #[test]
    fn more_signals_never_score_lower() {
        let both = faq("A1", "when is the quantum exam", &["quantum"]);
        let text_only = faq("A2", "when is the quantum exam", &[]);
        let keywords_only = faq("A3", "zzzz", &["quantum"]);

        let query = "quantum";
        assert!(score_of(query, &both) >= score_of(query, &text_only));
        assert!(score_of(query, &both) >= score_of(query, &keywords_only));
    }

    #[test]
    fn subject_bonus_needs_query_and_identifier() {
        let tagged = faq("NLP_MODULE", "zzzz", &[]);
        let untagged = faq("FAQ9", "zzzz", &[]);
        let diff = score_of("nlp", &tagged) - score_of("nlp", &untagged);
        // identifier overlap + subject bonus
        assert_eq!(diff, IDENTIFIER_WEIGHT + SUBJECT_BONUS);
    }

    #[test]
    fn detail_bonus_needs_both_sides() {
        let detailed = faq("QC_SYLLABUS", "zzzz", &[]);
        let plain = faq("QC_1", "zzzz", &[]);
        let query = "complete list please";
        let diff = score_of(query, &detailed) - score_of(query, &plain);
        assert_eq!(diff, DETAIL_BONUS);
    }

    #[test]
    fn zero_scores_are_dropped() {
        let records = vec![faq("A", "xyz", &[]), faq("B", "abc", &[])];
        let ranked = rank_records("qqq", &records, 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![
            faq("T1", "same question", &[]),
            faq("T2", "same question", &[]),
            faq("T3", "same question", &[]),
        ];
        let ranked = rank_records("same question", &records, 2);
        let ids: Vec<String> = ranked
            .iter()
            .map(|s| s.record.identifier().into_owned())
            .collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[test]
    fn course_ranks_above_unrelated_faq() {
        let records = vec![
            faq(
                "HOL001",
                "What are the holidays in this semester?",
                &["holiday", "festival"],
            ),
            quantum_course(),
        ];
        let ranked = rank_records("who teaches quantum computing", &records, 3);
        assert!(!ranked.is_empty());
        assert_eq!(ranked[0].record, quantum_course());
        if let Some(second) = ranked.get(1) {
            assert!(ranked[0].score > second.score);
        }
    }

    #[test]
    fn top_k_bounds_output() {
        let records: Vec<FactRecord> = (0..10)
            .map(|n| faq(&format!("F{n}"), "exam dates", &["exam"]))
            .collect();
        assert_eq!(rank_records("exam", &records, 3).len(), 3);
    }
}
