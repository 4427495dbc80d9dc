use anyhow::Result;

use crate::config::RetrievalConfig;
use crate::models::{Assignment, Course, Entities, FactRecord, Intent, ScoredRecord};
use crate::store::FactStore;

/// Returned when no section could be assembled. The response policy treats it
/// as "no grounded context"; it is never shown to the student as-is.
pub const NO_DATA_MARKER: &str = "No specific data found.";

const CATEGORY_INTENTS: [Intent; 5] = [
    Intent::Timetable,
    Intent::Exam,
    Intent::Faculty,
    Intent::Course,
    Intent::Assignment,
];

pub struct ContextAssembler<'a> {
    store: &'a dyn FactStore,
    settings: &'a RetrievalConfig,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(store: &'a dyn FactStore, settings: &'a RetrievalConfig) -> Self {
        Self { store, settings }
    }

    pub async fn candidates(&self) -> Vec<FactRecord> {
        let faqs = or_empty(self.store.all_faqs().await, "faq candidates");
        let courses = or_empty(self.store.all_courses().await, "course candidates");
        faqs.into_iter()
            .map(FactRecord::Faq)
            .chain(courses.into_iter().map(FactRecord::Course))
            .collect()
    }

    pub async fn assemble(
        &self,
        scored: &[ScoredRecord],
        intent: Intent,
        entities: &Entities,
        query: &str,
    ) -> String {
        let mut block = ContextBlock::default();

        let relevant = scored
            .first()
            .is_some_and(|top| top.score > self.settings.relevance_threshold);
        if relevant {
            block.push("**Relevant Information:**".to_string());
            for hit in scored {
                let (question, answer) = question_answer(&hit.record);
                block.push_pair(&question, &answer);
            }
        }

        if CATEGORY_INTENTS.contains(&intent) {
            let faqs = or_empty(
                self.store
                    .faqs_by_category(intent.as_str(), self.settings.category_limit)
                    .await,
                "category faqs",
            );
            if !faqs.is_empty() {
                if block.is_empty() {
                    block.push("**Relevant FAQs:**".to_string());
                }
                for faq in &faqs {
                    block.push_pair(&faq.question, &faq.answer);
                }
            }
        }

        if intent == Intent::Course || entities.course.is_some() {
            if let Some(code) = entities.course.as_deref() {
                let requested = or_empty(self.store.course_by_code(code).await, "requested course");
                if let Some(course) = requested {
                    let detail = course_detail(&course);
                    if !block.contains(&detail) {
                        block.push("\n**Requested Course:**".to_string());
                        block.push(detail);
                    }
                }
            }

            let courses = or_empty(self.store.all_courses().await, "course listing");
            if !courses.is_empty() {
                block.push("\n**Available Courses:**".to_string());
                for course in &courses {
                    block.push(format!(
                        "- {}: {} ({} credits, Faculty: {})",
                        course.course_code,
                        course.course_name,
                        course.credits,
                        course.faculty_theory
                    ));
                }
            }
        }

        if intent == Intent::Assignment {
            let assignments = or_empty(
                self.store
                    .assignments_by_deadline(self.settings.assignment_limit)
                    .await,
                "assignments",
            );
            if !assignments.is_empty() {
                block.push("\n**Upcoming Assignments:**".to_string());
                for assignment in &assignments {
                    block.push(assignment_line(assignment));
                }
            }
        }

        if block.is_empty() {
            let courses = or_empty(self.store.all_courses().await, "fallback courses");
            if !courses.is_empty() {
                block.push("**7th Semester Courses:**".to_string());
                for course in courses.iter().take(self.settings.fallback_course_limit) {
                    block.push(format!("- {}: {}", course.course_code, course.course_name));
                }
            }
        }

        tracing::debug!(
            query,
            intent = intent.as_str(),
            lines = block.parts.len(),
            "assembled context"
        );
        block.finish()
    }
}

#[derive(Default)]
struct ContextBlock {
    parts: Vec<String>,
}

impl ContextBlock {
    fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn push(&mut self, line: String) {
        self.parts.push(line);
    }

    fn contains(&self, text: &str) -> bool {
        self.parts.join("\n").contains(text)
    }

    /// Appends a Q/A pair unless its text already occurs anywhere in the
    /// block. This is a plain substring test, so a short pair that happens to
    /// appear inside unrelated earlier text is suppressed as well.
    fn push_pair(&mut self, question: &str, answer: &str) -> bool {
        let candidate = format!("Q: {question}\nA: {answer}\n");
        if self.contains(&candidate) {
            return false;
        }
        self.parts.push(format!("Q: {question}"));
        self.parts.push(format!("A: {answer}\n"));
        true
    }

    fn finish(self) -> String {
        if self.parts.is_empty() {
            NO_DATA_MARKER.to_string()
        } else {
            self.parts.join("\n")
        }
    }
}

fn or_empty<T: Default>(result: Result<T>, section: &str) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(section, error = %err, "store query failed; skipping section");
        T::default()
    })
}

pub fn question_answer(record: &FactRecord) -> (String, String) {
    match record {
        FactRecord::Faq(faq) => (faq.question.clone(), faq.answer.clone()),
        FactRecord::Course(course) => (
            format!("Who teaches {} ({})?", course.course_name, course.course_code),
            course_detail(course),
        ),
        FactRecord::Assignment(assignment) => (
            format!("{} ({})", assignment.title, assignment.course_code),
            format!(
                "Due: {}, Marks: {}. {}",
                assignment.deadline.format("%B %d, %Y"),
                assignment.marks,
                assignment.description
            ),
        ),
    }
}

fn course_detail(course: &Course) -> String {
    let mut detail = format!(
        "{} {}: {} credits, {}; theory: {}",
        course.course_code,
        course.course_name,
        course.credits,
        course.course_type,
        course.faculty_theory
    );
    if let Some(lab) = course.faculty_lab.as_deref() {
        detail.push_str(&format!("; lab: {lab}"));
    }
    detail.push_str(&format!(
        "; CIE {} / SEE {}; {}",
        course.cie_marks, course.see_marks, course.hours_per_week
    ));
    detail
}

fn assignment_line(assignment: &Assignment) -> String {
    format!(
        "- {} ({}) - Due: {}, Marks: {}",
        assignment.title,
        assignment.course_code,
        assignment.deadline.format("%B %d, %Y"),
        assignment.marks
    )
}
