use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Assignment, Course, Faq};
use crate::seed::SeedData;

#[async_trait]
pub trait FactStore: Send + Sync {
    async fn all_faqs(&self) -> Result<Vec<Faq>>;

    async fn faqs_by_category(&self, category: &str, limit: usize) -> Result<Vec<Faq>>;

    async fn all_courses(&self) -> Result<Vec<Course>>;

    async fn course_by_code(&self, code: &str) -> Result<Option<Course>>;

    async fn assignments_by_deadline(&self, limit: usize) -> Result<Vec<Assignment>>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    faqs: Vec<Faq>,
    courses: Vec<Course>,
    assignments: Vec<Assignment>,
}

impl MemoryStore {
    pub fn new(faqs: Vec<Faq>, courses: Vec<Course>, assignments: Vec<Assignment>) -> Self {
        Self {
            faqs,
            courses,
            assignments,
        }
    }

    pub fn seeded() -> Self {
        Self::from(SeedData::department())
    }
}

impl From<SeedData> for MemoryStore {
    fn from(data: SeedData) -> Self {
        Self::new(data.faqs, data.courses, data.assignments)
    }
}

#[async_trait]
impl FactStore for MemoryStore {
    async fn all_faqs(&self) -> Result<Vec<Faq>> {
        Ok(self.faqs.clone())
    }

    async fn faqs_by_category(&self, category: &str, limit: usize) -> Result<Vec<Faq>> {
        let needle = category.to_lowercase();
        Ok(self
            .faqs
            .iter()
            .filter(|faq| faq.category.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        Ok(self.courses.clone())
    }

    async fn course_by_code(&self, code: &str) -> Result<Option<Course>> {
        Ok(self
            .courses
            .iter()
            .find(|course| course.course_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn assignments_by_deadline(&self, limit: usize) -> Result<Vec<Assignment>> {
        let mut out = self.assignments.clone();
        out.sort_by_key(|assignment| assignment.deadline);
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn category_lookup_is_substring_and_bounded() {
        let store = MemoryStore::seeded();
        let exam = store.faqs_by_category("exam", 3).await.unwrap();
        assert_eq!(exam.len(), 3);
        assert!(exam.iter().all(|faq| faq.category.contains("exam")));

        let none = store.faqs_by_category("parking", 3).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn assignments_come_back_by_deadline() {
        let store = MemoryStore::seeded();
        let assignments = store.assignments_by_deadline(10).await.unwrap();
        assert_eq!(assignments.len(), 10);
        assert!(assignments
            .windows(2)
            .all(|pair| pair[0].deadline <= pair[1].deadline));
    }

    #[tokio::test]
    async fn course_lookup_ignores_case() {
        let store = MemoryStore::seeded();
        let course = store.course_by_code("22aml72").await.unwrap();
        assert_eq!(
            course.map(|c| c.course_name),
            Some("Quantum Computing".to_string())
        );
        assert!(store.course_by_code("XX000").await.unwrap().is_none());
    }
}
