use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::config::AppConfig;
use crate::models::{
    Assignment, AssignmentStatus, ChatLogEntry, Course, Entities, Faq, Intent, StoreCounts,
};
use crate::seed::SeedData;
use crate::store::FactStore;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .with_context(|| format!("failed to create {}", config.data_dir.display()))?;

        let options = SqliteConnectOptions::from_str(&config.sqlite_dsn())?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    // A private in-memory database, already migrated. A single connection
    // keeps every query on the same memory instance.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faqs (
                faq_id TEXT PRIMARY KEY,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                category TEXT NOT NULL,
                keywords TEXT NOT NULL,
                confidence_level REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS courses (
                course_code TEXT PRIMARY KEY,
                course_name TEXT NOT NULL,
                course_type TEXT NOT NULL,
                credits INTEGER NOT NULL,
                faculty_theory TEXT NOT NULL,
                faculty_lab TEXT,
                semester INTEGER NOT NULL,
                cie_marks INTEGER NOT NULL,
                see_marks INTEGER NOT NULL,
                hours_per_week TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS assignments (
                id INTEGER PRIMARY KEY,
                course_code TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                assignment_type TEXT NOT NULL,
                deadline TEXT NOT NULL,
                marks INTEGER NOT NULL,
                status TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                user_message TEXT NOT NULL,
                bot_response TEXT NOT NULL,
                intent TEXT NOT NULL,
                confidence REAL NOT NULL,
                entities TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_history_session ON chat_history(session_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Replaces every fact table with `data` in one transaction. Chat logs are
    // left alone.
    pub async fn seed(&self, data: &SeedData) -> Result<StoreCounts> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM faqs").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM courses").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM assignments").execute(&mut *tx).await?;

        for faq in &data.faqs {
            insert_faq_tx(&mut tx, faq).await?;
        }
        for course in &data.courses {
            insert_course_tx(&mut tx, course).await?;
        }
        for assignment in &data.assignments {
            insert_assignment_tx(&mut tx, assignment).await?;
        }

        tx.commit().await?;
        self.counts().await
    }

    pub async fn counts(&self) -> Result<StoreCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM faqs) AS faqs,
                (SELECT COUNT(*) FROM courses) AS courses,
                (SELECT COUNT(*) FROM assignments) AS assignments
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreCounts {
            faqs: row.get("faqs"),
            courses: row.get("courses"),
            assignments: row.get("assignments"),
        })
    }

    pub async fn save_chat(
        &self,
        session_id: &str,
        user_message: &str,
        bot_response: &str,
        intent: Intent,
        confidence: f32,
        entities: &Entities,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_history
                (session_id, user_message, bot_response, intent, confidence, entities, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(user_message)
        .bind(bot_response)
        .bind(intent.as_str())
        .bind(f64::from(confidence))
        .bind(serde_json::to_string(entities)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn chat_history(
        &self,
        session_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ChatLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, user_message, bot_response, intent, confidence, entities,
                created_at
            FROM chat_history
            WHERE ?1 IS NULL OR session_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )
        .bind(session_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_chat_log).collect())
    }
}

#[async_trait]
impl FactStore for Database {
    async fn all_faqs(&self) -> Result<Vec<Faq>> {
        let rows = sqlx::query(
            r#"
            SELECT faq_id, question, answer, category, keywords, confidence_level
            FROM faqs
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_faq).collect())
    }

    async fn faqs_by_category(&self, category: &str, limit: usize) -> Result<Vec<Faq>> {
        let rows = sqlx::query(
            r#"
            SELECT faq_id, question, answer, category, keywords, confidence_level
            FROM faqs
            WHERE lower(category) LIKE ?
            ORDER BY rowid ASC
            LIMIT ?
            "#,
        )
        .bind(format!("%{}%", category.to_lowercase()))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_faq).collect())
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            r#"
            SELECT course_code, course_name, course_type, credits, faculty_theory, faculty_lab,
                   semester, cie_marks, see_marks, hours_per_week
            FROM courses
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_course).collect())
    }

    async fn course_by_code(&self, code: &str) -> Result<Option<Course>> {
        let row = sqlx::query(
            r#"
            SELECT course_code, course_name, course_type, credits, faculty_theory, faculty_lab,
                   semester, cie_marks, see_marks, hours_per_week
            FROM courses
            WHERE upper(course_code) = upper(?)
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_course))
    }

    async fn assignments_by_deadline(&self, limit: usize) -> Result<Vec<Assignment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_code, title, description, assignment_type, deadline, marks, status
            FROM assignments
            ORDER BY deadline ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_assignment).collect())
    }
}

async fn insert_faq_tx(tx: &mut Transaction<'_, Sqlite>, faq: &Faq) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO faqs (faq_id, question, answer, category, keywords, confidence_level)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&faq.faq_id)
    .bind(&faq.question)
    .bind(&faq.answer)
    .bind(&faq.category)
    .bind(serde_json::to_string(&faq.keywords)?)
    .bind(f64::from(faq.confidence_level))
    .execute(&mut **tx)
    .await
    .with_context(|| format!("failed to insert faq {}", faq.faq_id))?;

    Ok(())
}

async fn insert_course_tx(tx: &mut Transaction<'_, Sqlite>, course: &Course) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO courses (course_code, course_name, course_type, credits, faculty_theory,
                             faculty_lab, semester, cie_marks, see_marks, hours_per_week)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&course.course_code)
    .bind(&course.course_name)
    .bind(&course.course_type)
    .bind(course.credits)
    .bind(&course.faculty_theory)
    .bind(&course.faculty_lab)
    .bind(course.semester)
    .bind(course.cie_marks)
    .bind(course.see_marks)
    .bind(&course.hours_per_week)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("failed to insert course {}", course.course_code))?;

    Ok(())
}

async fn insert_assignment_tx(
    tx: &mut Transaction<'_, Sqlite>,
    assignment: &Assignment,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assignments
            (id, course_code, title, description, assignment_type, deadline, marks, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(assignment.id)
    .bind(&assignment.course_code)
    .bind(&assignment.title)
    .bind(&assignment.description)
    .bind(&assignment.assignment_type)
    .bind(assignment.deadline.to_rfc3339())
    .bind(assignment.marks)
    .bind(assignment.status.as_str())
    .execute(&mut **tx)
    .await
    .with_context(|| format!("failed to insert assignment {}", assignment.id))?;

    Ok(())
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_faq(row: SqliteRow) -> Faq {
    let keywords: String = row.get("keywords");
    Faq {
        faq_id: row.get("faq_id"),
        question: row.get("question"),
        answer: row.get("answer"),
        category: row.get("category"),
        keywords: serde_json::from_str(&keywords).unwrap_or_default(),
        confidence_level: row.get::<f64, _>("confidence_level") as f32,
    }
}

fn row_to_course(row: SqliteRow) -> Course {
    Course {
        course_code: row.get("course_code"),
        course_name: row.get("course_name"),
        course_type: row.get("course_type"),
        credits: row.get("credits"),
        faculty_theory: row.get("faculty_theory"),
        faculty_lab: row.get("faculty_lab"),
        semester: row.get("semester"),
        cie_marks: row.get("cie_marks"),
        see_marks: row.get("see_marks"),
        hours_per_week: row.get("hours_per_week"),
    }
}

fn row_to_assignment(row: SqliteRow) -> Assignment {
    Assignment {
        id: row.get("id"),
        course_code: row.get("course_code"),
        title: row.get("title"),
        description: row.get("description"),
        assignment_type: row.get("assignment_type"),
        deadline: parse_timestamp(&row.get::<String, _>("deadline")),
        marks: row.get("marks"),
        status: AssignmentStatus::from_db(&row.get::<String, _>("status")),
    }
}

fn row_to_chat_log(row: SqliteRow) -> ChatLogEntry {
    let entities: String = row.get("entities");
    ChatLogEntry {
        id: row.get("id"),
        session_id: row.get("session_id"),
        user_message: row.get("user_message"),
        bot_response: row.get("bot_response"),
        intent: row.get("intent"),
        confidence: row.get::<f64, _>("confidence") as f32,
        entities: serde_json::from_str(&entities).unwrap_or_default(),
        created_at: parse_timestamp(&row.get::<String, _>("created_at")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.seed(&SeedData::department()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn seeding_reports_counts_and_is_repeatable() {
        let db = Database::in_memory().await.unwrap();
        let data = SeedData::department();
        let first = db.seed(&data).await.unwrap();
        let second = db.seed(&data).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.faqs, data.faqs.len() as i64);
        assert_eq!(first.courses, data.courses.len() as i64);
        assert_eq!(first.assignments, data.assignments.len() as i64);
    }

    #[tokio::test]
    async fn queries_match_the_memory_store() {
        let db = seeded().await;
        let memory = MemoryStore::seeded();

        assert_eq!(db.all_faqs().await.unwrap(), memory.all_faqs().await.unwrap());
        assert_eq!(db.all_courses().await.unwrap(), memory.all_courses().await.unwrap());
        assert_eq!(
            db.faqs_by_category("exam", 3).await.unwrap(),
            memory.faqs_by_category("exam", 3).await.unwrap()
        );
        assert_eq!(
            db.assignments_by_deadline(10).await.unwrap(),
            memory.assignments_by_deadline(10).await.unwrap()
        );
    }

    #[tokio::test]
    async fn course_lookup_ignores_case() {
        let db = seeded().await;
        let course = db.course_by_code("22aml71").await.unwrap().unwrap();
        assert_eq!(course.course_name, "Natural Language Processing");
        assert!(db.course_by_code("XX000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn chat_log_is_newest_first_and_filterable() {
        let db = Database::in_memory().await.unwrap();
        let entities = Entities {
            day: Some("monday".to_string()),
            course: None,
        };
        db.save_chat("a", "hi", "hello", Intent::Greeting, 0.95, &Entities::default())
            .await
            .unwrap();
        db.save_chat("b", "monday?", "schedule", Intent::Timetable, 0.9, &entities)
            .await
            .unwrap();
        db.save_chat("a", "bye", "see you", Intent::Farewell, 0.95, &Entities::default())
            .await
            .unwrap();

        let all = db.chat_history(None, 50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].user_message, "bye");

        let only_b = db.chat_history(Some("b"), 50).await.unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].intent, "timetable");
        assert_eq!(only_b[0].entities, entities);

        assert_eq!(db.chat_history(Some("a"), 1).await.unwrap().len(), 1);
    }
}
