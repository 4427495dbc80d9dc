use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    pub faq_id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f32,
}

fn default_confidence_level() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    pub course_type: String,
    pub credits: i64,
    pub faculty_theory: String,
    pub faculty_lab: Option<String>,
    pub semester: i64,
    pub cie_marks: i64,
    pub see_marks: i64,
    pub hours_per_week: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Graded,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "submitted" => AssignmentStatus::Submitted,
            "graded" => AssignmentStatus::Graded,
            _ => AssignmentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: i64,
    pub course_code: String,
    pub title: String,
    pub description: String,
    pub assignment_type: String,
    pub deadline: DateTime<Utc>,
    pub marks: i64,
    pub status: AssignmentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FactRecord {
    Faq(Faq),
    Course(Course),
    Assignment(Assignment),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Farewell,
    Timetable,
    Faculty,
    Exam,
    Assignment,
    Course,
    Attendance,
    General,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::Timetable => "timetable",
            Intent::Faculty => "faculty",
            Intent::Exam => "exam",
            Intent::Assignment => "assignment",
            Intent::Course => "course",
            Intent::Attendance => "attendance",
            Intent::General => "general",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let intent = match value.trim().to_ascii_lowercase().as_str() {
            "greeting" => Intent::Greeting,
            "farewell" => Intent::Farewell,
            "timetable" => Intent::Timetable,
            "faculty" => Intent::Faculty,
            "exam" => Intent::Exam,
            "assignment" => Intent::Assignment,
            "course" => Intent::Course,
            "attendance" => Intent::Attendance,
            "general" => Intent::General,
            _ => return None,
        };
        Some(intent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.course.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: FactRecord,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub intent: String,
    pub confidence: f32,
    pub entities: Entities,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickAction {
    pub label: String,
    pub query: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreCounts {
    pub faqs: i64,
    pub courses: i64,
    pub assignments: i64,
}
