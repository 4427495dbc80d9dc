use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::chat::ChatService;
use crate::config::AppConfig;
use crate::db::Database;
use crate::models::{ChatRequest, ChatResponse, HistoryQuery, QuickAction};

#[derive(Clone)]
struct AppState {
    db: Database,
    chat: ChatService,
}

pub fn router(db: Database, chat: ChatService) -> Router {
    let state = AppState { db, chat };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chatbot/chat", post(chat_handler))
        .route("/api/chatbot/history", get(history_handler))
        .route("/api/chatbot/session/:session_id", delete(clear_session))
        .route("/api/chatbot/quick-actions", get(quick_actions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: AppConfig, db: Database, chat: ChatService) -> Result<()> {
    let app = router(db, chat);

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!(mode = config.chat_mode.as_str(), "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Academic Chatbot API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let (healthy, counts) = match state.db.counts().await {
        Ok(counts) => (true, counts),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not count records");
            (false, Default::default())
        }
    };

    Json(json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "generator_available": state.chat.generator_available(),
        "chat_mode": state.chat.mode().as_str(),
        "history_capacity": state.chat.history().capacity(),
        "database": {
            "healthy": healthy,
            "faqs": counts.faqs,
            "courses": counts.courses,
            "assignments": counts.assignments,
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let response = state.chat.respond(&request.message, &session_id).await;

    state
        .db
        .save_chat(
            &session_id,
            &request.message,
            &response.response,
            response.intent,
            response.confidence,
            &response.entities,
        )
        .await?;

    Ok(Json(response))
}

async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let history = state
        .db
        .chat_history(query.session_id.as_deref(), query.limit)
        .await?;
    Ok(Json(json!({ "history": history })))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let cleared = state.chat.clear_session(&session_id);
    tracing::info!(session_id = %session_id, cleared, "session cleared");
    Json(json!({ "message": "Session cleared successfully" }))
}

async fn quick_actions(State(state): State<AppState>) -> Json<Value> {
    let assignments = match state.db.counts().await {
        Ok(counts) => counts.assignments,
        Err(err) => {
            tracing::warn!(error = %err, "quick actions could not count assignments");
            0
        }
    };
    Json(json!({ "actions": quick_action_list(assignments) }))
}

fn quick_action_list(assignment_count: i64) -> Vec<QuickAction> {
    let action = |label: &str, query: &str| QuickAction {
        label: label.to_string(),
        query: query.to_string(),
    };

    let mut actions = vec![
        action("📚 All Courses", "What courses are there this semester?"),
        action("🎯 Assignments", "What assignments are due soon?"),
        action("📝 Exam Schedule", "When are the upcoming exams?"),
        action("👨‍🏫 Faculty Info", "Who are the faculty members?"),
        action("📅 Today's Classes", "What classes do I have today?"),
        action("📊 Policies", "What are the academic policies?"),
    ];
    if assignment_count > 0 {
        actions.insert(
            1,
            action(
                &format!("⏰ {assignment_count} Assignments"),
                "Show me all assignment deadlines",
            ),
        );
    }
    actions
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        tracing::error!(error = %value, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
