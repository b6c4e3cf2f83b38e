use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::agents::Dispatcher;
use crate::config::Config;
use crate::types::{AppError, ChatMessage, TokenUsage, ToolInvocation};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let dispatcher = Arc::new(Dispatcher::from_config(&config));
        Self { config, dispatcher }
    }
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Explicit persona override ("search", "analysis", "citation",
    /// "orchestrator"). When absent the router picks one.
    pub agent: Option<String>,
    /// When true the answer is delivered as a server-sent event stream
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub agent: String,
    pub role: String,
    pub content: String,
    pub tool_invocations: Vec<ToolInvocation>,
    pub usage: TokenUsage,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Whether a completion provider API key is present
    pub llm_configured: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) | AppError::ToolValidation(_) => StatusCode::BAD_REQUEST,
            AppError::Provider(_) | AppError::Adapter(_) => StatusCode::BAD_GATEWAY,
            AppError::ToolExecution(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                AppError::InvalidRequest("bad".into()).into_response().status(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Provider("down".into()).into_response().status(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal("oops".into()).into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_chat_request_stream_defaults_false() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
        )
        .unwrap();
        assert!(!request.stream);
        assert!(request.agent.is_none());
    }
}
