use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use std::convert::Infallible;
use tracing::info;

use crate::agents::ChatEvent;
use crate::models::{AppState, ChatRequest, ChatResponse};
use crate::types::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .with_state(state)
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    info!(
        message_count = request.messages.len(),
        agent = request.agent.as_deref().unwrap_or("auto"),
        stream = request.stream,
        "Received chat request"
    );

    if request.stream {
        stream_chat(state, request).await
    } else {
        let outcome = state
            .dispatcher
            .handle(&request.messages, request.agent.as_deref())
            .await?;

        Ok(Json(ChatResponse {
            agent: outcome.agent_name,
            role: outcome.role.to_string(),
            content: outcome.content,
            tool_invocations: outcome.tool_invocations,
            usage: outcome.usage,
        })
        .into_response())
    }
}

/// Streaming mode. The response opens with a `metadata` event naming the
/// selected persona, then relays events in generation order: text
/// fragments as plain data, tool invocations as `tool` events, usage as
/// a `usage` event, terminated by `[DONE]`.
async fn stream_chat(state: AppState, request: ChatRequest) -> Result<Response, AppError> {
    let result = state
        .dispatcher
        .handle_stream(&request.messages, request.agent.as_deref())
        .await?;

    let metadata = serde_json::json!({
        "agent": result.agent_name,
        "role": result.role,
    });

    let head = futures::stream::once(async move {
        Ok::<Event, Infallible>(Event::default().event("metadata").data(metadata.to_string()))
    });
    let body = result.stream.map(|event| {
        Ok(match event {
            Ok(ChatEvent::Delta(text)) => Event::default().data(text),
            Ok(ChatEvent::ToolInvocation(invocation)) => Event::default()
                .event("tool")
                .data(serde_json::to_string(&invocation).unwrap_or_default()),
            Ok(ChatEvent::Usage(usage)) => Event::default()
                .event("usage")
                .data(serde_json::to_string(&usage).unwrap_or_default()),
            Err(e) => Event::default().event("error").data(e.to_string()),
        })
    });
    let tail = futures::stream::once(async { Ok(Event::default().data("[DONE]")) });

    let events = head.chain(body).chain(tail);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        // No API key configured; provider calls fail, validation does not
        let config = Config::default_for_tests();
        AppState::from_config(config)
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_message_list_is_bad_request() {
        let app = router(test_state());
        let response = app
            .oneshot(chat_request(r#"{"messages": []}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_persona_is_bad_request() {
        let app = router(test_state());
        let body = r#"{"messages": [{"role": "user", "content": "hi"}], "agent": "librarian"}"#;
        let response = app.oneshot(chat_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_api_key_surfaces_as_bad_gateway() {
        let app = router(test_state());
        let body = r#"{"messages": [{"role": "user", "content": "hello"}]}"#;
        let response = app.oneshot(chat_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
