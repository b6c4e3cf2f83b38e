use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::types::{AppResult, ChatMessage, TokenUsage, ToolCall};

/// A tool advertised to the completion provider: name, human description,
/// and a JSON Schema for the arguments.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tools: Vec<ToolSpec>,
    /// When true the provider must answer in text; tool calls are not
    /// offered. Used for the final round after the tool-call cap.
    pub disable_tools: bool,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

/// One event from a streaming completion. Text arrives as incremental
/// deltas; tool calls are aggregated by the adapter and delivered whole
/// once the provider finishes requesting them.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Delta(String),
    ToolCalls(Vec<ToolCall>),
    Usage(TokenUsage),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse>;

    /// Stream a completion as it is generated. Implementations must
    /// deliver text deltas in generation order and may follow them with
    /// aggregated tool calls and usage accounting.
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> AppResult<BoxStream<'static, AppResult<StreamEvent>>>;
}
