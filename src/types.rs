// Shared type definitions and error taxonomy

/// One turn in a conversation. Role is "system", "user", or "assistant";
/// tool-result turns use "tool" with the originating call id attached.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a tool-result message tied to a provider tool call
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_call_id: Some(call_id.into()),
            tool_calls: None,
        }
    }

    /// Create an assistant message that requests tool invocations
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: String::new(),
            tool_call_id: None,
            tool_calls: Some(calls),
        }
    }
}

/// A tool invocation requested by the completion provider. Arguments are
/// the raw JSON string as sent on the wire; validation happens in the
/// tool registry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Record of one tool invocation made during a request, kept for
/// observability in the response payload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub result: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed inbound request. Rejected before any provider call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The completion provider itself failed (auth, rate limit, network).
    #[error("Completion provider error: {0}")]
    Provider(String),

    /// Tool arguments failed schema validation. Reported back to the
    /// provider as the tool result; the executor never runs.
    #[error("Tool argument validation failed: {0}")]
    ToolValidation(String),

    /// A tool executor failed after validation. Reported to the provider
    /// so the model can adapt; not fatal to the request.
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// An external literature source was unreachable, timed out, or
    /// returned garbage. Search adapters convert this to fallback data
    /// before it can escape to the user.
    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
