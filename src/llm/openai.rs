// OpenAI-compatible chat completion adapter
// Works against api.openai.com or any compatible endpoint via an alternate
// base URL (OPENAI_BASE_URL). Supports function tools and SSE streaming.
// API Reference: https://platform.openai.com/docs/api-reference/chat

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::llm::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, StreamEvent, ToolSpec,
};
use crate::types::{AppError, AppResult, ChatMessage, TokenUsage, ToolCall};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
}

// Request types for the chat completions API
#[derive(Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<ApiStreamOptions>,
}

#[derive(Serialize)]
struct ApiStreamOptions {
    include_usage: bool,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    // Assistant tool-call turns carry null content on the wire
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ApiFunctionCall,
}

#[derive(Serialize, Deserialize, Clone)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    kind: String,
    function: ApiFunctionDef,
}

#[derive(Serialize)]
struct ApiFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// Response types
#[derive(Deserialize)]
struct ApiChatResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ApiStreamChunk {
    #[serde(default)]
    choices: Vec<ApiStreamChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiStreamChoice {
    delta: ApiStreamDelta,
}

#[derive(Deserialize)]
struct ApiStreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiStreamToolCall>,
}

// Streamed tool calls arrive as indexed fragments: the first fragment for
// an index carries id and name, later ones append argument text.
#[derive(Deserialize)]
struct ApiStreamToolCall {
    index: usize,
    id: Option<String>,
    function: Option<ApiStreamFunction>,
}

#[derive(Deserialize)]
struct ApiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Point the adapter at an OpenAI-compatible endpoint
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        match &config.openai_base_url {
            Some(base) => Self::with_base_url(&config.openai_api_key, base),
            None => Self::new(&config.openai_api_key),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn check_api_key(&self) -> AppResult<()> {
        if self.api_key.is_empty() {
            return Err(AppError::Provider(
                "OPENAI_API_KEY is not configured; completion calls are unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn convert_message(msg: &ChatMessage) -> ApiMessage {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|c| ApiToolCall {
                    id: c.id.clone(),
                    kind: "function".to_string(),
                    function: ApiFunctionCall {
                        name: c.name.clone(),
                        arguments: c.arguments.clone(),
                    },
                })
                .collect()
        });

        // Assistant messages that only carry tool calls send null content
        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        };

        ApiMessage {
            role: msg.role.clone(),
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    fn convert_tool(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            kind: "function".to_string(),
            function: ApiFunctionDef {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters.clone(),
            },
        }
    }

    fn build_request(request: &CompletionRequest, stream: bool) -> ApiChatRequest {
        let tools = if request.disable_tools {
            vec![]
        } else {
            request.tools.iter().map(Self::convert_tool).collect()
        };

        ApiChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools,
            tool_choice: None,
            stream: if stream { Some(true) } else { None },
            stream_options: if stream {
                Some(ApiStreamOptions {
                    include_usage: true,
                })
            } else {
                None
            },
        }
    }

    /// Fold one streamed tool-call fragment into the accumulator
    fn accumulate_tool_call(calls: &mut Vec<ToolCall>, fragment: ApiStreamToolCall) {
        while calls.len() <= fragment.index {
            calls.push(ToolCall {
                id: String::new(),
                name: String::new(),
                arguments: String::new(),
            });
        }
        let call = &mut calls[fragment.index];
        if let Some(id) = fragment.id {
            call.id = id;
        }
        if let Some(function) = fragment.function {
            if let Some(name) = function.name {
                call.name = name;
            }
            if let Some(arguments) = function.arguments {
                call.arguments.push_str(&arguments);
            }
        }
    }

    async fn error_from_response(status: reqwest::StatusCode, body: String) -> AppError {
        if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return AppError::Provider(format!(
                "API error ({}): {} (type: {:?})",
                status, parsed.error.message, parsed.error.error_type
            ));
        }
        AppError::Provider(format!("API error ({}): {}", status, body))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiAdapter {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        self.check_api_key()?;

        let api_request = Self::build_request(request, false);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, body).await);
        }

        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse completion response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider("Provider returned no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|c| ToolCall {
                id: c.id,
                name: c.function.name,
                arguments: c.function.arguments,
            })
            .collect();

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
        })
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> AppResult<BoxStream<'static, AppResult<StreamEvent>>> {
        self.check_api_key()?;

        let api_request = Self::build_request(request, true);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, body).await);
        }

        // State: byte stream, line buffer, tool-call accumulator, finished
        // flag. Tool calls arrive as indexed fragments and are delivered as
        // one event once the provider signals the end of the stream.
        let bytes = Box::pin(response.bytes_stream());
        let stream = futures::stream::unfold(
            (bytes, String::new(), Vec::new(), false),
            |(mut bytes, mut buf, mut calls, finished)| async move {
                if finished {
                    return None;
                }
                loop {
                    // Drain complete SSE lines already buffered
                    if let Some(pos) = buf.find('\n') {
                        let line: String = buf.drain(..=pos).collect();
                        let line = line.trim();
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let data = data.trim();
                        if data == "[DONE]" {
                            if calls.is_empty() {
                                return None;
                            }
                            let event = StreamEvent::ToolCalls(std::mem::take(&mut calls));
                            return Some((Ok(event), (bytes, buf, calls, true)));
                        }
                        match serde_json::from_str::<ApiStreamChunk>(data) {
                            Ok(chunk) => {
                                if let Some(choice) = chunk.choices.into_iter().next() {
                                    for fragment in choice.delta.tool_calls {
                                        Self::accumulate_tool_call(&mut calls, fragment);
                                    }
                                    if let Some(content) = choice.delta.content {
                                        if !content.is_empty() {
                                            let event = StreamEvent::Delta(content);
                                            return Some((Ok(event), (bytes, buf, calls, false)));
                                        }
                                    }
                                } else if let Some(u) = chunk.usage {
                                    let event = StreamEvent::Usage(TokenUsage {
                                        prompt_tokens: u.prompt_tokens,
                                        completion_tokens: u.completion_tokens,
                                        total_tokens: u.total_tokens,
                                    });
                                    return Some((Ok(event), (bytes, buf, calls, false)));
                                }
                                continue;
                            }
                            Err(e) => {
                                let err = AppError::Provider(format!(
                                    "Failed to parse stream chunk: {}",
                                    e
                                ));
                                return Some((Err(err), (bytes, buf, calls, false)));
                            }
                        }
                    }

                    match bytes.next().await {
                        Some(Ok(part)) => buf.push_str(&String::from_utf8_lossy(&part)),
                        Some(Err(e)) => {
                            let err = AppError::Provider(format!("Stream read failed: {}", e));
                            return Some((Err(err), (bytes, buf, calls, true)));
                        }
                        None => {
                            if calls.is_empty() {
                                return None;
                            }
                            let event = StreamEvent::ToolCalls(std::mem::take(&mut calls));
                            return Some((Ok(event), (bytes, buf, calls, true)));
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}
