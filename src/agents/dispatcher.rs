//! Dispatcher
//!
//! Orchestrates one chat request end to end: validates the inbound
//! message list, selects a persona (explicit override or keyword
//! routing), assembles the outgoing conversation, and drives the
//! completion provider through bounded tool-invocation rounds.
//!
//! The outgoing list always starts with the persona's system prompt and
//! always ends with the newest user turn, regardless of how much history
//! sits in between. Tool rounds are sequential by construction: each
//! round's results feed the next request. After `MAX_TOOL_ROUNDS` the
//! provider must answer from what it has.

use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::agents::persona::{AgentRole, PersonaCatalog, PersonaConfig};
use crate::agents::router::route;
use crate::config::Config;
use crate::llm::{
    CompletionProvider, CompletionRequest, CompletionResponse, OpenAiAdapter, StreamEvent,
};
use crate::tools::ToolRegistry;
use crate::types::{AppError, AppResult, ChatMessage, TokenUsage, ToolCall, ToolInvocation};

/// Ceiling on sequential tool-invocation rounds within one request
pub const MAX_TOOL_ROUNDS: usize = 5;

/// Completed (non-streaming) result of one chat request
#[derive(Debug)]
pub struct ChatOutcome {
    pub role: AgentRole,
    pub agent_name: String,
    pub content: String,
    pub tool_invocations: Vec<ToolInvocation>,
    pub usage: TokenUsage,
}

/// One event in a streaming chat response, in generation order: tool
/// invocations as they run, text fragments as the provider emits them,
/// and accumulated usage at the end.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Delta(String),
    ToolInvocation(ToolInvocation),
    Usage(TokenUsage),
}

/// Streaming result of one chat request. Text fragments arrive
/// incrementally while the request is still being generated.
pub struct ChatStream {
    pub role: AgentRole,
    pub agent_name: String,
    pub stream: BoxStream<'static, AppResult<ChatEvent>>,
}

pub struct Dispatcher {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    catalog: PersonaCatalog,
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<ToolRegistry>,
        catalog: PersonaCatalog,
    ) -> Self {
        Self {
            provider,
            registry,
            catalog,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(OpenAiAdapter::from_config(&config.llm)),
            Arc::new(ToolRegistry::from_config(&config.adapters)),
            PersonaCatalog::from_config(&config.llm),
        )
    }

    /// Validate the inbound list and build the outgoing conversation.
    /// Runs before any provider call; all `InvalidRequest` rejections
    /// happen here.
    fn prepare(
        &self,
        messages: &[ChatMessage],
        explicit_persona: Option<&str>,
    ) -> AppResult<(&PersonaConfig, Vec<ChatMessage>)> {
        let last = messages
            .last()
            .ok_or_else(|| AppError::InvalidRequest("Message list is empty".to_string()))?;
        if last.role != "user" {
            return Err(AppError::InvalidRequest(
                "Last message must be from user".to_string(),
            ));
        }

        let role = match explicit_persona {
            Some(name) => AgentRole::parse(name).ok_or_else(|| {
                AppError::InvalidRequest(format!("Unknown persona: {}", name))
            })?,
            None => route(&last.content),
        };
        let persona = self.catalog.get(role);

        info!(agent = %persona.name, role = %role, "Dispatching chat request");

        // System prompt first, prior history in the middle, the new user
        // turn appended last even if the caller's ordering was reshuffled.
        let mut outgoing = Vec::with_capacity(messages.len() + 1);
        outgoing.push(ChatMessage::system(&persona.system_prompt));
        outgoing.extend(messages[..messages.len() - 1].iter().cloned());
        outgoing.push(last.clone());

        Ok((persona, outgoing))
    }

    /// Run tool rounds until the provider stops requesting tools or the
    /// round cap is reached. Returns the final response when the provider
    /// produced one, or `None` when the cap was exhausted.
    async fn run_tool_rounds(
        &self,
        persona: &PersonaConfig,
        outgoing: &mut Vec<ChatMessage>,
        invocations: &mut Vec<ToolInvocation>,
        usage: &mut TokenUsage,
    ) -> AppResult<Option<CompletionResponse>> {
        for round in 0..MAX_TOOL_ROUNDS {
            let request = build_request(persona, &self.registry, outgoing.clone(), false);
            let response = self.provider.complete(&request).await?;
            usage.accumulate(&response.usage);

            if response.tool_calls.is_empty() {
                return Ok(Some(response));
            }

            info!(round, call_count = response.tool_calls.len(), "Executing tool calls");
            outgoing.push(ChatMessage::assistant_tool_calls(response.tool_calls.clone()));

            for call in &response.tool_calls {
                let (invocation, tool_message) = execute_call(&self.registry, call).await;
                invocations.push(invocation);
                outgoing.push(tool_message);
            }
        }

        Ok(None)
    }

    /// Handle a chat request and return the complete answer
    pub async fn handle(
        &self,
        messages: &[ChatMessage],
        explicit_persona: Option<&str>,
    ) -> AppResult<ChatOutcome> {
        let (persona, mut outgoing) = self.prepare(messages, explicit_persona)?;
        let mut invocations = Vec::new();
        let mut usage = TokenUsage::default();

        let response = match self
            .run_tool_rounds(persona, &mut outgoing, &mut invocations, &mut usage)
            .await?
        {
            Some(response) => response,
            None => {
                // Round cap exhausted: the provider answers from what it has
                let request = build_request(persona, &self.registry, outgoing, true);
                let response = self.provider.complete(&request).await?;
                usage.accumulate(&response.usage);
                response
            }
        };

        info!(
            agent = %persona.name,
            tool_invocations = invocations.len(),
            response_len = response.content.len(),
            "Chat request complete"
        );

        Ok(ChatOutcome {
            role: persona.role,
            agent_name: persona.name.clone(),
            content: response.content,
            tool_invocations: invocations,
            usage,
        })
    }

    /// Handle a chat request, delivering the answer as an incremental
    /// event stream. Every provider call is a streaming call: text
    /// fragments are relayed in arrival order while generation is still
    /// in flight, and tool rounds run between streams as the provider
    /// requests them.
    pub async fn handle_stream(
        &self,
        messages: &[ChatMessage],
        explicit_persona: Option<&str>,
    ) -> AppResult<ChatStream> {
        let (persona, outgoing) = self.prepare(messages, explicit_persona)?;
        let role = persona.role;
        let agent_name = persona.name.clone();

        // The rounds run in a task so fragments reach the caller while
        // generation is still in progress. A dropped receiver (client
        // disconnect) aborts the remaining rounds.
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(drive_stream_rounds(
            Arc::clone(&self.provider),
            Arc::clone(&self.registry),
            persona.clone(),
            outgoing,
            tx,
        ));

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed();

        Ok(ChatStream {
            role,
            agent_name,
            stream,
        })
    }
}

fn build_request(
    persona: &PersonaConfig,
    registry: &ToolRegistry,
    messages: Vec<ChatMessage>,
    disable_tools: bool,
) -> CompletionRequest {
    CompletionRequest {
        model: persona.model.clone(),
        messages,
        temperature: Some(persona.temperature),
        max_tokens: None,
        tools: registry.specs(),
        disable_tools,
    }
}

/// Validate and run one provider-requested tool call. Failures become the
/// tool's result payload so the model can adapt; the request goes on.
async fn execute_call(registry: &ToolRegistry, call: &ToolCall) -> (ToolInvocation, ChatMessage) {
    let arguments: serde_json::Value =
        serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null);

    let result = match registry.execute(&call.name, arguments.clone()).await {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool call failed");
            serde_json::json!({ "error": e.to_string() })
        }
    };

    let tool_message = ChatMessage::tool(&call.id, result.to_string());
    let invocation = ToolInvocation {
        tool_name: call.name.clone(),
        arguments,
        result,
    };
    (invocation, tool_message)
}

/// Streaming round loop. Each round opens a streaming completion with
/// tools bound; text deltas are forwarded as they arrive, aggregated tool
/// calls trigger execution and the next round. The round after the cap
/// withholds tools so the provider must answer.
async fn drive_stream_rounds(
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    persona: PersonaConfig,
    mut outgoing: Vec<ChatMessage>,
    tx: mpsc::Sender<AppResult<ChatEvent>>,
) {
    let mut usage = TokenUsage::default();

    for round in 0..=MAX_TOOL_ROUNDS {
        let disable_tools = round == MAX_TOOL_ROUNDS;
        let request = build_request(&persona, &registry, outgoing.clone(), disable_tools);

        let mut stream = match provider.complete_stream(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        let mut tool_calls: Vec<ToolCall> = Vec::new();
        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Delta(text)) => {
                    if tx.send(Ok(ChatEvent::Delta(text))).await.is_err() {
                        return;
                    }
                }
                Ok(StreamEvent::ToolCalls(calls)) => tool_calls = calls,
                Ok(StreamEvent::Usage(u)) => usage.accumulate(&u),
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }

        if tool_calls.is_empty() {
            break;
        }

        info!(round, call_count = tool_calls.len(), "Executing tool calls");
        outgoing.push(ChatMessage::assistant_tool_calls(tool_calls.clone()));

        for call in &tool_calls {
            let (invocation, tool_message) = execute_call(&registry, call).await;
            if tx
                .send(Ok(ChatEvent::ToolInvocation(invocation)))
                .await
                .is_err()
            {
                return;
            }
            outgoing.push(tool_message);
        }
    }

    let _ = tx.send(Ok(ChatEvent::Usage(usage))).await;
}
