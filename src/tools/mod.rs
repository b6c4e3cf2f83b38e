//! Tool Registry
//!
//! Capability table for the completion provider: a fixed mapping from tool
//! name to description, argument schema, and executor. Schema and executor
//! resolve through the same entry, so the tools advertised to the provider
//! can never drift from the tools that actually run.
//!
//! Registered tools:
//! - `searchPapers` - multi-database academic search
//! - `summarizePapers`, `comparePapers`, `extractCitations`,
//!   `findRelatedPapers` - analysis and citation helpers
//! - `searchPMC`, `searchEuropePMC`, `searchPreprints`, `getFullText` -
//!   open access biomedical sources

pub mod compare_papers;
pub mod extract_citations;
pub mod find_related_papers;
pub mod get_fulltext;
pub mod mock_data;
pub mod search_europe_pmc;
pub mod search_papers;
pub mod search_pmc;
pub mod search_preprints;
pub mod summarize_papers;
pub mod types;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

use crate::config::AdapterConfig;
use crate::llm::ToolSpec;
use crate::types::{AppError, AppResult};

/// Async executor over already-validated JSON arguments
pub type ToolExecutor =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, AppResult<serde_json::Value>> + Send + Sync>;

pub struct ToolDescriptor {
    pub description: String,
    /// JSON Schema for the arguments, as advertised to the provider
    pub parameters: serde_json::Value,
    pub executor: ToolExecutor,
}

/// Read-only after construction; shared across concurrent requests.
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Build the full registry with live adapters for the open access
    /// sources. Outbound calls share one client with a bounded timeout.
    pub fn from_config(config: &AdapterConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let mut registry = Self::empty();
        registry.register(search_papers::NAME, search_papers::descriptor());
        registry.register(summarize_papers::NAME, summarize_papers::descriptor());
        registry.register(extract_citations::NAME, extract_citations::descriptor());
        registry.register(compare_papers::NAME, compare_papers::descriptor());
        registry.register(find_related_papers::NAME, find_related_papers::descriptor());
        registry.register(
            search_pmc::NAME,
            search_pmc::descriptor(search_pmc::PmcClient::new(client.clone())),
        );
        registry.register(
            search_europe_pmc::NAME,
            search_europe_pmc::descriptor(search_europe_pmc::EuropePmcClient::new(client.clone())),
        );
        registry.register(
            search_preprints::NAME,
            search_preprints::descriptor(search_preprints::PreprintClient::new(client.clone())),
        );
        registry.register(
            get_fulltext::NAME,
            get_fulltext::descriptor(get_fulltext::FullTextClient::new(client)),
        );

        info!(tool_count = registry.tools.len(), "Tool registry initialized");
        registry
    }

    pub fn register(&mut self, name: &str, descriptor: ToolDescriptor) {
        self.tools.insert(name.to_string(), descriptor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Tool definitions for the completion request
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|(name, tool)| ToolSpec {
                name: name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            })
            .collect()
    }

    /// Validate and run a tool call. Unknown names and schema violations
    /// are `ToolValidation` errors; the executor is never reached for them.
    pub async fn execute(&self, name: &str, args: serde_json::Value) -> AppResult<serde_json::Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AppError::ToolValidation(format!("Unknown tool: {}", name)))?;
        (tool.executor)(args).await
    }
}

/// Deserialize and validate tool arguments before any executor runs
pub(crate) fn parse_args<T>(tool_name: &str, args: serde_json::Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(args)
        .map_err(|e| AppError::ToolValidation(format!("{}: {}", tool_name, e)))?;
    parsed
        .validate()
        .map_err(|e| AppError::ToolValidation(format!("{}: {}", tool_name, e)))?;
    Ok(parsed)
}

pub(crate) fn to_result_value<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("Failed to serialize tool result: {}", e)))
}
