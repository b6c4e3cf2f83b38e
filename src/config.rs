use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub adapters: AdapterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API key. May be empty: the service still starts,
    /// and completion calls fail at call time with a clear error.
    pub openai_api_key: String,
    /// Optional alternate base URL for OpenAI-compatible endpoints.
    pub openai_base_url: Option<String>,
    /// Default model for general chat and synthesis.
    pub chat_model: String,
    /// Cheaper model for simple tasks (search, citation formatting).
    pub fast_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    /// Per-request timeout for outbound literature API calls, in seconds.
    /// A hung external source must not stall a chat request.
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn api_key_configured(&self) -> bool {
        !self.openai_api_key.is_empty()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            llm: LlmConfig {
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                openai_base_url: env::var("OPENAI_BASE_URL").ok(),
                chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                fast_model: env::var("FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            adapters: AdapterConfig {
                timeout_secs: env::var("ADAPTER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            },
        })
    }

    /// Config with no API key for route and dispatcher tests
    #[cfg(test)]
    pub fn default_for_tests() -> Self {
        Self {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            llm: LlmConfig {
                openai_api_key: String::new(),
                openai_base_url: None,
                chat_model: "gpt-4o".to_string(),
                fast_model: "gpt-4o-mini".to_string(),
            },
            adapters: AdapterConfig { timeout_secs: 1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_configured() {
        let mut llm = LlmConfig {
            openai_api_key: String::new(),
            openai_base_url: None,
            chat_model: "gpt-4o".to_string(),
            fast_model: "gpt-4o-mini".to_string(),
        };
        assert!(!llm.api_key_configured());

        llm.openai_api_key = "sk-test".to_string();
        assert!(llm.api_key_configured());
    }
}
