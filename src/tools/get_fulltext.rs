//! Full-text retrieval from PubMed Central.
//!
//! Fetches the article XML over the PMC OAI endpoint and extracts the
//! title, body text, and a flat section breakdown. Unlike the search
//! tools this one has no fallback data: a missing article is a tool
//! failure the model is told about.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::tools::types::{FullTextPaper, PaperSection};
use crate::tools::{parse_args, to_result_value, ToolDescriptor};
use crate::types::{AppError, AppResult};

pub const NAME: &str = "getFullText";

const PMC_OAI_BASE: &str = "https://www.ncbi.nlm.nih.gov/pmc/oai/oai.cgi";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetFullTextArgs {
    #[validate(length(min = 1))]
    pub pmc_id: String,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Markdown,
    Json,
}

#[derive(Clone)]
pub struct FullTextClient {
    client: reqwest::Client,
    base_url: String,
}

impl FullTextClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, PMC_OAI_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn fetch(&self, params: &GetFullTextArgs) -> AppResult<FullTextPaper> {
        let numeric_id = params.pmc_id.trim_start_matches("PMC");
        let identifier = format!("oai:pubmedcentral.nih.gov:{}", numeric_id);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("verb", "GetRecord"),
                ("identifier", identifier.as_str()),
                ("format", "xml"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ToolExecution(format!("Failed to retrieve full text for {}: {}", params.pmc_id, e)))?;

        let xml = response
            .text()
            .await
            .map_err(|e| AppError::ToolExecution(format!("Failed to read full text for {}: {}", params.pmc_id, e)))?;

        let title = extract_between(&xml, "<article-title>", "</article-title>")
            .map(|t| strip_tags(t))
            .unwrap_or_else(|| "Unknown Title".to_string());

        let full_text = extract_between(&xml, "<body>", "</body>")
            .map(|body| collapse_whitespace(&strip_tags(body)))
            .unwrap_or_else(|| "Full text not available".to_string());

        let sections = extract_sections(&xml);

        info!(pmc_id = %params.pmc_id, text_len = full_text.len(), section_count = sections.len(), "Retrieved full text");
        Ok(FullTextPaper {
            pmc_id: params.pmc_id.clone(),
            title,
            full_text,
            sections,
        })
    }
}

fn extract_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let end = haystack[start..].find(close)? + start;
    Some(&haystack[start..end])
}

/// Remove XML tags, keeping the text between them
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull out `<title content-type="section">` / following `<p>` pairs
fn extract_sections(xml: &str) -> Vec<PaperSection> {
    const SECTION_OPEN: &str = "<title content-type=\"section\">";
    let mut sections = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find(SECTION_OPEN) {
        rest = &rest[start + SECTION_OPEN.len()..];
        let Some(title_end) = rest.find("</title>") else {
            break;
        };
        let title = rest[..title_end].to_string();
        rest = &rest[title_end..];

        if let Some(content) = extract_between(rest, "<p>", "</p>") {
            sections.push(PaperSection {
                title,
                content: content.to_string(),
            });
        }
    }

    sections
}

pub fn descriptor(client: FullTextClient) -> ToolDescriptor {
    let client = Arc::new(client);
    ToolDescriptor {
        description: "Retrieve the full text of an open access paper from PubMed Central using \
                      its PMC ID."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "pmcId": {
                    "type": "string",
                    "description": "PMC ID (e.g., \"PMC1234567\")"
                },
                "format": {
                    "type": "string",
                    "enum": ["plain", "markdown", "json"],
                    "description": "Output format"
                }
            },
            "required": ["pmcId"]
        }),
        executor: Arc::new(move |args| {
            let client = Arc::clone(&client);
            Box::pin(async move {
                let params: GetFullTextArgs = parse_args(NAME, args)?;
                let paper = client.fetch(&params).await?;
                to_result_value(&paper)
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_and_collapse() {
        let raw = "<sec><p>CRISPR  systems\n  enable</p> <p>genome editing</p></sec>";
        assert_eq!(
            collapse_whitespace(&strip_tags(raw)),
            "CRISPR systems enable genome editing"
        );
    }

    #[test]
    fn test_extract_sections() {
        let xml = r#"<title content-type="section">Methods</title> <p>We sequenced...</p>
                     <title content-type="section">Results</title> <p>We observed...</p>"#;
        let sections = extract_sections(xml);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Methods");
        assert_eq!(sections[1].content, "We observed...");
    }

    #[tokio::test]
    async fn test_fetch_parses_article_xml() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"<record>
                    <article-title>CRISPR <i>in vivo</i></article-title>
                    <body><sec><p>Editing efficiency was high.</p></sec></body>
                </record>"#,
            )
            .create_async()
            .await;

        let client = FullTextClient::with_base_url(reqwest::Client::new(), &server.url());
        let params: GetFullTextArgs = serde_json::from_value(json!({"pmcId": "PMC1234567"})).unwrap();
        let paper = client.fetch(&params).await.unwrap();
        assert_eq!(paper.pmc_id, "PMC1234567");
        assert_eq!(paper.title, "CRISPR in vivo");
        assert_eq!(paper.full_text, "Editing efficiency was high.");
    }

    #[tokio::test]
    async fn test_network_failure_is_tool_execution_error() {
        let client = FullTextClient::with_base_url(reqwest::Client::new(), "http://127.0.0.1:1");
        let descriptor = descriptor(client);
        let err = (descriptor.executor)(json!({"pmcId": "PMC1"})).await.unwrap_err();
        assert!(matches!(err, AppError::ToolExecution(_)));
    }
}
