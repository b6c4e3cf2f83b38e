//! PubMed Central search adapter.
//!
//! Two-step NCBI E-utilities flow: esearch for PMC ids, then esummary for
//! article metadata. On any failure the tool degrades to deterministic
//! fallback records instead of failing the conversation.
//! API Documentation: https://www.ncbi.nlm.nih.gov/books/NBK25501/

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::tools::mock_data::mock_open_access_papers;
use crate::tools::types::OpenAccessPaper;
use crate::tools::{parse_args, to_result_value, ToolDescriptor};
use crate::types::{AppError, AppResult};

pub const NAME: &str = "searchPMC";
pub const SOURCE: &str = "PubMed Central";

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchPmcArgs {
    pub query: String,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 100))]
    pub max_results: u32,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default = "default_true")]
    pub has_full_text: bool,
}

fn default_max_results() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Clone)]
pub struct PmcClient {
    client: reqwest::Client,
    base_url: String,
}

impl PmcClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, EUTILS_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, params: &SearchPmcArgs) -> AppResult<Vec<OpenAccessPaper>> {
        let term = match params.year_from {
            Some(year) => format!("{} AND \"{}\":[Publication Date]", params.query, year),
            None => params.query.clone(),
        };

        // Step 1: search for PMC ids
        let search_response = self
            .client
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&[
                ("db", "pmc"),
                ("term", &term),
                ("retmax", &params.max_results.to_string()),
                ("retmode", "json"),
                ("tool", "scholarsearch"),
                ("email", "scholarsearch@example.com"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Adapter(format!("PMC esearch request failed: {}", e)))?;

        let search_data: EsearchResponse = search_response
            .json()
            .await
            .map_err(|e| AppError::Adapter(format!("Failed to parse PMC esearch response: {}", e)))?;

        if search_data.esearchresult.idlist.is_empty() {
            info!(query = %params.query, "PMC search returned no ids");
            return Ok(vec![]);
        }

        // Step 2: fetch article summaries
        let id_list = search_data.esearchresult.idlist.join(",");
        let summary_response = self
            .client
            .get(format!("{}/esummary.fcgi", self.base_url))
            .query(&[
                ("db", "pmc"),
                ("id", id_list.as_str()),
                ("retmode", "json"),
                ("rettype", "abstract"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Adapter(format!("PMC esummary request failed: {}", e)))?;

        let summary_data: serde_json::Value = summary_response
            .json()
            .await
            .map_err(|e| AppError::Adapter(format!("Failed to parse PMC esummary response: {}", e)))?;

        // The summary result is a map keyed by uid, plus a "uids" index
        // entry. The esearch idlist is relevance-ranked, so it drives the
        // iteration order; the map alone would reorder results.
        let mut papers = Vec::new();
        if let Some(result) = summary_data.get("result").and_then(|r| r.as_object()) {
            for uid in &search_data.esearchresult.idlist {
                let Some(article) = result.get(uid) else {
                    continue;
                };
                let Some(title) = article.get("title").and_then(|t| t.as_str()) else {
                    continue;
                };

                let authors = article
                    .get("authors")
                    .and_then(|a| a.as_array())
                    .map(|list| {
                        list.iter()
                            .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();

                let url = format!("https://www.ncbi.nlm.nih.gov/pmc/PMC{}/", uid);
                papers.push(OpenAccessPaper {
                    id: format!("PMC{}", uid),
                    title: title.to_string(),
                    authors,
                    journal: article
                        .get("source")
                        .and_then(|s| s.as_str())
                        .unwrap_or("Unknown Journal")
                        .to_string(),
                    publish_date: article
                        .get("pubdate")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    summary: article
                        .get("abstract")
                        .and_then(|a| a.as_str())
                        .unwrap_or("No abstract available")
                        .to_string(),
                    source: SOURCE.to_string(),
                    url: url.clone(),
                    full_text_url: Some(url),
                    license: article
                        .get("license")
                        .and_then(|l| l.as_str())
                        .map(str::to_string),
                    // PMC records carry free full text by definition
                    is_open_access: true,
                });
            }
        }

        papers.truncate(params.max_results as usize);
        info!(query = %params.query, count = papers.len(), "PMC search complete");
        Ok(papers)
    }
}

pub fn descriptor(client: PmcClient) -> ToolDescriptor {
    let client = Arc::new(client);
    ToolDescriptor {
        description: "Search PubMed Central (PMC) for open access full-text biomedical papers. \
                      Returns only papers with free full-text availability."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query for biomedical papers (e.g., \"CRISPR gene editing\", \"cancer immunotherapy\")"
                },
                "maxResults": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of results to return"
                },
                "yearFrom": {
                    "type": "integer",
                    "description": "Filter papers from this year onwards"
                },
                "hasFullText": {
                    "type": "boolean",
                    "description": "Only return papers with full-text available"
                }
            },
            "required": ["query"]
        }),
        executor: Arc::new(move |args| {
            let client = Arc::clone(&client);
            Box::pin(async move {
                let params: SearchPmcArgs = parse_args(NAME, args)?;
                let papers = match client.search(&params).await {
                    Ok(papers) => papers,
                    Err(e) => {
                        warn!(error = %e, query = %params.query, "PMC search failed, using fallback data");
                        mock_open_access_papers(&params.query, params.max_results as usize, SOURCE)
                    }
                };
                to_result_value(&papers)
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> PmcClient {
        PmcClient::with_base_url(reqwest::Client::new(), url)
    }

    #[tokio::test]
    async fn test_search_parses_two_step_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"esearchresult": {"idlist": ["1234567"]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/esummary.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"result": {
                    "uids": ["1234567"],
                    "1234567": {
                        "title": "CRISPR mechanisms",
                        "authors": [{"name": "Chen S"}, {"name": "Watson E"}],
                        "source": "Nature Communications",
                        "pubdate": "2024-03-15"
                    }
                }}"#,
            )
            .create_async()
            .await;

        let params: SearchPmcArgs = serde_json::from_value(json!({"query": "crispr"})).unwrap();
        let papers = client_for(&server.url()).search(&params).await.unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id, "PMC1234567");
        assert_eq!(papers[0].authors, vec!["Chen S", "Watson E"]);
        assert!(papers[0].is_open_access);
    }

    #[tokio::test]
    async fn test_search_preserves_relevance_order() {
        let mut server = mockito::Server::new_async().await;
        // Most relevant id sorts after the other alphabetically; the
        // esearch ranking must still win.
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"esearchresult": {"idlist": ["9999999", "1111111"]}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/esummary.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"result": {
                    "uids": ["1111111", "9999999"],
                    "1111111": {"title": "Second hit"},
                    "9999999": {"title": "Top hit"}
                }}"#,
            )
            .create_async()
            .await;

        let params: SearchPmcArgs = serde_json::from_value(json!({"query": "crispr"})).unwrap();
        let papers = client_for(&server.url()).search(&params).await.unwrap();
        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["PMC9999999", "PMC1111111"]);
    }

    #[tokio::test]
    async fn test_empty_id_list_yields_empty_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/esearch.fcgi")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"esearchresult": {"idlist": []}}"#)
            .create_async()
            .await;

        let params: SearchPmcArgs = serde_json::from_value(json!({"query": "nothing"})).unwrap();
        let papers = client_for(&server.url()).search(&params).await.unwrap();
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_executor_falls_back_on_network_failure() {
        // Unroutable port: the request errors immediately
        let descriptor = descriptor(client_for("http://127.0.0.1:1"));
        let result = (descriptor.executor)(json!({"query": "cancer immunotherapy"}))
            .await
            .unwrap();
        let papers: Vec<OpenAccessPaper> = serde_json::from_value(result).unwrap();
        assert!(!papers.is_empty());
        assert!(papers[0].title.contains("cancer immunotherapy"));
        assert_eq!(papers[0].source, SOURCE);
    }
}
