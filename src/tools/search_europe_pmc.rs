//! Europe PMC search adapter.
//!
//! Single REST call with `resultType=lite`. Author strings split on `;`,
//! dates pass through unreformatted. Failures degrade to fallback records.
//! API Documentation: https://europepmc.org/RestfulWebService

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::tools::mock_data::mock_open_access_papers;
use crate::tools::types::OpenAccessPaper;
use crate::tools::{parse_args, to_result_value, ToolDescriptor};
use crate::types::{AppError, AppResult};

pub const NAME: &str = "searchEuropePMC";
pub const SOURCE: &str = "Europe PMC";

const EUROPE_PMC_BASE: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchEuropePmcArgs {
    pub query: String,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 100))]
    pub max_results: u32,
    #[serde(default = "default_true")]
    pub has_full_text: bool,
    #[serde(default)]
    pub has_pdf: Option<bool>,
}

fn default_max_results() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "resultList")]
    result_list: Option<ResultList>,
}

#[derive(Debug, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<ArticleRecord>,
}

#[derive(Debug, Deserialize)]
struct ArticleRecord {
    pmid: Option<String>,
    id: Option<String>,
    pmcid: Option<String>,
    title: Option<String>,
    #[serde(rename = "authorString")]
    author_string: Option<String>,
    #[serde(rename = "journalTitle")]
    journal_title: Option<String>,
    #[serde(rename = "firstPublicationDate")]
    first_publication_date: Option<String>,
    #[serde(rename = "pubYear")]
    pub_year: Option<String>,
    #[serde(rename = "abstractText")]
    abstract_text: Option<String>,
    license: Option<String>,
}

#[derive(Clone)]
pub struct EuropePmcClient {
    client: reqwest::Client,
    base_url: String,
}

impl EuropePmcClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, EUROPE_PMC_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, params: &SearchEuropePmcArgs) -> AppResult<Vec<OpenAccessPaper>> {
        let mut query = vec![
            ("query".to_string(), params.query.clone()),
            ("resultType".to_string(), "lite".to_string()),
            ("pageSize".to_string(), params.max_results.to_string()),
            ("format".to_string(), "json".to_string()),
            ("hasFullText".to_string(), params.has_full_text.to_string()),
        ];
        if let Some(has_pdf) = params.has_pdf {
            query.push(("hasPdf".to_string(), has_pdf.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::Adapter(format!("Europe PMC request failed: {}", e)))?;

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Adapter(format!("Failed to parse Europe PMC response: {}", e)))?;

        let records = data
            .result_list
            .map(|list| list.result)
            .unwrap_or_default();

        let papers: Vec<OpenAccessPaper> = records
            .into_iter()
            .filter_map(|item| {
                let title = item.title?;
                let id = item
                    .pmid
                    .clone()
                    .or(item.id)
                    .or(item.pmcid.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                let url = match (&item.pmid, &item.pmcid) {
                    (Some(pmid), _) => format!("https://europepmc.org/article/MED/{}", pmid),
                    (None, Some(pmcid)) => format!("https://europepmc.org/article/PMC/{}", pmcid),
                    (None, None) => format!("https://europepmc.org/search?query={}", id),
                };
                Some(OpenAccessPaper {
                    id,
                    title,
                    authors: item
                        .author_string
                        .map(|s| s.split(';').map(|a| a.trim().to_string()).collect())
                        .unwrap_or_default(),
                    journal: item.journal_title.unwrap_or_else(|| "Unknown".to_string()),
                    publish_date: item
                        .first_publication_date
                        .or(item.pub_year)
                        .unwrap_or_default(),
                    summary: item
                        .abstract_text
                        .unwrap_or_else(|| "No abstract available".to_string()),
                    source: SOURCE.to_string(),
                    url,
                    full_text_url: None,
                    license: item.license,
                    is_open_access: true,
                })
            })
            .collect();

        info!(query = %params.query, count = papers.len(), "Europe PMC search complete");
        Ok(papers)
    }
}

pub fn descriptor(client: EuropePmcClient) -> ToolDescriptor {
    let client = Arc::new(client);
    ToolDescriptor {
        description: "Search Europe PMC for open access biomedical and life sciences papers. \
                      Includes European research with full-text access."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., \"cancer immunotherapy\", \"Alzheimer biomarkers\")"
                },
                "maxResults": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of results"
                },
                "hasFullText": {
                    "type": "boolean",
                    "description": "Only return papers with full-text available"
                },
                "hasPdf": {
                    "type": "boolean",
                    "description": "Filter for papers with PDF available"
                }
            },
            "required": ["query"]
        }),
        executor: Arc::new(move |args| {
            let client = Arc::clone(&client);
            Box::pin(async move {
                let params: SearchEuropePmcArgs = parse_args(NAME, args)?;
                let papers = match client.search(&params).await {
                    Ok(papers) => papers,
                    Err(e) => {
                        warn!(error = %e, query = %params.query, "Europe PMC search failed, using fallback data");
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

    fn client_for(url: &str) -> EuropePmcClient {
        EuropePmcClient::with_base_url(reqwest::Client::new(), url)
    }

    #[tokio::test]
    async fn test_search_splits_author_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"resultList": {"result": [{
                    "pmid": "38000001",
                    "title": "Alzheimer biomarkers in plasma",
                    "authorString": "Liu J; Martinez A",
                    "journalTitle": "Brain",
                    "firstPublicationDate": "2024-05-01",
                    "abstractText": "Plasma biomarkers..."
                }]}}"#,
            )
            .create_async()
            .await;

        let params: SearchEuropePmcArgs =
            serde_json::from_value(json!({"query": "alzheimer"})).unwrap();
        let papers = client_for(&server.url()).search(&params).await.unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].authors, vec!["Liu J", "Martinez A"]);
        assert_eq!(papers[0].url, "https://europepmc.org/article/MED/38000001");
        // Date passes through without reformatting
        assert_eq!(papers[0].publish_date, "2024-05-01");
    }

    #[tokio::test]
    async fn test_executor_falls_back_on_malformed_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let descriptor = descriptor(client_for(&server.url()));
        let result = (descriptor.executor)(json!({"query": "microbiome"})).await.unwrap();
        let papers: Vec<OpenAccessPaper> = serde_json::from_value(result).unwrap();
        assert!(!papers.is_empty());
        assert!(papers[0].title.contains("microbiome"));
        assert_eq!(papers[0].source, SOURCE);
    }
}
