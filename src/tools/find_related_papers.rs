//! Related-paper discovery tool.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::tools::types::PaperSearchResult;
use crate::tools::{parse_args, to_result_value, ToolDescriptor};

pub const NAME: &str = "findRelatedPapers";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindRelatedPapersArgs {
    pub paper_id: String,
    #[serde(default)]
    pub relation_type: RelationType,
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 50))]
    pub max_results: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Citing,
    Cited,
    #[default]
    Similar,
}

fn default_max_results() -> u32 {
    10
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        description: "Find papers that are related to a specific paper (citations, references, \
                      similar topics)"
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "paperId": {
                    "type": "string",
                    "description": "The paper ID to find related papers for"
                },
                "relationType": {
                    "type": "string",
                    "enum": ["citing", "cited", "similar"],
                    "description": "Type of relationship"
                },
                "maxResults": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 50,
                    "description": "Maximum number of related papers"
                }
            },
            "required": ["paperId"]
        }),
        executor: Arc::new(|args| {
            Box::pin(async move {
                let params: FindRelatedPapersArgs = parse_args(NAME, args)?;
                info!(paper_id = %params.paper_id, relation = ?params.relation_type, "Finding related papers");

                let related = vec![PaperSearchResult {
                    id: "related-1".to_string(),
                    title: "Related Research: Follow-up Study".to_string(),
                    authors: vec!["Dr. Smith".to_string()],
                    journal: "Science".to_string(),
                    publish_date: "2024-04-01".to_string(),
                    summary: "This paper builds upon previous research...".to_string(),
                    url: Some("https://example.com/related/1".to_string()),
                }];
                to_result_value(&related)
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_related_papers() {
        let descriptor = descriptor();
        let result = (descriptor.executor)(json!({"paperId": "PMC1"})).await.unwrap();
        let papers: Vec<PaperSearchResult> = serde_json::from_value(result).unwrap();
        assert!(!papers.is_empty());
    }

    #[tokio::test]
    async fn test_max_results_bound_enforced() {
        let descriptor = descriptor();
        let err = (descriptor.executor)(json!({"paperId": "PMC1", "maxResults": 51}))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::types::AppError::ToolValidation(_)));
    }
}
