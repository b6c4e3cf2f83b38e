//! Cross-paper comparison tool.

use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::tools::types::PaperComparison;
use crate::tools::{parse_args, to_result_value, ToolDescriptor};

pub const NAME: &str = "comparePapers";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComparePapersArgs {
    #[validate(length(min = 2))]
    pub paper_ids: Vec<String>,
    #[serde(default)]
    pub aspects: Option<Vec<ComparisonAspect>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonAspect {
    Methodology,
    Results,
    Sample,
    Conclusions,
    Limitations,
}

impl ComparisonAspect {
    const ALL: [ComparisonAspect; 5] = [
        ComparisonAspect::Methodology,
        ComparisonAspect::Results,
        ComparisonAspect::Sample,
        ComparisonAspect::Conclusions,
        ComparisonAspect::Limitations,
    ];

    fn key(&self) -> &'static str {
        match self {
            ComparisonAspect::Methodology => "methodology",
            ComparisonAspect::Results => "results",
            ComparisonAspect::Sample => "sample",
            ComparisonAspect::Conclusions => "conclusions",
            ComparisonAspect::Limitations => "limitations",
        }
    }

    fn placeholder_finding(&self) -> &'static str {
        match self {
            ComparisonAspect::Methodology => {
                "Paper 1 uses a randomized controlled trial design, while Paper 2 employs a cohort study approach..."
            }
            ComparisonAspect::Results => {
                "Both studies found similar outcomes, with effect sizes of 0.5 and 0.6 respectively..."
            }
            ComparisonAspect::Sample => {
                "Paper 1: N=500, Paper 2: N=1200. Both studies had adequate power..."
            }
            ComparisonAspect::Conclusions => {
                "Both papers conclude that further research is needed to validate findings..."
            }
            ComparisonAspect::Limitations => {
                "Paper 1 was limited by single-center design, Paper 2 by retrospective data collection..."
            }
        }
    }
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        description: "Compare multiple research papers across methodologies, results, sample \
                      sizes, and conclusions"
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "paperIds": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 2,
                    "description": "Array of at least 2 paper IDs to compare"
                },
                "aspects": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": ["methodology", "results", "sample", "conclusions", "limitations"]
                    },
                    "description": "Specific aspects to compare (defaults to all)"
                }
            },
            "required": ["paperIds"]
        }),
        executor: Arc::new(|args| {
            Box::pin(async move {
                let params: ComparePapersArgs = parse_args(NAME, args)?;
                info!(paper_count = params.paper_ids.len(), "Comparing papers");

                let aspects = params
                    .aspects
                    .unwrap_or_else(|| ComparisonAspect::ALL.to_vec());
                let comparison: BTreeMap<String, String> = aspects
                    .iter()
                    .map(|a| (a.key().to_string(), a.placeholder_finding().to_string()))
                    .collect();

                to_result_value(&PaperComparison {
                    paper_ids: params.paper_ids,
                    comparison,
                })
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_to_all_aspects() {
        let descriptor = descriptor();
        let result = (descriptor.executor)(json!({"paperIds": ["1", "2"]})).await.unwrap();
        let comparison: PaperComparison = serde_json::from_value(result).unwrap();
        assert_eq!(comparison.comparison.len(), 5);
        assert!(comparison.comparison.contains_key("methodology"));
    }

    #[tokio::test]
    async fn test_fewer_than_two_papers_rejected() {
        let descriptor = descriptor();
        let err = (descriptor.executor)(json!({"paperIds": ["1"]})).await.unwrap_err();
        assert!(matches!(err, crate::types::AppError::ToolValidation(_)));
    }

    #[tokio::test]
    async fn test_requested_aspects_only() {
        let descriptor = descriptor();
        let result = (descriptor.executor)(json!({"paperIds": ["1", "2"], "aspects": ["results"]}))
            .await
            .unwrap();
        let comparison: PaperComparison = serde_json::from_value(result).unwrap();
        assert_eq!(comparison.comparison.len(), 1);
        assert!(comparison.comparison.contains_key("results"));
    }
}
