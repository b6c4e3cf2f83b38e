//! Canonical result shapes shared by all literature tools.

use serde::{Deserialize, Serialize};

/// Paper search result from academic databases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSearchResult {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub publish_date: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An open access paper. Constructing this type asserts that free full
/// text exists for the record; `is_open_access` is a tag, not a computed
/// flag, and always serializes as `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccessPaper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub publish_date: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    pub is_open_access: bool,
}

/// Comparison of multiple papers across named aspects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperComparison {
    pub paper_ids: Vec<String>,
    pub comparison: std::collections::BTreeMap<String, String>,
}

/// Full text of an open access article, with a flat section breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullTextPaper {
    pub pmc_id: String,
    pub title: String,
    pub full_text: String,
    pub sections: Vec<PaperSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSection {
    pub title: String,
    pub content: String,
}
