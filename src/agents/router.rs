//! Intent router
//!
//! Maps a user utterance to a persona by keyword containment, checked in
//! a fixed priority order: search first, then citation, then analysis.
//! The ordering is a contract: a message matching both a search keyword
//! and a citation keyword ("find citations for CRISPR papers") resolves
//! to search because that list is tested first. Anything without a match
//! falls through to the orchestrator.
//!
//! Matching is plain substring containment on the lower-cased message.
//! There is no stemming and no word-boundary check, so a keyword inside a
//! longer unrelated word still matches. Known false-positive risk, kept
//! as-is until routing accuracy becomes a problem.

use crate::agents::persona::AgentRole;

const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "look for",
    "papers on",
    "articles about",
    "literature on",
];

const CITATION_KEYWORDS: &[&str] = &[
    "cite",
    "citation",
    "reference",
    "bibliography",
    "apa",
    "mla",
    "format",
];

const ANALYSIS_KEYWORDS: &[&str] = &[
    "summarize",
    "analyze",
    "compare",
    "synthesis",
    "what does",
    "explain",
];

/// Select a persona for a user message. Pure and stateless; the same
/// input always yields the same role.
pub fn route(message: &str) -> AgentRole {
    let lower = message.to_lowercase();

    let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| lower.contains(kw));

    if contains_any(SEARCH_KEYWORDS) {
        return AgentRole::Search;
    }
    if contains_any(CITATION_KEYWORDS) {
        return AgentRole::Citation;
    }
    if contains_any(ANALYSIS_KEYWORDS) {
        return AgentRole::Analysis;
    }

    // Complex or unclear requests go to the orchestrator
    AgentRole::Orchestrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_intent() {
        assert_eq!(route("find papers about CRISPR gene editing"), AgentRole::Search);
        assert_eq!(route("Search PubMed for immunotherapy trials"), AgentRole::Search);
        assert_eq!(route("any literature on long covid?"), AgentRole::Search);
    }

    #[test]
    fn test_citation_intent() {
        assert_eq!(route("give me the APA reference for this paper"), AgentRole::Citation);
        assert_eq!(route("build a bibliography"), AgentRole::Citation);
    }

    #[test]
    fn test_analysis_intent() {
        assert_eq!(route("summarize these two studies"), AgentRole::Analysis);
        assert_eq!(route("what does this result mean?"), AgentRole::Analysis);
    }

    #[test]
    fn test_no_keywords_defaults_to_orchestrator() {
        assert_eq!(route("hello there"), AgentRole::Orchestrator);
        assert_eq!(route(""), AgentRole::Orchestrator);
        assert_eq!(route("?!.,;"), AgentRole::Orchestrator);
    }

    #[test]
    fn test_priority_search_beats_citation() {
        // Contains "find" (search) and "citation" (citation)
        assert_eq!(route("find citations for CRISPR papers"), AgentRole::Search);
    }

    #[test]
    fn test_priority_search_beats_analysis() {
        // Contains "search" (search) and "compare" (analysis)
        assert_eq!(route("search for trials and compare them"), AgentRole::Search);
    }

    #[test]
    fn test_priority_citation_beats_analysis() {
        // Contains "cite" (citation) and "summarize" (analysis)
        assert_eq!(route("summarize and cite the key studies"), AgentRole::Citation);
    }

    #[test]
    fn test_deterministic() {
        let message = "compare the formats used in these references";
        let first = route(message);
        for _ in 0..10 {
            assert_eq!(route(message), first);
        }
    }

    #[test]
    fn test_substring_containment_no_word_boundaries() {
        // "informative" contains "format" - containment is intentional
        assert_eq!(route("that was informative"), AgentRole::Citation);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(route("FIND PAPERS NOW"), AgentRole::Search);
    }
}
