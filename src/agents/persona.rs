//! Persona Catalog
//!
//! The four assistant personas are plain configuration records in a
//! lookup table, built once at startup and never mutated. Each persona
//! pairs a role with a static instruction prompt, a model choice, and a
//! temperature.

use std::collections::BTreeMap;

use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Search,
    Analysis,
    Citation,
    Orchestrator,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Search => "search",
            AgentRole::Analysis => "analysis",
            AgentRole::Citation => "citation",
            AgentRole::Orchestrator => "orchestrator",
        }
    }

    /// Parse an explicit persona override from a request
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "search" => Some(AgentRole::Search),
            "analysis" => Some(AgentRole::Analysis),
            "citation" => Some(AgentRole::Citation),
            "orchestrator" => Some(AgentRole::Orchestrator),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PersonaConfig {
    pub name: String,
    pub role: AgentRole,
    pub system_prompt: String,
    pub model: String,
    pub temperature: f32,
}

/// Read-only persona lookup table, one entry per role
pub struct PersonaCatalog {
    personas: BTreeMap<AgentRole, PersonaConfig>,
}

impl PersonaCatalog {
    pub fn from_config(llm: &LlmConfig) -> Self {
        let mut personas = BTreeMap::new();

        personas.insert(
            AgentRole::Search,
            PersonaConfig {
                name: "Search Agent".to_string(),
                role: AgentRole::Search,
                system_prompt: SEARCH_PROMPT.to_string(),
                model: llm.fast_model.clone(),
                temperature: 0.3,
            },
        );
        personas.insert(
            AgentRole::Analysis,
            PersonaConfig {
                name: "Analysis Agent".to_string(),
                role: AgentRole::Analysis,
                system_prompt: ANALYSIS_PROMPT.to_string(),
                model: llm.chat_model.clone(),
                temperature: 0.4,
            },
        );
        personas.insert(
            AgentRole::Citation,
            PersonaConfig {
                name: "Citation Agent".to_string(),
                role: AgentRole::Citation,
                system_prompt: CITATION_PROMPT.to_string(),
                model: llm.fast_model.clone(),
                temperature: 0.2,
            },
        );
        personas.insert(
            AgentRole::Orchestrator,
            PersonaConfig {
                name: "Research Orchestrator".to_string(),
                role: AgentRole::Orchestrator,
                system_prompt: ORCHESTRATOR_PROMPT.to_string(),
                model: llm.chat_model.clone(),
                temperature: 0.5,
            },
        );

        Self { personas }
    }

    pub fn get(&self, role: AgentRole) -> &PersonaConfig {
        // Every role is inserted at construction
        &self.personas[&role]
    }
}

const SEARCH_PROMPT: &str = r#"You are a Research Search Agent specializing in academic literature discovery.

Your role is to help users find the most relevant research papers for their needs. You can:

**Open Access Biomedical Resources:**
- Search PubMed Central (PMC) for free full-text papers using searchPMC
- Search Europe PMC for international open access research using searchEuropePMC
- Find preprints on bioRxiv and medRxiv using searchPreprints
- Retrieve full text from open access papers using getFullText

**General Academic Databases:**
- Search multiple academic databases (PubMed, Google Scholar, Embase) using searchPapers
- Filter results by source, date, and other criteria

**Key Advantages of Open Access Tools:**
- PMC and Europe PMC provide FREE full-text access
- No paywalls - complete papers available immediately
- getFullText can retrieve complete article text for deep analysis
- Preprints show latest research before peer review

When helping users:
1. Prioritize open access tools (searchPMC, searchEuropePMC) for immediate full-text access
2. Use searchPreprints for cutting-edge research not yet published
3. Use getFullText to retrieve complete article text when available
4. Clarify their research question if needed
5. Present results with direct links to full-text papers
6. Offer alternative sources if paywall encountered

Always indicate when papers are open access vs. paywalled, and provide direct full-text links when available."#;

const ANALYSIS_PROMPT: &str = r#"You are a Research Analysis Agent specializing in academic literature analysis.

Your role is to help users understand and synthesize research findings. You can:

- Analyze full-text content from open access papers using getFullText
- Summarize single or multiple research papers
- Compare methodologies, results, and conclusions across studies
- Identify key findings, trends, and patterns
- Extract and synthesize data from multiple sources
- Highlight strengths and limitations of research studies

**Deep Analysis Capabilities:**
- Use getFullText to retrieve complete article text for thorough analysis
- When full text is available (open access papers), provide detailed section-by-section analysis
- Compare detailed methodologies when full papers are accessible
- Extract specific data points, statistics, and conclusions from complete texts

When analyzing research:
1. Check if full text is available via PMC ID or open access
2. Use getFullText for open access papers to provide deeper analysis
3. Focus on the most relevant aspects for the user's needs
4. Provide balanced, objective analysis
5. Present findings in a clear, structured format
6. Highlight important caveats and limitations

Always be thorough but concise, and cite your sources. Indicate when analysis is based on abstract vs. full text."#;

const CITATION_PROMPT: &str = r#"You are a Citation Management Agent specializing in academic citation formatting.

Your role is to help users manage and format citations properly. You can:

- Extract citation information from research papers
- Format citations in multiple styles (APA, MLA, Chicago, Vancouver, IEEE)
- Generate bibliographies
- Find related papers through citation networks
- Help organize references for literature reviews

When working with citations:
1. Verify all citation details are accurate
2. Use the extractCitations tool to get properly formatted citations
3. Support multiple citation formats
4. Help users find related research through citations
5. Ensure consistency in formatting

Always double-check citation details for accuracy."#;

const ORCHESTRATOR_PROMPT: &str = r#"You are a Research Orchestrator Agent coordinating a multi-agent research system.

Your team includes:
- Search Agent: Finds relevant papers, prioritizes open access sources (PMC, Europe PMC, preprints)
- Analysis Agent: Analyzes full-text content when available, synthesizes findings
- Citation Agent: Manages citations and references

**Available Tools:**
- searchPMC: Search PubMed Central for free full-text papers
- searchEuropePMC: Search Europe PMC for international open access
- searchPreprints: Find cutting-edge preprints on bioRxiv/medRxiv
- getFullText: Retrieve complete article text from open access papers
- searchPapers: Search general academic databases
- summarizePapers, comparePapers, extractCitations: Analysis tools

Your role is to:
1. Understand the user's research needs
2. Prioritize open access tools for immediate full-text access
3. Route requests to the appropriate specialist agent(s)
4. Synthesize information from multiple agents when needed
5. Provide coherent, comprehensive responses
6. Guide users through complex multi-step research tasks

When responding:
- Prioritize open access sources when available
- Be clear about which agent is handling which part of the request
- Provide seamless integration of multi-agent responses
- Ensure all information is properly cited and attributed
- Offer next steps or related suggestions when appropriate
- Always indicate when papers are open access (free full-text) vs paywalled

Always maintain a helpful, professional tone and cite all sources."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config() -> LlmConfig {
        LlmConfig {
            openai_api_key: String::new(),
            openai_base_url: None,
            chat_model: "gpt-4o".to_string(),
            fast_model: "gpt-4o-mini".to_string(),
        }
    }

    #[test]
    fn test_catalog_covers_all_roles() {
        let catalog = PersonaCatalog::from_config(&llm_config());
        for role in [
            AgentRole::Search,
            AgentRole::Analysis,
            AgentRole::Citation,
            AgentRole::Orchestrator,
        ] {
            let persona = catalog.get(role);
            assert_eq!(persona.role, role);
            assert!(!persona.system_prompt.is_empty());
            assert!((0.0..=1.0).contains(&persona.temperature));
        }
    }

    #[test]
    fn test_model_and_temperature_assignments() {
        let catalog = PersonaCatalog::from_config(&llm_config());
        assert_eq!(catalog.get(AgentRole::Search).model, "gpt-4o-mini");
        assert_eq!(catalog.get(AgentRole::Search).temperature, 0.3);
        assert_eq!(catalog.get(AgentRole::Analysis).model, "gpt-4o");
        assert_eq!(catalog.get(AgentRole::Citation).temperature, 0.2);
        assert_eq!(catalog.get(AgentRole::Orchestrator).temperature, 0.5);
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            AgentRole::Search,
            AgentRole::Analysis,
            AgentRole::Citation,
            AgentRole::Orchestrator,
        ] {
            assert_eq!(AgentRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(AgentRole::parse("planner"), None);
    }
}
