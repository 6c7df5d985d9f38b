//! Request payloads for the external text generator
//!
//! These structures are the wire contract: they serialize to the camelCase
//! JSON the generator expects and carry a snapshot of the nation that is
//! large enough to steer generation but bounded in size.

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::types::{Era, GovernmentType};
use crate::core::Result;
use crate::issue::types::{Complexity, Issue};
use crate::nation::institutions::{Factions, Institutions};
use crate::nation::stats::NationStats;
use crate::nation::Nation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Generate,
    Interpret,
    ExpandOptions,
}

/// The issue being expanded, as the generator sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentIssueContext {
    pub title: String,
    pub description: String,
    pub category: String,
    pub options: Vec<String>,
}

impl CurrentIssueContext {
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            category: issue.category.clone(),
            options: issue.options.iter().map(|o| o.text.clone()).collect(),
        }
    }
}

/// Ask for a new issue, or more options for an existing one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub mode: RequestMode,
    pub era: Era,
    pub stats: NationStats,
    /// Recent decisions, oldest first
    pub history: Vec<String>,
    pub history_log: Vec<String>,
    pub institutions: Institutions,
    pub factions: Factions,
    pub active_policies: Vec<String>,
    pub complexity: Complexity,
    pub desired_option_count: usize,
    /// Titles the generator must not reuse
    pub forbidden: Vec<String>,
    pub nation_name: String,
    pub motto: String,
    pub leader: String,
    pub government_type: GovernmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_issue: Option<CurrentIssueContext>,
}

fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

impl GenerationRequest {
    pub fn for_nation(nation: &Nation, config: &EngineConfig) -> Self {
        let complexity = Complexity::for_era(nation.era);
        Self {
            mode: RequestMode::Generate,
            era: nation.era,
            stats: nation.stats.clone(),
            history: tail(&nation.decision_history, config.history_in_request)
                .iter()
                .map(|r| r.summary())
                .collect(),
            history_log: nation.history_log.clone(),
            institutions: nation.institutions.clone(),
            factions: nation.factions.clone(),
            active_policies: nation
                .active_policies
                .iter()
                .map(|p| format!("{}: {}", p.issue_title, p.option_text))
                .collect(),
            complexity,
            desired_option_count: complexity.desired_option_count(),
            forbidden: tail(&nation.used_issue_titles, config.forbidden_titles_in_request),
            nation_name: nation.name.clone(),
            motto: nation.motto.clone(),
            leader: nation.leader.clone(),
            government_type: nation.government_type.clone(),
            current_issue: None,
        }
    }

    pub fn expand_options(nation: &Nation, issue: &Issue, config: &EngineConfig) -> Self {
        Self {
            mode: RequestMode::ExpandOptions,
            current_issue: Some(CurrentIssueContext::from_issue(issue)),
            ..Self::for_nation(nation, config)
        }
    }
}

/// Ask the generator to turn a free-text response into an option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretRequest {
    pub mode: RequestMode,
    pub nation_name: String,
    pub government_type: GovernmentType,
    pub era: Era,
    pub stats: NationStats,
    pub crisis_context: String,
    pub user_response: String,
}

impl InterpretRequest {
    pub fn new(nation: &Nation, issue: &Issue, user_response: &str) -> Self {
        Self {
            mode: RequestMode::Interpret,
            nation_name: nation.name.clone(),
            government_type: nation.government_type.clone(),
            era: nation.era,
            stats: nation.stats.clone(),
            crisis_context: format!("{}\n{}", issue.title, issue.description),
            user_response: user_response.to_string(),
        }
    }
}

/// Any request the generator accepts; the `mode` field tells them apart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratorRequest {
    Generate(GenerationRequest),
    Interpret(InterpretRequest),
}

impl GeneratorRequest {
    pub fn mode(&self) -> RequestMode {
        match self {
            GeneratorRequest::Generate(r) => r.mode,
            GeneratorRequest::Interpret(r) => r.mode,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Slot;
    use crate::nation::NewNation;

    fn nation() -> Nation {
        let config = EngineConfig::default();
        let mut nation = Nation::create(NewNation::new("u", Slot::new(1).unwrap(), "Elaris"), 0, &config);
        for i in 0..60 {
            nation.remember_title(&format!("Title {}", i), &config);
        }
        nation
    }

    #[test]
    fn test_generation_request_shape() {
        let config = EngineConfig::default();
        let request = GenerationRequest::for_nation(&nation(), &config);
        assert_eq!(request.forbidden.len(), 40);
        assert_eq!(request.forbidden.last().map(String::as_str), Some("Title 59"));
        assert_eq!(request.desired_option_count, 3);

        let json = serde_json::to_value(GeneratorRequest::Generate(request)).unwrap();
        assert_eq!(json["mode"], "generate");
        assert_eq!(json["era"], "Stone Age");
        assert!(json.get("desiredOptionCount").is_some());
        assert!(json.get("currentIssue").is_none());
    }

    #[test]
    fn test_expand_request_carries_issue() {
        let config = EngineConfig::default();
        let issue = Issue::new("Well Rights", "Dry summer", "food", Vec::new());
        let request = GenerationRequest::expand_options(&nation(), &issue, &config);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["mode"], "expand-options");
        assert_eq!(json["currentIssue"]["title"], "Well Rights");
    }

    #[test]
    fn test_interpret_request_mode() {
        let issue = Issue::new("Flood", "The river rose", "infrastructure", Vec::new());
        let request = GeneratorRequest::Interpret(InterpretRequest::new(&nation(), &issue, "Build levees"));
        assert_eq!(request.mode(), RequestMode::Interpret);
        let json: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(json["userResponse"], "Build levees");
    }
}
