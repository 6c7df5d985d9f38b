//! Issue and option types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::Era;
use crate::crisis::arc::{CrisisType, Severity};
use crate::crisis::engine::CrisisTarget;
use crate::nation::stats::Effects;

pub use crate::nation::policy::{Consequence, ConsequenceKind};

/// Where an issue came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    Crisis,
    Project,
    Ending,
    External,
    Sample,
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Specialization,
    Era,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMetadata {
    pub source: IssueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<CrisisType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
}

impl IssueMetadata {
    pub fn new(source: IssueSource) -> Self {
        Self {
            source,
            crisis_type: None,
            severity: None,
            crisis_id: None,
            region_id: None,
            region_name: None,
            stage: None,
            project_type: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub supporter: String,
    #[serde(default)]
    pub effects: Effects,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequence: Option<Consequence>,
}

impl IssueOption {
    pub fn new(text: impl Into<String>, supporter: impl Into<String>, effects: Effects) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            supporter: supporter.into(),
            effects,
            consequence: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_consequence(mut self, consequence: Consequence) -> Self {
        self.consequence = Some(consequence);
        self
    }
}

/// Build an effects map from static pairs
pub fn effects_of(pairs: &[(&str, i64)]) -> Effects {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// A decision point presented to the player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub is_map_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IssueMetadata>,
    pub options: Vec<IssueOption>,
}

impl Issue {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        options: Vec<IssueOption>,
    ) -> Self {
        let mut issue = Self {
            id: format!("issue-{}", Uuid::new_v4()),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            is_map_event: false,
            metadata: None,
            options,
        };
        issue.ensure_option_ids();
        issue
    }

    pub fn with_metadata(mut self, metadata: IssueMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn option(&self, id: &str) -> Option<&IssueOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn source(&self) -> Option<IssueSource> {
        self.metadata.as_ref().map(|m| m.source)
    }

    pub fn region_id(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.region_id.as_deref())
    }

    /// The arc this issue addresses, if it was raised by one
    pub fn crisis_target(&self) -> Option<CrisisTarget> {
        let meta = self.metadata.as_ref()?;
        if meta.crisis_id.is_none() && meta.crisis_type.is_none() {
            return None;
        }
        Some(CrisisTarget {
            crisis_id: meta.crisis_id.clone(),
            crisis_type: meta.crisis_type,
            region_id: meta.region_id.clone(),
        })
    }

    /// Give every option a unique id, keeping the first holder of an explicit id
    pub fn ensure_option_ids(&mut self) {
        let mut taken: HashSet<String> = HashSet::new();
        let mut needs_id = Vec::new();
        for (i, option) in self.options.iter().enumerate() {
            if option.id.is_empty() || !taken.insert(option.id.clone()) {
                needs_id.push(i);
            }
        }
        let mut next = 1;
        for i in needs_id {
            while taken.contains(&format!("opt-{}", next)) {
                next += 1;
            }
            let id = format!("opt-{}", next);
            taken.insert(id.clone());
            self.options[i].id = id;
        }
    }
}

/// How many options an issue should offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn for_era(era: Era) -> Complexity {
        match era.index() {
            0..=2 => Complexity::Low,
            3..=6 => Complexity::Medium,
            _ => Complexity::High,
        }
    }

    pub fn desired_option_count(&self) -> usize {
        match self {
            Complexity::Low => 3,
            Complexity::Medium => 4,
            Complexity::High => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_option_ids_fills_and_dedups() {
        let issue = Issue::new(
            "Well Rights",
            "Who draws water first?",
            "food",
            vec![
                IssueOption::new("Elders first", "Elders", Effects::new()),
                IssueOption::new("Farmers first", "Farmers", Effects::new()).with_id("opt-1"),
                IssueOption::new("Lots", "Priests", Effects::new()).with_id("lots"),
                IssueOption::new("Again", "Priests", Effects::new()).with_id("lots"),
            ],
        );
        let ids: Vec<_> = issue.options.iter().map(|o| o.id.as_str()).collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(ids.contains(&"lots"));
    }

    #[test]
    fn test_complexity_for_era() {
        assert_eq!(Complexity::for_era(Era::IronAge), Complexity::Low);
        assert_eq!(Complexity::for_era(Era::Classical), Complexity::Medium);
        assert_eq!(Complexity::for_era(Era::Industrial), Complexity::Medium);
        assert_eq!(Complexity::for_era(Era::Modern), Complexity::High);
        assert_eq!(Complexity::High.desired_option_count(), 5);
    }

    #[test]
    fn test_crisis_target_from_metadata() {
        let mut meta = IssueMetadata::new(IssueSource::Crisis);
        meta.crisis_type = Some(CrisisType::Health);
        meta.region_id = Some("river".into());
        let issue = Issue::new("x", "y", "health", Vec::new()).with_metadata(meta);
        let target = issue.crisis_target().unwrap();
        assert_eq!(target.crisis_type, Some(CrisisType::Health));
        assert_eq!(target.region_id.as_deref(), Some("river"));
    }

    #[test]
    fn test_issue_json_shape() {
        let issue = Issue::new("T", "D", "economy", Vec::new());
        let json = serde_json::to_value(&issue).unwrap();
        assert!(json.get("isMapEvent").is_some());
        assert!(json.get("metadata").is_none());
    }
}
