//! Parse raw generator output into issues and options
//!
//! Generators wrap their JSON in prose, emit floats or strings where
//! integers belong and sometimes stop mid-object. Parsing is lenient about
//! the first two and strict about the last.

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::{NationError, Result};
use crate::issue::types::{
    Consequence, ConsequenceKind, Issue, IssueMetadata, IssueOption, IssueSource,
};
use crate::nation::stats::Effects;

/// Minimum options a generated issue must carry to be usable
pub const MIN_GENERATED_OPTIONS: usize = 3;

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default)]
    text: String,
    #[serde(default)]
    supporter: String,
    #[serde(default)]
    effects: Value,
    #[serde(default)]
    consequence: Option<Value>,
}

impl RawOption {
    fn into_option(self) -> Option<IssueOption> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        let mut option = IssueOption::new(text, self.supporter.trim(), lenient_effects(&self.effects));
        option.consequence = self.consequence.as_ref().and_then(lenient_consequence);
        Some(option)
    }
}

/// Extract JSON object from a response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| NationError::LlmError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| NationError::LlmError("No closing brace found in response".into()))?;
    if end < start {
        return Err(NationError::LlmError("Truncated JSON in response".into()));
    }
    Ok(&response[start..=end])
}

fn lenient_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s
            .trim()
            .trim_start_matches('+')
            .parse::<f64>()
            .ok()
            .map(|f| f.round() as i64),
        _ => None,
    }
}

/// Stat effects from any JSON object, dropping values that are not numbers
pub fn lenient_effects(value: &Value) -> Effects {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| lenient_number(v).map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

fn lenient_consequence(value: &Value) -> Option<Consequence> {
    let text = value.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    let chance = value
        .get("chance")
        .and_then(|c| c.as_f64().or_else(|| c.as_str().and_then(|s| s.trim().parse().ok())))
        .unwrap_or(0.0);
    let kind = match value.get("type").and_then(Value::as_str) {
        Some(t) if t.eq_ignore_ascii_case("benefit") => ConsequenceKind::Benefit,
        _ => ConsequenceKind::Downside,
    };
    let mut consequence = Consequence {
        text: text.to_string(),
        chance,
        kind,
        stat_effects: value.get("statEffects").map(lenient_effects).unwrap_or_default(),
    };
    consequence.clamp_chance();
    Some(consequence)
}

fn parse_raw_issue(response: &str) -> Result<RawIssue> {
    let json = extract_json(response)?;
    serde_json::from_str(json)
        .map_err(|e| NationError::LlmError(format!("Failed to parse issue: {}", e)))
}

/// Parse a generated issue; it must have a title and enough options
pub fn parse_generated_issue(response: &str) -> Result<Issue> {
    let raw = parse_raw_issue(response)?;
    let title = raw.title.trim().to_string();
    if title.is_empty() {
        return Err(NationError::LlmError("Generated issue has no title".into()));
    }
    let options: Vec<IssueOption> = raw.options.into_iter().filter_map(RawOption::into_option).collect();
    if options.len() < MIN_GENERATED_OPTIONS {
        return Err(NationError::LlmError(format!(
            "Generated issue has {} options, need {}",
            options.len(),
            MIN_GENERATED_OPTIONS
        )));
    }
    let category = if raw.category.trim().is_empty() {
        "governance".to_string()
    } else {
        raw.category.trim().to_lowercase()
    };
    Ok(Issue::new(title, raw.description.trim(), category, options)
        .with_metadata(IssueMetadata::new(IssueSource::External)))
}

/// Options from an expand-options response
pub fn parse_option_list(response: &str) -> Result<Vec<IssueOption>> {
    let raw = parse_raw_issue(response)?;
    let options: Vec<IssueOption> = raw.options.into_iter().filter_map(RawOption::into_option).collect();
    if options.is_empty() {
        return Err(NationError::LlmError("No options in response".into()));
    }
    Ok(options)
}

/// A free-text answer turned into an option by the generator
pub fn parse_interpretation(response: &str) -> Result<IssueOption> {
    let json = extract_json(response)?;
    let raw: RawOption = serde_json::from_str(json)
        .map_err(|e| NationError::LlmError(format!("Failed to parse interpretation: {}", e)))?;
    let mut option = raw
        .into_option()
        .ok_or_else(|| NationError::LlmError("Interpretation has no text".into()))?;
    if option.supporter.is_empty() {
        option.supporter = "Your Decree".into();
    }
    Ok(option)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"Sure! Here is your issue:
{"title": "Salt Road Tolls", "description": "Merchants complain.", "category": "Economy",
 "options": [
   {"text": "Abolish the tolls", "supporter": "Merchants", "effects": {"economy": 4, "happiness": "+2"}},
   {"text": "Raise the tolls", "effects": {"economy": 2.6, "crime": 1}},
   {"text": "Keep them as they are", "effects": {"mood": "good"}},
   {"text": "  ", "effects": {}}
 ]}
Hope this helps."#;

    #[test]
    fn test_extract_json_simple() {
        let response = r#"{"title": "x"}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("I cannot help with that").is_err());
        assert!(extract_json("} oops {").is_err());
    }

    #[test]
    fn test_parse_generated_issue() {
        let issue = parse_generated_issue(GOOD).unwrap();
        assert_eq!(issue.title, "Salt Road Tolls");
        assert_eq!(issue.category, "economy");
        assert_eq!(issue.options.len(), 3);
        assert_eq!(issue.options[0].effects.get("happiness"), Some(&2));
        assert_eq!(issue.options[1].effects.get("economy"), Some(&3));
        assert!(issue.options[2].effects.is_empty());
        assert_eq!(issue.source(), Some(IssueSource::External));
    }

    #[test]
    fn test_too_few_options_rejected() {
        let response = r#"{"title": "Thin", "options": [{"text": "a"}, {"text": "b"}]}"#;
        assert!(parse_generated_issue(response).is_err());
    }

    #[test]
    fn test_truncated_json_rejected() {
        let response = r#"{"title": "Cut off", "options": [{"text": "a"}, {"text": "b"}"#;
        assert!(parse_generated_issue(response).is_err());
    }

    #[test]
    fn test_parse_interpretation_with_consequence() {
        let response = r#"{"text": "Build levees", "effects": {"economy": -2},
            "consequence": {"text": "Floods recede", "chance": 1.4, "type": "benefit", "statEffects": {"happiness": 3}}}"#;
        let option = parse_interpretation(response).unwrap();
        assert_eq!(option.text, "Build levees");
        let consequence = option.consequence.unwrap();
        assert_eq!(consequence.chance, 1.0);
        assert_eq!(consequence.kind, ConsequenceKind::Benefit);
    }
}
