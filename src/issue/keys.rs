//! Repeat keys - the short-term identity of an issue

use crate::crisis::arc::crisis_repeat_key;
use crate::issue::types::Issue;

const BOILERPLATE: &[&str] = &[
    "the", "a", "an", "of", "on", "in", "for", "and", "to", "crisis", "issue", "debate",
    "question", "proposal", "dilemma", "matter", "new",
];

/// Normalized title used for repeat detection
///
/// Lowercased, parenthesised text removed, punctuation dropped and filler
/// words stripped: "The New Granary Debate (Part II)" becomes "granary".
pub fn title_slug(title: &str) -> String {
    let mut depth = 0usize;
    let mut cleaned = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_alphanumeric() => cleaned.extend(c.to_lowercase()),
            c if c.is_whitespace() || c == '-' || c == '_' => cleaned.push(' '),
            _ => {}
        }
    }

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !BOILERPLATE.contains(w))
        .collect();
    if words.is_empty() {
        "untitled".into()
    } else {
        words.join("-")
    }
}

pub fn repeat_key(issue: &Issue) -> String {
    if let Some(meta) = &issue.metadata {
        if let (Some(crisis_type), Some(region_id)) = (meta.crisis_type, meta.region_id.as_deref()) {
            return crisis_repeat_key(crisis_type, region_id);
        }
    }
    let category = if issue.category.trim().is_empty() {
        "general".to_string()
    } else {
        issue.category.trim().to_lowercase()
    };
    format!("issue:{}:{}", category, title_slug(&issue.title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::arc::CrisisType;
    use crate::issue::types::{IssueMetadata, IssueSource};

    #[test]
    fn test_slug_strips_boilerplate_and_parens() {
        assert_eq!(title_slug("The New Granary Debate (Part II)"), "granary");
        assert_eq!(title_slug("Tariffs on Imported Salt!"), "tariffs-imported-salt");
        assert_eq!(title_slug("The Crisis"), "untitled");
    }

    #[test]
    fn test_plain_issue_key() {
        let issue = Issue::new("River Toll Dispute", "", "Economy", Vec::new());
        assert_eq!(repeat_key(&issue), "issue:economy:river-toll-dispute");
    }

    #[test]
    fn test_crisis_issue_key() {
        let mut meta = IssueMetadata::new(IssueSource::Crisis);
        meta.crisis_type = Some(CrisisType::Unrest);
        meta.region_id = Some("north".into());
        let issue = Issue::new("System Stress: Unrest in Northreach", "", "unrest", Vec::new())
            .with_metadata(meta);
        assert_eq!(repeat_key(&issue), "crisis:unrest:north");
    }
}
