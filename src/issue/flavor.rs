//! Era flavoring and the anachronism guard

use crate::core::types::Era;
use crate::issue::types::Issue;

/// Ordered substitutions for pre-industrial eras; longer forms come first
const PRE_INDUSTRIAL_TERMS: &[(&str, &str)] = &[
    ("technologies", "crafts"),
    ("technology", "craft knowledge"),
    ("technological", "artisanal"),
    ("infrastructure", "roads and granaries"),
    ("industrialization", "expansion of workshops"),
    ("industrial", "artisan"),
    ("factories", "workshops"),
    ("factory", "workshop"),
    ("corporations", "merchant houses"),
    ("corporation", "merchant house"),
    ("scientists", "scholars"),
    ("scientist", "scholar"),
    ("hospitals", "houses of healing"),
    ("hospital", "house of healing"),
    ("healthcare", "healing"),
    ("universities", "academies"),
    ("university", "academy"),
    ("electricity", "firelight"),
    ("police", "watchmen"),
    ("newspapers", "town criers"),
    ("economy", "trade"),
    ("budget", "treasury"),
    ("cyber", "signal"),
];

const BANNED_EXACT: &[&str] = &["ai"];

const BANNED_PREFIXES: &[&str] = &[
    "robot", "cyber", "nuclear", "satellite", "internet", "digital", "genetic", "deepfake",
    "automation",
];

/// Replace every ASCII-case-insensitive occurrence of `from` that starts a
/// word, keeping the capitalisation of the matched text
fn replace_preserving_case(text: &str, from: &str, to: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let needle = from.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut search = 0;
    while let Some(found) = lower[search..].find(&needle) {
        let start = search + found;
        let end = start + needle.len();
        let mid_word = lower[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
        if mid_word {
            search = end;
            continue;
        }
        out.push_str(&text[copied..start]);
        out.push_str(&match_case(&text[start..end], to));
        copied = end;
        search = end;
    }
    out.push_str(&text[copied..]);
    out
}

fn match_case(matched: &str, replacement: &str) -> String {
    let letters: Vec<char> = matched.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_ascii_uppercase()) {
        return replacement.to_ascii_uppercase();
    }
    match matched.chars().next() {
        Some(first) if first.is_ascii_uppercase() => {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(head) => head.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
        _ => replacement.to_string(),
    }
}

pub fn flavor_text(text: &str, era: Era) -> String {
    if !era.is_pre_industrial() {
        return text.to_string();
    }
    PRE_INDUSTRIAL_TERMS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| replace_preserving_case(&acc, from, to))
}

/// Apply era wording to title, description and option texts
pub fn flavor_issue(issue: &mut Issue, era: Era) {
    if !era.is_pre_industrial() {
        return;
    }
    issue.title = flavor_text(&issue.title, era);
    issue.description = flavor_text(&issue.description, era);
    for option in &mut issue.options {
        option.text = flavor_text(&option.text, era);
    }
}

/// First out-of-era term found in `text`, if any
pub fn find_anachronism(text: &str) -> Option<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .find(|token| {
            BANNED_EXACT.contains(token) || BANNED_PREFIXES.iter().any(|p| token.starts_with(p))
        })
        .map(str::to_string)
}

/// Check an issue's raw text against the era's vocabulary
pub fn issue_anachronism(issue: &Issue, era: Era) -> Option<String> {
    if !era.forbids_modern_terms() {
        return None;
    }
    std::iter::once(issue.title.as_str())
        .chain(std::iter::once(issue.description.as_str()))
        .chain(issue.options.iter().map(|o| o.text.as_str()))
        .find_map(find_anachronism)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::types::IssueOption;
    use crate::nation::stats::Effects;

    #[test]
    fn test_flavor_preserves_case() {
        let text = "Technology and infrastructure; TECHNOLOGY matters";
        assert_eq!(
            flavor_text(text, Era::IronAge),
            "Craft knowledge and roads and granaries; CRAFT KNOWLEDGE matters"
        );
    }

    #[test]
    fn test_flavor_skips_modern_eras() {
        assert_eq!(flavor_text("Technology", Era::Modern), "Technology");
    }

    #[test]
    fn test_only_word_starts_are_replaced() {
        assert_eq!(flavor_text("Anti-police riots", Era::Classical), "Anti-watchmen riots");
        assert_eq!(flavor_text("Repolice", Era::Classical), "Repolice");
    }

    #[test]
    fn test_plural_before_singular() {
        assert_eq!(flavor_text("New factories", Era::Renaissance), "New workshops");
    }

    #[test]
    fn test_guard_tokens() {
        assert_eq!(find_anachronism("An AI oracle"), Some("ai".into()));
        assert_eq!(find_anachronism("Robotic farmhands"), Some("robotic".into()));
        assert_eq!(find_anachronism("Fair taxes for the rain god"), None);
        assert_eq!(find_anachronism("Daily bread"), None);
    }

    #[test]
    fn test_issue_guard_respects_era() {
        let issue = Issue::new(
            "Nuclear Granary",
            "",
            "food",
            vec![IssueOption::new("Build it", "", Effects::new())],
        );
        assert!(issue_anachronism(&issue, Era::Medieval).is_some());
        assert!(issue_anachronism(&issue, Era::Renaissance).is_none());
    }
}
