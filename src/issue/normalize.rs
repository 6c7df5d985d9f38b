//! Option count normalization
//!
//! Externally generated issues arrive with any number of options, often with
//! near-duplicates. Normalization dedups and trims them, then tops the list
//! up from canned options matching the issue's theme.

use std::collections::HashSet;

use crate::core::types::Era;
use crate::issue::types::{effects_of, Issue, IssueOption};

pub const MIN_OPTIONS: usize = 3;
pub const MAX_OPTIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    Infrastructure,
    Security,
    Health,
    Culture,
    Economy,
    Governance,
    Innovation,
    Food,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Infrastructure,
        Theme::Security,
        Theme::Health,
        Theme::Culture,
        Theme::Economy,
        Theme::Governance,
        Theme::Innovation,
        Theme::Food,
    ];

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Theme::Infrastructure => &[
                "road", "bridge", "canal", "aqueduct", "rail", "port", "harbo", "wall",
                "construct", "infrastructure", "transport", "sewer", "power", "grid",
            ],
            Theme::Security => &[
                "army", "soldier", "guard", "border", "raid", "bandit", "crime", "police",
                "war", "defen", "militia", "spy", "security", "weapon", "invasion",
            ],
            Theme::Health => &[
                "plague", "disease", "sick", "healer", "medic", "hospital", "health",
                "epidemic", "sanitation", "doctor", "vaccin", "pandemic",
            ],
            Theme::Culture => &[
                "festival", "temple", "art", "religio", "faith", "priest", "tradition",
                "language", "culture", "music", "monument", "ritual", "school",
            ],
            Theme::Economy => &[
                "trade", "tax", "market", "merchant", "coin", "tariff", "debt", "econom",
                "wage", "price", "guild", "tithe", "budget", "currency",
            ],
            Theme::Governance => &[
                "council", "law", "court", "election", "king", "succession", "corrupt",
                "govern", "rights", "assembly", "vote", "noble", "reform", "constitution",
            ],
            Theme::Innovation => &[
                "invent", "science", "research", "technolog", "scholar", "discover", "machine",
                "engineer", "innovat", "experiment", "knowledge", "academy",
            ],
            Theme::Food => &[
                "harvest", "grain", "famine", "farm", "crop", "herd", "fish", "hunt", "food",
                "granar", "drought", "irrigat", "well",
            ],
        }
    }
}

type Canned = (&'static str, &'static str, &'static [(&'static str, i64)]);

fn canned_pool(theme: Theme, pre_industrial: bool) -> &'static [Canned] {
    match (theme, pre_industrial) {
        (Theme::Infrastructure, true) => &[
            ("Press the villages into building new roads", "Road Wardens", &[("economy", 4), ("happiness", -3)]),
            ("Let each clan maintain its own paths", "Clan Elders", &[("politicalFreedom", 3), ("economy", -2)]),
            ("Raise a stone bridge over the river", "Master Masons", &[("economy", 5), ("environment", -2)]),
            ("Dig a canal to the fields", "Farmers", &[("economy", 3), ("environment", -3), ("happiness", 2)]),
            ("Leave the land as the ancestors shaped it", "Elders", &[("environment", 3), ("economy", -3)]),
        ],
        (Theme::Infrastructure, false) => &[
            ("Fund a national public works programme", "Planning Ministry", &[("economy", 5), ("gdp", 2), ("environment", -2)]),
            ("Privatise maintenance contracts", "Contractors Guild", &[("economy", 3), ("civilRights", -1), ("happiness", -2)]),
            ("Prioritise public transit over highways", "Urbanists", &[("environment", 4), ("economy", 1)]),
            ("Modernise the power grid", "Engineers Union", &[("technology", 3), ("economy", 2)]),
            ("Defer repairs to balance the budget", "Treasury", &[("economy", 2), ("happiness", -3)]),
        ],
        (Theme::Security, true) => &[
            ("Raise a levy of spearmen", "War Chiefs", &[("crime", -5), ("happiness", -2)]),
            ("Pay the raiders tribute", "Merchants", &[("economy", -4), ("crime", -2)]),
            ("Build palisades around the villages", "Builders", &[("crime", -3), ("economy", -2)]),
            ("Let each household arm itself", "Free Farmers", &[("politicalFreedom", 3), ("crime", 2)]),
            ("Send envoys to parley", "Elders", &[("happiness", 2), ("crime", -1)]),
        ],
        (Theme::Security, false) => &[
            ("Expand the police force", "Interior Ministry", &[("crime", -6), ("civilRights", -2)]),
            ("Invest in community policing", "Civil Liberties Union", &[("crime", -3), ("civilRights", 2)]),
            ("Grant emergency surveillance powers", "Security Council", &[("crime", -5), ("politicalFreedom", -4)]),
            ("Address root causes with social programmes", "Social Workers", &[("crime", -2), ("happiness", 3), ("economy", -2)]),
            ("Hire private security contractors", "Contractors Guild", &[("crime", -3), ("economy", -2)]),
        ],
        (Theme::Health, true) => &[
            ("Summon the herbalists to every village", "Healers", &[("healthcare", 5), ("economy", -2)]),
            ("Isolate the sick beyond the walls", "Guards", &[("healthcare", 3), ("civilRights", -3)]),
            ("Hold rites to appease the spirits", "Priests", &[("happiness", 3), ("healthcare", -1)]),
            ("Dig clean wells away from the middens", "Well Diggers", &[("healthcare", 4), ("environment", 2)]),
            ("Let each family tend its own", "Elders", &[("politicalFreedom", 2), ("healthcare", -3)]),
        ],
        (Theme::Health, false) => &[
            ("Fund universal healthcare", "Health Ministry", &[("healthcare", 6), ("economy", -3)]),
            ("Subsidise private clinics", "Medical Association", &[("healthcare", 3), ("economy", -1)]),
            ("Launch a public health campaign", "Public Health Board", &[("healthcare", 3), ("education", 1)]),
            ("Mandate preventive screenings", "Doctors", &[("healthcare", 4), ("civilRights", -2)]),
            ("Leave health to the free market", "Insurers", &[("economy", 3), ("healthcare", -3)]),
        ],
        (Theme::Culture, true) => &[
            ("Hold a great festival", "Bards", &[("happiness", 5), ("economy", -2)]),
            ("Build a shrine in every village", "Priests", &[("happiness", 3), ("economy", -3)]),
            ("Honour the old customs strictly", "Elders", &[("civilRights", -2), ("happiness", 2)]),
            ("Welcome the stories of travellers", "Wanderers", &[("education", 3), ("civilRights", 2)]),
            ("Carve the deeds of the people in stone", "Carvers", &[("education", 2), ("happiness", 2)]),
        ],
        (Theme::Culture, false) => &[
            ("Fund the national arts council", "Artists", &[("happiness", 4), ("economy", -2)]),
            ("Protect heritage sites by law", "Historians", &[("environment", 2), ("happiness", 2)]),
            ("Promote multicultural programmes", "Community Leaders", &[("civilRights", 4), ("happiness", 1)]),
            ("Cut cultural spending", "Treasury", &[("economy", 3), ("happiness", -3)]),
            ("Let culture find its own patrons", "Collectors", &[("politicalFreedom", 2), ("economy", 1)]),
        ],
        (Theme::Economy, true) => &[
            ("Open a market at the crossroads", "Traders", &[("economy", 5), ("crime", 2)]),
            ("Demand tribute in grain and goods", "Chieftain", &[("economy", 3), ("happiness", -3)]),
            ("Share the stores equally", "Commoners", &[("happiness", 4), ("economy", -2)]),
            ("Strike a common coin", "Metalworkers", &[("economy", 4), ("technology", 1)]),
            ("Forbid trade with outsiders", "Elders", &[("economy", -3), ("crime", -2)]),
        ],
        (Theme::Economy, false) => &[
            ("Cut taxes to spur growth", "Business Lobby", &[("economy", 5), ("gdp", 2), ("healthcare", -2)]),
            ("Raise taxes on the wealthy", "Labour Union", &[("economy", -2), ("happiness", 3)]),
            ("Invest in industrial policy", "Industry Ministry", &[("economy", 4), ("environment", -2)]),
            ("Deregulate the markets", "Financiers", &[("economy", 4), ("civilRights", -1), ("crime", 1)]),
            ("Strengthen the social safety net", "Welfare Advocates", &[("happiness", 4), ("economy", -2)]),
        ],
        (Theme::Governance, true) => &[
            ("Call the elders to council", "Elders", &[("politicalFreedom", 3), ("happiness", 1)]),
            ("Let the chieftain rule by decree", "Chieftain", &[("politicalFreedom", -4), ("crime", -2)]),
            ("Settle it by ancestral law", "Law-Speakers", &[("civilRights", 2), ("happiness", 1)]),
            ("Let the assembly of free folk decide", "Free Folk", &[("politicalFreedom", 4), ("economy", -1)]),
            ("Consult the oracle", "Seers", &[("happiness", 2), ("education", -1)]),
        ],
        (Theme::Governance, false) => &[
            ("Hold a national referendum", "Democracy Advocates", &[("politicalFreedom", 4), ("economy", -1)]),
            ("Pass an executive order", "Executive Office", &[("politicalFreedom", -3), ("economy", 2)]),
            ("Refer it to the constitutional court", "Jurists", &[("civilRights", 3)]),
            ("Form a cross-party commission", "Moderates", &[("happiness", 2), ("politicalFreedom", 1)]),
            ("Devolve the decision to the regions", "Regional Governors", &[("politicalFreedom", 3), ("economy", -1)]),
        ],
        (Theme::Innovation, true) => &[
            ("Sponsor the most skilled artisans", "Artisans", &[("technology", 4), ("economy", -2)]),
            ("Send apprentices to learn abroad", "Masters", &[("education", 3), ("technology", 2)]),
            ("Forbid untested methods", "Elders", &[("technology", -2), ("happiness", 1)]),
            ("Offer a prize for useful inventions", "Tinkerers", &[("technology", 3), ("economy", -1)]),
            ("Record all craft knowledge in a hall of lore", "Lore Keepers", &[("education", 4), ("economy", -1)]),
        ],
        (Theme::Innovation, false) => &[
            ("Fund basic research grants", "Science Academy", &[("technology", 5), ("economy", -2)]),
            ("Offer tax credits for innovation", "Tech Industry", &[("technology", 4), ("economy", 1)]),
            ("Create a national innovation lab", "Engineers", &[("technology", 4), ("education", 2), ("economy", -3)]),
            ("Regulate emerging technologies", "Ethics Board", &[("civilRights", 2), ("technology", -1)]),
            ("Let private industry lead", "Venture Capitalists", &[("economy", 3), ("technology", 2)]),
        ],
        (Theme::Food, true) => &[
            ("Open the communal granary", "Commoners", &[("happiness", 4), ("economy", -2)]),
            ("Clear new fields from the forest", "Farmers", &[("economy", 4), ("environment", -4)]),
            ("Ration the stores strictly", "Stewards", &[("happiness", -2), ("healthcare", 2)]),
            ("Send hunters further afield", "Hunters", &[("economy", 2), ("crime", 1)]),
            ("Pray for rain and a good harvest", "Priests", &[("happiness", 2)]),
        ],
        (Theme::Food, false) => &[
            ("Subsidise domestic farmers", "Agriculture Ministry", &[("economy", -1), ("happiness", 3)]),
            ("Open food imports", "Importers", &[("economy", 2), ("happiness", 2)]),
            ("Invest in irrigation and crop science", "Agronomists", &[("technology", 2), ("environment", 2)]),
            ("Introduce food price controls", "Consumer Groups", &[("happiness", 3), ("economy", -3)]),
            ("Build strategic food reserves", "Planning Ministry", &[("healthcare", 2), ("economy", -2)]),
        ],
    }
}

const GENERIC_POOL: &[Canned] = &[
    ("Take no action for now", "Cautious Advisors", &[]),
    ("Delegate the matter to local leaders", "Local Leaders", &[("politicalFreedom", 2)]),
    ("Commission a study before deciding", "Scholars", &[("education", 1), ("economy", -1)]),
    ("Seek a compromise between the factions", "Mediators", &[("happiness", 1)]),
    ("Act decisively from the capital", "Loyalists", &[("politicalFreedom", -1), ("economy", 1)]),
];

/// Pick the theme with the most keyword hits; ties and no hits go to governance
pub fn classify(issue: &Issue) -> Theme {
    let mut haystack = format!("{} {} {}", issue.title, issue.category, issue.description);
    for option in &issue.options {
        haystack.push(' ');
        haystack.push_str(&option.text);
    }
    let haystack = haystack.to_lowercase();
    let tokens: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let scores: Vec<(Theme, usize)> = Theme::ALL
        .iter()
        .map(|theme| {
            let hits = tokens
                .iter()
                .filter(|t| theme.keywords().iter().any(|k| t.starts_with(k)))
                .count();
            (*theme, hits)
        })
        .collect();

    let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    let leaders: Vec<Theme> = scores
        .iter()
        .filter(|(_, s)| *s == best)
        .map(|(t, _)| *t)
        .collect();
    match leaders.as_slice() {
        [only] if best > 0 => *only,
        _ => Theme::Governance,
    }
}

pub fn target_count(desired: usize) -> usize {
    desired.clamp(MIN_OPTIONS, MAX_OPTIONS)
}

/// Dedup, trim and top up an issue's options in place
pub fn normalize_options(issue: &mut Issue, desired: usize, era: Era) {
    let target = target_count(desired);

    let mut seen = HashSet::new();
    issue.options.retain(|o| {
        let text = o.text.trim();
        !text.is_empty() && seen.insert(text.to_lowercase())
    });
    issue.options.truncate(target);

    if issue.options.len() < target {
        let theme = classify(issue);
        let pools = [canned_pool(theme, era.is_pre_industrial()), GENERIC_POOL];
        for (text, supporter, effects) in pools.iter().flat_map(|p| p.iter()) {
            if issue.options.len() >= target {
                break;
            }
            if seen.insert(text.to_lowercase()) {
                issue
                    .options
                    .push(IssueOption::new(*text, *supporter, effects_of(effects)));
            }
        }
        tracing::debug!("Topped up \"{}\" with {:?} options", issue.title, theme);
    }

    issue.ensure_option_ids();
}
