//! Built-in sample issues, used when the external generator is unavailable

use std::collections::HashSet;

use crate::core::types::Era;
use crate::issue::types::{
    effects_of, Consequence, ConsequenceKind, Issue, IssueMetadata, IssueOption, IssueSource,
};
use crate::nation::policy::ConsequenceKind::{Benefit, Downside};

type Stat = (&'static str, i64);

struct SampleOption {
    text: &'static str,
    supporter: &'static str,
    effects: &'static [Stat],
    consequence: Option<(&'static str, f64, ConsequenceKind, &'static [Stat])>,
}

const fn opt(text: &'static str, supporter: &'static str, effects: &'static [Stat]) -> SampleOption {
    SampleOption {
        text,
        supporter,
        effects,
        consequence: None,
    }
}

impl SampleOption {
    const fn then(
        mut self,
        text: &'static str,
        chance: f64,
        kind: ConsequenceKind,
        effects: &'static [Stat],
    ) -> Self {
        self.consequence = Some((text, chance, kind, effects));
        self
    }
}

struct Sample {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    options: &'static [SampleOption],
}

const STONE_AGE: &[Sample] = &[
    Sample {
        title: "The Mammoth Herd",
        description: "Scouts report a great herd moving through the valley. The hunt could feed everyone through winter, or cost many lives.",
        category: "food",
        options: &[
            opt("Send every able hunter", "Hunters", &[("economy", 6), ("healthcare", -3)])
                .then("The feast brings the clans together.", 0.5, Benefit, &[("happiness", 4)]),
            opt("Hunt only the stragglers", "Elders", &[("economy", 2), ("environment", 1)]),
            opt("Let the herd pass in peace", "Spirit Speakers", &[("happiness", 2), ("economy", -2)]),
        ],
    },
    Sample {
        title: "Keepers of the Fire",
        description: "The central fire went out in last night's storm. Who should guard the flame from now on?",
        category: "culture",
        options: &[
            opt("Appoint a sacred fire-keeper", "Spirit Speakers", &[("happiness", 3), ("politicalFreedom", -1)]),
            opt("Teach every family to make fire", "Toolmakers", &[("technology", 4), ("education", 2)]),
            opt("Rotate the duty among the hunters", "Hunters", &[("civilRights", 2)]),
        ],
    },
    Sample {
        title: "Strangers at the Cave Mouth",
        description: "A wandering band asks to shelter in our caves for the winter.",
        category: "security",
        options: &[
            opt("Welcome them as kin", "Gatherers", &[("happiness", 2), ("civilRights", 3), ("crime", 2)]),
            opt("Trade shelter for their flint", "Toolmakers", &[("economy", 4)]),
            opt("Drive them away", "Warriors", &[("crime", -3), ("civilRights", -3)]),
        ],
    },
];

const BRONZE_AGE: &[Sample] = &[
    Sample {
        title: "Tin from the Mountains",
        description: "Bronze needs tin, and the only source lies beyond the mountain passes held by herders.",
        category: "economy",
        options: &[
            opt("Open a trade route with the herders", "Traders", &[("economy", 5), ("technology", 2)]),
            opt("Seize the mines by force", "War Chiefs", &[("economy", 3), ("crime", 4), ("happiness", -2)])
                .then("The herders raid our caravans in revenge.", 0.4, Downside, &[("economy", -3), ("crime", 3)]),
            opt("Make do with copper", "Elders", &[("technology", -2), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "The Temple Granary",
        description: "Priests want all surplus grain stored in the temple, where they will distribute it in lean years.",
        category: "food",
        options: &[
            opt("Give the priests the granary", "Priests", &[("healthcare", 3), ("politicalFreedom", -2)]),
            opt("Keep grain in family stores", "Farmers", &[("politicalFreedom", 2), ("healthcare", -1)]),
            opt("Build a granary run by the council", "Council", &[("economy", 2), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "Scribes and Tallies",
        description: "A few traders have begun marking clay tablets to track debts. Should this craft be encouraged?",
        category: "innovation",
        options: &[
            opt("Found a school for scribes", "Scribes", &[("education", 5), ("economy", -2)]),
            opt("Reserve writing for the temple", "Priests", &[("education", 2), ("civilRights", -2)]),
            opt("Leave it to the traders", "Traders", &[("economy", 2)]),
        ],
    },
];

const IRON_AGE: &[Sample] = &[
    Sample {
        title: "The Iron Smiths' Secret",
        description: "Our smiths have learned to work iron, and neighbouring chiefs offer gold for the secret.",
        category: "innovation",
        options: &[
            opt("Guard the secret jealously", "Smiths", &[("technology", 3), ("economy", 2)]),
            opt("Sell the secret for gold", "Merchants", &[("economy", 6), ("crime", 2)]),
            opt("Share it with our allies", "Diplomats", &[("happiness", 2), ("technology", 1)]),
        ],
    },
    Sample {
        title: "Hill Fort Walls",
        description: "Raiders from the north grow bolder each summer. The hill fort's earthen walls are crumbling.",
        category: "security",
        options: &[
            opt("Rebuild the walls in stone", "Builders", &[("crime", -4), ("economy", -3)]),
            opt("Train a standing warband", "Warlords", &[("crime", -5), ("politicalFreedom", -3)]),
            opt("Pay the raiders to stay away", "Merchants", &[("economy", -4), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "Sacred Groves",
        description: "Charcoal burners want to fell the sacred groves to feed the forges.",
        category: "culture",
        options: &[
            opt("Protect the groves", "Druids", &[("environment", 4), ("technology", -1)]),
            opt("Fell half the groves", "Charcoal Burners", &[("economy", 3), ("environment", -3)]),
            opt("Plant new groves for each one cut", "Foresters", &[("environment", 1), ("economy", 1)]),
        ],
    },
];

const CLASSICAL: &[Sample] = &[
    Sample {
        title: "The Aqueduct Question",
        description: "The city has outgrown its wells. Engineers propose an aqueduct from the hills at vast expense.",
        category: "infrastructure",
        options: &[
            opt("Build the grand aqueduct", "Engineers", &[("healthcare", 5), ("economy", -4), ("happiness", 2)])
                .then("Clean water halts a summer fever.", 0.5, Benefit, &[("healthcare", 3)]),
            opt("Dig more wells", "Well Diggers", &[("healthcare", 2), ("economy", -1)]),
            opt("Levy the rich to pay for it", "Tribunes", &[("happiness", 3), ("economy", -2)]),
            opt("Postpone the project", "Treasury", &[("economy", 2), ("healthcare", -2)]),
        ],
    },
    Sample {
        title: "Citizenship for Freedmen",
        description: "Freed labourers demand citizenship and a voice in the assembly.",
        category: "governance",
        options: &[
            opt("Grant full citizenship", "Reformers", &[("civilRights", 5), ("politicalFreedom", 3)]),
            opt("Grant citizenship without a vote", "Senators", &[("civilRights", 2)]),
            opt("Refuse their petition", "Patricians", &[("civilRights", -3), ("crime", 3)]),
            opt("Offer land in the colonies instead", "Colonists", &[("economy", 2), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "The Philosophers' School",
        description: "A famous philosopher wishes to open a school in the capital, but his teachings question the gods.",
        category: "innovation",
        options: &[
            opt("Welcome the school", "Scholars", &[("education", 5), ("happiness", -1)]),
            opt("Allow it under temple oversight", "Priests", &[("education", 2), ("politicalFreedom", -1)]),
            opt("Banish the philosopher", "Traditionalists", &[("education", -3), ("politicalFreedom", -3)]),
            opt("Fund lectures for the public", "Tribunes", &[("education", 4), ("economy", -2)]),
        ],
    },
];

const MEDIEVAL: &[Sample] = &[
    Sample {
        title: "The Plague Ships",
        description: "Ships from the east arrive with sick sailors aboard. The merchants insist their cargo must land.",
        category: "health",
        options: &[
            opt("Quarantine the ships for forty days", "Physicians", &[("healthcare", 5), ("economy", -4)]),
            opt("Let the cargo land, keep the crews aboard", "Merchants", &[("economy", 2), ("healthcare", -2)])
                .then("Rats slip ashore with the cargo.", 0.4, Downside, &[("healthcare", -5), ("population", -2)]),
            opt("Burn the ships", "Town Watch", &[("healthcare", 3), ("economy", -6), ("crime", 2)]),
            opt("Pray for deliverance", "Clergy", &[("happiness", 2), ("healthcare", -3)]),
        ],
    },
    Sample {
        title: "Charter for the Guilds",
        description: "The craft guilds ask for a royal charter granting them control over their trades.",
        category: "economy",
        options: &[
            opt("Grant the charter", "Guild Masters", &[("economy", 4), ("politicalFreedom", -1)]),
            opt("Grant it with price limits", "Townsfolk", &[("economy", 2), ("happiness", 2)]),
            opt("Refuse and keep trade open", "Free Traders", &[("economy", 1), ("crime", 1)]),
            opt("Tax the guilds for the privilege", "Exchequer", &[("economy", 3), ("happiness", -1)]),
        ],
    },
    Sample {
        title: "A Dispute of Succession",
        description: "Two cousins claim the lordship of the eastern march. Both have armed supporters.",
        category: "governance",
        options: &[
            opt("Back the elder cousin", "Old Nobility", &[("crime", -2), ("politicalFreedom", -1)]),
            opt("Let the local barons choose", "Barons", &[("politicalFreedom", 3), ("crime", 2)]),
            opt("Take the march under the crown", "Royal Council", &[("economy", 3), ("happiness", -3)]),
            opt("Settle it by trial of combat", "Knights", &[("happiness", 2), ("civilRights", -2)]),
        ],
    },
];

const RENAISSANCE: &[Sample] = &[
    Sample {
        title: "The Printing Press",
        description: "A craftsman has built a press that copies books in days. Scribes and clergy are alarmed.",
        category: "innovation",
        options: &[
            opt("License presses freely", "Printers", &[("education", 6), ("politicalFreedom", 3)]),
            opt("Allow only licensed presses", "Censors", &[("education", 3), ("politicalFreedom", -2)]),
            opt("Ban the press", "Scribes", &[("education", -3), ("happiness", -1)]),
            opt("Print only sacred texts", "Clergy", &[("education", 2), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "Patrons of the Arts",
        description: "Wealthy families compete to sponsor painters and sculptors. Should the state join in?",
        category: "culture",
        options: &[
            opt("Commission great public works of art", "Artists", &[("happiness", 5), ("economy", -3)]),
            opt("Leave patronage to the banking houses", "Bankers", &[("economy", 2)]),
            opt("Tax luxury commissions", "Treasury", &[("economy", 3), ("happiness", -2)]),
            opt("Found an academy of arts", "Academicians", &[("education", 3), ("economy", -2)]),
        ],
    },
    Sample {
        title: "Voyages Beyond the Horizon",
        description: "A navigator seeks ships to find a western passage to the spice lands.",
        category: "economy",
        options: &[
            opt("Fund a full fleet", "Navigators", &[("economy", -4), ("technology", 3)])
                .then("The fleet returns laden with spices.", 0.45, Benefit, &[("economy", 8), ("gdp", 3)]),
            opt("Fund a single ship", "Merchants", &[("economy", -1), ("technology", 1)]),
            opt("Decline the venture", "Treasury", &[("economy", 1)]),
            opt("Invite foreign backers", "Diplomats", &[("economy", 1), ("politicalFreedom", -1)]),
        ],
    },
];

const INDUSTRIAL: &[Sample] = &[
    Sample {
        title: "Child Labour in the Mills",
        description: "Reformers report children working fourteen-hour shifts in the textile mills.",
        category: "governance",
        options: &[
            opt("Ban child labour outright", "Reformers", &[("civilRights", 5), ("economy", -3)]),
            opt("Limit hours and require schooling", "Teachers", &[("education", 4), ("economy", -1)]),
            opt("Leave it to the mill owners", "Industrialists", &[("economy", 4), ("happiness", -4)]),
            opt("Inspect the worst mills", "Inspectors", &[("civilRights", 2), ("economy", -1)]),
        ],
    },
    Sample {
        title: "The Railway Boom",
        description: "Investors race to lay track across the country. Some routes run through farmland and towns.",
        category: "infrastructure",
        options: &[
            opt("Grant railway companies compulsory purchase", "Railway Barons", &[("economy", 6), ("civilRights", -3)]),
            opt("Build a state railway", "Ministry of Works", &[("economy", 3), ("gdp", 2), ("happiness", 1)]),
            opt("Regulate routes and fares", "Parliament", &[("economy", 2), ("happiness", 2)]),
            opt("Protect the farmland", "Farmers", &[("environment", 3), ("economy", -2)]),
        ],
    },
    Sample {
        title: "Smoke Over the City",
        description: "Factory smoke blackens the capital and coughing fills the tenements.",
        category: "health",
        options: &[
            opt("Impose smoke controls", "Physicians", &[("healthcare", 4), ("environment", 4), ("economy", -3)]),
            opt("Move factories outside the city", "Planners", &[("healthcare", 2), ("economy", -2)]),
            opt("Smoke means prosperity", "Industrialists", &[("economy", 4), ("healthcare", -4), ("environment", -4)]),
            opt("Build public baths and parks", "Reformers", &[("happiness", 3), ("healthcare", 2), ("economy", -2)]),
        ],
    },
];

const MODERN: &[Sample] = &[
    Sample {
        title: "Universal Suffrage",
        description: "Campaigners demand the vote for every adult citizen regardless of property or gender.",
        category: "governance",
        options: &[
            opt("Enact universal suffrage", "Suffragists", &[("politicalFreedom", 6), ("civilRights", 4)]),
            opt("Extend the vote gradually", "Moderates", &[("politicalFreedom", 2), ("civilRights", 2)]),
            opt("Keep the property qualification", "Landowners", &[("politicalFreedom", -3), ("crime", 2)]),
            opt("Put it to a referendum", "Democrats", &[("politicalFreedom", 3)]),
            opt("Suppress the campaign", "Security Services", &[("politicalFreedom", -5), ("crime", -1)]),
        ],
    },
    Sample {
        title: "The National Health Service",
        description: "After years of debate, a bill for free healthcare at the point of use reaches parliament.",
        category: "health",
        options: &[
            opt("Pass the bill in full", "Health Ministry", &[("healthcare", 7), ("economy", -4)]),
            opt("Pass a means-tested version", "Centrists", &[("healthcare", 4), ("economy", -2)]),
            opt("Subsidise private insurance instead", "Insurers", &[("healthcare", 2), ("economy", 1)]),
            opt("Reject the bill", "Taxpayers Alliance", &[("economy", 2), ("happiness", -3)]),
            opt("Fund rural clinics first", "Rural Caucus", &[("healthcare", 3), ("happiness", 1)]),
        ],
    },
    Sample {
        title: "Highways or Railways",
        description: "The transport ministry must choose between a national motorway network and electrified rail.",
        category: "infrastructure",
        options: &[
            opt("Build the motorways", "Automobile Lobby", &[("economy", 5), ("environment", -4)]),
            opt("Electrify the railways", "Rail Unions", &[("economy", 3), ("environment", 2)]),
            opt("Split the budget", "Treasury", &[("economy", 2)]),
            opt("Invest in city transit", "Urbanists", &[("happiness", 3), ("environment", 2), ("economy", -1)]),
            opt("Let private firms build toll roads", "Contractors", &[("economy", 3), ("happiness", -2)]),
        ],
    },
];

const INFORMATION: &[Sample] = &[
    Sample {
        title: "Data Privacy Act",
        description: "Tech companies harvest personal data on a vast scale. Citizens want control over their information.",
        category: "governance",
        options: &[
            opt("Pass strict privacy laws", "Privacy Advocates", &[("civilRights", 6), ("economy", -2)]),
            opt("Require consent but allow data trading", "Tech Industry", &[("civilRights", 2), ("economy", 2)]),
            opt("Let the market decide", "Free Market Institute", &[("economy", 4), ("civilRights", -3)]),
            opt("Create a public data trust", "Reformers", &[("civilRights", 3), ("technology", 2), ("economy", -1)]),
            opt("Give security agencies access", "Security Council", &[("crime", -3), ("civilRights", -5)]),
        ],
    },
    Sample {
        title: "The Automation Wave",
        description: "Automated systems threaten millions of jobs in logistics and manufacturing.",
        category: "economy",
        options: &[
            opt("Introduce a universal basic income", "Futurists", &[("happiness", 5), ("economy", -4)]),
            opt("Tax automation to fund retraining", "Labour Unions", &[("education", 3), ("economy", -1)]),
            opt("Embrace automation fully", "Tech Industry", &[("economy", 6), ("happiness", -4), ("technology", 3)]),
            opt("Slow adoption with regulation", "Regulators", &[("happiness", 2), ("technology", -1)]),
            opt("Expand public sector jobs", "Public Sector Unions", &[("happiness", 3), ("economy", -3)]),
        ],
    },
    Sample {
        title: "Misinformation Epidemic",
        description: "False stories spread faster than corrections across social networks.",
        category: "culture",
        options: &[
            opt("Fund independent fact-checkers", "Journalists", &[("education", 3), ("economy", -1)]),
            opt("Force platforms to remove falsehoods", "Regulators", &[("politicalFreedom", -3), ("happiness", 2)]),
            opt("Teach media literacy in schools", "Teachers", &[("education", 4)]),
            opt("Do nothing and defend free speech", "Civil Libertarians", &[("politicalFreedom", 3), ("crime", 2)]),
            opt("Launch a state information service", "Government Press Office", &[("politicalFreedom", -2), ("education", 1)]),
        ],
    },
];

const CYBERPUNK: &[Sample] = &[
    Sample {
        title: "Neural Implant Licensing",
        description: "Corporations sell neural implants that boost productivity. Unlicensed clinics are thriving in the undercity.",
        category: "health",
        options: &[
            opt("License and regulate implants", "Medical Board", &[("healthcare", 4), ("crime", -2)]),
            opt("Ban implants outright", "Purists", &[("technology", -4), ("crime", 4)]),
            opt("Subsidise implants for workers", "Corporate Council", &[("economy", 5), ("civilRights", -3)]),
            opt("Shut down the black clinics", "Enforcers", &[("crime", -4), ("happiness", -2)]),
            opt("Make implant designs open source", "Netrunners", &[("technology", 4), ("crime", 2)]),
        ],
    },
    Sample {
        title: "Megacorp Sovereignty",
        description: "The largest corporation demands legal authority over its own arcology districts.",
        category: "governance",
        options: &[
            opt("Refuse and reassert state law", "Constitutionalists", &[("politicalFreedom", 2), ("economy", -4)]),
            opt("Grant limited autonomy", "Corporate Council", &[("economy", 5), ("civilRights", -3)]),
            opt("Nationalise the corporation", "Populists", &[("economy", -3), ("happiness", 4)]),
            opt("Tax the arcologies heavily", "Treasury", &[("economy", 3), ("crime", 2)]),
            opt("Let residents vote on it", "Democrats", &[("politicalFreedom", 4)]),
        ],
    },
    Sample {
        title: "Undercity Blackouts",
        description: "Power rationing leaves the lower districts dark for hours each night.",
        category: "infrastructure",
        options: &[
            opt("Redistribute power to the undercity", "Street Unions", &[("happiness", 4), ("economy", -3)]),
            opt("Build microgrids in the lower districts", "Engineers", &[("technology", 3), ("economy", -2)]),
            opt("Prioritise the corporate towers", "Corporate Council", &[("economy", 4), ("crime", 4)]),
            opt("Deploy drones to police the dark zones", "Enforcers", &[("crime", -3), ("civilRights", -3)]),
            opt("Ration power equally", "Planners", &[("happiness", 1), ("economy", -1)]),
        ],
    },
];

const INTERGALACTIC: &[Sample] = &[
    Sample {
        title: "First Contact Protocol",
        description: "A signal from a neighbouring star system appears to be an invitation.",
        category: "security",
        options: &[
            opt("Send an envoy fleet", "Diplomatic Corps", &[("technology", 3), ("happiness", 3)])
                .then("The aliens share their star charts.", 0.5, Benefit, &[("technology", 5)]),
            opt("Answer with a guarded message", "Admiralty", &[("crime", -1), ("technology", 1)]),
            opt("Stay silent and watch", "Intelligence Directorate", &[("politicalFreedom", -2)]),
            opt("Arm the frontier", "Fleet Command", &[("crime", -3), ("economy", -3)]),
            opt("Let the colonies decide", "Colonial Assembly", &[("politicalFreedom", 3)]),
        ],
    },
    Sample {
        title: "Terraforming Rights",
        description: "A colony world could be made habitable, but it harbours native microbial life.",
        category: "food",
        options: &[
            opt("Terraform the planet", "Colonisation Board", &[("economy", 6), ("environment", -5)]),
            opt("Declare it a preserve", "Xenobiologists", &[("environment", 5), ("education", 2)]),
            opt("Terraform one hemisphere", "Moderates", &[("economy", 3), ("environment", -2)]),
            opt("Build sealed domes instead", "Engineers", &[("technology", 3), ("economy", -2)]),
            opt("Study it for a decade", "Science Council", &[("education", 3), ("economy", -1)]),
        ],
    },
    Sample {
        title: "The Core Worlds Tax",
        description: "Frontier colonies resent paying for the defence of the wealthy core worlds.",
        category: "economy",
        options: &[
            opt("Cut frontier taxes", "Frontier Senators", &[("happiness", 4), ("economy", -3)]),
            opt("Keep the tax and send more patrols", "Fleet Command", &[("crime", -3), ("happiness", -2)]),
            opt("Give colonies seats in the senate", "Reformers", &[("politicalFreedom", 4), ("civilRights", 2)]),
            opt("Raise the tax", "Core Treasury", &[("economy", 4), ("crime", 3)]),
            opt("Invest tax revenue in frontier shipyards", "Shipwrights", &[("economy", 2), ("technology", 2)]),
        ],
    },
];

fn table(era: Era) -> &'static [Sample] {
    match era {
        Era::StoneAge => STONE_AGE,
        Era::BronzeAge => BRONZE_AGE,
        Era::IronAge => IRON_AGE,
        Era::Classical => CLASSICAL,
        Era::Medieval => MEDIEVAL,
        Era::Renaissance => RENAISSANCE,
        Era::Industrial => INDUSTRIAL,
        Era::Modern => MODERN,
        Era::Information => INFORMATION,
        Era::Cyberpunk => CYBERPUNK,
        Era::Intergalactic => INTERGALACTIC,
    }
}

fn build(sample: &Sample) -> Issue {
    let options = sample
        .options
        .iter()
        .map(|o| {
            let option = IssueOption::new(o.text, o.supporter, effects_of(o.effects));
            match o.consequence {
                Some((text, chance, kind, effects)) => option.with_consequence(Consequence {
                    text: text.to_string(),
                    chance,
                    kind,
                    stat_effects: effects_of(effects),
                }),
                None => option,
            }
        })
        .collect();
    Issue::new(sample.title, sample.description, sample.category, options)
        .with_metadata(IssueMetadata::new(IssueSource::Sample))
}

/// Sample issues for an era, first occurrence of each title only
pub fn samples_for(era: Era) -> Vec<Issue> {
    let mut seen = HashSet::new();
    table(era)
        .iter()
        .filter(|s| seen.insert(s.title.to_lowercase()))
        .map(build)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::flavor::issue_anachronism;

    #[test]
    fn test_every_era_has_samples() {
        for era in Era::ALL {
            let samples = samples_for(era);
            assert!(samples.len() >= 3, "{} has too few samples", era);
            for issue in &samples {
                assert!(issue.options.len() >= 3, "{} has too few options", issue.title);
            }
        }
    }

    #[test]
    fn test_early_samples_are_in_period() {
        for era in Era::ALL.into_iter().filter(|e| e.forbids_modern_terms()) {
            for issue in samples_for(era) {
                assert_eq!(issue_anachronism(&issue, era), None, "{}", issue.title);
            }
        }
    }

    #[test]
    fn test_consequences_are_attached() {
        let samples = samples_for(Era::StoneAge);
        let hunt = samples.iter().find(|i| i.title == "The Mammoth Herd").unwrap();
        let consequence = hunt.options[0].consequence.as_ref().unwrap();
        assert_eq!(consequence.kind, ConsequenceKind::Benefit);
        assert_eq!(consequence.stat_effects.get("happiness"), Some(&4));
    }
}
