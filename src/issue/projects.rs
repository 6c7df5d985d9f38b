//! Fixed issue builders: the branching ending, crisis issues, regional
//! charters and era knowledge projects

use crate::core::types::Era;
use crate::crisis::arc::{CrisisArc, CrisisType};
use crate::issue::types::{effects_of, Issue, IssueMetadata, IssueOption, IssueSource, ProjectType};
use crate::nation::region::Specialization;
use crate::nation::Nation;

pub const PATH_CYBERPUNK: &str = "path-cyberpunk";
pub const PATH_SPACE: &str = "path-space";
pub const DIVERGENCE_TITLE: &str = "The Great Divergence";
pub const CRISIS_TITLE_PREFIX: &str = "System Stress: ";

/// The two-way choice that ends the Information Age
pub fn branching_ending() -> Issue {
    let options = vec![
        IssueOption::new(
            "Merge the nation with its networks and machines",
            "Technocrats",
            effects_of(&[("technology", 10), ("economy", 5), ("civilRights", -5)]),
        )
        .with_id(PATH_CYBERPUNK),
        IssueOption::new(
            "Turn every resource toward the stars",
            "Explorers",
            effects_of(&[("technology", 8), ("happiness", 5), ("economy", -3)]),
        )
        .with_id(PATH_SPACE),
    ];
    Issue::new(
        DIVERGENCE_TITLE,
        "Our knowledge has outgrown a single world. One road leads inward, into a society \
         woven through with machines; the other leads outward, toward an empire among the stars. \
         The choice cannot be undone.",
        "innovation",
        options,
    )
    .with_metadata(IssueMetadata::new(IssueSource::Ending))
}

pub fn crisis_title(arc: &CrisisArc) -> String {
    format!("{}{}", CRISIS_TITLE_PREFIX, arc.label)
}

fn crisis_options(crisis_type: CrisisType) -> Vec<IssueOption> {
    let table: [(&str, &str, &[(&str, i64)]); 3] = match crisis_type {
        CrisisType::Unrest => [
            ("Meet the protesters' main demands", "Citizens", &[("happiness", 5), ("economy", -2)]),
            ("Deploy the guard to restore order", "Security Council", &[("crime", -4), ("politicalFreedom", -3), ("happiness", -2)]),
            ("Open a public inquiry into the grievances", "Reformers", &[("politicalFreedom", 2), ("happiness", 2)]),
        ],
        CrisisType::Corruption => [
            ("Purge the corrupt officials", "Reformers", &[("crime", -3), ("politicalFreedom", -1), ("economy", 1)]),
            ("Establish an independent auditor", "Jurists", &[("economy", 2), ("civilRights", 1)]),
            ("Quietly buy off the ringleaders", "Elites", &[("economy", -3), ("crime", 2)]),
        ],
        CrisisType::Infrastructure => [
            ("Fund emergency repairs", "Builders", &[("economy", -3), ("happiness", 3), ("gdp", 1)]),
            ("Press local labour into service", "Stewards", &[("economy", 2), ("happiness", -3), ("civilRights", -2)]),
            ("Reroute resources from other regions", "Planners", &[("economy", -1), ("happiness", 1)]),
        ],
        CrisisType::Health => [
            ("Send healers and supplies", "Healers", &[("healthcare", 5), ("economy", -3)]),
            ("Seal the region off", "Security Council", &[("healthcare", 3), ("civilRights", -3), ("economy", -2)]),
            ("Let the outbreak run its course", "Treasury", &[("healthcare", -4), ("population", -1)]),
        ],
        CrisisType::Security => [
            ("Reinforce the garrison", "Security Council", &[("crime", -5), ("economy", -2)]),
            ("Negotiate with local leaders", "Diplomats", &[("crime", -2), ("happiness", 2)]),
            ("Impose a curfew", "Enforcers", &[("crime", -4), ("civilRights", -3)]),
        ],
        CrisisType::Innovation => [
            ("Fund the stalled works", "Innovators", &[("technology", 4), ("economy", -2)]),
            ("Recruit outside experts", "Scholars", &[("technology", 3), ("education", 2), ("economy", -2)]),
            ("Shelve the work for now", "Treasury", &[("technology", -2), ("economy", 2)]),
        ],
    };
    table
        .iter()
        .map(|(text, supporter, effects)| IssueOption::new(*text, *supporter, effects_of(effects)))
        .collect()
}

/// A map event built from an escalated arc
pub fn crisis_issue(arc: &CrisisArc) -> Issue {
    let mut metadata = IssueMetadata::new(IssueSource::Crisis);
    metadata.crisis_type = Some(arc.crisis_type);
    metadata.severity = Some(arc.severity);
    metadata.crisis_id = Some(arc.id.clone());
    metadata.region_id = Some(arc.region_id.clone());
    metadata.region_name = Some(arc.region_name.clone());
    metadata.stage = Some(arc.stage);

    let mut issue = Issue::new(
        crisis_title(arc),
        format!(
            "{} has reached stage {} of {} in {}: {}. Left alone, it will break down.",
            arc.crisis_type.title(),
            arc.stage,
            arc.max_stage,
            arc.region_name,
            arc.reason
        ),
        arc.crisis_type.name(),
        crisis_options(arc.crisis_type),
    )
    .with_metadata(metadata);
    issue.is_map_event = true;
    issue
}

fn charter_option(spec: Specialization, region: &str) -> IssueOption {
    let (text, supporter, effects): (String, &str, &[(&str, i64)]) = match spec {
        Specialization::Agrarian => (
            format!("Charter {} as the nation's breadbasket", region),
            "Farmers",
            &[("economy", 2), ("happiness", 2), ("environment", -1)],
        ),
        Specialization::Industrial => (
            format!("Charter {} as a centre of industry", region),
            "Industrialists",
            &[("economy", 4), ("environment", -3), ("technology", 1)],
        ),
        Specialization::Trade => (
            format!("Charter {} as a free trading hub", region),
            "Merchants",
            &[("economy", 3), ("gdp", 2)],
        ),
        Specialization::Fortress => (
            format!("Charter {} as a fortified march", region),
            "Security Council",
            &[("crime", -4), ("politicalFreedom", -1)],
        ),
        Specialization::Scholarly => (
            format!("Charter {} as a seat of learning", region),
            "Scholars",
            &[("education", 4), ("technology", 2), ("economy", -1)],
        ),
    };
    IssueOption::new(text, supporter, effects_of(effects)).with_id(spec.option_id())
}

/// Regional charter for the weakest region (lowest development plus stability)
pub fn specialization_project(nation: &Nation, decree: u32) -> Option<Issue> {
    let region = nation
        .regions
        .iter()
        .min_by_key(|r| r.development + r.stability)?;

    let mut metadata = IssueMetadata::new(IssueSource::Project);
    metadata.project_type = Some(ProjectType::Specialization);
    metadata.region_id = Some(region.id.clone());
    metadata.region_name = Some(region.name.clone());

    let options = Specialization::ALL
        .iter()
        .map(|spec| charter_option(*spec, &region.name))
        .collect();

    Some(
        Issue::new(
            format!("Regional Charter: {} (Decree {})", region.name, decree),
            format!(
                "{} lags behind the rest of {} (development {}, stability {}). \
                 The council proposes a charter to give the region a clear purpose.",
                region.name, nation.name, region.development, region.stability
            ),
            "governance",
            options,
        )
        .with_metadata(metadata),
    )
}

fn era_project_name(era: Era) -> Option<&'static str> {
    match era {
        Era::StoneAge => Some("Circle of Fire-Keepers"),
        Era::BronzeAge => Some("Smelters' Compact"),
        Era::IronAge => Some("Forge Schools"),
        Era::Classical => Some("Great Library"),
        Era::Medieval => Some("Cathedral Scriptoria"),
        Era::Renaissance => Some("Royal Academy"),
        Era::Industrial => Some("Engine Institute"),
        Era::Modern => Some("National Research Council"),
        Era::Information | Era::Cyberpunk | Era::Intergalactic => None,
    }
}

/// Knowledge investment that pushes the nation toward its next era
pub fn era_project(era: Era, phase: u32) -> Option<Issue> {
    let name = era_project_name(era)?;
    let mut metadata = IssueMetadata::new(IssueSource::Project);
    metadata.project_type = Some(ProjectType::Era);

    let options = vec![
        IssueOption::new(
            format!("Pour resources into the {}", name),
            "Scholars",
            effects_of(&[("technology", 12), ("economy", -4)]),
        ),
        IssueOption::new(
            "Fund the work modestly",
            "Moderates",
            effects_of(&[("technology", 6), ("economy", -1)]),
        ),
        IssueOption::new(
            "Invite wealthy patrons to pay for it",
            "Elites",
            effects_of(&[("technology", 4), ("economy", 1), ("civilRights", -1)]),
        ),
        IssueOption::new(
            "Defer the project",
            "Treasury",
            effects_of(&[("economy", 2), ("technology", -1)]),
        ),
    ];

    Some(
        Issue::new(
            format!("The {} (Phase {})", name, phase),
            format!(
                "Learned voices urge the founding of the {}, a gathering of the best minds \
                 of the {}. Its work could carry the nation into a new age.",
                name, era
            ),
            "innovation",
            options,
        )
        .with_metadata(metadata),
    )
}
