//! Issues: the policy dilemmas presented to the player
//!
//! Fixed builders, sample tables, option normalization, era flavoring and
//! the strategy pipeline that picks which issue comes next.

pub mod flavor;
pub mod keys;
pub mod normalize;
pub mod pipeline;
pub mod projects;
pub mod samples;
pub mod types;

pub use keys::{repeat_key, title_slug};
pub use pipeline::{generate_issue, GeneratedIssue, PipelineInput, Strategy, STRATEGY_ORDER};
pub use projects::{PATH_CYBERPUNK, PATH_SPACE};
pub use types::{Complexity, Issue, IssueMetadata, IssueOption, IssueSource, ProjectType};
