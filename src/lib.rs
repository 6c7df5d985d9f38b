//! Nation Forge - persistent nation simulation driven by policy decisions

pub mod core;
pub mod crisis;
pub mod decision;
pub mod issue;
pub mod llm;
pub mod nation;
pub mod persistence;
pub mod session;
