//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{NationError, Result};

/// Save slot number (1..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot(u8);

impl Slot {
    pub const ALL: [Slot; 3] = [Slot(1), Slot(2), Slot(3)];

    pub fn new(slot: u8) -> Result<Self> {
        if (1..=3).contains(&slot) {
            Ok(Self(slot))
        } else {
            Err(NationError::InvalidSlot(slot))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nation identity: `{userId}-slot-{slot}`
pub fn nation_id(user_id: &str, slot: Slot) -> String {
    format!("{}-slot-{}", user_id, slot)
}

/// 2D map position in the 0..100 map space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[min, max]`
    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Eternal,
    Eras,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Eternal => "Eternal",
            GameMode::Eras => "Eras",
        }
    }
}

/// Historical stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Era {
    #[default]
    #[serde(rename = "Stone Age")]
    StoneAge,
    #[serde(rename = "Bronze Age")]
    BronzeAge,
    #[serde(rename = "Iron Age")]
    IronAge,
    #[serde(rename = "Classical Era")]
    Classical,
    #[serde(rename = "Medieval Era")]
    Medieval,
    #[serde(rename = "Renaissance")]
    Renaissance,
    #[serde(rename = "Industrial Age")]
    Industrial,
    #[serde(rename = "Modern Era")]
    Modern,
    #[serde(rename = "Information Age")]
    Information,
    #[serde(rename = "Cyberpunk Era")]
    Cyberpunk,
    #[serde(rename = "Intergalactic Empire")]
    Intergalactic,
}

impl Era {
    pub const ALL: [Era; 11] = [
        Era::StoneAge,
        Era::BronzeAge,
        Era::IronAge,
        Era::Classical,
        Era::Medieval,
        Era::Renaissance,
        Era::Industrial,
        Era::Modern,
        Era::Information,
        Era::Cyberpunk,
        Era::Intergalactic,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Era::StoneAge => "Stone Age",
            Era::BronzeAge => "Bronze Age",
            Era::IronAge => "Iron Age",
            Era::Classical => "Classical Era",
            Era::Medieval => "Medieval Era",
            Era::Renaissance => "Renaissance",
            Era::Industrial => "Industrial Age",
            Era::Modern => "Modern Era",
            Era::Information => "Information Age",
            Era::Cyberpunk => "Cyberpunk Era",
            Era::Intergalactic => "Intergalactic Empire",
        }
    }

    /// Next era along the research track. The two endings are reached only by choice.
    pub fn next(&self) -> Option<Era> {
        match self {
            Era::Information | Era::Cyberpunk | Era::Intergalactic => None,
            _ => Era::ALL.get(self.index() + 1).copied(),
        }
    }

    /// Stone Age through Renaissance
    pub fn is_pre_industrial(&self) -> bool {
        *self <= Era::Renaissance
    }

    /// Eras in which modern vocabulary is rejected outright
    pub fn forbids_modern_terms(&self) -> bool {
        *self <= Era::Medieval
    }

    pub fn from_name(name: &str) -> Option<Era> {
        Era::ALL
            .iter()
            .copied()
            .find(|era| era.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Form of government. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GovernmentType {
    Democracy,
    Republic,
    Monarchy,
    Authoritarian,
    Theocracy,
    Technocracy,
    Other(String),
}

impl GovernmentType {
    pub fn name(&self) -> &str {
        match self {
            GovernmentType::Democracy => "Democracy",
            GovernmentType::Republic => "Republic",
            GovernmentType::Monarchy => "Monarchy",
            GovernmentType::Authoritarian => "Authoritarian",
            GovernmentType::Theocracy => "Theocracy",
            GovernmentType::Technocracy => "Technocracy",
            GovernmentType::Other(label) => label,
        }
    }

    /// Regimes whose security apparatus gains on every decision
    pub fn is_autocratic(&self) -> bool {
        matches!(self, GovernmentType::Authoritarian | GovernmentType::Theocracy)
    }
}

impl Default for GovernmentType {
    fn default() -> Self {
        GovernmentType::Democracy
    }
}

impl From<String> for GovernmentType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "democracy" => GovernmentType::Democracy,
            "republic" => GovernmentType::Republic,
            "monarchy" => GovernmentType::Monarchy,
            "authoritarian" => GovernmentType::Authoritarian,
            "theocracy" => GovernmentType::Theocracy,
            "technocracy" => GovernmentType::Technocracy,
            _ => GovernmentType::Other(value),
        }
    }
}

impl From<GovernmentType> for String {
    fn from(value: GovernmentType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for GovernmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
