use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::leveling::{self, Progress};

/// One of the five fixed life-skill tracks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AttributeName {
    Intelligence,
    Strength,
    Love,
    Network,
    Family,
}

impl AttributeName {
    /// All attributes in canonical display order.
    pub const ALL: [AttributeName; 5] = [
        AttributeName::Intelligence,
        AttributeName::Strength,
        AttributeName::Love,
        AttributeName::Network,
        AttributeName::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Intelligence => "intelligence",
            AttributeName::Strength => "strength",
            AttributeName::Love => "love",
            AttributeName::Network => "network",
            AttributeName::Family => "family",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        AttributeName::ALL
            .into_iter()
            .find(|name| name.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "attribute".to_string(),
                message: format!(
                    "unknown attribute '{s}'; expected intelligence|strength|love|network|family"
                ),
            })
    }
}

/// Level and cumulative XP for a single attribute.
///
/// Fields are only changed through [`Attribute::gain`], which keeps
/// `level == level_from_xp(total_xp)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    name: AttributeName,
    level: u32,
    total_xp: u64,
}

impl Attribute {
    /// Fresh attribute at level 1 with no XP.
    pub fn new(name: AttributeName) -> Self {
        Self {
            name,
            level: leveling::MIN_LEVEL,
            total_xp: 0,
        }
    }

    pub fn name(&self) -> AttributeName {
        self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Cumulative XP earned over the attribute's lifetime.
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Progress towards the next level.
    pub fn progress(&self) -> Progress {
        leveling::progress_to_next_level(self.signed_xp(), self.level)
    }

    /// Add `xp` and recompute the level.
    pub(crate) fn gain(&mut self, xp: u64) -> XpGain {
        let level_before = self.level;
        self.total_xp = self.total_xp.saturating_add(xp);
        self.level = leveling::level_from_xp(self.signed_xp());
        XpGain {
            attribute: self.name,
            xp,
            level_before,
            level_after: self.level,
        }
    }

    /// Restore the level invariant on data read from storage.
    ///
    /// Returns `true` if anything had to change.
    pub(crate) fn normalize(&mut self, slot: AttributeName) -> bool {
        let level = leveling::level_from_xp(self.signed_xp());
        let changed = self.level != level || self.name != slot;
        self.level = level;
        self.name = slot;
        changed
    }

    fn signed_xp(&self) -> i64 {
        i64::try_from(self.total_xp).unwrap_or(i64::MAX)
    }
}

/// Result of applying XP to one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpGain {
    pub attribute: AttributeName,
    pub xp: u64,
    pub level_before: u32,
    pub level_after: u32,
}

impl XpGain {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Fixed mapping from every [`AttributeName`] to its [`Attribute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    intelligence: Attribute,
    strength: Attribute,
    love: Attribute,
    network: Attribute,
    family: Attribute,
}

impl Attributes {
    pub fn new() -> Self {
        Self {
            intelligence: Attribute::new(AttributeName::Intelligence),
            strength: Attribute::new(AttributeName::Strength),
            love: Attribute::new(AttributeName::Love),
            network: Attribute::new(AttributeName::Network),
            family: Attribute::new(AttributeName::Family),
        }
    }

    pub fn get(&self, name: AttributeName) -> &Attribute {
        match name {
            AttributeName::Intelligence => &self.intelligence,
            AttributeName::Strength => &self.strength,
            AttributeName::Love => &self.love,
            AttributeName::Network => &self.network,
            AttributeName::Family => &self.family,
        }
    }

    pub(crate) fn get_mut(&mut self, name: AttributeName) -> &mut Attribute {
        match name {
            AttributeName::Intelligence => &mut self.intelligence,
            AttributeName::Strength => &mut self.strength,
            AttributeName::Love => &mut self.love,
            AttributeName::Network => &mut self.network,
            AttributeName::Family => &mut self.family,
        }
    }

    /// Attributes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        AttributeName::ALL.into_iter().map(move |name| self.get(name))
    }

    /// Highest level across all attributes.
    pub fn max_level(&self) -> u32 {
        self.iter()
            .map(Attribute::level)
            .max()
            .unwrap_or(leveling::MIN_LEVEL)
    }

    /// Total XP across all attributes.
    pub fn total_xp(&self) -> u64 {
        self.iter()
            .fold(0u64, |acc, attr| acc.saturating_add(attr.total_xp()))
    }

    pub(crate) fn normalize(&mut self) -> usize {
        AttributeName::ALL
            .into_iter()
            .filter(|&name| self.get_mut(name).normalize(name))
            .count()
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new()
    }
}
