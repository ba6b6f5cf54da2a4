//! Experience ledger - per-skill XP and levels
//!
//! Level N needs 100·N xp; surplus carries over, so one large award can jump
//! several levels. Saved after every award.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::store::{persist, KeyValueStore, LEDGER_KEY};

/// XP needed per level, multiplied by the current level
pub const XP_PER_LEVEL: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Walking,
    Punching,
    Training,
}

impl Skill {
    pub const ALL: [Skill; 3] = [Skill::Walking, Skill::Punching, Skill::Training];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Walking => "walking",
            Skill::Punching => "punching",
            Skill::Training => "training",
        }
    }
}

impl FromStr for Skill {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .iter()
            .copied()
            .find(|skill| skill.as_str() == s)
            .ok_or_else(|| GestureError::UnknownSkill(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillProgress {
    /// XP toward the next level
    pub xp: u32,
    pub level: u32,
}

impl Default for SkillProgress {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

impl SkillProgress {
    /// Add xp and consume level thresholds. Returns levels gained.
    fn add(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        self.level = self.level.max(1);
        let mut gained = 0;
        while self.xp >= XP_PER_LEVEL * self.level {
            self.xp -= XP_PER_LEVEL * self.level;
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceLedger {
    skills: BTreeMap<Skill, SkillProgress>,
}

impl ExperienceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self, skill: Skill) -> SkillProgress {
        self.skills.get(&skill).copied().unwrap_or_default()
    }

    /// Award xp to a known skill and persist. Returns levels gained.
    pub fn award(&mut self, skill: Skill, amount: u32, store: &mut dyn KeyValueStore) -> u32 {
        let gained = self.skills.entry(skill).or_default().add(amount);
        if gained > 0 {
            log::info!("⭐ {} reached level {}", skill.as_str(), self.progress(skill).level);
        }
        persist(store, LEDGER_KEY, self);
        gained
    }

    /// Award by name; unknown skills are logged and ignored
    pub fn award_xp(&mut self, skill: &str, amount: u32, store: &mut dyn KeyValueStore) -> Option<u32> {
        match skill.parse::<Skill>() {
            Ok(skill) => Some(self.award(skill, amount, store)),
            Err(e) => {
                log::warn!("Ignoring XP award: {}", e);
                None
            }
        }
    }
}
