//! Per-user skill statistics.
//!
//! [`summarize`] is recomputed on every request and every notification; the
//! result is never cached or persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::skill::{SkillInfo, SkillLevel};

/// How many skills the "recently updated" list holds.
pub const RECENTLY_UPDATED_LIMIT: usize = 5;

/// Aggregated view of a user's skills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSummary {
    pub total_skills: usize,
    /// Exact, case-sensitive category string to count.
    pub by_category: BTreeMap<String, usize>,
    pub by_level: BTreeMap<SkillLevel, usize>,
    /// Newest `last_updated` first, at most [`RECENTLY_UPDATED_LIMIT`] entries.
    pub recently_updated: Vec<SkillInfo>,
}

impl SkillSummary {
    pub fn is_empty(&self) -> bool {
        self.total_skills == 0
    }
}

/// Build a [`SkillSummary`] from a user's skills.
///
/// Ties on `last_updated` are ordered by ascending skill id so the recent
/// list is stable across calls.
pub fn summarize(skills: &[SkillInfo]) -> SkillSummary {
    let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_level: BTreeMap<SkillLevel, usize> = BTreeMap::new();

    for skill in skills {
        *by_category.entry(skill.category.clone()).or_default() += 1;
        *by_level.entry(skill.level).or_default() += 1;
    }

    let mut recent: Vec<&SkillInfo> = skills.iter().collect();
    recent.sort_by(|a, b| {
        b.last_updated
            .cmp(&a.last_updated)
            .then_with(|| a.id.cmp(&b.id))
    });

    SkillSummary {
        total_skills: skills.len(),
        by_category,
        by_level,
        recently_updated: recent
            .into_iter()
            .take(RECENTLY_UPDATED_LIMIT)
            .cloned()
            .collect(),
    }
}
